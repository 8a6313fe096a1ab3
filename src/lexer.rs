//! 编译结果表达式的词法分析器

use crate::token::{Span, Token, TokenKind};

pub struct Lexer<'a> {
    input: &'a str,
    /// 输入字符串中的当前位置（字节索引）
    position: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer { input, position: 0 }
    }

    /// 返回当前位置的字符，不推进位置
    fn peek(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    /// 返回下一个位置的字符，不推进位置
    fn peek_next(&self) -> Option<char> {
        self.input[self.position..].chars().nth(1)
    }

    /// 推进位置一个字符并返回该字符
    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if let Some(c) = c {
            self.position += c.len_utf8();
        }
        c
    }

    /// 跳过空白字符
    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.bump();
            } else {
                break;
            }
        }
    }

    fn bump_digits(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.bump();
            } else {
                break;
            }
        }
    }

    /// 读取数字字面量：整数、小数以及指数形式（`1e20`）
    fn read_number(&mut self, start: usize) -> Token<'a> {
        self.bump_digits();
        if self.peek() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            self.bump(); // 消费 '.'
            self.bump_digits();
        }
        if matches!(self.peek(), Some('e') | Some('E')) {
            let after = self.peek_next();
            if after.is_some_and(|c| c.is_ascii_digit() || c == '-' || c == '+') {
                self.bump(); // 消费 'e'
                if matches!(self.peek(), Some('-') | Some('+')) {
                    self.bump();
                }
                self.bump_digits();
            }
        }
        Token {
            kind: TokenKind::Number(&self.input[start..self.position]),
            span: Span::new(start, self.position),
        }
    }

    /// 读取单引号包围的字符串字面量，`''` 表示一个转义的单引号
    /// 注意：开始的引号已经被调用者消费
    fn read_string(&mut self, start: usize) -> Token<'a> {
        let content_start = self.position;
        loop {
            match self.peek() {
                Some('\'') if self.peek_next() == Some('\'') => {
                    self.bump();
                    self.bump();
                }
                Some('\'') => break,
                Some(_) => {
                    self.bump();
                }
                // 未闭合的字符串
                None => {
                    return Token {
                        kind: TokenKind::Illegal,
                        span: Span::new(start, self.position),
                    };
                }
            }
        }
        let content_end = self.position;
        self.bump(); // 消费结束引号

        Token {
            kind: TokenKind::String(&self.input[content_start..content_end]),
            span: Span::new(start, self.position),
        }
    }

    /// 读取标识符或关键字
    /// 标识符可以包含字母、数字、下划线和点（`t.col`）
    fn read_identifier(&mut self, start: usize) -> Token<'a> {
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' || c == '.' {
                self.bump();
            } else {
                break;
            }
        }
        let literal = &self.input[start..self.position];
        let kind = match_keyword(literal);
        Token {
            kind,
            span: Span::new(start, self.position),
        }
    }
}

fn match_keyword(s: &str) -> TokenKind<'_> {
    match s.to_ascii_lowercase().as_str() {
        "and" => TokenKind::And,
        "or" => TokenKind::Or,
        "not" => TokenKind::Not,
        "in" => TokenKind::In,
        "is" => TokenKind::Is,
        "null" => TokenKind::Null,
        "like" => TokenKind::Like,
        "between" => TokenKind::Between,
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        _ => TokenKind::Identifier(s),
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_whitespace();
        let start = self.position;

        let c = self.bump()?;

        let token = match c {
            '=' => Token { kind: TokenKind::Eq, span: Span::new(start, self.position) },
            '(' => Token { kind: TokenKind::LParen, span: Span::new(start, self.position) },
            ')' => Token { kind: TokenKind::RParen, span: Span::new(start, self.position) },
            ',' => Token { kind: TokenKind::Comma, span: Span::new(start, self.position) },
            '<' => match self.peek() {
                Some('=') => {
                    self.bump();
                    Token { kind: TokenKind::Lte, span: Span::new(start, self.position) }
                }
                Some('>') => {
                    self.bump();
                    Token { kind: TokenKind::NotEq, span: Span::new(start, self.position) }
                }
                _ => Token { kind: TokenKind::Lt, span: Span::new(start, self.position) },
            },
            '>' => {
                if self.peek() == Some('=') {
                    self.bump();
                    Token { kind: TokenKind::Gte, span: Span::new(start, self.position) }
                } else {
                    Token { kind: TokenKind::Gt, span: Span::new(start, self.position) }
                }
            }
            '!' => {
                if self.peek() == Some('=') {
                    self.bump();
                    Token { kind: TokenKind::NotEq, span: Span::new(start, self.position) }
                } else {
                    Token { kind: TokenKind::Illegal, span: Span::new(start, self.position) }
                }
            }
            '-' => Token { kind: TokenKind::Dash, span: Span::new(start, self.position) },
            '\'' => self.read_string(start),
            c if c.is_ascii_digit() => self.read_number(start),
            c if c.is_alphabetic() || c == '_' => self.read_identifier(start),
            _ => Token { kind: TokenKind::Illegal, span: Span::new(start, self.position) },
        };
        Some(token)
    }
}
