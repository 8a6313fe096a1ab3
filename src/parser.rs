//! 编译结果表达式的语法分析器
//!
//! 把编译器输出的条件表达式重新读回布尔表达式树，用来核对编译结果与原始过滤树
//! 在逻辑上是否等价。
//!
//! ## 解析流程图
//!
//! ```text
//! parse()
//!   └─ parse_or_expression()
//!        ├─ parse_and_expression()
//!        │    ├─ parse_not_expression()
//!        │    │    └─ parse_primary_expression()
//!        │    │         ├─ "(" → 分组表达式 (递归调用 parse_or_expression)
//!        │    │         └─ parse_operand() + parse_predicate_tail()
//!        │    │              ├─ IS [NOT] NULL
//!        │    │              ├─ [NOT] IN (值列表)
//!        │    │              ├─ [NOT] LIKE 值
//!        │    │              ├─ [NOT] BETWEEN 值 AND 值
//!        │    │              ├─ 比较运算符 → 比较操作 + 值
//!        │    │              └─ 无后缀 → 布尔字面量 (TRUE / FALSE)
//!        │    │
//!        │    └─ 遇到AND时，继续解析右侧NOT表达式
//!        │
//!        └─ 遇到OR时，继续解析右侧AND表达式
//! ```
//!
//! ## 语法优先级（从高到低）
//!
//! 1. **括号分组** `(expression)`
//! 2. **谓词** `a = 1`, `a IS NULL`, `a IN (...)`, `a BETWEEN 1 AND 2`
//! 3. **NOT操作** `NOT expression`
//! 4. **AND操作** `expr1 AND expr2`
//! 5. **OR操作** `expr1 OR expr2`
//!
//! `BETWEEN` 内部的 `AND` 属于谓词本身，不是逻辑连接符。

use std::fmt;

use thiserror::Error;

use crate::formatter::quote_string;
use crate::lexer::Lexer;
use crate::token::{Span, Token, TokenKind};

/// 比较运算符
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompOp {
    Eq,    // =
    NotEq, // <> / !=
    Gt,    // >
    Lt,    // <
    Gte,   // >=
    Lte,   // <=
}

/// 字面量值
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    /// 保留原始文本，例如 "-2.5"
    Number(String),
    /// `DATE '2024-01-31'`
    Date(String),
    Boolean(bool),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(s) => f.write_str(&quote_string(s)),
            Literal::Number(n) => f.write_str(n),
            Literal::Date(d) => write!(f, "DATE {}", quote_string(d)),
            Literal::Boolean(true) => f.write_str("TRUE"),
            Literal::Boolean(false) => f.write_str("FALSE"),
        }
    }
}

/// 谓词的操作数：列、函数调用或字面量
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// 列名或函数调用，文本已规范化，例如 `SUBSTR(first_name, 1, 3)`
    Column(String),
    Literal(Literal),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Column(c) => f.write_str(c),
            Operand::Literal(l) => write!(f, "{}", l),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PredicateKind {
    Compare { op: CompOp, value: Operand },
    In(Vec<Operand>),
    Like(Operand),
    Between(Operand, Operand),
    IsNull,
}

/// 叶子谓词
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub left: Operand,
    pub kind: PredicateKind,
    /// 谓词内部书写的否定：`NOT IN`、`NOT LIKE`、`NOT BETWEEN`、`IS NOT NULL`
    pub negated: bool,
}

impl Predicate {
    /// 左操作数为列或函数调用时返回其文本
    pub fn field(&self) -> Option<&str> {
        match &self.left {
            Operand::Column(c) => Some(c),
            Operand::Literal(_) => None,
        }
    }
}

/// 读回的布尔表达式树
#[derive(Debug, Clone, PartialEq)]
pub enum BoolExpr {
    And(Box<BoolExpr>, Box<BoolExpr>),
    Or(Box<BoolExpr>, Box<BoolExpr>),
    Not(Box<BoolExpr>),
    Predicate(Predicate),
    Literal(bool),
}

impl BoolExpr {
    /// 在给定谓词真值的情况下求值
    pub fn eval<F>(&self, truth: &F) -> bool
    where
        F: Fn(&Predicate) -> bool,
    {
        match self {
            BoolExpr::And(a, b) => a.eval(truth) && b.eval(truth),
            BoolExpr::Or(a, b) => a.eval(truth) || b.eval(truth),
            BoolExpr::Not(a) => !a.eval(truth),
            BoolExpr::Predicate(p) => truth(p),
            BoolExpr::Literal(b) => *b,
        }
    }

    /// 按从左到右的顺序收集所有谓词
    pub fn predicates(&self) -> Vec<&Predicate> {
        let mut out = Vec::new();
        self.collect_predicates(&mut out);
        out
    }

    fn collect_predicates<'a>(&'a self, out: &mut Vec<&'a Predicate>) {
        match self {
            BoolExpr::And(a, b) | BoolExpr::Or(a, b) => {
                a.collect_predicates(out);
                b.collect_predicates(out);
            }
            BoolExpr::Not(a) => a.collect_predicates(out),
            BoolExpr::Predicate(p) => out.push(p),
            BoolExpr::Literal(_) => {}
        }
    }
}

pub struct Parser<'a> {
    tokens: &'a [Token<'a>],
    position: usize,
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
    pub span: Option<Span>,
}

impl ParseError {
    fn new(message: String, span: Option<Span>) -> Self {
        Self { message, span }
    }

    fn at_position(message: String, span: Span) -> Self {
        Self {
            message,
            span: Some(span),
        }
    }
}

/// 对整个表达式字符串做词法和语法分析
pub fn parse_expression(input: &str) -> Result<BoolExpr, ParseError> {
    let tokens: Vec<_> = Lexer::new(input).collect();
    Parser::new(&tokens).parse()
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token<'a>]) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    /// 返回当前 token，不推进位置
    fn peek(&self) -> Option<&'a Token<'a>> {
        self.tokens.get(self.position)
    }

    /// 返回当前 token 并推进位置
    fn advance(&mut self) -> Option<&'a Token<'a>> {
        let tokens = self.tokens;
        let token = tokens.get(self.position)?;
        self.position += 1;
        Some(token)
    }

    /// 期望特定类型的 token 并推进，否则返回错误
    fn expect(&mut self, expected: TokenKind) -> Result<&'a Token<'a>, ParseError> {
        let tokens = self.tokens;
        match tokens.get(self.position) {
            Some(token)
                if std::mem::discriminant(&token.kind) == std::mem::discriminant(&expected) =>
            {
                self.position += 1;
                Ok(token)
            }
            Some(token) => Err(ParseError::at_position(
                format!("Expected {:?}, found {:?}", expected, token.kind),
                token.span,
            )),
            None => Err(ParseError::new(
                format!("Expected {:?}, but reached end of input", expected),
                None,
            )),
        }
    }

    /// 检查当前 token 是否匹配给定类型
    fn match_token(&self, kind: &TokenKind) -> bool {
        if let Some(token) = self.peek() {
            std::mem::discriminant(&token.kind) == std::mem::discriminant(kind)
        } else {
            false
        }
    }

    /// 当前 token 匹配时消费它
    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.match_token(kind) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    /// 解析完整表达式，要求消费全部输入
    pub fn parse(&mut self) -> Result<BoolExpr, ParseError> {
        let expr = self.parse_or_expression()?;
        if let Some(token) = self.peek() {
            return Err(ParseError::at_position(
                format!("Unexpected token: {:?}", token.kind),
                token.span,
            ));
        }
        Ok(expr)
    }

    /// 解析OR表达式 (最低优先级)
    ///
    /// 语法: `and_expr (OR and_expr)*`
    fn parse_or_expression(&mut self) -> Result<BoolExpr, ParseError> {
        let mut left = self.parse_and_expression()?;

        while self.eat(&TokenKind::Or) {
            let right = self.parse_and_expression()?;
            left = BoolExpr::Or(Box::new(left), Box::new(right));
        }

        Ok(left)
    }

    /// 解析AND表达式
    ///
    /// 语法: `not_expr (AND not_expr)*`
    fn parse_and_expression(&mut self) -> Result<BoolExpr, ParseError> {
        let mut left = self.parse_not_expression()?;

        while self.eat(&TokenKind::And) {
            let right = self.parse_not_expression()?;
            left = BoolExpr::And(Box::new(left), Box::new(right));
        }

        Ok(left)
    }

    /// 解析NOT表达式
    ///
    /// 语法: `NOT* primary_expr`
    fn parse_not_expression(&mut self) -> Result<BoolExpr, ParseError> {
        if self.eat(&TokenKind::Not) {
            let expr = self.parse_not_expression()?;
            Ok(BoolExpr::Not(Box::new(expr)))
        } else {
            self.parse_primary_expression()
        }
    }

    fn parse_primary_expression(&mut self) -> Result<BoolExpr, ParseError> {
        if self.eat(&TokenKind::LParen) {
            let expr = self.parse_or_expression()?;
            self.expect(TokenKind::RParen)?;
            return Ok(expr);
        }

        let left = self.parse_operand()?;
        self.parse_predicate_tail(left)
    }

    fn parse_predicate_tail(&mut self, left: Operand) -> Result<BoolExpr, ParseError> {
        let Some(token) = self.peek() else {
            return Self::bare_operand(left, None);
        };
        let span = token.span;

        let kind = match &token.kind {
            TokenKind::Is => {
                self.advance();
                let negated = self.eat(&TokenKind::Not);
                self.expect(TokenKind::Null)?;
                return Ok(BoolExpr::Predicate(Predicate {
                    left,
                    kind: PredicateKind::IsNull,
                    negated,
                }));
            }
            TokenKind::Not => {
                self.advance();
                return self.parse_negatable(left, true);
            }
            TokenKind::In | TokenKind::Like | TokenKind::Between => {
                return self.parse_negatable(left, false);
            }
            TokenKind::Eq => CompOp::Eq,
            TokenKind::NotEq => CompOp::NotEq,
            TokenKind::Gt => CompOp::Gt,
            TokenKind::Lt => CompOp::Lt,
            TokenKind::Gte => CompOp::Gte,
            TokenKind::Lte => CompOp::Lte,
            _ => return Self::bare_operand(left, Some(span)),
        };
        self.advance();
        let value = self.parse_operand()?;

        // `1=1` 之类的恒等比较折叠为字面量
        if let (Operand::Literal(l), Operand::Literal(r)) = (&left, &value) {
            if kind == CompOp::Eq {
                return Ok(BoolExpr::Literal(l == r));
            }
        }

        Ok(BoolExpr::Predicate(Predicate {
            left,
            kind: PredicateKind::Compare { op: kind, value },
            negated: false,
        }))
    }

    /// 解析 `[NOT] IN / LIKE / BETWEEN`，`NOT` 已由调用者消费
    fn parse_negatable(&mut self, left: Operand, negated: bool) -> Result<BoolExpr, ParseError> {
        let Some(token) = self.advance() else {
            return Err(ParseError::new(
                "Expected IN, LIKE or BETWEEN, but reached end of input".to_string(),
                None,
            ));
        };
        let span = token.span;

        let kind = match &token.kind {
            TokenKind::In => {
                self.expect(TokenKind::LParen)?;
                let mut values = vec![self.parse_operand()?];
                while self.eat(&TokenKind::Comma) {
                    values.push(self.parse_operand()?);
                }
                self.expect(TokenKind::RParen)?;
                PredicateKind::In(values)
            }
            TokenKind::Like => PredicateKind::Like(self.parse_operand()?),
            TokenKind::Between => {
                let lower = self.parse_operand()?;
                self.expect(TokenKind::And)?;
                let upper = self.parse_operand()?;
                PredicateKind::Between(lower, upper)
            }
            other => {
                return Err(ParseError::at_position(
                    format!("Expected IN, LIKE or BETWEEN, found {:?}", other),
                    span,
                ))
            }
        };

        Ok(BoolExpr::Predicate(Predicate {
            left,
            kind,
            negated,
        }))
    }

    /// 没有谓词后缀的操作数只能是布尔字面量
    fn bare_operand(left: Operand, span: Option<Span>) -> Result<BoolExpr, ParseError> {
        match left {
            Operand::Literal(Literal::Boolean(b)) => Ok(BoolExpr::Literal(b)),
            other => Err(ParseError::new(
                format!("Expected a predicate after `{}`", other),
                span,
            )),
        }
    }

    /// 解析操作数：标识符、函数调用、`DATE '...'` 或字面量
    fn parse_operand(&mut self) -> Result<Operand, ParseError> {
        let Some(token) = self.advance() else {
            return Err(ParseError::new("Expected operand".to_string(), None));
        };
        let span = token.span;

        match &token.kind {
            TokenKind::String(s) => Ok(Operand::Literal(Literal::String(s.replace("''", "'")))),
            TokenKind::Number(n) => Ok(Operand::Literal(Literal::Number(n.to_string()))),
            TokenKind::True => Ok(Operand::Literal(Literal::Boolean(true))),
            TokenKind::False => Ok(Operand::Literal(Literal::Boolean(false))),
            TokenKind::Dash => match self.advance() {
                Some(Token {
                    kind: TokenKind::Number(n),
                    ..
                }) => Ok(Operand::Literal(Literal::Number(format!("-{}", n)))),
                _ => Err(ParseError::at_position(
                    "Expected number after '-'".to_string(),
                    span,
                )),
            },
            TokenKind::Identifier(name) => {
                let name = *name;
                if name.eq_ignore_ascii_case("DATE") {
                    if let Some(Token {
                        kind: TokenKind::String(s),
                        ..
                    }) = self.peek()
                    {
                        let day = s.to_string();
                        self.advance();
                        return Ok(Operand::Literal(Literal::Date(day)));
                    }
                }
                if self.eat(&TokenKind::LParen) {
                    let mut args = Vec::new();
                    if !self.match_token(&TokenKind::RParen) {
                        loop {
                            args.push(self.parse_operand()?.to_string());
                            if !self.eat(&TokenKind::Comma) {
                                break;
                            }
                        }
                    }
                    self.expect(TokenKind::RParen)?;
                    return Ok(Operand::Column(format!("{}({})", name, args.join(", "))));
                }
                Ok(Operand::Column(name.to_string()))
            }
            other => Err(ParseError::at_position(
                format!("Expected operand, found {:?}", other),
                span,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str) -> Operand {
        Operand::Column(name.to_string())
    }

    fn string(s: &str) -> Operand {
        Operand::Literal(Literal::String(s.to_string()))
    }

    #[test]
    fn test_simple_comparison() {
        let expr = parse_expression("department = 'HR'").unwrap();
        assert_eq!(
            expr,
            BoolExpr::Predicate(Predicate {
                left: column("department"),
                kind: PredicateKind::Compare {
                    op: CompOp::Eq,
                    value: string("HR"),
                },
                negated: false,
            })
        );
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let expr = parse_expression("a = 1 OR b = 2 AND c = 3").unwrap();
        match expr {
            BoolExpr::Or(_, right) => assert!(matches!(*right, BoolExpr::And(_, _))),
            other => panic!("Expected OR at the top, got {:?}", other),
        }
    }

    #[test]
    fn test_parentheses_override_precedence() {
        let expr = parse_expression("(a = 1 OR b = 2) AND c = 3").unwrap();
        match expr {
            BoolExpr::And(left, _) => assert!(matches!(*left, BoolExpr::Or(_, _))),
            other => panic!("Expected AND at the top, got {:?}", other),
        }
    }

    #[test]
    fn test_function_call_operand() {
        let expr = parse_expression("SUBSTR(first_name, 1, 3) = 'Joh'").unwrap();
        let preds = expr.predicates();
        assert_eq!(preds.len(), 1);
        assert_eq!(preds[0].field(), Some("SUBSTR(first_name, 1, 3)"));
    }

    #[test]
    fn test_natural_negations() {
        for input in [
            "status NOT IN ('Open', 'Closed')",
            "name NOT LIKE 'J%'",
            "age NOT BETWEEN 18 AND 65",
            "manager IS NOT NULL",
        ] {
            let expr = parse_expression(input).unwrap();
            match expr {
                BoolExpr::Predicate(p) => assert!(p.negated, "{} should be negated", input),
                other => panic!("Expected predicate for {}, got {:?}", input, other),
            }
        }
    }

    #[test]
    fn test_between_and_is_not_a_connective() {
        let expr = parse_expression("age BETWEEN 18 AND 65 AND dept = 'HR'").unwrap();
        match expr {
            BoolExpr::And(left, right) => {
                assert!(matches!(
                    *left,
                    BoolExpr::Predicate(Predicate {
                        kind: PredicateKind::Between(_, _),
                        ..
                    })
                ));
                assert!(matches!(*right, BoolExpr::Predicate(_)));
            }
            other => panic!("Expected AND, got {:?}", other),
        }
    }

    #[test]
    fn test_leading_not() {
        let expr = parse_expression("NOT salary > 100").unwrap();
        assert!(matches!(expr, BoolExpr::Not(_)));
    }

    #[test]
    fn test_identity_literals() {
        assert_eq!(parse_expression("1=1").unwrap(), BoolExpr::Literal(true));
        assert_eq!(parse_expression("TRUE").unwrap(), BoolExpr::Literal(true));
        assert_eq!(parse_expression("1 = 0").unwrap(), BoolExpr::Literal(false));
    }

    #[test]
    fn test_literal_forms() {
        let expr = parse_expression(
            "d = DATE '2024-01-31' AND n = -2.5 AND s = 'O''Brien' AND t = TO_DATE('2024-01-31', 'YYYY-MM-DD')",
        )
        .unwrap();
        let values: Vec<String> = expr
            .predicates()
            .iter()
            .map(|p| match &p.kind {
                PredicateKind::Compare { value, .. } => value.to_string(),
                other => panic!("unexpected {:?}", other),
            })
            .collect();
        assert_eq!(
            values,
            vec![
                "DATE '2024-01-31'",
                "-2.5",
                "'O''Brien'",
                "TO_DATE('2024-01-31', 'YYYY-MM-DD')",
            ]
        );
    }

    #[test]
    fn test_eval() {
        let expr = parse_expression("(a = 1 OR b = 2) AND NOT c IS NULL").unwrap();
        let truth = |p: &Predicate| matches!(p.field(), Some("b") | Some("c"));
        // (false OR true) AND NOT true
        assert!(!expr.eval(&truth));
    }

    #[test]
    fn test_errors() {
        assert!(parse_expression("a = 1 AND").is_err());
        assert!(parse_expression("(a = 1").is_err());
        assert!(parse_expression("a IN ()").is_err());
        assert!(parse_expression("a = 1 b = 2").is_err());
        assert!(parse_expression("a").is_err());

        let err = parse_expression("a = 1 )").unwrap_err();
        assert_eq!(err.span, Some(Span::new(6, 7)));
    }
}
