//! The token definition for compiled filter expressions.

/// A token is a single unit of the language, with a specific kind and location.
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    pub span: Span,
}

/// The kind of a token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind<'a> {
    // Keywords
    And,     // "AND"
    Or,      // "OR"
    Not,     // "NOT"
    In,      // "IN"
    Is,      // "IS"
    Null,    // "NULL"
    Like,    // "LIKE"
    Between, // "BETWEEN"
    True,    // "TRUE"
    False,   // "FALSE"

    // Literals
    Identifier(&'a str),
    String(&'a str), // The raw content between quotes, `''` escapes still doubled
    Number(&'a str), // The raw digits, e.g. "50000" or "2.5"

    // Punctuation
    LParen, // (
    RParen, // )
    Comma,  // ,
    Dash,   // -

    // Operators
    Eq,    // =
    NotEq, // != or <>
    Gt,    // >
    Lt,    // <
    Gte,   // >=
    Lte,   // <=

    // Special
    Illegal, // An illegal/unknown character
}

/// Represents a span in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// The starting byte offset.
    pub start: usize,
    /// The ending byte offset.
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}
