//! Compiles hierarchical filter trees into parenthesized boolean expressions
//! for a query's `WHERE` clause.
//!
//! ```text
//! Group{AND}
//!   ├─ department = 'HR'
//!   └─ Group{OR}
//!        ├─ salary > 50000
//!        └─ SUBSTR(first_name, 1, 3) = 'Joh'
//!
//! => department = 'HR' AND (salary > 50000 OR SUBSTR(first_name, 1, 3) = 'Joh')
//! ```

pub mod ast;
pub mod compiler;
pub mod config;
pub mod error;
pub mod formatter;
pub mod lexer;
pub mod parser;
pub mod query;
pub mod token;


pub use ast::{Condition, Group, GroupOp, Node, Number, Operator, TypedValue};
pub use compiler::{CompileResult, FilterCompiler, Rewrite};
pub use config::{Backend, BooleanStyle, DateStyle, Dialect};
pub use error::{ConfigError, FilterError};
pub use parser::{parse_expression, BoolExpr, ParseError};
