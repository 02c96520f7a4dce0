mod expr;
mod lexer;
mod program;
mod types;

use thiserror::Error;

pub use expr::parse_expression;
pub use lexer::{lex_line, Token};
pub use program::{parse_input, parse_program};
pub use types::{BinaryOp, Branch, Expr, Function, Input, Program, Stmt, StmtKind, UnaryOp};

/// A syntax error at a 1-based source line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct SyntaxError {
    pub line: usize,
    pub message: String,
}

impl SyntaxError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}
