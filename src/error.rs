use thiserror::Error;

use crate::token::Token;

/// Single error taxonomy for the whole pipeline. The rendered form points
/// at the offending token in its source line:
///
/// ```text
/// <ParserError line:1>
/// unexpected token
/// 42"foo
/// __^
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub token: Token,
}

impl ParseError {
    pub fn new(message: impl Into<String>, token: &Token) -> Self {
        Self {
            message: message.into(),
            token: token.clone(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "<ParserError {}:{}>\n{}\n{}\n{}^",
            self.token.source.display_name(),
            self.token.line,
            self.message,
            self.token.source.line(self.token.line),
            "_".repeat(self.token.column),
        )
    }
}

impl std::error::Error for ParseError {}

pub type ParseResult<T> = Result<T, ParseError>;

/// Errors surfaced by module interpretation: either a pipeline error or an
/// I/O failure from an import, passed through verbatim.
#[derive(Debug, Error)]
pub enum InterpretError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
