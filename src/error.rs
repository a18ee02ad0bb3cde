use std::result;

use thiserror::Error;

use crate::evaluator::EvalError;
use crate::lexer::{LexError, Span};
use crate::parser::ParseError;

/// Any failure from [`parse`](crate::parse).
///
/// The three stages never share a variant, so callers can tell a malformed
/// character stream from a grammar error from a dangling reference.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("Lex error: {0}")]
    Lex(#[from] LexError),
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("Evaluation error: {0}")]
    Eval(#[from] EvalError),
}

impl Error {
    pub fn span(&self) -> Span {
        match self {
            Error::Lex(e) => e.span,
            Error::Parse(e) => e.span,
            Error::Eval(e) => e.span(),
        }
    }

    /// Stable machine-readable code, e.g. `UNTERMINATED_STRING`.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Lex(e) => e.code.as_str(),
            Error::Parse(e) => e.code.as_str(),
            Error::Eval(e) => e.code(),
        }
    }

    pub fn is_lex(&self) -> bool {
        matches!(self, Error::Lex(_))
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, Error::Parse(_))
    }

    pub fn is_eval(&self) -> bool {
        matches!(self, Error::Eval(_))
    }
}

pub type Result<T> = result::Result<T, Error>;
