//! Parser error types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unexpected token at position {position}: expected {expected}, found {found}")]
    UnexpectedToken {
        position: usize,
        expected: String,
        found: String,
    },

    #[error("Unexpected end of input")]
    UnexpectedEof,

    #[error("Unclosed delimiter '{delimiter}' opened at position {position}")]
    UnclosedDelimiter { delimiter: String, position: usize },

    #[error("Invalid element index: {0}")]
    InvalidIndex(String),

    #[error("Maximum parsing depth exceeded: depth {depth} exceeds limit of {max_depth}")]
    MaxDepthExceeded { depth: usize, max_depth: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnexpectedToken,
    UnexpectedEof,
    UnclosedDelimiter,
    InvalidIndex,
    MaxDepthExceeded,
}

impl ParseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::UnexpectedToken { .. } => ErrorKind::UnexpectedToken,
            ParseError::UnexpectedEof => ErrorKind::UnexpectedEof,
            ParseError::UnclosedDelimiter { .. } => ErrorKind::UnclosedDelimiter,
            ParseError::InvalidIndex(_) => ErrorKind::InvalidIndex,
            ParseError::MaxDepthExceeded { .. } => ErrorKind::MaxDepthExceeded,
        }
    }
}

impl From<ParseError> for cut_core::Error {
    fn from(err: ParseError) -> Self {
        cut_core::Error::MalformedExpression(err.to_string())
    }
}
