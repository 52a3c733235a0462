//! Error types for cut

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    #[error("Malformed expression: {0}")]
    MalformedExpression(String),

    #[error("Unresolvable type: no pointer element at depth {depth} in '{ty}'")]
    UnresolvableType { ty: String, depth: usize },

    #[error("Knowledge base unavailable: {0}")]
    KnowledgeBase(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Whether the error only abandons the current case.
    ///
    /// Everything else aborts the run since no later case could succeed either.
    pub fn is_case_local(&self) -> bool {
        matches!(
            self,
            Error::UnknownFunction(_)
                | Error::MalformedExpression(_)
                | Error::UnresolvableType { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
