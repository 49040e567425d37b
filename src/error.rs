//! Error types for the sift front-end.

use crate::summary::SummaryError;
use sift_search::SearchError;

/// Top-level error type for the search front-end.
#[derive(Debug, thiserror::Error)]
pub enum SiftError {
    /// Configuration could not be loaded.
    #[error("config error: {0}")]
    Config(String),

    /// Search backend error.
    #[error(transparent)]
    Search(#[from] SearchError),

    /// Generative summary error.
    #[error(transparent)]
    Summary(#[from] SummaryError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, SiftError>;

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn config_display() {
        let err = SiftError::Config("bad override file".into());
        assert_eq!(err.to_string(), "config error: bad override file");
    }

    #[test]
    fn search_errors_pass_through() {
        let err: SiftError = SearchError::Transport("refused".into()).into();
        assert_eq!(err.to_string(), "transport error: refused");
    }

    #[test]
    fn summary_errors_pass_through() {
        let err: SiftError = SummaryError::AuthError("bad key".into()).into();
        assert!(err.to_string().starts_with("[AUTH_FAILED]"));
    }
}
