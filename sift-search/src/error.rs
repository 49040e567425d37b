//! Error types for the sift-search crate.
//!
//! Display strings are stable and safe to log. No API keys appear in error
//! messages; backend bodies are carried verbatim because Meilisearch error
//! bodies never echo the bearer token.

/// Errors that can occur while querying the search backend.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The backend answered with a non-2xx status.
    #[error("search backend error: HTTP {status}: {message}")]
    Backend {
        /// HTTP status code returned by the backend.
        status: u16,
        /// Error message extracted from the response body.
        message: String,
    },

    /// The request never produced a response (DNS, connect, TLS, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// The backend answered 2xx but the body was not a search response.
    #[error("decode error: {0}")]
    Decode(String),

    /// Invalid search configuration.
    #[error("config error: {0}")]
    Config(String),
}

impl SearchError {
    /// The single message shown in place of the results list.
    pub fn user_message(&self) -> String {
        match self {
            Self::Backend { status, message } => {
                format!("Search failed ({status}): {message}")
            }
            Self::Transport(_) => "Could not reach the search service.".to_owned(),
            Self::Decode(_) => "The search service returned an unreadable response.".to_owned(),
            Self::Config(detail) => format!("Search is misconfigured: {detail}"),
        }
    }

    /// HTTP status for backend errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Backend { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Convenience type alias for sift-search results.
pub type Result<T> = std::result::Result<T, SearchError>;
