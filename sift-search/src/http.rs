//! Shared HTTP client for backend requests.

use crate::config::SearchConfig;
use crate::error::SearchError;
use std::time::Duration;

/// User-Agent sent with every search request.
pub const USER_AGENT: &str = concat!("sift/", env!("CARGO_PKG_VERSION"));

/// Build a [`reqwest::Client`] configured for the search backend.
///
/// The client has:
/// - Whole-request timeout from config
/// - A fixed `sift/<version>` User-Agent
/// - Brotli and gzip decompression
///
/// # Errors
///
/// Returns [`SearchError::Config`] if the client cannot be constructed.
pub fn build_client(config: &SearchConfig) -> Result<reqwest::Client, SearchError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| SearchError::Config(format!("failed to build HTTP client: {e}")))
}

/// Map a `reqwest` send/receive failure to a transport error.
pub fn transport_error(err: &reqwest::Error) -> SearchError {
    if err.is_timeout() {
        SearchError::Transport(format!("request timed out: {err}"))
    } else if err.is_connect() {
        SearchError::Transport(format!("connection failed: {err}"))
    } else {
        SearchError::Transport(err.to_string())
    }
}

/// Pull a human-readable message out of an error body.
///
/// Meilisearch answers errors with `{"message": "...", "code": "..."}`.
/// Anything else is carried as raw text.
pub fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
        .unwrap_or_else(|| body.trim().to_string())
}
