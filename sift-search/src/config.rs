//! Search configuration with sensible defaults.
//!
//! [`SearchConfig`] holds the backend location, credentials, and the fixed
//! per-request parameters (result limit, highlight markers, hybrid tuning).

use crate::error::SearchError;

/// Number of hits requested per search.
pub const DEFAULT_LIMIT: usize = 20;

/// Fields the backend is asked to highlight.
pub const HIGHLIGHT_ATTRIBUTES: &[&str] = &["title", "content", "description"];

/// Configuration for the Meilisearch backend.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Base URL of the Meilisearch instance, e.g. `http://localhost:7700`.
    pub host: String,
    /// Bearer token. May be empty for an unsecured instance.
    pub api_key: String,
    /// Index to search.
    pub index: String,
    /// Hits requested per search.
    pub limit: usize,
    /// Hybrid weighting, 0.0 = keyword only, 1.0 = vector only.
    /// Not clamped here; the backend rejects out-of-range values.
    pub semantic_ratio: f64,
    /// Name of the embedder configured on the index.
    pub embedder: String,
    /// Marker inserted before each highlighted span.
    pub highlight_pre_tag: String,
    /// Marker inserted after each highlighted span.
    pub highlight_post_tag: String,
    /// Whole-request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost:7700".into(),
            api_key: String::new(),
            index: "movies".into(),
            limit: DEFAULT_LIMIT,
            semantic_ratio: 0.5,
            embedder: "default".into(),
            highlight_pre_tag: "<mark>".into(),
            highlight_post_tag: "</mark>".into(),
            timeout_seconds: 10,
        }
    }
}

impl SearchConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `host` and `index` must not be blank
    /// - `limit` must be greater than 0
    /// - `timeout_seconds` must be greater than 0
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.host.trim().is_empty() {
            return Err(SearchError::Config("host must not be empty".into()));
        }
        if self.index.trim().is_empty() {
            return Err(SearchError::Config("index must not be empty".into()));
        }
        if self.limit == 0 {
            return Err(SearchError::Config("limit must be greater than 0".into()));
        }
        if self.timeout_seconds == 0 {
            return Err(SearchError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// `{host}/indexes/{index}/search`, tolerating a trailing slash on the host.
    pub fn search_url(&self) -> String {
        format!(
            "{}/indexes/{}/search",
            self.host.trim_end_matches('/'),
            self.index
        )
    }
}
