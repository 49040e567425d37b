//! # sift-search
//!
//! Hybrid (keyword + vector) search against a hosted Meilisearch index.
//!
//! ## Design
//!
//! - One `POST /indexes/{index}/search` per query with fixed parameters:
//!   20 hits, highlighted `title`/`content`/`description`, ranking scores,
//!   and the configured `semanticRatio`/`embedder`
//! - Hits are normalised through an ordered fallback over conventional
//!   field names, because indexed content is heterogeneous across
//!   deployments
//! - Normalisation never fails: missing fields and bad URLs degrade to
//!   sentinels
//! - Non-2xx answers become [`SearchError::Backend`] with status and
//!   message; network failures become [`SearchError::Transport`]
//!
//! ## Security
//!
//! - The API key is sent only as a bearer token and never logged
//! - Queries are logged at trace level only

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod normalize;
pub mod types;

pub use client::{MeiliClient, SearchBackend};
pub use config::SearchConfig;
pub use error::{Result, SearchError};
pub use normalize::normalize;
pub use types::{HitId, NormalizedHit, RawHit, SearchQuery, SearchResultSet};

/// Run one search with a throwaway client.
///
/// Convenience wrapper for one-shot use; long-lived callers should keep a
/// [`MeiliClient`] so the connection pool is reused.
///
/// # Errors
///
/// Returns [`SearchError::Config`] for an invalid configuration, otherwise
/// the same errors as [`SearchBackend::search`].
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> sift_search::Result<()> {
/// let config = sift_search::SearchConfig::default();
/// let results = sift_search::search("space opera", &config).await?;
/// for hit in &results.hits {
///     println!("{} ({})", hit.display_title, hit.source_host);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn search(query: &str, config: &SearchConfig) -> Result<SearchResultSet> {
    let query = SearchQuery::new(query);
    if query.is_blank() {
        return Ok(SearchResultSet::empty());
    }
    MeiliClient::new(config.clone())?.search(&query).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn search_validates_config_before_dispatch() {
        let config = SearchConfig {
            limit: 0,
            ..Default::default()
        };
        let result = search("test", &config).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("limit"));
    }

    #[tokio::test]
    async fn blank_search_skips_config_and_network() {
        let config = SearchConfig {
            host: String::new(),
            ..Default::default()
        };
        let result = search("  ", &config).await;
        assert!(result.expect("blank is a no-op").is_empty());
    }
}
