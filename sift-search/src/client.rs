//! Hybrid search client for Meilisearch.
//!
//! [`SearchBackend`] is the seam the front-end talks to; [`MeiliClient`] is
//! the HTTP implementation. Each call is independent: the client imposes no
//! ordering between concurrent searches, superseding is the caller's job.

use std::time::Instant;

use crate::config::{SearchConfig, HIGHLIGHT_ATTRIBUTES};
use crate::error::SearchError;
use crate::http::{build_client, extract_error_message, transport_error};
use crate::normalize::normalize_all;
use crate::types::{SearchQuery, SearchResponse, SearchResultSet};

/// Something that can answer a search query.
///
/// All implementations must be `Send + Sync` so searches can be spawned
/// onto the runtime.
pub trait SearchBackend: Send + Sync {
    /// Run a search and return normalised hits in ranking order.
    ///
    /// Blank queries must return [`SearchResultSet::empty()`] without
    /// contacting the backend.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Backend`] for non-2xx answers and
    /// [`SearchError::Transport`] when no answer arrives.
    fn search(
        &self,
        query: &SearchQuery,
    ) -> impl std::future::Future<Output = Result<SearchResultSet, SearchError>> + Send;
}

/// Build the JSON body of a hybrid search request.
pub fn build_search_request(query: &str, config: &SearchConfig) -> serde_json::Value {
    serde_json::json!({
        "q": query,
        "limit": config.limit,
        "attributesToHighlight": HIGHLIGHT_ATTRIBUTES,
        "highlightPreTag": config.highlight_pre_tag,
        "highlightPostTag": config.highlight_post_tag,
        "showRankingScore": true,
        "hybrid": {
            "semanticRatio": config.semantic_ratio,
            "embedder": config.embedder,
        },
    })
}

/// Meilisearch REST client.
#[derive(Debug, Clone)]
pub struct MeiliClient {
    config: SearchConfig,
    client: reqwest::Client,
}

impl MeiliClient {
    /// Create a client after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] for an invalid configuration.
    pub fn new(config: SearchConfig) -> Result<Self, SearchError> {
        config.validate()?;
        let client = build_client(&config)?;
        Ok(Self { config, client })
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    async fn send(&self, query: &SearchQuery) -> Result<SearchResultSet, SearchError> {
        let url = self.config.search_url();
        let body = build_search_request(query.as_str(), &self.config);
        let started = Instant::now();

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            tracing::warn!(
                status = status.as_u16(),
                body = %body_text,
                "search backend returned an error"
            );
            return Err(SearchError::Backend {
                status: status.as_u16(),
                message: extract_error_message(&body_text),
            });
        }

        let bytes = response.bytes().await.map_err(|e| transport_error(&e))?;
        let decoded: SearchResponse = serde_json::from_slice(&bytes)
            .map_err(|e| SearchError::Decode(format!("invalid search response: {e}")))?;

        tracing::debug!(
            hits = decoded.hits.len(),
            estimated_total = decoded.estimated_total_hits,
            backend_ms = decoded.processing_time_ms,
            round_trip_ms = started.elapsed().as_millis() as u64,
            "search completed"
        );

        Ok(SearchResultSet {
            hits: normalize_all(&decoded.raw_hits()),
            estimated_total_hits: decoded.estimated_total_hits,
            processing_time_ms: decoded.processing_time_ms,
            query: query.as_str().to_owned(),
        })
    }
}

impl SearchBackend for MeiliClient {
    async fn search(&self, query: &SearchQuery) -> Result<SearchResultSet, SearchError> {
        if query.is_blank() {
            return Ok(SearchResultSet::empty());
        }
        tracing::trace!(query = %query, index = %self.config.index, "dispatching search");
        self.send(query).await
    }
}
