//! Coordinator flow tests.
//!
//! Fake search backends and summary providers drive the coordinator through
//! complete query generations:
//! - Last submitted query wins, whatever order responses arrive in
//! - Summaries start after hits arrive and stream to `Done`
//! - A failed summary can be retried without touching the results
//! - Search and summary failures stay isolated from each other

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use serde_json::json;
use sift::sift_search::{
    RawHit, SearchBackend, SearchError, SearchQuery, SearchResultSet, normalize,
};
use sift::summary::{SUMMARY_FAILED_MESSAGE, SummaryError, SummaryProvider, TextStream};
use sift::{Coordinator, SummaryState};

/// Answers every query with one hit; `cat` is slow, `broken` fails.
struct Catalog;

impl SearchBackend for Catalog {
    async fn search(&self, query: &SearchQuery) -> Result<SearchResultSet, SearchError> {
        let text = query.as_str().trim().to_owned();
        let delay = if text == "cat" { 300 } else { 10 };
        tokio::time::sleep(Duration::from_millis(delay)).await;

        if text == "broken" {
            return Err(SearchError::Backend {
                status: 503,
                message: "index unavailable".into(),
            });
        }

        let hit = RawHit::from_value(json!({
            "id": 1,
            "title": format!("{text} facts"),
            "content": format!("All about {text}.")
        }));
        Ok(SearchResultSet {
            hits: vec![normalize(&hit, 0)],
            estimated_total_hits: 1,
            processing_time_ms: 1,
            query: text,
        })
    }
}

/// Streams an answer naming the query; `cat` answers hang after one fragment.
struct Echo {
    calls: AtomicUsize,
    fail_first: bool,
}

impl Echo {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_first: false,
        }
    }
}

#[async_trait]
impl SummaryProvider for Echo {
    fn name(&self) -> &str {
        "echo"
    }

    async fn stream(&self, prompt: &str) -> Result<TextStream, SummaryError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_first && call == 0 {
            return Err(SummaryError::ProviderError("HTTP 500".into()));
        }

        if prompt.contains("User Query: \"cat\"") {
            let head = futures_util::stream::iter(vec![Ok("Cats".to_owned())]);
            let hanging: TextStream = Box::pin(head.chain(futures_util::stream::pending()));
            return Ok(hanging);
        }

        let subject = if prompt.contains("User Query: \"dog\"") {
            "Dogs"
        } else {
            "Things"
        };
        let fragments = vec![Ok(subject.to_owned()), Ok(" [1]".to_owned())];
        let stream: TextStream = Box::pin(futures_util::stream::iter(fragments));
        Ok(stream)
    }
}

type App = Coordinator<Catalog, Echo>;

/// Apply events until nothing is loading or streaming.
async fn settle(app: &mut App) -> usize {
    let mut applied = 0;
    tokio::time::timeout(Duration::from_secs(5), async {
        while !app.state().is_settled() {
            if app.apply_next().await {
                applied += 1;
            }
        }
    })
    .await
    .expect("coordinator should settle");
    applied
}

// ────────────────────────────────────────────────────────────────────────────
// Superseding
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn last_submitted_query_wins() {
    let mut app: App = Coordinator::new(Catalog, None, Duration::from_secs(5));

    let cat = app.submit("cat").expect("cat accepted");
    let dog = app.submit("dog").expect("dog accepted");
    assert!(dog > cat);

    settle(&mut app).await;
    assert_eq!(app.state().results.as_ref().expect("results").query, "dog");

    // Give the slow search time to finish; it must not show up.
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(app.state().current_generation(), dog);
    assert_eq!(app.state().results.as_ref().expect("results").query, "dog");
    assert_eq!(app.state().query, "dog");
}

#[tokio::test]
async fn new_query_discards_streaming_summary() {
    let mut app: App = Coordinator::new(Catalog, Some(Echo::new()), Duration::from_secs(5));

    app.submit("cat").expect("cat accepted");
    tokio::time::timeout(Duration::from_secs(5), async {
        while !matches!(app.state().summary, SummaryState::Streaming(_)) {
            app.apply_next().await;
        }
    })
    .await
    .expect("cat summary should start streaming");
    assert_eq!(app.state().summary, SummaryState::Streaming("Cats".into()));

    app.submit("dog").expect("dog accepted");
    assert_eq!(app.state().summary, SummaryState::Idle);

    settle(&mut app).await;
    assert_eq!(app.state().summary, SummaryState::Done("Dogs [1]".into()));
}

// ────────────────────────────────────────────────────────────────────────────
// Summary lifecycle
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn summary_follows_results() {
    let mut app: App = Coordinator::new(Catalog, Some(Echo::new()), Duration::from_secs(5));
    assert!(app.summaries_enabled());

    app.submit("dog").expect("accepted");
    settle(&mut app).await;

    let state = app.state();
    assert!(!state.is_loading);
    assert!(state.error.is_none());
    assert_eq!(state.results.as_ref().expect("results").len(), 1);
    assert_eq!(state.summary, SummaryState::Done("Dogs [1]".into()));
}

#[tokio::test]
async fn failed_summary_can_be_retried() {
    let provider = Echo {
        calls: AtomicUsize::new(0),
        fail_first: true,
    };
    let mut app: App = Coordinator::new(Catalog, Some(provider), Duration::from_secs(5));

    app.submit("dog").expect("accepted");
    settle(&mut app).await;
    assert_eq!(
        app.state().summary,
        SummaryState::Failed(SUMMARY_FAILED_MESSAGE.into())
    );
    assert!(app.state().summary_retry_available());
    assert!(app.state().results.is_some());

    assert!(app.retry_summary());
    assert_eq!(app.state().summary, SummaryState::Loading);
    assert!(!app.retry_summary());

    settle(&mut app).await;
    assert_eq!(app.state().summary, SummaryState::Done("Dogs [1]".into()));
    assert_eq!(app.state().results.as_ref().expect("results").query, "dog");
}

#[tokio::test]
async fn search_failure_skips_summary() {
    let mut app: App = Coordinator::new(Catalog, Some(Echo::new()), Duration::from_secs(5));

    app.submit("broken").expect("accepted");
    settle(&mut app).await;

    let state = app.state();
    assert!(!state.is_loading);
    let error = state.error.as_deref().expect("error message");
    assert!(error.contains("503"));
    assert_eq!(state.summary, SummaryState::Idle);
}

#[tokio::test]
async fn summaries_disabled_without_provider() {
    let mut app: App = Coordinator::new(Catalog, None, Duration::from_secs(5));
    assert!(!app.summaries_enabled());

    app.submit("dog").expect("accepted");
    settle(&mut app).await;
    assert_eq!(app.state().summary, SummaryState::Idle);
    assert!(!app.retry_summary());
}
