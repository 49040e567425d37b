//! Query coordinator — runs searches and summaries, applies their results.
//!
//! ```text
//! submit(q) ──► search task ──┐
//!                             ├─► events ──► apply() ──► AppSearchState
//!        hits ─► summary task ┘
//! ```
//!
//! Each generation owns a [`CancellationToken`]. Submitting a new query
//! cancels the previous token, so its tasks stop emitting, and anything
//! they already emitted is dropped by the generation guard in
//! [`AppSearchState::apply`].

use std::sync::Arc;
use std::time::Duration;

use sift_search::{NormalizedHit, SearchBackend, SearchQuery};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::session::{AppSearchState, Generation, SessionEvent};
use crate::summary::{MAX_CONTEXT_HITS, SummaryProvider, SummaryState, stream_summary};

/// Owns the session state and the tasks feeding it.
pub struct Coordinator<B, P> {
    backend: Arc<B>,
    provider: Option<Arc<P>>,
    idle_timeout: Duration,
    state: AppSearchState,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
    events_rx: mpsc::UnboundedReceiver<SessionEvent>,
    /// Cancels everything started for the current generation.
    generation_cancel: CancellationToken,
    /// Cancels the current summary attempt only.
    summary_cancel: CancellationToken,
}

impl<B, P> Coordinator<B, P>
where
    B: SearchBackend + 'static,
    P: SummaryProvider + 'static,
{
    /// Create a coordinator. With no provider, summaries are never requested.
    pub fn new(backend: B, provider: Option<P>, idle_timeout: Duration) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let generation_cancel = CancellationToken::new();
        let summary_cancel = generation_cancel.child_token();
        Self {
            backend: Arc::new(backend),
            provider: provider.map(Arc::new),
            idle_timeout,
            state: AppSearchState::new(),
            events_tx,
            events_rx,
            generation_cancel,
            summary_cancel,
        }
    }

    pub fn state(&self) -> &AppSearchState {
        &self.state
    }

    pub fn summaries_enabled(&self) -> bool {
        self.provider.is_some()
    }

    /// Submit a query, superseding whatever is in flight.
    ///
    /// Blank queries are ignored and return `None`.
    pub fn submit(&mut self, text: &str) -> Option<Generation> {
        let query = SearchQuery::new(text);
        let generation = self.state.begin(&query)?;

        self.generation_cancel.cancel();
        self.generation_cancel = CancellationToken::new();
        self.summary_cancel = self.generation_cancel.child_token();

        tracing::info!(%generation, "search submitted");
        tracing::trace!(%generation, query = %query, "query text");

        let backend = Arc::clone(&self.backend);
        let tx = self.events_tx.clone();
        let cancel = self.generation_cancel.clone();
        tokio::spawn(async move {
            let outcome = tokio::select! {
                () = cancel.cancelled() => return,
                outcome = backend.search(&query) => outcome,
            };
            // The receiver lives as long as the coordinator.
            let _ = tx.send(SessionEvent::SearchFinished {
                generation,
                outcome,
            });
        });

        Some(generation)
    }

    /// Re-issue the current generation's summary after a failure.
    ///
    /// Returns `false` if there is nothing to retry.
    pub fn retry_summary(&mut self) -> bool {
        if self.provider.is_none() {
            return false;
        }
        let hits = self.context_hits();
        let Some(generation) = self.state.begin_summary_retry() else {
            return false;
        };
        tracing::info!(%generation, "retrying summary");
        self.start_summary(generation, hits);
        true
    }

    /// Wait for the next event from any task.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        self.events_rx.recv().await
    }

    /// Apply one event; a freshly applied non-empty result set starts the
    /// summary for that generation.
    ///
    /// Returns whether the event changed the state.
    pub fn apply(&mut self, event: SessionEvent) -> bool {
        let starts_summary = matches!(
            &event,
            SessionEvent::SearchFinished { outcome: Ok(results), .. } if !results.is_empty()
        );
        let generation = event.generation();

        if !self.state.apply(event) {
            return false;
        }
        if starts_summary && self.provider.is_some() {
            let hits = self.context_hits();
            self.state.summary = SummaryState::Loading;
            self.start_summary(generation, hits);
        }
        true
    }

    /// Wait for the next event and apply it.
    pub async fn apply_next(&mut self) -> bool {
        match self.next_event().await {
            Some(event) => self.apply(event),
            None => false,
        }
    }

    fn context_hits(&self) -> Vec<NormalizedHit> {
        self.state
            .results
            .as_ref()
            .map(|results| results.hits.iter().take(MAX_CONTEXT_HITS).cloned().collect())
            .unwrap_or_default()
    }

    fn start_summary(&mut self, generation: Generation, hits: Vec<NormalizedHit>) {
        let Some(provider) = self.provider.clone() else {
            return;
        };

        self.summary_cancel.cancel();
        self.summary_cancel = self.generation_cancel.child_token();

        let cancel = self.summary_cancel.clone();
        let tx = self.events_tx.clone();
        let query = self.state.query.clone();
        let idle_timeout = self.idle_timeout;

        tracing::debug!(%generation, hits = hits.len(), provider = provider.name(), "starting summary");
        tokio::spawn(async move {
            stream_summary(&*provider, &query, &hits, &cancel, idle_timeout, |state| {
                let _ = tx.send(SessionEvent::Summary { generation, state });
            })
            .await;
        });
    }
}

impl<B, P> Drop for Coordinator<B, P> {
    fn drop(&mut self) {
        self.generation_cancel.cancel();
    }
}
