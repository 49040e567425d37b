//! Search session state with a generation guard.
//!
//! Every accepted query starts a new [`Generation`]. Asynchronous results
//! are tagged with the generation they were started for, and
//! [`AppSearchState::apply`] drops any event whose generation is no longer
//! current. Displayed state therefore follows the last submitted query, not
//! the last response to arrive.

use std::fmt;

use sift_search::{SearchError, SearchQuery, SearchResultSet};

use crate::summary::SummaryState;

/// Identifies one submitted query. Strictly increasing within a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub fn get(self) -> u64 {
        self.0
    }

    fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen-{}", self.0)
    }
}

/// A completed asynchronous operation, tagged with its generation.
#[derive(Debug)]
pub enum SessionEvent {
    SearchFinished {
        generation: Generation,
        outcome: Result<SearchResultSet, SearchError>,
    },
    Summary {
        generation: Generation,
        state: SummaryState,
    },
}

impl SessionEvent {
    pub fn generation(&self) -> Generation {
        match self {
            Self::SearchFinished { generation, .. } | Self::Summary { generation, .. } => {
                *generation
            }
        }
    }
}

/// Everything the interactive surface displays.
#[derive(Debug, Default)]
pub struct AppSearchState {
    /// Text of the last accepted query.
    pub query: String,
    /// Latest results; kept while the next query loads.
    pub results: Option<SearchResultSet>,
    pub is_loading: bool,
    /// User-facing search error of the current generation.
    pub error: Option<String>,
    /// Set by the first accepted query; never cleared.
    pub has_searched: bool,
    pub summary: SummaryState,
    generation: Generation,
}

impl AppSearchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_generation(&self) -> Generation {
        self.generation
    }

    /// Accept a query and start a new generation.
    ///
    /// Blank queries are rejected without touching any state. Anything
    /// still in flight for the previous generation becomes stale, and the
    /// previous summary is discarded whatever its stage.
    pub fn begin(&mut self, query: &SearchQuery) -> Option<Generation> {
        if query.is_blank() {
            return None;
        }
        self.generation = self.generation.next();
        self.query = query.as_str().to_owned();
        self.is_loading = true;
        self.error = None;
        self.has_searched = true;
        self.summary = SummaryState::Idle;
        Some(self.generation)
    }

    /// Apply an event if it belongs to the current generation.
    ///
    /// Returns whether anything changed.
    pub fn apply(&mut self, event: SessionEvent) -> bool {
        let generation = event.generation();
        if generation != self.generation {
            tracing::debug!(%generation, current = %self.generation, "dropping stale event");
            return false;
        }

        match event {
            SessionEvent::SearchFinished { outcome, .. } => {
                self.is_loading = false;
                match outcome {
                    Ok(results) => {
                        self.results = Some(results);
                        self.error = None;
                    }
                    Err(err) => {
                        tracing::error!(%generation, error = %err, "search failed");
                        self.error = Some(err.user_message());
                    }
                }
            }
            SessionEvent::Summary { state, .. } => self.summary = state,
        }
        true
    }

    /// Nothing is loading or streaming for the current generation.
    pub fn is_settled(&self) -> bool {
        !self.is_loading
            && !matches!(self.summary, SummaryState::Loading | SummaryState::Streaming(_))
    }

    /// Whether the current summary failed and may be requested again.
    pub fn summary_retry_available(&self) -> bool {
        matches!(self.summary, SummaryState::Failed(_))
    }

    /// Mark a retry as started. Returns the generation to tag it with, or
    /// `None` if there is nothing to retry.
    pub fn begin_summary_retry(&mut self) -> Option<Generation> {
        if !self.summary_retry_available() {
            return None;
        }
        self.summary = SummaryState::Loading;
        Some(self.generation)
    }
}
