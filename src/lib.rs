//! Sift: hybrid search front-end with streaming, cited AI summaries.
//!
//! A submitted query goes to the search backend; once hits arrive, the top
//! few are turned into a grounding prompt and a generative model streams a
//! short answer that cites them as `[1]`, `[2]`, ...
//!
//! # Architecture
//!
//! - **Config**: runtime overrides → environment → defaults ([`config`])
//! - **Search**: hybrid Meilisearch client and hit normalisation
//!   (`sift-search` crate)
//! - **Summary**: prompt building and Gemini token streaming ([`summary`])
//! - **Render**: line classifier for the summary's Markdown subset ([`render`])
//! - **Session**: generation-guarded display state ([`session`])
//! - **Coordinator**: spawns searches and summaries, applies their events
//!   ([`coordinator`])

pub mod config;
pub mod coordinator;
pub mod error;
pub mod render;
pub mod session;
pub mod summary;

pub use config::{AppConfig, ConfigSources, SummaryConfig};
pub use coordinator::Coordinator;
pub use error::{Result, SiftError};
pub use session::{AppSearchState, Generation, SessionEvent};
pub use summary::{GeminiAdapter, GeminiConfig, SummaryProvider, SummaryState};

pub use sift_search;
