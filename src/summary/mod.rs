//! Streaming, cited summaries of search results.
//!
//! The top hits of a search are turned into a grounding prompt
//! ([`build_prompt`]), sent to a generative model through a
//! [`SummaryProvider`], and the streamed fragments are folded into a
//! [`SummaryState`] by [`stream_summary`].
//!
//! # Submodules
//!
//! - [`error`] — [`SummaryError`] with stable error codes
//! - [`prompt`] — prompt template and per-hit context
//! - [`sse`] — Server-Sent Events line parser
//! - [`provider`] — the [`SummaryProvider`] trait
//! - [`gemini`] — Gemini `streamGenerateContent` adapter
//! - [`state`] — [`SummaryState`] and the running text buffer
//! - [`stream`] — drives one summary to a terminal state

pub mod error;
pub mod gemini;
pub mod prompt;
pub mod provider;
pub mod sse;
pub mod state;
pub mod stream;

pub use error::SummaryError;
pub use gemini::{GeminiAdapter, GeminiConfig};
pub use prompt::build_prompt;
pub use provider::{SummaryProvider, TextStream};
pub use state::{SummaryAccumulator, SummaryPhase, SummaryState};
pub use stream::stream_summary;

/// Model used for summaries.
pub const MODEL_NAME: &str = "gemini-2.5-flash";

/// System instruction sent with every summary request.
pub const SYSTEM_INSTRUCTION: &str = "You are a concise search summarizer engine.";

/// Number of top hits included in the prompt.
pub const MAX_CONTEXT_HITS: usize = 5;

/// The only failure text the end user ever sees.
pub const SUMMARY_FAILED_MESSAGE: &str = "Failed to generate AI summary.";
