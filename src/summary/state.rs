//! Summary lifecycle state.

use std::fmt;

/// Lifecycle of one summary.
///
/// `Idle → Loading → Streaming → Done`, or `Failed` from `Loading` or
/// `Streaming`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SummaryState {
    /// Nothing requested.
    #[default]
    Idle,
    /// Request issued, no text yet.
    Loading,
    /// At least one fragment received; holds the text so far.
    Streaming(String),
    /// Stream ended normally; holds the full text.
    Done(String),
    /// Stream failed; holds the user-facing reason.
    Failed(String),
}

/// The variant of a [`SummaryState`] without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SummaryPhase {
    Idle,
    Loading,
    Streaming,
    Done,
    Failed,
}

impl fmt::Display for SummaryPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Streaming => "streaming",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

impl SummaryState {
    pub fn phase(&self) -> SummaryPhase {
        match self {
            Self::Idle => SummaryPhase::Idle,
            Self::Loading => SummaryPhase::Loading,
            Self::Streaming(_) => SummaryPhase::Streaming,
            Self::Done(_) => SummaryPhase::Done,
            Self::Failed(_) => SummaryPhase::Failed,
        }
    }

    /// Text accumulated so far, if any.
    pub fn content(&self) -> Option<&str> {
        match self {
            Self::Streaming(text) | Self::Done(text) => Some(text),
            _ => None,
        }
    }

    /// `Done` or `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done(_) | Self::Failed(_))
    }
}

/// Running buffer of streamed text.
#[derive(Debug, Default)]
pub struct SummaryAccumulator {
    buffer: String,
    fragments: usize,
}

impl SummaryAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one fragment. Empty fragments are ignored.
    ///
    /// Returns `true` if the buffer changed.
    pub fn push(&mut self, fragment: &str) -> bool {
        if fragment.is_empty() {
            return false;
        }
        self.buffer.push_str(fragment);
        self.fragments += 1;
        true
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    /// Number of non-empty fragments received.
    pub fn fragments(&self) -> usize {
        self.fragments
    }

    /// Snapshot as a `Streaming` state.
    pub fn streaming(&self) -> SummaryState {
        SummaryState::Streaming(self.buffer.clone())
    }

    /// Consume into a `Done` state.
    pub fn finish(self) -> SummaryState {
        SummaryState::Done(self.buffer)
    }
}
