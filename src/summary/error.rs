//! Error types for the summary module.
//!
//! Each error variant carries a stable error code (SCREAMING_SNAKE_CASE)
//! that is included in the Display output and accessible via [`SummaryError::code()`].
//! None of these messages are shown to the end user; they are logged, and
//! the user sees [`SUMMARY_FAILED_MESSAGE`](super::SUMMARY_FAILED_MESSAGE).

/// Stable error codes for programmatic error handling.
pub mod error_codes {
    /// Invalid or missing configuration.
    pub const CONFIG_INVALID: &str = "CONFIG_INVALID";

    /// Authentication failed (invalid/missing API key).
    pub const AUTH_FAILED: &str = "AUTH_FAILED";

    /// Request to the model provider failed.
    pub const REQUEST_FAILED: &str = "REQUEST_FAILED";

    /// Streaming response encountered an error.
    pub const STREAM_FAILED: &str = "STREAM_FAILED";

    /// No chunk arrived within the idle timeout.
    pub const TIMEOUT_ERROR: &str = "TIMEOUT_ERROR";

    /// Provider-specific error not covered by other variants.
    pub const PROVIDER_ERROR: &str = "PROVIDER_ERROR";
}

/// Errors produced while generating a summary.
///
/// The Display impl formats as `[CODE] message`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SummaryError {
    /// Invalid or missing configuration.
    #[error("[{}] {}", error_codes::CONFIG_INVALID, .0)]
    ConfigError(String),

    /// Authentication failed (invalid/missing API key).
    #[error("[{}] {}", error_codes::AUTH_FAILED, .0)]
    AuthError(String),

    /// Request to the model provider failed.
    #[error("[{}] {}", error_codes::REQUEST_FAILED, .0)]
    RequestError(String),

    /// Streaming response encountered an error.
    #[error("[{}] {}", error_codes::STREAM_FAILED, .0)]
    StreamError(String),

    /// No chunk arrived within the idle timeout.
    #[error("[{}] {}", error_codes::TIMEOUT_ERROR, .0)]
    TimeoutError(String),

    /// Provider-specific error not covered by other variants.
    #[error("[{}] {}", error_codes::PROVIDER_ERROR, .0)]
    ProviderError(String),
}

impl SummaryError {
    /// Returns the stable error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError(_) => error_codes::CONFIG_INVALID,
            Self::AuthError(_) => error_codes::AUTH_FAILED,
            Self::RequestError(_) => error_codes::REQUEST_FAILED,
            Self::StreamError(_) => error_codes::STREAM_FAILED,
            Self::TimeoutError(_) => error_codes::TIMEOUT_ERROR,
            Self::ProviderError(_) => error_codes::PROVIDER_ERROR,
        }
    }

    /// Returns the inner message without the code prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::ConfigError(m)
            | Self::AuthError(m)
            | Self::RequestError(m)
            | Self::StreamError(m)
            | Self::TimeoutError(m)
            | Self::ProviderError(m) => m,
        }
    }
}

/// Convenience alias for summary results.
pub type Result<T> = std::result::Result<T, SummaryError>;
