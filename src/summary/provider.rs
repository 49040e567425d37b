//! Provider trait for generative summary backends.
//!
//! A provider turns one prompt into a stream of text fragments in arrival
//! order. Everything above it (state, cancellation, failure mapping) is
//! provider-neutral.

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::Stream;

use super::error::SummaryError;

/// A boxed stream of text fragments.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, SummaryError>> + Send>>;

/// Trait for summary providers.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use sift::summary::{SummaryError, SummaryProvider, TextStream};
///
/// struct Echo;
///
/// #[async_trait]
/// impl SummaryProvider for Echo {
///     fn name(&self) -> &str {
///         "echo"
///     }
///
///     async fn stream(&self, prompt: &str) -> Result<TextStream, SummaryError> {
///         let fragments = vec![Ok(prompt.to_owned())];
///         Ok(Box::pin(futures_util::stream::iter(fragments)))
///     }
/// }
/// ```
#[async_trait]
pub trait SummaryProvider: Send + Sync {
    /// Provider identifier for logs.
    fn name(&self) -> &str;

    /// Issue the request and return the fragment stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent or the provider
    /// rejects it before streaming starts. Failures after that arrive as
    /// `Err` items on the stream.
    async fn stream(&self, prompt: &str) -> Result<TextStream, SummaryError>;
}
