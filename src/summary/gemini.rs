//! Gemini adapter using the `streamGenerateContent` SSE endpoint.
//!
//! Each SSE event carries a `GenerateContentResponse`; the text of every
//! candidate part is forwarded as one fragment. Events without text
//! (usage metadata, finish markers) are skipped.
//!
//! # Examples
//!
//! ```no_run
//! use futures_util::StreamExt;
//! use sift::summary::{GeminiAdapter, GeminiConfig, SummaryProvider};
//!
//! # async fn example() -> Result<(), sift::summary::SummaryError> {
//! let adapter = GeminiAdapter::new(GeminiConfig::new("AIza-key"))?;
//! let mut stream = adapter.stream("Summarise: ...").await?;
//! while let Some(fragment) = stream.next().await {
//!     print!("{}", fragment?);
//! }
//! # Ok(())
//! # }
//! ```

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use serde_json::{Value, json};

use super::error::SummaryError;
use super::provider::{SummaryProvider, TextStream};
use super::sse::{SseEvent, SseLineParser};
use super::{MODEL_NAME, SYSTEM_INSTRUCTION};
use crate::config::SummaryConfig;

/// Public Generative Language API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Configuration for the Gemini adapter.
#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub system_instruction: String,
    pub connect_timeout: Duration,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("connect_timeout", &self.connect_timeout)
            .finish_non_exhaustive()
    }
}

impl GeminiConfig {
    /// Config with the default model, endpoint and system instruction.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: MODEL_NAME.to_owned(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            system_instruction: SYSTEM_INSTRUCTION.to_owned(),
            connect_timeout: Duration::from_secs(10),
        }
    }

    /// Point at a different endpoint (tests, proxies).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Build from resolved summary settings.
    ///
    /// # Errors
    ///
    /// Returns [`SummaryError::ConfigError`] if no API key is configured.
    pub fn from_summary_config(config: &SummaryConfig) -> Result<Self, SummaryError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| SummaryError::ConfigError("GEMINI_API_KEY is not set".into()))?;
        Ok(Self {
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
            ..Self::new(api_key)
                .with_base_url(config.base_url.clone())
                .with_model(config.model.clone())
        })
    }

    /// Full streaming endpoint URL.
    pub fn stream_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:streamGenerateContent?alt=sse",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

/// Build the `streamGenerateContent` request body.
pub fn build_request(prompt: &str, system_instruction: &str) -> Value {
    json!({
        "contents": [
            { "role": "user", "parts": [{ "text": prompt }] }
        ],
        "systemInstruction": {
            "parts": [{ "text": system_instruction }]
        }
    })
}

/// Extract the text of one SSE data payload.
///
/// Returns `Ok(None)` for events that carry no text.
///
/// # Errors
///
/// Returns [`SummaryError::StreamError`] when the payload is an error object
/// or the prompt was blocked.
pub fn parse_chunk(data: &str) -> Result<Option<String>, SummaryError> {
    let Ok(value) = serde_json::from_str::<Value>(data) else {
        tracing::debug!(len = data.len(), "skipping non-JSON stream event");
        return Ok(None);
    };

    if let Some(error) = value.get("error") {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        return Err(SummaryError::StreamError(format!(
            "Gemini stream error: {message}"
        )));
    }

    let text: String = value
        .get("candidates")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|candidate| candidate.pointer("/content/parts"))
        .filter_map(Value::as_array)
        .flatten()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();

    if text.is_empty() {
        if let Some(reason) = value
            .pointer("/promptFeedback/blockReason")
            .and_then(Value::as_str)
        {
            return Err(SummaryError::StreamError(format!(
                "Gemini blocked the prompt: {reason}"
            )));
        }
        return Ok(None);
    }

    Ok(Some(text))
}

/// Extract an error message from a Gemini error body.
///
/// Errors come as `{"error": {...}}`, or wrapped in an array on the
/// streaming endpoint.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            let error = match &v {
                Value::Array(items) => items.first()?.get("error")?,
                other => other.get("error")?,
            };
            error.get("message").and_then(Value::as_str).map(String::from)
        })
        .unwrap_or_else(|| body.trim().to_owned())
}

/// Map an HTTP error status to a [`SummaryError`].
fn map_http_error(status: reqwest::StatusCode, body: &str) -> SummaryError {
    let message = extract_error_message(body);
    match status.as_u16() {
        401 | 403 => SummaryError::AuthError(format!("Gemini authentication failed: {message}")),
        429 => SummaryError::RequestError(format!("Gemini rate limited: {message}")),
        code => SummaryError::ProviderError(format!("Gemini HTTP {code}: {message}")),
    }
}

/// Gemini provider.
pub struct GeminiAdapter {
    config: GeminiConfig,
    client: reqwest::Client,
}

impl std::fmt::Debug for GeminiAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiAdapter")
            .field("model", &self.config.model)
            .field("base_url", &self.config.base_url)
            .finish()
    }
}

impl GeminiAdapter {
    /// Create an adapter.
    ///
    /// Only the connect phase is time-limited; an answer may stream for as
    /// long as chunks keep arriving.
    ///
    /// # Errors
    ///
    /// Returns [`SummaryError::ConfigError`] if the HTTP client cannot be built.
    pub fn new(config: GeminiConfig) -> Result<Self, SummaryError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(concat!("sift/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SummaryError::ConfigError(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }
}

#[async_trait]
impl SummaryProvider for GeminiAdapter {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn stream(&self, prompt: &str) -> Result<TextStream, SummaryError> {
        let body = build_request(prompt, &self.config.system_instruction);

        tracing::debug!(
            model = %self.config.model,
            prompt_len = prompt.len(),
            "opening summary stream"
        );

        let response = self
            .client
            .post(self.config.stream_url())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| SummaryError::RequestError(format!("Gemini request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(map_http_error(status, &body_text));
        }

        Ok(Box::pin(create_text_stream(response.bytes_stream())))
    }
}

struct StreamState {
    byte_stream: std::pin::Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>,
    sse_parser: SseLineParser,
    pending: VecDeque<Result<String, SummaryError>>,
    finished: bool,
}

impl StreamState {
    fn queue(&mut self, events: impl IntoIterator<Item = SseEvent>) {
        for event in events {
            if event.is_done() {
                continue;
            }
            match parse_chunk(&event.data) {
                Ok(Some(text)) => self.pending.push_back(Ok(text)),
                Ok(None) => {}
                Err(e) => {
                    self.pending.push_back(Err(e));
                    // Nothing after an error is forwarded.
                    self.finished = true;
                    return;
                }
            }
        }
    }
}

/// Turn the response body into a fragment stream. Ends after the first error.
fn create_text_stream(
    byte_stream: impl Stream<Item = Result<Bytes, reqwest::Error>> + Send + 'static,
) -> impl Stream<Item = Result<String, SummaryError>> + Send {
    futures_util::stream::unfold(
        StreamState {
            byte_stream: Box::pin(byte_stream),
            sse_parser: SseLineParser::new(),
            pending: VecDeque::new(),
            finished: false,
        },
        |mut state| async move {
            loop {
                if let Some(item) = state.pending.pop_front() {
                    return Some((item, state));
                }
                if state.finished {
                    return None;
                }

                match state.byte_stream.next().await {
                    Some(Ok(chunk)) => {
                        let events = state.sse_parser.push(&chunk);
                        state.queue(events);
                    }
                    Some(Err(e)) => {
                        state.finished = true;
                        let err = SummaryError::StreamError(format!("Stream read error: {e}"));
                        return Some((Err(err), state));
                    }
                    None => {
                        let trailing = state.sse_parser.flush();
                        state.queue(trailing);
                        state.finished = true;
                    }
                }
            }
        },
    )
}
