//! Server-Sent Events (SSE) parsing for streamed model output.
//!
//! The model endpoint answers with `text/event-stream`:
//!
//! ```text
//! data: {"candidates":[{"content":{"parts":[{"text":"Hel"}]}}]}
//!
//! data: {"candidates":[{"content":{"parts":[{"text":"lo"}]}}]}
//!
//! ```
//!
//! Network chunks do not respect line or UTF-8 boundaries, so
//! [`SseLineParser`] buffers raw bytes and only decodes complete lines.
//!
//! # Examples
//!
//! ```
//! use sift::summary::sse::SseLineParser;
//!
//! let mut parser = SseLineParser::new();
//! assert!(parser.push(b"data: hel").is_empty());
//! let events = parser.push(b"lo\n\n");
//! assert_eq!(events.len(), 1);
//! assert_eq!(events[0].data, "hello");
//! ```

/// A parsed Server-Sent Event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    /// The `event:` field, if any.
    pub event_type: Option<String>,
    /// All `data:` lines joined with `\n`.
    pub data: String,
}

impl SseEvent {
    /// Whether this event is the `[DONE]` sentinel some providers send.
    pub fn is_done(&self) -> bool {
        self.data.trim() == "[DONE]"
    }
}

#[derive(Debug, Default)]
struct PendingEvent {
    event_type: Option<String>,
    data_lines: Vec<String>,
}

impl PendingEvent {
    fn take(&mut self) -> Option<SseEvent> {
        if self.data_lines.is_empty() {
            self.event_type = None;
            return None;
        }
        let event = SseEvent {
            event_type: self.event_type.take(),
            data: self.data_lines.join("\n"),
        };
        self.data_lines.clear();
        Some(event)
    }

    /// Feed one line (without terminator). Returns an event at a blank line.
    fn line(&mut self, line: &str) -> Option<SseEvent> {
        if line.is_empty() {
            return self.take();
        }
        if line.starts_with(':') {
            return None;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "data" => self.data_lines.push(value.to_owned()),
            "event" => self.event_type = Some(value.to_owned()),
            _ => {}
        }
        None
    }
}

/// Parse a complete SSE body into events.
pub fn parse_sse_text(text: &str) -> Vec<SseEvent> {
    let mut parser = SseLineParser::new();
    let mut events = parser.push(text.as_bytes());
    events.extend(parser.flush());
    events
}

/// Incremental SSE parser fed with raw network chunks.
#[derive(Debug, Default)]
pub struct SseLineParser {
    buffer: Vec<u8>,
    pending: PendingEvent,
}

impl SseLineParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a chunk of bytes; returns the events it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend_from_slice(chunk);
        let mut events = Vec::new();

        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.buffer.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            let line = String::from_utf8_lossy(&line);
            if let Some(event) = self.pending.line(&line) {
                events.push(event);
            }
        }

        events
    }

    /// Flush at end of stream: a final event without its blank line.
    pub fn flush(&mut self) -> Option<SseEvent> {
        if !self.buffer.is_empty() {
            let rest = std::mem::take(&mut self.buffer);
            let line = String::from_utf8_lossy(&rest);
            let line = line.strip_suffix('\r').unwrap_or(&line);
            if let Some(event) = self.pending.line(line) {
                return Some(event);
            }
        }
        self.pending.take()
    }
}
