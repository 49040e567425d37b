//! Summary rendering — classifies streamed Markdown-ish text into blocks
//! and tracks what a live stream has already printed.
//!
//! Only the subset the summary prompt asks for is understood: `**bold**`
//! spans, `-`/`*` bullets, `N.` numbered items, blank-line spacers and
//! plain paragraphs. Each line is classified on its own, so partial text
//! from a stream that is still running renders the same way it will once
//! complete.

/// Inline span within a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    Text(String),
    Bold(String),
}

/// One rendered line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// `- item` or `* item`.
    Bullet(Vec<Span>),
    /// `12. item`; `marker` is the literal `12.`.
    Numbered { marker: String, spans: Vec<Span> },
    /// Blank line; a fixed vertical gap.
    Spacer,
    Paragraph(Vec<Span>),
}

/// Split a line into plain and bold spans.
///
/// A `**` pairs with the next `**` on the same line. An unpaired marker,
/// or a pair with nothing between, stays literal text.
///
/// # Examples
///
/// ```
/// use sift::render::{split_bold, Span};
///
/// assert_eq!(
///     split_bold("a **b** c"),
///     vec![Span::Text("a ".into()), Span::Bold("b".into()), Span::Text(" c".into())]
/// );
/// assert_eq!(split_bold("2 ** 3"), vec![Span::Text("2 ** 3".into())]);
/// ```
pub fn split_bold(line: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut plain = String::new();
    let mut rest = line;

    while let Some(open) = rest.find("**") {
        let after_open = &rest[open + 2..];
        let Some(close) = after_open.find("**") else {
            break;
        };
        let inner = &after_open[..close];
        plain.push_str(&rest[..open]);
        if inner.is_empty() {
            plain.push_str("****");
        } else {
            if !plain.is_empty() {
                spans.push(Span::Text(std::mem::take(&mut plain)));
            }
            spans.push(Span::Bold(inner.to_owned()));
        }
        rest = &after_open[close + 2..];
    }

    plain.push_str(rest);
    if !plain.is_empty() {
        spans.push(Span::Text(plain));
    }
    spans
}

/// Length of a leading `<digits>.<whitespace>` marker, excluding the whitespace.
fn numbered_marker(line: &str) -> Option<usize> {
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let mut tail = line[digits..].chars();
    match (tail.next(), tail.next()) {
        (Some('.'), Some(c)) if c.is_whitespace() => Some(digits + 1),
        _ => None,
    }
}

fn classify(line: &str) -> Block {
    let trimmed = line.trim();

    if trimmed.starts_with("- ") || trimmed.starts_with("* ") {
        let body = trimmed[1..].trim_start();
        return Block::Bullet(split_bold(body));
    }

    if let Some(len) = numbered_marker(trimmed) {
        let body = trimmed[len..].trim_start();
        return Block::Numbered {
            marker: trimmed[..len].to_owned(),
            spans: split_bold(body),
        };
    }

    if trimmed.is_empty() {
        return Block::Spacer;
    }

    Block::Paragraph(split_bold(line))
}

/// Render summary text into blocks, one per line.
///
/// Pure and total: any input renders, and the same input always renders
/// the same way.
///
/// # Examples
///
/// ```
/// use sift::render::{render, Block, Span};
///
/// let blocks = render("- **Bold** item\n\n1. First\nPlain line");
/// assert_eq!(blocks.len(), 4);
/// assert!(matches!(&blocks[0], Block::Bullet(spans) if spans[0] == Span::Bold("Bold".into())));
/// assert_eq!(blocks[1], Block::Spacer);
/// ```
pub fn render(text: &str) -> Vec<Block> {
    text.split('\n').map(classify).collect()
}

const BOLD_ON: &str = "\x1b[1m";
const BOLD_OFF: &str = "\x1b[0m";

fn write_spans(out: &mut String, spans: &[Span]) {
    for span in spans {
        match span {
            Span::Text(text) => out.push_str(text),
            Span::Bold(text) => {
                out.push_str(BOLD_ON);
                out.push_str(text);
                out.push_str(BOLD_OFF);
            }
        }
    }
}

/// Format blocks for a terminal, bold as ANSI escapes.
pub fn format_blocks(blocks: &[Block]) -> String {
    let mut out = String::new();
    for block in blocks {
        match block {
            Block::Bullet(spans) => {
                out.push_str("  • ");
                write_spans(&mut out, spans);
            }
            Block::Numbered { marker, spans } => {
                out.push_str("  ");
                out.push_str(marker);
                out.push(' ');
                write_spans(&mut out, spans);
            }
            Block::Spacer => {}
            Block::Paragraph(spans) => write_spans(&mut out, spans),
        }
        out.push('\n');
    }
    out
}

/// Tracks how much of a streaming summary has been shown.
///
/// Each `Streaming` state carries the whole text so far; [`LiveText::delta`]
/// returns only the part not yet printed.
#[derive(Debug, Default)]
pub struct LiveText {
    shown: String,
}

impl LiveText {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether nothing has been shown since the last reset.
    pub fn is_empty(&self) -> bool {
        self.shown.is_empty()
    }

    /// New text in `partial` since the previous call.
    ///
    /// If `partial` does not extend what was shown (a different summary),
    /// the whole of it is new.
    pub fn delta<'a>(&mut self, partial: &'a str) -> &'a str {
        let fresh = partial
            .strip_prefix(self.shown.as_str())
            .unwrap_or(partial);
        self.shown = partial.to_owned();
        fresh
    }

    pub fn reset(&mut self) {
        self.shown.clear();
    }
}
