//! Schema-tolerant reduction of raw hits to display fields.
//!
//! Indexed content differs between deployments, so every display field is
//! picked by an ordered fallback over the conventional keys. Normalisation
//! is total: malformed values and unparsable URLs degrade to sentinels.

use serde_json::Value;
use url::Url;

use crate::types::{HitId, NormalizedHit, RawHit};

/// Title used when a hit has no usable title or name.
pub const UNTITLED: &str = "Untitled Document";

/// Hostname shown when a hit has no parsable URL.
pub const SOURCE_SENTINEL: &str = "Source";

/// `raw_url` value for hits without a link.
pub const NO_LINK: &str = "#";

/// Visible path characters kept before the ellipsis.
pub const MAX_PATH_CHARS: usize = 20;

const ELLIPSIS: &str = "...";

/// Normalise one hit. `position` is its zero-based rank in the result list.
///
/// Field priority (first usable value wins):
///
/// - title: `_formatted.title`, `title`, `name`, [`UNTITLED`]
/// - excerpt: `_formatted.overview`, `_formatted.description`,
///   `_formatted.content`, `description`, `content`, JSON of the record
/// - link: `url`, `link`, [`NO_LINK`]
///
/// # Examples
///
/// ```
/// use sift_search::normalize::normalize;
/// use sift_search::types::RawHit;
///
/// let hit = RawHit::from_value(serde_json::json!({
///     "title": "Rust",
///     "url": "https://www.rust-lang.org/learn"
/// }));
/// let normalized = normalize(&hit, 0);
/// assert_eq!(normalized.display_title, "Rust");
/// assert_eq!(normalized.source_host, "www.rust-lang.org");
/// assert_eq!(normalized.source_path, "/learn");
/// ```
pub fn normalize(hit: &RawHit, position: usize) -> NormalizedHit {
    let formatted = hit.formatted.as_ref();

    let display_title = first_text([
        formatted.and_then(|f| f.title.as_ref()),
        hit.title.as_ref(),
        hit.name.as_ref(),
    ])
    .unwrap_or_else(|| UNTITLED.to_owned());

    let display_excerpt = first_text([
        formatted.and_then(|f| f.overview.as_ref()),
        formatted.and_then(|f| f.description.as_ref()),
        formatted.and_then(|f| f.content.as_ref()),
        hit.description.as_ref(),
        hit.content.as_ref(),
    ])
    .unwrap_or_else(|| hit.to_json());

    let raw_url = first_text([hit.url.as_ref(), hit.link.as_ref()])
        .unwrap_or_else(|| NO_LINK.to_owned());

    let (source_host, source_path) = split_source(&raw_url);

    NormalizedHit {
        id: hit_id(hit.id.as_ref(), position),
        display_title,
        display_excerpt,
        source_host,
        source_path,
        ranking_score: hit.ranking_score.as_ref().and_then(Value::as_f64),
        raw_url,
        raw: hit.clone(),
    }
}

/// Normalise a whole hit list, preserving backend order.
pub fn normalize_all(hits: &[RawHit]) -> Vec<NormalizedHit> {
    hits.iter()
        .enumerate()
        .map(|(position, hit)| normalize(hit, position))
        .collect()
}

/// Render a field value as display text, or `None` if it should fall through.
///
/// Empty strings, zero, `false` and null fall through, as do arrays and
/// objects, which have no sensible one-line rendering.
pub fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_owned()),
        _ => None,
    }
}

/// First candidate that renders as non-empty text.
pub fn first_text<'a, I>(candidates: I) -> Option<String>
where
    I: IntoIterator<Item = Option<&'a Value>>,
{
    candidates.into_iter().flatten().find_map(text_value)
}

fn hit_id(id: Option<&Value>, position: usize) -> HitId {
    id.and_then(text_value)
        .map(HitId::Key)
        .unwrap_or(HitId::Position(position))
}

/// Hostname and display path for a link. Never fails.
pub fn split_source(raw_url: &str) -> (String, String) {
    if raw_url == NO_LINK {
        return (SOURCE_SENTINEL.to_owned(), String::new());
    }

    let Ok(parsed) = Url::parse(raw_url) else {
        tracing::trace!(url = raw_url, "unparsable hit url");
        return (SOURCE_SENTINEL.to_owned(), String::new());
    };

    let host = match parsed.host_str() {
        Some(host) if !host.is_empty() => host.to_owned(),
        _ => SOURCE_SENTINEL.to_owned(),
    };

    (host, display_path(parsed.path()))
}

/// `/` becomes empty; longer paths are cut to [`MAX_PATH_CHARS`] plus `...`.
pub fn display_path(path: &str) -> String {
    if path == "/" {
        return String::new();
    }
    if path.chars().count() > MAX_PATH_CHARS {
        let mut cut: String = path.chars().take(MAX_PATH_CHARS).collect();
        cut.push_str(ELLIPSIS);
        return cut;
    }
    path.to_owned()
}
