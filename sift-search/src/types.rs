//! Core types: queries, raw backend hits, normalised hits, result sets.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A query as typed by the user. Only dispatched when non-blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    text: String,
}

impl SearchQuery {
    /// Wrap raw query text. The text is kept as typed; blankness is checked
    /// separately so the caller can decide whether to dispatch.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// The query text exactly as typed.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// `true` when the query is empty after trimming whitespace.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Highlighted variants of text fields, as returned under `_formatted`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormattedFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<Value>,
    /// Every other formatted attribute the index returned.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

const FORMATTED_KEY: &str = "_formatted";

fn lenient_formatted<'de, D>(deserializer: D) -> Result<Option<FormattedFields>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// One document as returned by the backend.
///
/// The index schema is not fixed, so every conventional field is an optional
/// JSON value and the remaining keys are kept in `extra`. Deserialising a
/// `RawHit` therefore succeeds for any JSON object; a `_formatted` that is
/// not an object is ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawHit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<Value>,
    #[serde(
        rename = "_rankingScore",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub ranking_score: Option<Value>,
    #[serde(
        rename = "_formatted",
        default,
        deserialize_with = "lenient_formatted",
        skip_serializing_if = "Option::is_none"
    )]
    pub formatted: Option<FormattedFields>,
    /// Unknown keys, preserved but not consulted.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawHit {
    /// Build a hit from an arbitrary JSON value. Non-objects yield an empty hit.
    ///
    /// A `_formatted` value that is not an object is kept verbatim in `extra`.
    pub fn from_value(value: Value) -> Self {
        let Value::Object(mut map) = value else {
            return Self::default();
        };
        let stray_formatted = match map.get(FORMATTED_KEY) {
            None | Some(Value::Object(_) | Value::Null) => None,
            Some(_) => map.remove(FORMATTED_KEY),
        };

        let mut hit: Self = serde_json::from_value(Value::Object(map)).unwrap_or_default();
        if let Some(value) = stray_formatted {
            hit.extra.insert(FORMATTED_KEY.to_owned(), value);
        }
        hit
    }

    /// Compact JSON serialisation of the whole record.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_owned())
    }
}

/// Stable identity of a hit for display keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitId {
    /// The document's own `id` (string or number), rendered as text.
    Key(String),
    /// No usable `id`; position in the result list.
    Position(usize),
}

impl fmt::Display for HitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Position(idx) => write!(f, "#{idx}"),
        }
    }
}

/// A hit reduced to what a result card needs.
///
/// Title and excerpt may carry the configured highlight markers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedHit {
    pub id: HitId,
    pub display_title: String,
    pub display_excerpt: String,
    /// Hostname of `raw_url`, or [`SOURCE_SENTINEL`](crate::normalize::SOURCE_SENTINEL).
    pub source_host: String,
    /// Path of `raw_url`; empty for `/`, truncated past 20 characters.
    pub source_path: String,
    pub ranking_score: Option<f64>,
    /// Original link, or [`NO_LINK`](crate::normalize::NO_LINK).
    pub raw_url: String,
    /// The record this was derived from.
    pub raw: RawHit,
}

impl NormalizedHit {
    /// Score with two decimals, e.g. `"0.87"`.
    pub fn score_label(&self) -> Option<String> {
        self.ranking_score.map(|score| format!("{score:.2}"))
    }

    /// Whether the hit carries a link at all.
    pub fn has_link(&self) -> bool {
        self.raw_url != crate::normalize::NO_LINK
    }
}

/// The hits of one search, in backend ranking order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResultSet {
    pub hits: Vec<NormalizedHit>,
    pub estimated_total_hits: u64,
    pub processing_time_ms: u64,
    pub query: String,
}

impl SearchResultSet {
    /// Result set for a query that was never sent.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }
}

/// Wire shape of a Meilisearch search response. Missing fields default.
///
/// Hits stay untyped here so one odd element cannot fail the whole
/// response; [`SearchResponse::raw_hits`] converts them one by one.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub hits: Vec<Value>,
    #[serde(default)]
    pub estimated_total_hits: u64,
    #[serde(default)]
    pub processing_time_ms: u64,
}

impl SearchResponse {
    /// Every hit as a [`RawHit`], in response order.
    pub fn raw_hits(&self) -> Vec<RawHit> {
        self.hits.iter().cloned().map(RawHit::from_value).collect()
    }
}
