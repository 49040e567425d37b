//! Grounding prompt for the summary model.

use sift_search::NormalizedHit;
use sift_search::normalize::first_text;

use super::MAX_CONTEXT_HITS;

/// One hit as prompt context, with its 1-based citation index.
///
/// Uses the plain record fields; highlight markup would only confuse the model.
fn context_entry(position: usize, hit: &NormalizedHit) -> String {
    let raw = &hit.raw;
    let index = position + 1;

    let title = first_text([raw.title.as_ref(), raw.name.as_ref()])
        .unwrap_or_else(|| format!("Result {index}"));
    let content = first_text([
        raw.content.as_ref(),
        raw.description.as_ref(),
        raw.overview.as_ref(),
    ])
    .unwrap_or_else(|| raw.to_json());

    format!("[{index}] Title: {title}\nContent: {content}")
}

/// Build the prompt for `query` from at most [`MAX_CONTEXT_HITS`] hits.
///
/// # Examples
///
/// ```
/// use sift::summary::build_prompt;
/// use sift_search::{normalize, RawHit};
///
/// let hit = normalize(&RawHit::from_value(serde_json::json!({
///     "title": "Alien",
///     "content": "A space horror film."
/// })), 0);
/// let prompt = build_prompt("alien", &[hit]);
/// assert!(prompt.contains("[1] Title: Alien\nContent: A space horror film."));
/// ```
pub fn build_prompt(query: &str, hits: &[NormalizedHit]) -> String {
    let context = hits
        .iter()
        .take(MAX_CONTEXT_HITS)
        .enumerate()
        .map(|(position, hit)| context_entry(position, hit))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "You are a helpful, intelligent search assistant.\n\
         User Query: \"{query}\"\n\
         \n\
         Please provide a concise, informative answer to the query based MAINLY on the following search results.\n\
         If the search results are relevant, cite them using [1], [2], etc.\n\
         If the search results do not contain the answer, acknowledge that but try to answer \
         from your general knowledge if appropriate, or state you don't know.\n\
         Format the response in simple Markdown (bolding key terms, using bullet points for lists).\n\
         Keep the tone neutral, professional, and direct.\n\
         \n\
         Search Results Context:\n\
         {context}"
    )
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use serde_json::{Value, json};
    use sift_search::{RawHit, normalize};

    fn hit(position: usize, value: Value) -> NormalizedHit {
        normalize(&RawHit::from_value(value), position)
    }

    #[test]
    fn prompt_embeds_query_and_instructions() {
        let prompt = build_prompt("red planet", &[]);
        assert!(prompt.contains("User Query: \"red planet\""));
        assert!(prompt.contains("[1], [2]"));
        assert!(prompt.contains("general knowledge"));
        assert!(prompt.ends_with("Search Results Context:\n"));
    }

    #[test]
    fn entries_are_one_based_and_blank_line_separated() {
        let hits = [
            hit(0, json!({ "title": "Mars", "content": "Fourth planet." })),
            hit(1, json!({ "title": "Phobos", "content": "A moon of Mars." })),
        ];
        let prompt = build_prompt("mars", &hits);
        assert!(prompt.contains(
            "[1] Title: Mars\nContent: Fourth planet.\n\n[2] Title: Phobos\nContent: A moon of Mars."
        ));
    }

    #[test]
    fn only_top_hits_are_included() {
        let hits: Vec<_> = (0..8)
            .map(|i| hit(i, json!({ "title": format!("Doc {i}"), "content": "x" })))
            .collect();
        let prompt = build_prompt("docs", &hits);
        assert!(prompt.contains("[5] Title: Doc 4"));
        assert!(!prompt.contains("[6]"));
        assert!(!prompt.contains("Doc 5"));
    }

    #[test]
    fn plain_fields_are_used_not_highlights() {
        let hits = [hit(
            0,
            json!({
                "title": "Alien",
                "content": "Space horror.",
                "_formatted": { "title": "<mark>Alien</mark>" }
            }),
        )];
        let prompt = build_prompt("alien", &hits);
        assert!(prompt.contains("[1] Title: Alien\n"));
        assert!(!prompt.contains("<mark>"));
    }

    #[test]
    fn title_falls_back_to_name_then_index() {
        let hits = [
            hit(0, json!({ "name": "Named", "content": "c" })),
            hit(1, json!({ "content": "c" })),
        ];
        let prompt = build_prompt("q", &hits);
        assert!(prompt.contains("[1] Title: Named\n"));
        assert!(prompt.contains("[2] Title: Result 2\n"));
    }

    #[test]
    fn content_falls_back_through_description_overview_then_json() {
        let hits = [
            hit(0, json!({ "title": "a", "description": "Desc" })),
            hit(1, json!({ "title": "b", "overview": "Over" })),
            hit(2, json!({ "title": "c", "year": 1979 })),
        ];
        let prompt = build_prompt("q", &hits);
        assert!(prompt.contains("[1] Title: a\nContent: Desc"));
        assert!(prompt.contains("[2] Title: b\nContent: Over"));
        assert!(prompt.contains("[3] Title: c\nContent: {\"title\":\"c\",\"year\":1979}"));
    }
}
