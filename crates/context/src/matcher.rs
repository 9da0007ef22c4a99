//! Matcher — selects the documents relevant to a user query.
//!
//! A document is included when ANY rule fires (logical OR):
//! - its source file name (minus extension) appears as a whole word in the
//!   query, case-insensitive;
//! - any of its tags appears as a whole word;
//! - its category appears as a whole word;
//! - a fuzzy pass over title/description/info scores at or under the
//!   configured distance threshold.
//!
//! Result order: fuzzy matches first by ascending distance, then rule-only
//! matches in store order. Documents matched by both passes appear once, at
//! their fuzzy rank.

use std::collections::HashSet;

use emberchat_core::document::ContextDocument;
use regex::Regex;
use tracing::debug;

use crate::store::ContextStore;

/// Default fuzzy distance threshold: 0 is exact, higher admits looser matches.
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.72;

/// Tokens shorter than this are only matched exactly, never fuzzily.
const MIN_FUZZY_TOKEN_LEN: usize = 4;

/// Max normalized edit distance for two tokens to count as the same word.
const TOKEN_EDIT_TOLERANCE: f64 = 0.34;

pub struct Matcher {
    fuzzy_threshold: f64,
}

impl Matcher {
    pub fn new(fuzzy_threshold: f64) -> Self {
        Self { fuzzy_threshold }
    }

    /// Return the relevant documents for `query`, best matches first.
    pub fn matches(&self, query: &str, store: &ContextStore) -> Vec<ContextDocument> {
        let query_tokens = tokenize(query);

        // Fuzzy pass over title / description / info, ranked by ascending distance.
        let mut fuzzy_ranked: Vec<(usize, f64)> = store
            .documents()
            .iter()
            .enumerate()
            .filter_map(|(i, doc)| {
                self.best_fuzzy_distance(&query_tokens, doc)
                    .filter(|d| *d <= self.fuzzy_threshold)
                    .map(|d| (i, d))
            })
            .collect();
        fuzzy_ranked.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });

        let mut included: HashSet<usize> = fuzzy_ranked.iter().map(|(i, _)| *i).collect();
        let mut matched: Vec<ContextDocument> = fuzzy_ranked
            .iter()
            .map(|(i, _)| store.documents()[*i].clone())
            .collect();
        let fuzzy_count = matched.len();

        // Rule pass, appended in store order.
        for (i, doc) in store.documents().iter().enumerate() {
            if included.contains(&i) {
                continue;
            }
            if rule_match(query, doc) {
                included.insert(i);
                matched.push(doc.clone());
            }
        }

        debug!(
            total = matched.len(),
            fuzzy = fuzzy_count,
            rule_only = matched.len() - fuzzy_count,
            "Matched context documents"
        );

        matched
    }

    /// The smallest fuzzy distance among the document's searchable fields.
    fn best_fuzzy_distance(&self, query_tokens: &[String], doc: &ContextDocument) -> Option<f64> {
        [&doc.title, &doc.description, &doc.info]
            .into_iter()
            .flatten()
            .filter_map(|field| fuzzy_distance(query_tokens, field))
            .min_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new(DEFAULT_FUZZY_THRESHOLD)
    }
}

/// Whether any whole-word rule (source name, tag, category) fires.
fn rule_match(query: &str, doc: &ContextDocument) -> bool {
    if word_in_query(query, doc.source_stem()) {
        return true;
    }

    if doc.tags.iter().any(|tag| word_in_query(query, tag)) {
        return true;
    }

    matches!(&doc.category, Some(category) if word_in_query(query, category))
}

/// Case-insensitive whole-word containment check.
fn word_in_query(query: &str, needle: &str) -> bool {
    let needle = needle.trim();
    if needle.is_empty() {
        return false;
    }
    match Regex::new(&format!(r"(?i)\b{}\b", regex::escape(needle))) {
        Ok(pattern) => pattern.is_match(query),
        Err(_) => false,
    }
}

/// Fuzzy distance between a query and one document field, in [0, 1].
///
/// Measures how much of the field is covered by the query: 0 when every
/// field token appears (possibly with small typos) in the query, 1 when
/// none do. Returns None for fields with no tokens.
fn fuzzy_distance(query_tokens: &[String], field: &str) -> Option<f64> {
    let field_tokens = tokenize(field);
    if field_tokens.is_empty() {
        return None;
    }

    let covered = field_tokens
        .iter()
        .filter(|ft| query_tokens.iter().any(|qt| tokens_match(qt, ft)))
        .count();

    Some(1.0 - covered as f64 / field_tokens.len() as f64)
}

/// Two tokens match exactly, or within a small edit-distance tolerance.
fn tokens_match(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    if a.len() < MIN_FUZZY_TOKEN_LEN || b.len() < MIN_FUZZY_TOKEN_LEN {
        return false;
    }
    let max_len = a.len().max(b.len());
    levenshtein(a, b) as f64 / max_len as f64 <= TOKEN_EDIT_TOLERANCE
}

/// Lowercase alphanumeric word split.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Classic two-row Levenshtein edit distance.
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(json: &str, source: &str) -> ContextDocument {
        let mut doc: ContextDocument = serde_json::from_str(json).unwrap();
        doc.source = source.into();
        doc
    }

    fn store_with(docs: Vec<ContextDocument>) -> ContextStore {
        ContextStore::from_documents(docs)
    }

    #[test]
    fn tag_matches_verbatim_case_insensitive() {
        let store = store_with(vec![doc(
            r#"{"id": "post-1", "tags": ["blog", "caching"]}"#,
            "blogs.json",
        )]);

        let matched = Matcher::default().matches("Tell me about CACHING strategies", &store);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].id, "post-1");
    }

    #[test]
    fn tag_requires_word_boundary() {
        let store = store_with(vec![doc(r#"{"id": "p", "tags": ["blog"]}"#, "blogs.json")]);

        // "blogging" contains "blog" but not as a whole word; "blogs" source
        // stem doesn't appear either.
        let matched = Matcher::default().matches("I enjoy blogging daily", &store);
        assert!(matched.is_empty());
    }

    #[test]
    fn source_stem_matches_as_word() {
        let store = store_with(vec![doc(r#"{"id": "p", "tags": ["writing"]}"#, "blogs.json")]);

        let matched = Matcher::default().matches("show me your blogs please", &store);
        assert_eq!(matched.len(), 1);
    }

    #[test]
    fn category_matches_as_word() {
        let store = store_with(vec![doc(
            r#"{"id": "p", "category": "education", "tags": ["degree"]}"#,
            "background.json",
        )]);

        let matched = Matcher::default().matches("what is your education like", &store);
        assert_eq!(matched.len(), 1);
    }

    #[test]
    fn fuzzy_matches_title_within_threshold() {
        let store = store_with(vec![doc(
            r#"{"id": "p", "title": "Caching strategies", "tags": ["perf"]}"#,
            "blogs.json",
        )]);

        // Both title tokens are covered (one with a typo) — distance 0.
        let matched = Matcher::default().matches("your cachng strategies article", &store);
        assert_eq!(matched.len(), 1);
    }

    #[test]
    fn unrelated_query_matches_nothing() {
        let store = store_with(vec![doc(
            r#"{"id": "p", "title": "Caching strategies", "tags": ["perf"], "category": "engineering"}"#,
            "blogs.json",
        )]);

        let matched = Matcher::default().matches("what is the weather today", &store);
        assert!(matched.is_empty());
    }

    #[test]
    fn fuzzy_rank_precedes_rule_only_matches() {
        let store = store_with(vec![
            doc(r#"{"id": "rule-only", "tags": ["rust"]}"#, "project.json"),
            doc(
                r#"{"id": "loose", "title": "Notes on rust tooling and editors"}"#,
                "blogs.json",
            ),
            doc(r#"{"id": "tight", "title": "rust tooling"}"#, "blogs.json"),
        ]);

        let matched = Matcher::default().matches("tell me about rust tooling", &store);
        let ids: Vec<&str> = matched.iter().map(|d| d.id.as_str()).collect();

        // "tight" is fully covered (distance 0), "loose" partially, and the
        // tag-only document trails in store order.
        assert_eq!(ids[0], "tight");
        let loose_pos = ids.iter().position(|id| *id == "loose").unwrap();
        let rule_pos = ids.iter().position(|id| *id == "rule-only").unwrap();
        assert!(loose_pos < rule_pos);
    }

    #[test]
    fn document_matched_by_both_passes_appears_once() {
        let store = store_with(vec![doc(
            r#"{"id": "p", "title": "caching", "tags": ["caching"]}"#,
            "blogs.json",
        )]);

        let matched = Matcher::default().matches("caching", &store);
        assert_eq!(matched.len(), 1);
    }

    #[test]
    fn untagged_document_not_tag_matched() {
        let store = store_with(vec![doc(r#"{"id": "p"}"#, "misc.json")]);

        let matched = Matcher::default().matches("anything at all", &store);
        assert!(matched.is_empty());
    }

    #[test]
    fn levenshtein_basics() {
        assert_eq!(levenshtein("caching", "caching"), 0);
        assert_eq!(levenshtein("caching", "cachng"), 1);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
    }

    #[test]
    fn short_tokens_never_fuzzy_match() {
        assert!(tokens_match("cat", "cat"));
        assert!(!tokens_match("cat", "car"));
        assert!(tokens_match("caching", "cachng"));
    }
}
