//! Fuzzy matcher over typed record collections
//!
//! [`FuzzySearch`] wraps the `nucleo-matcher` scoring oracle and exposes a
//! normalised score in `[0, 1]` where 0 is a perfect match. Results are sorted
//! by ascending score; ties keep collection order.
//!
//! # Score contract
//!
//! For every key of a record, each field value is scored on its own and the
//! best value wins:
//!
//! - quality 0 when the raw score reaches `ideal`, the score of the query
//!   against its own text
//! - at most `0.05` for a contiguous run, even one inside a word
//! - `0.05 + 0.95 · (1 - raw / inner)` for scattered hits, `inner` being the
//!   score of the query as a run inside a word
//! - plus `match_start / distance` unless `ignore_location` is set
//! - values above `threshold` do not match
//!
//! The record score multiplies `max(quality, ε)^(weight · norm)` over all
//! matched keys, where `norm(n) = 1 / n^(0.5 · field_norm_weight)` for a value
//! of `n` whitespace-separated tokens.

pub mod best_match;
mod score;

pub use best_match::{best_file_match, best_link_match};

use crate::model::{IconRecord, LinkRecord, SearchRecord};
use nucleo_matcher::{Config, Matcher};
use score::{Query, combine, field_norm};
use std::cell::RefCell;
use std::cmp::Ordering;

/// Key of a searchable record field
pub const KEY_NAME: &str = "name";
pub const KEY_BASENAME: &str = "basename";
pub const KEY_PATH: &str = "path";
pub const KEY_ALIASES: &str = "aliases";
pub const KEY_TITLE: &str = "title";
pub const KEY_HEADINGS: &str = "headings";
pub const KEY_URL: &str = "url";
pub const KEY_TAGS: &str = "tags";

/// Records the matcher can look into
pub trait Searchable {
    /// Values of the field named `key`; an empty vector when absent
    fn field_values(&self, key: &str) -> Vec<&str>;
}

impl Searchable for String {
    fn field_values(&self, _key: &str) -> Vec<&str> {
        vec![self.as_str()]
    }
}

impl Searchable for SearchRecord {
    fn field_values(&self, key: &str) -> Vec<&str> {
        match key {
            KEY_NAME => vec![self.name.as_str()],
            KEY_BASENAME => vec![self.basename.as_str()],
            KEY_PATH => vec![self.path.as_str()],
            KEY_TITLE => self.title.as_deref().into_iter().collect(),
            KEY_ALIASES => self
                .aliases
                .iter()
                .flatten()
                .map(String::as_str)
                .collect(),
            KEY_HEADINGS => self
                .headings
                .iter()
                .flatten()
                .map(String::as_str)
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl Searchable for LinkRecord {
    fn field_values(&self, key: &str) -> Vec<&str> {
        match key {
            KEY_TITLE => vec![self.title.as_str()],
            KEY_URL => vec![self.url.as_str()],
            _ => Vec::new(),
        }
    }
}

impl Searchable for IconRecord {
    fn field_values(&self, key: &str) -> Vec<&str> {
        match key {
            KEY_NAME => vec![self.name.as_str()],
            KEY_TAGS => self.tags.iter().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }
}

/// Weighted field of a record
#[derive(Debug, Clone, PartialEq)]
pub struct SearchKey {
    pub name: String,
    pub weight: f64,
}

impl SearchKey {
    #[must_use]
    pub fn new(name: impl Into<String>, weight: f64) -> Self {
        Self {
            name: name.into(),
            weight,
        }
    }
}

/// Scoring configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    /// Weighted keys; empty means the whole record is one field
    pub keys: Vec<SearchKey>,
    /// Maximum per-field quality that still counts as a match
    pub threshold: f64,
    /// How far from the start a match may land before it stops counting
    pub distance: u32,
    pub ignore_location: bool,
    pub ignore_field_norm: bool,
    pub field_norm_weight: f64,
    /// fzf-style `^prefix`, `suffix$`, `'exact` and `!negation` atoms
    pub use_extended_search: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            keys: Vec::new(),
            threshold: 0.2,
            distance: 125,
            ignore_location: false,
            ignore_field_norm: false,
            field_norm_weight: 1.35,
            use_extended_search: true,
        }
    }
}

impl SearchOptions {
    #[must_use]
    pub fn with_keys(mut self, keys: Vec<SearchKey>) -> Self {
        self.keys = keys;
        self
    }

    #[must_use]
    pub const fn ignore_location(mut self, ignore: bool) -> Self {
        self.ignore_location = ignore;
        self
    }

    #[must_use]
    pub const fn field_norm_weight(mut self, weight: f64) -> Self {
        self.field_norm_weight = weight;
        self
    }

    #[must_use]
    pub const fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Keys with weights normalised to sum to 1
    fn normalized_keys(&self) -> Vec<SearchKey> {
        if self.keys.is_empty() {
            return vec![SearchKey::new("", 1.0)];
        }
        let total: f64 = self.keys.iter().map(|k| k.weight).sum();
        let total = if total > 0.0 { total } else { 1.0 };
        self.keys
            .iter()
            .map(|k| SearchKey::new(k.name.clone(), k.weight / total))
            .collect()
    }
}

/// A matched field value with the matched character positions
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMatch {
    pub key: String,
    pub value: String,
    pub indices: Vec<u32>,
}

/// One ranked search hit
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult<T> {
    pub item: T,
    /// Position of the item in the searched collection
    pub ref_index: usize,
    /// `None` for synthesised entries that always pass filtering
    pub score: Option<f64>,
    pub matches: Vec<FieldMatch>,
}

impl<T> SearchResult<T> {
    /// Entry not produced by the matcher
    #[must_use]
    pub const fn synthetic(item: T) -> Self {
        Self {
            item,
            ref_index: 0,
            score: None,
            matches: Vec::new(),
        }
    }

    /// Whether any matched field has the given key
    #[must_use]
    pub fn matched_key(&self, key: &str) -> Option<&FieldMatch> {
        self.matches.iter().find(|m| m.key == key)
    }
}

/// Fuzzy search over an in-memory collection
pub struct FuzzySearch<T> {
    records: Vec<T>,
    options: SearchOptions,
    matcher: RefCell<Matcher>,
}

impl<T: Searchable + Clone> FuzzySearch<T> {
    #[must_use]
    pub fn new(records: Vec<T>, options: SearchOptions) -> Self {
        Self {
            records,
            options,
            matcher: RefCell::new(Matcher::new(Config::DEFAULT)),
        }
    }

    #[must_use]
    pub const fn options(&self) -> &SearchOptions {
        &self.options
    }

    #[must_use]
    pub fn records(&self) -> &[T] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Replace the whole collection
    pub fn update_collection(&mut self, records: Vec<T>) {
        self.records = records;
    }

    /// Rank every matching record, best first
    #[must_use]
    pub fn raw_search(&self, query: &str, limit: Option<usize>) -> Vec<SearchResult<T>> {
        if self.records.is_empty() {
            return Vec::new();
        }

        let mut matcher = self.matcher.borrow_mut();
        let Some(compiled) = Query::compile(query, &self.options, &mut matcher) else {
            return Vec::new();
        };
        let keys = self.options.normalized_keys();
        let mut buf = Vec::new();

        let mut results: Vec<SearchResult<T>> = self
            .records
            .iter()
            .enumerate()
            .filter_map(|(ref_index, record)| {
                let mut total = 1.0;
                let mut matches = Vec::new();

                for key in &keys {
                    let best = record
                        .field_values(&key.name)
                        .into_iter()
                        .filter_map(|value| {
                            compiled
                                .score_value(value, &self.options, &mut matcher, &mut buf)
                                .map(|s| (value, s))
                        })
                        .min_by(|a, b| {
                            a.1.quality
                                .partial_cmp(&b.1.quality)
                                .unwrap_or(Ordering::Equal)
                        });

                    if let Some((value, scored)) = best {
                        let norm = field_norm(value, &self.options);
                        total = combine(total, scored.quality, key.weight, norm);
                        matches.push(FieldMatch {
                            key: key.name.clone(),
                            value: value.to_string(),
                            indices: scored.indices,
                        });
                    }
                }

                (!matches.is_empty()).then(|| SearchResult {
                    item: record.clone(),
                    ref_index,
                    score: Some(total.clamp(0.0, 1.0)),
                    matches,
                })
            })
            .collect();

        results.sort_by(|a, b| {
            a.score
                .partial_cmp(&b.score)
                .unwrap_or(Ordering::Equal)
                .then(a.ref_index.cmp(&b.ref_index))
        });
        if let Some(limit) = limit {
            results.truncate(limit);
        }
        results
    }

    /// Ranked results with `score < threshold`, at most `max_results`
    #[must_use]
    pub fn filtered_search(
        &self,
        query: &str,
        threshold: f64,
        max_results: usize,
    ) -> Vec<SearchResult<T>> {
        filter_results(self.raw_search(query, None), threshold, max_results)
    }

    /// [`Self::filtered_search`] with the 0.25 / 5 defaults
    #[must_use]
    pub fn filtered_search_default(&self, query: &str) -> Vec<SearchResult<T>> {
        self.filtered_search(query, DEFAULT_SCORE_THRESHOLD, DEFAULT_MAX_RESULTS)
    }
}

/// Default cut-off of [`FuzzySearch::filtered_search`]
pub const DEFAULT_SCORE_THRESHOLD: f64 = 0.25;
/// Default result cap of [`FuzzySearch::filtered_search`]
pub const DEFAULT_MAX_RESULTS: usize = 5;

/// Keep results under `threshold`; unscored entries always pass
#[must_use]
pub fn filter_results<T>(
    results: Vec<SearchResult<T>>,
    threshold: f64,
    max_results: usize,
) -> Vec<SearchResult<T>> {
    results
        .into_iter()
        .filter(|r| r.score.is_none_or(|s| s < threshold))
        .take(max_results)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basenames(names: &[&str]) -> Vec<SearchRecord> {
        names
            .iter()
            .map(|n| SearchRecord::file(format!("{n}.md")))
            .collect()
    }

    fn file_options() -> SearchOptions {
        SearchOptions::default().with_keys(vec![
            SearchKey::new(KEY_BASENAME, 1.5),
            SearchKey::new(KEY_ALIASES, 0.1),
            SearchKey::new(KEY_HEADINGS, 1.0),
        ])
    }

    #[test]
    fn test_empty_collection_or_query() {
        let empty: FuzzySearch<String> = FuzzySearch::new(Vec::new(), SearchOptions::default());
        assert!(empty.raw_search("a", None).is_empty());

        let search = FuzzySearch::new(vec!["alpha".to_string()], SearchOptions::default());
        assert!(search.raw_search("", None).is_empty());
        assert!(search.raw_search("  ", None).is_empty());
    }

    #[test]
    fn test_readme_ranking() {
        let search = FuzzySearch::new(
            basenames(&["README", "ReadMe Notes", "other"]),
            file_options(),
        );
        let results = search.filtered_search_default("readme");
        let names: Vec<&str> = results.iter().map(|r| r.item.basename.as_str()).collect();

        assert_eq!(names.first(), Some(&"README"));
        assert!(!names.contains(&"other"));
        if let Some(pos) = names.iter().position(|n| *n == "ReadMe Notes") {
            assert!(pos > 0);
        }
    }

    #[test]
    fn test_exact_basename_round_trip() {
        let names = ["Daily Log", "Project Plan", "inbox", "Meeting 2024-01-02"];
        let search = FuzzySearch::new(basenames(&names), file_options());

        for name in names {
            let results = search.filtered_search_default(name);
            assert!(
                results.iter().any(|r| r.item.basename == name),
                "{name} not found"
            );
        }
    }

    #[test]
    fn test_mid_word_substrings_match() {
        let names = ["report", "mynote", "logo", "Meeting notes", "budget-2024", "photo"];
        let search = FuzzySearch::new(
            basenames(&names),
            crate::strategy::file_search_options(false, true),
        );
        let found = |query: &str| -> Vec<String> {
            search
                .raw_search(query, None)
                .into_iter()
                .map(|r| r.item.basename)
                .collect()
        };

        assert_eq!(found("port"), vec!["report"]);
        assert_eq!(found("get"), vec!["budget-2024"]);
        assert!(found("otes").contains(&"Meeting notes".to_string()));

        let note = found("note");
        assert!(note.contains(&"mynote".to_string()));
        assert!(note.contains(&"Meeting notes".to_string()));
    }

    #[test]
    fn test_single_character_query() {
        let search = FuzzySearch::new(
            basenames(&["logo", "photo", "text"]),
            crate::strategy::file_search_options(false, true),
        );
        let names: Vec<String> = search
            .raw_search("o", None)
            .into_iter()
            .map(|r| r.item.basename)
            .collect();
        assert_eq!(names, vec!["logo", "photo"]);
    }

    #[test]
    fn test_word_start_beats_mid_word() {
        let search = FuzzySearch::new(
            vec!["import".to_string(), "port".to_string()],
            SearchOptions::default().ignore_location(true),
        );
        let results = search.raw_search("port", None);
        assert_eq!(results[0].item, "port");
        assert!(results[0].score < results[1].score);
    }

    #[test]
    fn test_update_collection_is_idempotent() {
        let mut search = FuzzySearch::new(basenames(&["one"]), file_options());
        let records = basenames(&["alpha", "alphabet", "beta"]);

        search.update_collection(records.clone());
        let first = search.raw_search("alp", None);
        search.update_collection(records);
        let second = search.raw_search("alp", None);

        assert_eq!(first, second);
        assert_eq!(search.len(), 3);
    }

    #[test]
    fn test_ties_keep_collection_order() {
        let search = FuzzySearch::new(
            vec!["same".to_string(), "same".to_string(), "same".to_string()],
            SearchOptions::default(),
        );
        let refs: Vec<usize> = search
            .raw_search("same", None)
            .iter()
            .map(|r| r.ref_index)
            .collect();
        assert_eq!(refs, vec![0, 1, 2]);
    }

    #[test]
    fn test_limit() {
        let search = FuzzySearch::new(
            vec!["note a".to_string(), "note b".to_string(), "note c".to_string()],
            SearchOptions::default(),
        );
        assert_eq!(search.raw_search("note", Some(2)).len(), 2);
    }

    #[test]
    fn test_heading_match_is_reported() {
        let record = SearchRecord::file("Guide.md").with_metadata(
            None,
            Vec::new(),
            Some(vec!["Installation".to_string()]),
        );
        let search = FuzzySearch::new(vec![record], file_options());
        let results = search.raw_search("installation", None);

        assert_eq!(results.len(), 1);
        assert!(results[0].matched_key(KEY_HEADINGS).is_some());
        assert!(results[0].matched_key(KEY_BASENAME).is_none());
    }

    #[test]
    fn test_filter_results_passes_unscored() {
        let results = vec![
            SearchResult::synthetic("goto".to_string()),
            SearchResult {
                item: "bad".to_string(),
                ref_index: 0,
                score: Some(0.9),
                matches: Vec::new(),
            },
            SearchResult {
                item: "good".to_string(),
                ref_index: 1,
                score: Some(0.01),
                matches: Vec::new(),
            },
        ];
        let kept: Vec<String> = filter_results(results, 0.25, 5)
            .into_iter()
            .map(|r| r.item)
            .collect();
        assert_eq!(kept, vec!["goto".to_string(), "good".to_string()]);
    }

    #[test]
    fn test_extended_search_prefix() {
        let search = FuzzySearch::new(
            vec!["project".to_string(), "my project".to_string()],
            SearchOptions::default(),
        );
        let results = search.raw_search("^proj", None);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].item, "project");
    }
}
