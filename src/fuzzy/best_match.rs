//! Pick the display name of a result that matched on several fields

use super::{FuzzySearch, KEY_HEADINGS, SearchOptions, SearchResult};
use crate::model::{LinkRecord, SearchRecord};

/// Name that best explains why a file matched `query`
///
/// A heading match never relabels the file, so it yields the basename.
/// Otherwise the basename and aliases are searched again and the top hit
/// wins, falling back to the basename.
#[must_use]
pub fn best_file_match(result: &SearchResult<SearchRecord>, query: &str) -> String {
    let record = &result.item;
    if result.matched_key(KEY_HEADINGS).is_some() {
        return record.basename.clone();
    }
    let Some(aliases) = record.aliases.as_ref().filter(|a| !a.is_empty()) else {
        return record.basename.clone();
    };

    let candidates: Vec<String> = std::iter::once(record.basename.clone())
        .chain(aliases.iter().cloned())
        .collect();
    top_hit(candidates, query).unwrap_or_else(|| record.basename.clone())
}

/// Title or url of a link, whichever matches `query` best
#[must_use]
pub fn best_link_match(result: &SearchResult<LinkRecord>, query: &str) -> String {
    let link = &result.item;
    if link.title.is_empty() {
        return link.url.clone();
    }
    top_hit(vec![link.title.clone(), link.url.clone()], query)
        .unwrap_or_else(|| link.url.clone())
}

fn top_hit(candidates: Vec<String>, query: &str) -> Option<String> {
    FuzzySearch::new(candidates, SearchOptions::default())
        .raw_search(query, Some(1))
        .into_iter()
        .next()
        .map(|r| r.item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fuzzy::{FieldMatch, KEY_BASENAME};
    use crate::model::LinkType;

    fn result_for(record: SearchRecord, key: &str) -> SearchResult<SearchRecord> {
        SearchResult {
            item: record,
            ref_index: 0,
            score: Some(0.1),
            matches: vec![FieldMatch {
                key: key.to_string(),
                value: String::new(),
                indices: Vec::new(),
            }],
        }
    }

    #[test]
    fn test_heading_match_keeps_basename() {
        let record = SearchRecord::file("Guide.md").with_metadata(
            None,
            vec!["Manual".to_string()],
            Some(vec!["Manual setup".to_string()]),
        );
        let result = result_for(record, KEY_HEADINGS);
        assert_eq!(best_file_match(&result, "manual"), "Guide");
    }

    #[test]
    fn test_alias_beats_basename() {
        let record = SearchRecord::file("2024-01-01.md").with_metadata(
            None,
            vec!["New Year".to_string()],
            None,
        );
        let result = result_for(record, KEY_BASENAME);
        assert_eq!(best_file_match(&result, "new year"), "New Year");
    }

    #[test]
    fn test_no_aliases_falls_back() {
        let result = result_for(SearchRecord::file("Guide.md"), KEY_BASENAME);
        assert_eq!(best_file_match(&result, "zzz"), "Guide");
    }

    #[test]
    fn test_link_match() {
        let link = LinkRecord::new("Rust Docs", "https://doc.rust-lang.org", LinkType::Bookmark);
        let result = SearchResult::synthetic(link);
        assert_eq!(best_link_match(&result, "rust docs"), "Rust Docs");
        assert_eq!(best_link_match(&result, "qqq"), "https://doc.rust-lang.org");

        let untitled = SearchResult::synthetic(LinkRecord::new("", "https://a.b", LinkType::History));
        assert_eq!(best_link_match(&untitled, "a"), "https://a.b");
    }
}
