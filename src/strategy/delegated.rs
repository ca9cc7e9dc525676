//! Full-text search through an external backend

use super::{ComponentKey, DisplayProps, SelectOutcome, SuggesterStrategy, TextSegment};
use crate::host::{HostContext, OpenOptions};
use crate::suggest::error::Result;
use crate::suggest::keymap::{KeyChord, ScopeAction, SelectMode, new_tab_bindings};
use async_trait::async_trait;
use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// One hit of a full-text backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelegatedResult {
    pub basename: String,
    pub path: String,
    pub excerpt: String,
    /// Words of the query the backend found in the note
    pub found_words: Vec<String>,
    pub score: f64,
    /// Character offset of the first match in the note
    pub match_offset: Option<usize>,
}

/// Full-text search backend
#[async_trait(?Send)]
pub trait FullTextSearch {
    async fn search(&self, query: &str) -> Result<Vec<DelegatedResult>>;
}

/// Settings the delegated strategy reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelegatedOptions {
    pub max_results: usize,
    pub show_path: bool,
    pub show_excerpt: bool,
    /// Scroll to the first match after opening
    pub jump_to_first_match: bool,
}

impl Default for DelegatedOptions {
    fn default() -> Self {
        Self {
            max_results: 12,
            show_path: true,
            show_excerpt: true,
            jump_to_first_match: true,
        }
    }
}

pub struct DelegatedStrategy {
    host: HostContext,
    backend: Rc<dyn FullTextSearch>,
    options: DelegatedOptions,
}

impl DelegatedStrategy {
    #[must_use]
    pub fn new(host: HostContext, backend: Rc<dyn FullTextSearch>, options: DelegatedOptions) -> Self {
        Self {
            host,
            backend,
            options,
        }
    }
}

#[async_trait(?Send)]
impl SuggesterStrategy for DelegatedStrategy {
    type Item = DelegatedResult;

    async fn get_suggestions(&self, input: &str) -> Vec<DelegatedResult> {
        match self.backend.search(input).await {
            Ok(mut results) => {
                results.truncate(self.options.max_results);
                results
            }
            Err(e) => {
                tracing::warn!("Full-text search failed: {e}");
                Vec::new()
            }
        }
    }

    async fn use_selected_item(
        &self,
        item: DelegatedResult,
        mode: SelectMode,
        _input: &str,
    ) -> Result<SelectOutcome> {
        if self.host.vault.file_by_path(&item.path).is_none() {
            tracing::debug!("{} no longer exists", item.path);
            return Ok(SelectOutcome::Close);
        }

        let workspace = &self.host.workspace;
        workspace
            .open_file(&item.path, OpenOptions::new_tab(mode.new_tab()))
            .await?;
        if self.options.jump_to_first_match
            && let Some(offset) = item.match_offset
        {
            workspace.scroll_to_offset(&item.path, offset).await?;
        }
        Ok(SelectOutcome::Close)
    }

    fn display_props(&self, item: &DelegatedResult, _input: &str) -> DisplayProps {
        DisplayProps {
            label: item.basename.clone(),
            detail: self.options.show_path.then(|| item.path.clone()),
            excerpt: if self.options.show_excerpt {
                highlight_excerpt(&item.excerpt, &item.found_words)
            } else {
                Vec::new()
            },
            ..DisplayProps::default()
        }
    }

    fn component_key(&self) -> ComponentKey {
        ComponentKey::DelegatedSuggestion
    }

    fn key_bindings(&self) -> Vec<(KeyChord, ScopeAction)> {
        new_tab_bindings()
    }
}

/// Split `excerpt` into plain and highlighted runs
///
/// Every found word is matched literally and case-insensitively; longer
/// words win where two overlap.
#[must_use]
pub fn highlight_excerpt(excerpt: &str, words: &[String]) -> Vec<TextSegment> {
    let mut words: Vec<&str> = words
        .iter()
        .map(String::as_str)
        .filter(|w| !w.is_empty())
        .collect();
    if excerpt.is_empty() {
        return Vec::new();
    }
    if words.is_empty() {
        return vec![TextSegment::plain(excerpt)];
    }
    words.sort_by_key(|w| std::cmp::Reverse(w.len()));

    let pattern = words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|");
    let re = match RegexBuilder::new(&pattern).case_insensitive(true).build() {
        Ok(re) => re,
        Err(e) => {
            tracing::warn!("Cannot highlight excerpt: {e}");
            return vec![TextSegment::plain(excerpt)];
        }
    };

    let mut segments = Vec::new();
    let mut last = 0;
    for m in re.find_iter(excerpt) {
        if m.start() > last {
            segments.push(TextSegment::plain(&excerpt[last..m.start()]));
        }
        segments.push(TextSegment::highlighted(m.as_str()));
        last = m.end();
    }
    if last < excerpt.len() {
        segments.push(TextSegment::plain(&excerpt[last..]));
    }
    segments
}
