//! Vault file search
//!
//! Ranks the records of a [`SearchFileIndex`] and opens, deep-links or
//! creates notes on selection.

use super::{ComponentKey, DisplayProps, NoSuggestion, SelectOutcome, SuggesterStrategy, TextSegment};
use crate::fuzzy::{
    KEY_ALIASES, KEY_BASENAME, KEY_HEADINGS, KEY_TITLE, SearchKey, SearchOptions, SearchResult,
    best_file_match,
};
use crate::host::{HostContext, OpenOptions};
use crate::index::SearchFileIndex;
use crate::index::paths::{join_path, last_segment, parent_of};
use crate::model::SearchRecord;
use crate::suggest::error::Result;
use crate::suggest::keymap::{HotkeyHint, KeyChord, ScopeAction, SelectMode, file_bindings, file_hints};
use async_trait::async_trait;
use moka::sync::Cache;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

const BEST_MATCH_CACHE_CAPACITY: u64 = 2048;

/// Settings the file strategy reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStrategyOptions {
    pub max_results: usize,
    /// Open the matched heading instead of the top of the file
    pub auto_jump_to_heading: bool,
    /// Show the parent folder as detail
    pub show_path: bool,
    pub search_headings: bool,
}

impl Default for FileStrategyOptions {
    fn default() -> Self {
        Self {
            max_results: 12,
            auto_jump_to_heading: true,
            show_path: true,
            search_headings: true,
        }
    }
}

/// Matcher configuration for file records
///
/// Basename outweighs title and headings; aliases only break ties.
#[must_use]
pub fn file_search_options(search_title: bool, search_headings: bool) -> SearchOptions {
    let mut keys = vec![
        SearchKey::new(KEY_BASENAME, 1.5),
        SearchKey::new(KEY_ALIASES, 0.1),
    ];
    if search_title {
        keys.push(SearchKey::new(KEY_TITLE, 1.2));
    }
    if search_headings {
        keys.push(SearchKey::new(KEY_HEADINGS, 1.0));
    }
    SearchOptions::default()
        .with_keys(keys)
        .ignore_location(true)
        .field_norm_weight(1.65)
}

/// Default strategy of the search bar
pub struct DefaultStrategy {
    host: HostContext,
    index: Rc<RefCell<SearchFileIndex>>,
    options: FileStrategyOptions,
    best_matches: Cache<(String, String), String>,
    cached_generation: Cell<u64>,
}

impl DefaultStrategy {
    #[must_use]
    pub fn new(
        host: HostContext,
        index: Rc<RefCell<SearchFileIndex>>,
        options: FileStrategyOptions,
    ) -> Self {
        let generation = index.borrow().generation();
        Self {
            host,
            index,
            options,
            best_matches: Cache::builder()
                .max_capacity(BEST_MATCH_CACHE_CAPACITY)
                .build(),
            cached_generation: Cell::new(generation),
        }
    }

    #[must_use]
    pub fn index(&self) -> &Rc<RefCell<SearchFileIndex>> {
        &self.index
    }

    #[must_use]
    pub const fn options(&self) -> FileStrategyOptions {
        self.options
    }

    /// Best-matching name for a result, memoised until the index changes
    fn display_name(&self, result: &SearchResult<SearchRecord>, input: &str) -> String {
        let generation = self.index.borrow().generation();
        if self.cached_generation.replace(generation) != generation {
            self.best_matches.invalidate_all();
        }

        let key = (result.item.path.clone(), input.to_string());
        if let Some(name) = self.best_matches.get(&key) {
            return name;
        }
        let name = best_file_match(result, input);
        self.best_matches.insert(key, name.clone());
        name
    }

    async fn open(&self, path: &str, new_tab: bool) -> Result<()> {
        self.host
            .workspace
            .open_file(path, OpenOptions::new_tab(new_tab))
            .await?;
        Ok(())
    }

    /// Create the note for `record`, or for the typed input
    ///
    /// Unresolved records are created at their own path, with the parent
    /// folder made first. Typed input opens an existing markdown file of
    /// the same basename instead of creating a duplicate.
    async fn create(&self, record: Option<&SearchRecord>, input: &str, new_tab: bool) -> Result<()> {
        let vault = &self.host.vault;

        let path = match record.filter(|r| r.is_unresolved) {
            Some(record) => {
                let folder = parent_of(&record.path);
                if !folder.is_empty() && !vault.exists(folder).await? {
                    vault.create_folder(folder).await?;
                }
                vault.create_file(&record.path, "").await?.path
            }
            None => {
                let input = input.trim();
                if input.is_empty() {
                    return Ok(());
                }
                let existing = self
                    .index
                    .borrow()
                    .markdown_by_basename(input)
                    .map(|r| r.path.clone());
                if let Some(path) = existing {
                    tracing::debug!("Opening existing note {path} instead of creating one");
                    return self.open(&path, new_tab).await;
                }
                let path = join_path(&vault.default_new_file_parent(), &format!("{input}.md"));
                vault.create_file(&path, "").await?.path
            }
        };

        tracing::debug!("Created {path}");
        self.open(&path, new_tab).await
    }
}

#[async_trait(?Send)]
impl SuggesterStrategy for DefaultStrategy {
    type Item = SearchResult<SearchRecord>;

    async fn get_suggestions(&self, input: &str) -> Vec<Self::Item> {
        self.index
            .borrow()
            .search()
            .raw_search(input, Some(self.options.max_results))
    }

    async fn use_selected_item(
        &self,
        result: Self::Item,
        mode: SelectMode,
        input: &str,
    ) -> Result<SelectOutcome> {
        let new_tab = mode.new_tab();
        let record = &result.item;

        if mode.create() {
            self.create(None, input, new_tab).await?;
            return Ok(SelectOutcome::Close);
        }
        if !record.is_created {
            self.create(Some(record), input, new_tab).await?;
            return Ok(SelectOutcome::Close);
        }
        if self.host.vault.file_by_path(&record.path).is_none() {
            tracing::debug!("{} no longer exists", record.path);
            return Ok(SelectOutcome::Close);
        }

        match result.matched_key(KEY_HEADINGS) {
            Some(heading) if self.options.auto_jump_to_heading => {
                let link = format!("{}#{}", record.path, heading.value);
                self.host
                    .workspace
                    .open_link_text(&link, OpenOptions::new_tab(new_tab))
                    .await?;
            }
            _ => self.open(&record.path, new_tab).await?,
        }
        Ok(SelectOutcome::Close)
    }

    fn display_props(&self, result: &Self::Item, input: &str) -> DisplayProps {
        let record = &result.item;
        let heading = result
            .matched_key(KEY_HEADINGS)
            .filter(|_| self.options.search_headings);

        let label = if heading.is_some() || input.is_empty() {
            record.basename.clone()
        } else {
            self.display_name(result, input)
        };
        let label_matches = result
            .matched_key(KEY_BASENAME)
            .filter(|m| m.value == label)
            .map(|m| m.indices.clone())
            .unwrap_or_default();

        let detail = self
            .options
            .show_path
            .then(|| last_segment(parent_of(&record.path)).to_string())
            .filter(|folder| !folder.is_empty());
        let badge = if record.is_created {
            record.extension.clone().filter(|ext| ext != "md")
        } else {
            Some("new".to_string())
        };

        DisplayProps {
            label,
            label_matches,
            detail,
            badge,
            icon: None,
            excerpt: heading
                .map(|h| vec![TextSegment::highlighted(h.value.clone())])
                .unwrap_or_default(),
        }
    }

    fn component_key(&self) -> ComponentKey {
        ComponentKey::FileSuggestion
    }

    /// Offer to create the typed note unless the filter hides markdown
    fn on_no_suggestion(&self, input: &str) -> NoSuggestion<Self::Item> {
        let hides_markdown = self
            .index
            .borrow()
            .filter()
            .is_some_and(|f| f.excludes_markdown());
        if hides_markdown || input.trim().is_empty() {
            return NoSuggestion::Close;
        }
        NoSuggestion::Show(vec![SearchResult::synthetic(
            SearchRecord::create_placeholder(input.trim()),
        )])
    }

    fn key_bindings(&self) -> Vec<(KeyChord, ScopeAction)> {
        file_bindings()
    }

    fn hotkey_hints(&self) -> Vec<HotkeyHint> {
        file_hints()
    }
}
