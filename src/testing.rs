//! Testing utilities for hometab
//!
//! Fixtures shared by unit tests: an in-memory host, a list-backed strategy
//! with configurable latency, and stub backends.
//!
//! Only available when compiled with `cfg(test)`.

use crate::host::{HostContext, MemoryVault, RecordingWorkspace};
use crate::model::LinkRecord;
use crate::strategy::{
    ComponentKey, DelegatedResult, DisplayProps, FullTextSearch, NoSuggestion, SelectOutcome,
    SuggesterStrategy, WebBackend,
};
use crate::suggest::keymap::{KeyChord, ScopeAction, SelectMode, file_bindings};
use crate::suggest::{Result, SuggestError};
use async_trait::async_trait;
use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

/// Run `future` inside a fresh `LocalSet`
pub async fn run_local<F: Future>(future: F) -> F::Output {
    tokio::task::LocalSet::new().run_until(future).await
}

/// In-memory vault plus recording workspace
pub struct TestHost {
    pub vault: Rc<MemoryVault>,
    pub workspace: Rc<RecordingWorkspace>,
}

impl TestHost {
    /// Empty vault whose new notes go to `inbox`
    #[must_use]
    pub fn new() -> Self {
        Self {
            vault: Rc::new(MemoryVault::new().with_new_file_parent("inbox")),
            workspace: Rc::new(RecordingWorkspace::new()),
        }
    }

    /// Add files given as `(path, content)` pairs
    #[must_use]
    pub fn with_files(self, files: &[(&str, &str)]) -> Self {
        for (path, content) in files {
            self.vault.add_file(path, content);
        }
        self
    }

    #[must_use]
    pub fn context(&self) -> HostContext {
        HostContext::new(
            self.vault.clone(),
            self.vault.clone(),
            self.workspace.clone(),
        )
    }
}

impl Default for TestHost {
    fn default() -> Self {
        Self::new()
    }
}

/// Strategy over a fixed list of strings
///
/// Matches by case-insensitive substring, records every fetch and selection,
/// and can delay individual inputs to simulate slow backends.
pub struct ListStrategy {
    items: Vec<String>,
    delays: HashMap<String, Duration>,
    placeholder: bool,
    outcome: SelectOutcome,
    fetches: RefCell<Vec<String>>,
    selections: RefCell<Vec<(String, SelectMode)>>,
}

impl ListStrategy {
    #[must_use]
    pub fn new(items: &[&str]) -> Self {
        Self {
            items: items.iter().map(ToString::to_string).collect(),
            delays: HashMap::new(),
            placeholder: false,
            outcome: SelectOutcome::Close,
            fetches: RefCell::new(Vec::new()),
            selections: RefCell::new(Vec::new()),
        }
    }

    /// Delay the fetch for exactly `input`
    #[must_use]
    pub fn with_delay(mut self, input: &str, delay: Duration) -> Self {
        self.delays.insert(input.to_string(), delay);
        self
    }

    /// Offer `create <input>` when nothing matches
    #[must_use]
    pub fn with_placeholder(mut self) -> Self {
        self.placeholder = true;
        self
    }

    #[must_use]
    pub fn with_outcome(mut self, outcome: SelectOutcome) -> Self {
        self.outcome = outcome;
        self
    }

    #[must_use]
    pub fn fetches(&self) -> Vec<String> {
        self.fetches.borrow().clone()
    }

    #[must_use]
    pub fn selections(&self) -> Vec<(String, SelectMode)> {
        self.selections.borrow().clone()
    }
}

#[async_trait(?Send)]
impl SuggesterStrategy for ListStrategy {
    type Item = String;

    async fn get_suggestions(&self, input: &str) -> Vec<String> {
        self.fetches.borrow_mut().push(input.to_string());
        if let Some(delay) = self.delays.get(input) {
            tokio::time::sleep(*delay).await;
        }
        if input.is_empty() {
            return Vec::new();
        }
        let needle = input.to_lowercase();
        self.items
            .iter()
            .filter(|item| item.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    async fn use_selected_item(
        &self,
        item: String,
        mode: SelectMode,
        _input: &str,
    ) -> Result<SelectOutcome> {
        self.selections.borrow_mut().push((item, mode));
        Ok(self.outcome.clone())
    }

    fn display_props(&self, item: &String, _input: &str) -> DisplayProps {
        DisplayProps {
            label: item.clone(),
            ..DisplayProps::default()
        }
    }

    fn component_key(&self) -> ComponentKey {
        ComponentKey::FileSuggestion
    }

    fn on_no_suggestion(&self, input: &str) -> NoSuggestion<String> {
        if self.placeholder && !input.is_empty() {
            NoSuggestion::Show(vec![format!("create {input}")])
        } else {
            NoSuggestion::Close
        }
    }

    fn key_bindings(&self) -> Vec<(KeyChord, ScopeAction)> {
        file_bindings()
    }
}

/// Full-text backend returning canned results, or failing
#[derive(Default)]
pub struct StubFullText {
    pub results: Vec<DelegatedResult>,
    pub fail: bool,
    pub queries: RefCell<Vec<String>>,
}

#[async_trait(?Send)]
impl FullTextSearch for StubFullText {
    async fn search(&self, query: &str) -> Result<Vec<DelegatedResult>> {
        self.queries.borrow_mut().push(query.to_string());
        if self.fail {
            return Err(SuggestError::BackendUnavailable("index not ready".to_string()));
        }
        Ok(self.results.clone())
    }
}

/// Web backend with fixed bookmarks and history
#[derive(Default)]
pub struct StubWeb {
    pub bookmarks: Vec<LinkRecord>,
    pub history: Vec<LinkRecord>,
    pub navigated: RefCell<Vec<String>>,
}

#[async_trait(?Send)]
impl WebBackend for StubWeb {
    fn search_engine_url(&self, query: &str) -> String {
        format!("https://duckduckgo.com/?q={}", query.replace(' ', "+"))
    }

    async fn bookmarks(&self) -> Vec<LinkRecord> {
        self.bookmarks.clone()
    }

    async fn history(&self) -> Vec<LinkRecord> {
        self.history.clone()
    }

    async fn navigate(&self, url: &str, _new_tab: bool) -> crate::host::Result<()> {
        self.navigated.borrow_mut().push(url.to_string());
        Ok(())
    }
}
