//! Main search bar of the start page
//!
//! One suggester serves the search input for its whole life. Switching
//! between vault search, full-text search and the web swaps the strategy
//! inside that suggester, so input wiring and debounce state survive the
//! swap. File filters narrow the vault index instead of swapping anything.

use crate::config::HomeTabSettings;
use crate::fuzzy::SearchResult;
use crate::host::{EventBus, HostContext};
use crate::index::SearchFileIndex;
use crate::model::{FilterSpec, FilterType, LinkRecord, SearchRecord};
use crate::notice::Notifier;
use crate::strategy::{
    ComponentKey, DefaultStrategy, DelegatedOptions, DelegatedResult, DelegatedStrategy,
    DisplayProps, FileStrategyOptions, FullTextSearch, NoSuggestion, SelectOutcome,
    SuggesterStrategy, WebBackend, WebStrategy,
};
use crate::suggest::error::Result;
use crate::suggest::keymap::{HotkeyHint, KeyChord, ScopeAction, SelectMode};
use crate::suggest::{InputEvent, KeyOutcome, SuggesterOptions, SuggestionView, TextInputSuggester};
use async_trait::async_trait;
use crossterm::event::KeyEvent;
use std::cell::RefCell;
use std::rc::Rc;

/// Item of whichever strategy is active
#[derive(Debug, Clone, PartialEq)]
pub enum Suggestion {
    File(SearchResult<SearchRecord>),
    Delegated(DelegatedResult),
    Web(SearchResult<LinkRecord>),
}

/// Strategies the search bar switches between
pub enum SearchStrategy {
    Default(DefaultStrategy),
    Delegated(DelegatedStrategy),
    Web(WebStrategy),
}

impl SearchStrategy {
    #[must_use]
    pub const fn filter_type(&self) -> FilterType {
        match self {
            Self::Default(_) => FilterType::Default,
            Self::Delegated(_) => FilterType::DelegatedSearch,
            Self::Web(_) => FilterType::Web,
        }
    }
}

#[async_trait(?Send)]
impl SuggesterStrategy for SearchStrategy {
    type Item = Suggestion;

    async fn get_suggestions(&self, input: &str) -> Vec<Suggestion> {
        match self {
            Self::Default(s) => s
                .get_suggestions(input)
                .await
                .into_iter()
                .map(Suggestion::File)
                .collect(),
            Self::Delegated(s) => s
                .get_suggestions(input)
                .await
                .into_iter()
                .map(Suggestion::Delegated)
                .collect(),
            Self::Web(s) => s
                .get_suggestions(input)
                .await
                .into_iter()
                .map(Suggestion::Web)
                .collect(),
        }
    }

    async fn use_selected_item(
        &self,
        item: Suggestion,
        mode: SelectMode,
        input: &str,
    ) -> Result<SelectOutcome> {
        match (self, item) {
            (Self::Default(s), Suggestion::File(item)) => s.use_selected_item(item, mode, input).await,
            (Self::Delegated(s), Suggestion::Delegated(item)) => {
                s.use_selected_item(item, mode, input).await
            }
            (Self::Web(s), Suggestion::Web(item)) => s.use_selected_item(item, mode, input).await,
            _ => {
                tracing::debug!("Ignoring a suggestion left over from another strategy");
                Ok(SelectOutcome::Keep)
            }
        }
    }

    fn display_props(&self, item: &Suggestion, input: &str) -> DisplayProps {
        match (self, item) {
            (Self::Default(s), Suggestion::File(item)) => s.display_props(item, input),
            (Self::Delegated(s), Suggestion::Delegated(item)) => s.display_props(item, input),
            (Self::Web(s), Suggestion::Web(item)) => s.display_props(item, input),
            _ => DisplayProps::default(),
        }
    }

    fn component_key(&self) -> ComponentKey {
        match self {
            Self::Default(s) => s.component_key(),
            Self::Delegated(s) => s.component_key(),
            Self::Web(s) => s.component_key(),
        }
    }

    fn on_no_suggestion(&self, input: &str) -> NoSuggestion<Suggestion> {
        fn wrap<T>(outcome: NoSuggestion<T>, f: fn(T) -> Suggestion) -> NoSuggestion<Suggestion> {
            match outcome {
                NoSuggestion::Close => NoSuggestion::Close,
                NoSuggestion::Show(items) => NoSuggestion::Show(items.into_iter().map(f).collect()),
            }
        }
        match self {
            Self::Default(s) => wrap(s.on_no_suggestion(input), Suggestion::File),
            Self::Delegated(s) => wrap(s.on_no_suggestion(input), Suggestion::Delegated),
            Self::Web(s) => wrap(s.on_no_suggestion(input), Suggestion::Web),
        }
    }

    fn key_bindings(&self) -> Vec<(KeyChord, ScopeAction)> {
        match self {
            Self::Default(s) => s.key_bindings(),
            Self::Delegated(s) => s.key_bindings(),
            Self::Web(s) => s.key_bindings(),
        }
    }

    fn hotkey_hints(&self) -> Vec<HotkeyHint> {
        match self {
            Self::Default(s) => s.hotkey_hints(),
            Self::Delegated(s) => s.hotkey_hints(),
            Self::Web(s) => s.hotkey_hints(),
        }
    }
}

/// Optional search backends; `None` means the host lacks them
#[derive(Clone, Default)]
pub struct Backends {
    pub full_text: Option<Rc<dyn FullTextSearch>>,
    pub web: Option<Rc<dyn WebBackend>>,
}

/// Search input with switchable strategies
pub struct SearchBar {
    host: HostContext,
    index: Rc<RefCell<SearchFileIndex>>,
    backends: Backends,
    file_options: FileStrategyOptions,
    delegated_options: DelegatedOptions,
    max_results: usize,
    notifier: Rc<dyn Notifier>,
    active: RefCell<FilterSpec>,
    suggester: TextInputSuggester<SearchStrategy>,
}

impl SearchBar {
    /// Search bar over `index` with the settings' debounce
    ///
    /// Starts with full-text search when the `omnisearch` setting is on and
    /// a backend exists, with vault search otherwise.
    #[must_use]
    pub fn new(
        host: HostContext,
        index: Rc<RefCell<SearchFileIndex>>,
        settings: &HomeTabSettings,
        backends: Backends,
        view: Rc<dyn SuggestionView>,
        notifier: Rc<dyn Notifier>,
    ) -> Self {
        let options = settings.suggester_options();
        Self::with_options(host, index, settings, backends, view, notifier, options)
    }

    /// Same as [`Self::new`] with explicit suggester timing
    #[must_use]
    pub fn with_options(
        host: HostContext,
        index: Rc<RefCell<SearchFileIndex>>,
        settings: &HomeTabSettings,
        backends: Backends,
        view: Rc<dyn SuggestionView>,
        notifier: Rc<dyn Notifier>,
        options: SuggesterOptions,
    ) -> Self {
        let file_options = settings.file_strategy_options();
        let delegated_options = settings.delegated_options();

        let (strategy, active) = match &backends.full_text {
            Some(backend) if settings.omnisearch => (
                SearchStrategy::Delegated(DelegatedStrategy::new(
                    host.clone(),
                    Rc::clone(backend),
                    delegated_options,
                )),
                FilterSpec::new(FilterType::DelegatedSearch, None),
            ),
            _ => (
                SearchStrategy::Default(DefaultStrategy::new(
                    host.clone(),
                    Rc::clone(&index),
                    file_options,
                )),
                FilterSpec::default_search(),
            ),
        };

        Self {
            host,
            index,
            backends,
            file_options,
            delegated_options,
            max_results: settings.max_results,
            notifier,
            active: RefCell::new(active),
            suggester: TextInputSuggester::new(strategy, view, options),
        }
    }

    #[must_use]
    pub fn suggester(&self) -> &TextInputSuggester<SearchStrategy> {
        &self.suggester
    }

    /// Filter currently applied
    #[must_use]
    pub fn active_filter(&self) -> FilterSpec {
        self.active.borrow().clone()
    }

    #[must_use]
    pub fn index(&self) -> &Rc<RefCell<SearchFileIndex>> {
        &self.index
    }

    /// Switch to the strategy or file filter named by `key`
    ///
    /// Unknown keys and the active filter are ignored. A backend the host
    /// does not provide produces a notice and keeps the current strategy.
    /// Returns whether anything changed; a change clears the input.
    pub async fn update_active_strategy(&self, key: &str) -> bool {
        let Some(requested) = FilterSpec::from_key(key) else {
            tracing::debug!("Unknown filter key {key:?}");
            return false;
        };
        if same_filter(&self.active.borrow(), &requested) {
            return false;
        }

        let current = self.active.borrow().filter_type;
        let needs_swap = strategy_family(current) != strategy_family(requested.filter_type);
        if needs_swap {
            let Some(strategy) = self.build_strategy(&requested) else {
                return false;
            };
            if let Err(e) = self.suggester.set_strategy(strategy) {
                tracing::warn!("Could not switch search strategy: {e}");
                return false;
            }
        }

        let file_filter = Some(requested.clone()).filter(|f| f.filter_type.is_file_filter());
        self.index.borrow_mut().set_filter(file_filter);

        tracing::debug!("Search filter is now {:?}", requested);
        self.active.replace(requested);
        self.suggester.set_input("", true).await;
        true
    }

    /// Strategy for `filter`, or `None` with a notice when its backend is missing
    fn build_strategy(&self, filter: &FilterSpec) -> Option<SearchStrategy> {
        match filter.filter_type {
            FilterType::DelegatedSearch => match &self.backends.full_text {
                Some(backend) => Some(SearchStrategy::Delegated(DelegatedStrategy::new(
                    self.host.clone(),
                    Rc::clone(backend),
                    self.delegated_options,
                ))),
                None => {
                    self.notifier
                        .warning("Full-text search is not available, enable a search backend first");
                    None
                }
            },
            FilterType::Web => match &self.backends.web {
                Some(backend) => Some(SearchStrategy::Web(WebStrategy::new(
                    Rc::clone(backend),
                    self.max_results,
                ))),
                None => {
                    self.notifier
                        .warning("Web search is not available, enable the web viewer first");
                    None
                }
            },
            FilterType::Default | FilterType::FileExt | FilterType::FileType => {
                Some(SearchStrategy::Default(DefaultStrategy::new(
                    self.host.clone(),
                    Rc::clone(&self.index),
                    self.file_options,
                )))
            }
        }
    }

    /// Follow the input field until [`Self::destroy`]
    pub fn bind_input(&self, events: &EventBus<InputEvent>) {
        self.suggester.bind_input(events);
    }

    pub async fn handle_input(&self, value: &str) {
        self.suggester.update(value).await;
    }

    pub async fn handle_key(&self, key: &KeyEvent) -> KeyOutcome {
        self.suggester.handle_key(key).await
    }

    #[must_use]
    pub fn suggestions(&self) -> Vec<Suggestion> {
        self.suggester.source().suggestions()
    }

    #[must_use]
    pub fn display_props(&self, item: &Suggestion) -> DisplayProps {
        self.suggester.display_props(item)
    }

    #[must_use]
    pub fn hotkey_hints(&self) -> Vec<HotkeyHint> {
        self.suggester.hotkey_hints()
    }

    pub fn destroy(&self) {
        self.suggester.destroy();
    }
}

/// Filters that map to the same strategy, ignoring the option of non-file filters
fn same_filter(a: &FilterSpec, b: &FilterSpec) -> bool {
    a.filter_type == b.filter_type && (!a.filter_type.is_file_filter() || a.option == b.option)
}

fn strategy_family(filter_type: FilterType) -> FilterType {
    match filter_type {
        FilterType::FileExt | FilterType::FileType => FilterType::Default,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::IndexOptions;
    use crate::notice::{NoticeLevel, NoticeLog};
    use crate::strategy::file_search_options;
    use crate::suggest::NullView;
    use crate::testing::{StubFullText, StubWeb, TestHost, run_local};

    struct Fixture {
        bar: SearchBar,
        notices: Rc<NoticeLog>,
    }

    fn fixture(backends: Backends, settings: HomeTabSettings) -> Fixture {
        let host = TestHost::new().with_files(&[
            ("Plan.md", "# Goals\n"),
            ("logo.png", ""),
            ("photo.jpg", ""),
        ]);
        let index = Rc::new(RefCell::new(SearchFileIndex::new(
            host.context(),
            IndexOptions::default(),
            file_search_options(false, true),
        )));
        let notices = Rc::new(NoticeLog::new());
        let bar = SearchBar::new(
            host.context(),
            index,
            &settings,
            backends,
            Rc::new(NullView),
            notices.clone(),
        );
        Fixture { bar, notices }
    }

    fn full_backends() -> Backends {
        Backends {
            full_text: Some(Rc::new(StubFullText::default())),
            web: Some(Rc::new(StubWeb::default())),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_and_same_keys_are_ignored() {
        run_local(async {
            let f = fixture(full_backends(), HomeTabSettings::default());
            assert!(!f.bar.update_active_strategy("nope").await);
            assert!(!f.bar.update_active_strategy("default").await);
            assert_eq!(f.bar.active_filter().filter_type, FilterType::Default);
        })
        .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_backend_keeps_strategy() {
        run_local(async {
            let f = fixture(Backends::default(), HomeTabSettings::default());
            f.bar.handle_input("plan").await;

            assert!(!f.bar.update_active_strategy("web").await);
            assert!(!f.bar.update_active_strategy("omni").await);

            assert_eq!(f.bar.suggester().component_key(), ComponentKey::FileSuggestion);
            assert_eq!(f.bar.suggester().input(), "plan");
            assert_eq!(f.notices.count(), 2);
            assert_eq!(f.notices.latest().unwrap().0, NoticeLevel::Warning);
        })
        .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_swap_keeps_suggester_and_clears_input() {
        run_local(async {
            let f = fixture(full_backends(), HomeTabSettings::default());
            let before = f.bar.suggester().clone();
            f.bar.handle_input("plan").await;
            assert!(f.bar.suggester().is_open());

            assert!(f.bar.update_active_strategy("web").await);
            assert_eq!(before.component_key(), ComponentKey::WebSuggestion);
            assert_eq!(f.bar.suggester().input(), "");
            assert!(!f.bar.suggester().is_open());

            f.bar.handle_input("example.com").await;
            let first = f.bar.suggestions().remove(0);
            assert!(matches!(first, Suggestion::Web(_)));
        })
        .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_file_filter_narrows_index() {
        run_local(async {
            let f = fixture(full_backends(), HomeTabSettings::default());
            assert!(f.bar.update_active_strategy("image").await);
            assert_eq!(
                f.bar.index().borrow().filter().cloned(),
                Some(FilterSpec::from_key("image").unwrap())
            );

            f.bar.handle_input("o").await;
            let paths: Vec<String> = f
                .bar
                .suggestions()
                .into_iter()
                .filter_map(|s| match s {
                    Suggestion::File(r) => Some(r.item.path),
                    _ => None,
                })
                .collect();
            assert!(!paths.is_empty());
            assert!(paths.iter().all(|p| p != "Plan.md"));

            assert!(f.bar.update_active_strategy("png").await);
            assert!(f.bar.update_active_strategy("default").await);
            assert!(f.bar.index().borrow().filter().is_none());
        })
        .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_omnisearch_setting_starts_delegated() {
        run_local(async {
            let settings = HomeTabSettings {
                omnisearch: true,
                ..HomeTabSettings::default()
            };
            let f = fixture(full_backends(), settings.clone());
            assert_eq!(f.bar.active_filter().filter_type, FilterType::DelegatedSearch);

            let without = fixture(Backends::default(), settings);
            assert_eq!(without.bar.active_filter().filter_type, FilterType::Default);
        })
        .await;
    }
}
