//! Text-input suggester state machine
//!
//! Binds an input field to a [`SuggestionSource`] and a strategy:
//!
//! ```text
//!   Closed --fetch non-empty--> Open --close()--> Closing --200ms--> Closed
//!                                 ^                  |
//!                                 +-----open()-------+
//! ```
//!
//! Input is debounced and every fetch carries a sequence number; a result
//! is applied only if no newer request was issued and the live input still
//! equals the input it was fetched for. Closing and destroying invalidate
//! in-flight fetches.
//!
//! The closing timer runs on [`tokio::task::spawn_local`], so the suggester
//! must be driven from inside a [`tokio::task::LocalSet`].

use super::error::{Result, SuggestError};
use super::keymap::{HotkeyHint, KeyScope, ScopeAction, SelectMode};
use super::source::SuggestionSource;
use super::view::SuggestionView;
use crate::host::{EventBus, Subscription};
use crate::strategy::{ComponentKey, DisplayProps, NoSuggestion, SelectOutcome, SuggesterStrategy};
use crossterm::event::KeyEvent;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Delay between `close()` and unmounting the popup
pub const CLOSE_DELAY: Duration = Duration::from_millis(200);

/// Lifecycle state of the popup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggesterState {
    Closed,
    Open,
    /// Unmount scheduled but still abortable
    Closing,
}

/// Whether the suggester consumed a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Handled,
    /// Let the host apply its own shortcuts
    NotHandled,
}

/// Events of the bound input field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Changed(String),
    Blur,
}

/// Timing of a suggester
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuggesterOptions {
    /// Quiet period before a fetch
    pub debounce: Duration,
    pub close_delay: Duration,
}

impl Default for SuggesterOptions {
    fn default() -> Self {
        Self {
            debounce: Duration::ZERO,
            close_delay: CLOSE_DELAY,
        }
    }
}

impl SuggesterOptions {
    #[must_use]
    pub const fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }
}

struct Inner<S: SuggesterStrategy> {
    strategy: RefCell<Rc<S>>,
    source: Rc<SuggestionSource<S::Item>>,
    view: Rc<dyn SuggestionView>,
    options: SuggesterOptions,
    state: Cell<SuggesterState>,
    input: RefCell<String>,
    last_handled: RefCell<Option<String>>,
    debounce_generation: Cell<u64>,
    request_seq: Cell<u64>,
    close_timer: RefCell<Option<JoinHandle<()>>>,
    destroyed: Cell<bool>,
    subscriptions: RefCell<Vec<Subscription>>,
}

impl<S: SuggesterStrategy> Inner<S> {
    fn next_request(&self) -> u64 {
        let seq = self.request_seq.get() + 1;
        self.request_seq.set(seq);
        seq
    }

    fn finish_close(&self) {
        if self.state.get() == SuggesterState::Closing {
            self.view.unmount();
            self.state.set(SuggesterState::Closed);
            self.close_timer.borrow_mut().take();
            tracing::debug!("Suggester closed");
        }
    }
}

/// Suggestion popup bound to one input field
///
/// Cloning yields another handle to the same suggester.
pub struct TextInputSuggester<S: SuggesterStrategy> {
    inner: Rc<Inner<S>>,
}

impl<S: SuggesterStrategy> Clone for TextInputSuggester<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S: SuggesterStrategy + 'static> TextInputSuggester<S> {
    #[must_use]
    pub fn new(strategy: S, view: Rc<dyn SuggestionView>, options: SuggesterOptions) -> Self {
        Self {
            inner: Rc::new(Inner {
                strategy: RefCell::new(Rc::new(strategy)),
                source: Rc::new(SuggestionSource::new()),
                view,
                options,
                state: Cell::new(SuggesterState::Closed),
                input: RefCell::new(String::new()),
                last_handled: RefCell::new(None),
                debounce_generation: Cell::new(0),
                request_seq: Cell::new(0),
                close_timer: RefCell::new(None),
                destroyed: Cell::new(false),
                subscriptions: RefCell::new(Vec::new()),
            }),
        }
    }

    #[must_use]
    pub fn source(&self) -> Rc<SuggestionSource<S::Item>> {
        Rc::clone(&self.inner.source)
    }

    #[must_use]
    pub fn state(&self) -> SuggesterState {
        self.inner.state.get()
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state() == SuggesterState::Open
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.inner.destroyed.get()
    }

    /// Live value of the input field
    #[must_use]
    pub fn input(&self) -> String {
        self.inner.input.borrow().clone()
    }

    #[must_use]
    pub fn strategy(&self) -> Rc<S> {
        self.inner.strategy.borrow().clone()
    }

    /// Replace the strategy, keeping the input wiring and key scope
    ///
    /// # Errors
    /// Returns [`SuggestError::Destroyed`] after [`Self::destroy`].
    pub fn set_strategy(&self, strategy: S) -> Result<()> {
        if self.is_destroyed() {
            return Err(SuggestError::Destroyed);
        }
        *self.inner.strategy.borrow_mut() = Rc::new(strategy);
        self.inner.last_handled.replace(None);
        self.inner.next_request();
        Ok(())
    }

    /// Debounced fetch for a new input value
    pub async fn update(&self, value: &str) {
        let inner = &self.inner;
        if inner.destroyed.get() {
            return;
        }
        inner.input.replace(value.to_string());

        let generation = inner.debounce_generation.get() + 1;
        inner.debounce_generation.set(generation);
        if !inner.options.debounce.is_zero() {
            tokio::time::sleep(inner.options.debounce).await;
            if inner.debounce_generation.get() != generation || inner.destroyed.get() {
                return;
            }
        }

        if inner.last_handled.borrow().as_deref() == Some(value) {
            return;
        }
        inner.last_handled.replace(Some(value.to_string()));

        let seq = inner.next_request();
        let strategy = self.strategy();
        let suggestions = strategy.get_suggestions(value).await;

        if inner.destroyed.get()
            || inner.request_seq.get() != seq
            || inner.input.borrow().as_str() != value
        {
            tracing::debug!("Discarding stale suggestions for {value:?}");
            return;
        }
        self.apply(value, suggestions);
    }

    /// Spawn [`Self::update`] on the local task set
    pub fn handle_input(&self, value: impl Into<String>) -> JoinHandle<()> {
        let this = self.clone();
        let value = value.into();
        tokio::task::spawn_local(async move { this.update(&value).await })
    }

    /// Write `value` into the input, fetching suggestions when `trigger` is set
    pub async fn set_input(&self, value: &str, trigger: bool) {
        if self.is_destroyed() {
            return;
        }
        if trigger {
            self.update(value).await;
        } else {
            self.inner.input.replace(value.to_string());
        }
    }

    /// Fetch again for the current input
    pub async fn focus(&self) {
        let value = self.input();
        self.update(&value).await;
    }

    pub fn blur(&self) {
        self.close();
    }

    fn apply(&self, value: &str, suggestions: Vec<S::Item>) {
        let suggestions = if suggestions.is_empty() {
            match self.strategy().on_no_suggestion(value) {
                NoSuggestion::Show(items) if !items.is_empty() => items,
                _ => {
                    self.close();
                    return;
                }
            }
        } else {
            suggestions
        };

        tracing::debug!("{} suggestions for {value:?}", suggestions.len());
        self.inner.source.set_suggestions(suggestions);
        self.open();
    }

    /// Show the popup, reusing it when an unmount is still pending
    pub fn open(&self) {
        let inner = &self.inner;
        if inner.destroyed.get() {
            return;
        }
        match inner.state.get() {
            SuggesterState::Open => {}
            SuggesterState::Closing => {
                if let Some(timer) = inner.close_timer.borrow_mut().take() {
                    timer.abort();
                }
                inner.state.set(SuggesterState::Open);
                tracing::debug!("Suggester reopened before unmount");
            }
            SuggesterState::Closed => {
                inner.view.mount();
                inner.state.set(SuggesterState::Open);
                tracing::debug!("Suggester opened");
            }
        }
    }

    /// Clear suggestions and schedule the unmount
    pub fn close(&self) {
        let inner = &self.inner;
        inner.next_request();
        inner.last_handled.replace(None);
        inner.source.clear();

        if inner.state.get() != SuggesterState::Open {
            return;
        }
        inner.state.set(SuggesterState::Closing);

        let weak = Rc::downgrade(&self.inner);
        let delay = inner.options.close_delay;
        let timer = tokio::task::spawn_local(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = weak.upgrade() {
                inner.finish_close();
            }
        });
        inner.close_timer.replace(Some(timer));
    }

    /// Close immediately and detach every listener; later calls are ignored
    pub fn destroy(&self) {
        let inner = &self.inner;
        if inner.destroyed.get() {
            return;
        }
        self.close();
        if let Some(timer) = inner.close_timer.borrow_mut().take() {
            timer.abort();
        }
        if inner.state.get() != SuggesterState::Closed {
            inner.view.unmount();
            inner.state.set(SuggesterState::Closed);
        }
        inner.destroyed.set(true);
        inner.subscriptions.borrow_mut().clear();
        tracing::debug!("Suggester destroyed");
    }

    /// Follow an input field's events until destroyed
    pub fn bind_input(&self, events: &EventBus<InputEvent>) {
        let weak = Rc::downgrade(&self.inner);
        let subscription = events.subscribe(move |event| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let this = Self { inner };
            match event {
                InputEvent::Changed(value) => drop(this.handle_input(value.clone())),
                InputEvent::Blur => this.blur(),
            }
        });
        self.own(subscription);
    }

    /// Keep a subscription alive until destroyed
    pub fn own(&self, subscription: Subscription) {
        if self.is_destroyed() {
            return;
        }
        self.inner.subscriptions.borrow_mut().push(subscription);
    }

    /// Key scope of the active strategy
    #[must_use]
    pub fn key_scope(&self) -> KeyScope {
        KeyScope::base().layered(self.strategy().key_bindings())
    }

    /// Handle a key while open
    pub async fn handle_key(&self, key: &KeyEvent) -> KeyOutcome {
        if self.is_destroyed() || !self.is_open() {
            return KeyOutcome::NotHandled;
        }
        let Some(action) = self.key_scope().action_for(key) else {
            return KeyOutcome::NotHandled;
        };

        let source = &self.inner.source;
        match action {
            ScopeAction::SelectPrev => {
                source.select_prev();
                self.inner.view.scroll_into_view(source.selected_index());
            }
            ScopeAction::SelectNext => {
                source.select_next();
                self.inner.view.scroll_into_view(source.selected_index());
            }
            ScopeAction::Close => self.close(),
            ScopeAction::Select(mode) => self.use_selected(mode).await,
        }
        KeyOutcome::Handled
    }

    /// Use the selected item; failures are logged
    pub async fn use_selected(&self, mode: SelectMode) {
        let Some(item) = self.inner.source.selected() else {
            return;
        };
        let input = self.input();
        let strategy = self.strategy();

        match strategy.use_selected_item(item, mode, &input).await {
            Ok(SelectOutcome::Close) => self.close(),
            Ok(SelectOutcome::SetInput(value)) => self.set_input(&value, true).await,
            Ok(SelectOutcome::Keep) => {}
            Err(e) => tracing::warn!("Could not use selected item: {e}"),
        }
    }

    #[must_use]
    pub fn display_props(&self, item: &S::Item) -> DisplayProps {
        self.strategy().display_props(item, &self.input())
    }

    #[must_use]
    pub fn component_key(&self) -> ComponentKey {
        self.strategy().component_key()
    }

    #[must_use]
    pub fn hotkey_hints(&self) -> Vec<HotkeyHint> {
        self.strategy().hotkey_hints()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suggest::view::{RecordingView, ViewCall};
    use crate::testing::{ListStrategy, run_local};
    use crossterm::event::{KeyCode, KeyModifiers};

    fn setup(strategy: ListStrategy) -> (TextInputSuggester<ListStrategy>, Rc<RecordingView>) {
        let view = Rc::new(RecordingView::new());
        let suggester = TextInputSuggester::new(strategy, view.clone(), SuggesterOptions::default());
        (suggester, view)
    }

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_opens_with_results() {
        run_local(async {
            let (suggester, view) = setup(ListStrategy::new(&["alpha", "beta", "alpine"]));
            suggester.update("al").await;

            assert_eq!(suggester.state(), SuggesterState::Open);
            assert_eq!(suggester.source().suggestions(), vec!["alpha", "alpine"]);
            assert_eq!(suggester.source().selected_index(), 0);
            assert!(view.is_mounted());
        })
        .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_result_closes() {
        run_local(async {
            let (suggester, view) = setup(ListStrategy::new(&["alpha"]));
            suggester.update("al").await;
            suggester.update("zz").await;

            assert_eq!(suggester.state(), SuggesterState::Closing);
            assert!(suggester.source().is_empty());
            tokio::time::sleep(CLOSE_DELAY * 2).await;
            assert_eq!(suggester.state(), SuggesterState::Closed);
            assert!(!view.is_mounted());
        })
        .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_suggestion_placeholder() {
        run_local(async {
            let (suggester, _view) = setup(ListStrategy::new(&["alpha"]).with_placeholder());
            suggester.update("zz").await;

            assert!(suggester.is_open());
            assert_eq!(suggester.source().suggestions(), vec!["create zz"]);
        })
        .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_twice_schedules_one_unmount() {
        run_local(async {
            let (suggester, view) = setup(ListStrategy::new(&["alpha"]));
            suggester.update("a").await;
            suggester.close();
            suggester.close();
            tokio::time::sleep(CLOSE_DELAY * 3).await;

            assert_eq!(view.count(ViewCall::Unmount), 1);
            assert_eq!(suggester.state(), SuggesterState::Closed);
        })
        .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_reopen_while_closing_reuses_popup() {
        run_local(async {
            let (suggester, view) = setup(ListStrategy::new(&["alpha", "beta"]));
            suggester.update("a").await;
            suggester.close();
            tokio::time::sleep(CLOSE_DELAY / 2).await;
            suggester.update("b").await;
            tokio::time::sleep(CLOSE_DELAY * 2).await;

            assert!(suggester.is_open());
            assert_eq!(view.count(ViewCall::Mount), 1);
            assert_eq!(view.count(ViewCall::Unmount), 0);
        })
        .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_stale_fetch_is_discarded() {
        run_local(async {
            let strategy = ListStrategy::new(&["apple", "abacus", "banana"])
                .with_delay("a", Duration::from_millis(100));
            let (suggester, _view) = setup(strategy);

            tokio::join!(suggester.update("a"), async {
                tokio::task::yield_now().await;
                suggester.update("ab").await;
            });

            assert_eq!(suggester.source().suggestions(), vec!["abacus"]);
            assert_eq!(suggester.input(), "ab");
        })
        .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_discards_in_flight_fetch() {
        run_local(async {
            let strategy = ListStrategy::new(&["apple", "abacus"])
                .with_delay("a", Duration::from_millis(100));
            let (suggester, view) = setup(strategy);

            let pending = suggester.handle_input("a");
            tokio::time::sleep(Duration::from_millis(10)).await;
            assert_eq!(suggester.strategy().fetches(), vec!["a"]);
            suggester.close();
            pending.await.unwrap();

            assert!(suggester.source().is_empty());
            assert_ne!(suggester.state(), SuggesterState::Open);
            assert_eq!(view.count(ViewCall::Mount), 0);
        })
        .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_destroy_discards_in_flight_fetch() {
        run_local(async {
            let strategy = ListStrategy::new(&["apple", "abacus"])
                .with_delay("a", Duration::from_millis(100));
            let (suggester, view) = setup(strategy);

            let pending = suggester.handle_input("a");
            tokio::time::sleep(Duration::from_millis(10)).await;
            suggester.destroy();
            pending.await.unwrap();

            assert!(suggester.source().is_empty());
            assert_eq!(suggester.state(), SuggesterState::Closed);
            assert_eq!(view.count(ViewCall::Mount), 0);
        })
        .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_collapses_keystrokes() {
        run_local(async {
            let view = Rc::new(RecordingView::new());
            let suggester = TextInputSuggester::new(
                ListStrategy::new(&["abc"]),
                view,
                SuggesterOptions::default().with_debounce(Duration::from_millis(50)),
            );

            tokio::join!(suggester.update("a"), suggester.update("ab"), suggester.update("abc"));

            assert_eq!(suggester.strategy().fetches(), vec!["abc"]);
            assert!(suggester.is_open());
        })
        .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_value_is_not_refetched() {
        run_local(async {
            let (suggester, _view) = setup(ListStrategy::new(&["abc"]));
            suggester.update("a").await;
            suggester.update("a").await;
            assert_eq!(suggester.strategy().fetches().len(), 1);

            suggester.close();
            suggester.update("a").await;
            assert_eq!(suggester.strategy().fetches().len(), 2);
        })
        .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_arrow_keys_wrap_and_scroll() {
        run_local(async {
            let (suggester, view) = setup(ListStrategy::new(&["a1", "a2", "a3"]));
            suggester.update("a").await;

            let up = key(KeyCode::Up, KeyModifiers::NONE);
            assert_eq!(suggester.handle_key(&up).await, KeyOutcome::Handled);
            assert_eq!(suggester.source().selected_index(), 2);
            assert!(view.calls().contains(&ViewCall::Scroll(2)));

            let down = key(KeyCode::Down, KeyModifiers::NONE);
            suggester.handle_key(&down).await;
            assert_eq!(suggester.source().selected_index(), 0);
        })
        .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_enter_modes() {
        run_local(async {
            let (suggester, _view) = setup(ListStrategy::new(&["a1", "a2"]));
            suggester.update("a").await;
            suggester
                .handle_key(&key(KeyCode::Down, KeyModifiers::NONE))
                .await;
            suggester
                .handle_key(&key(KeyCode::Enter, KeyModifiers::CONTROL))
                .await;

            assert_eq!(
                suggester.strategy().selections(),
                vec![("a2".to_string(), SelectMode::NewTab)]
            );
            assert_eq!(suggester.state(), SuggesterState::Closing);
        })
        .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_unhandled_keys() {
        run_local(async {
            let (suggester, _view) = setup(ListStrategy::new(&["a1"]));
            let enter = key(KeyCode::Enter, KeyModifiers::NONE);
            assert_eq!(suggester.handle_key(&enter).await, KeyOutcome::NotHandled);

            suggester.update("a").await;
            let letter = key(KeyCode::Char('x'), KeyModifiers::CONTROL);
            assert_eq!(suggester.handle_key(&letter).await, KeyOutcome::NotHandled);

            let esc = key(KeyCode::Esc, KeyModifiers::NONE);
            assert_eq!(suggester.handle_key(&esc).await, KeyOutcome::Handled);
            assert_eq!(suggester.state(), SuggesterState::Closing);
        })
        .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_outcome_sets_input() {
        run_local(async {
            let strategy = ListStrategy::new(&["alpha", "beta"])
                .with_outcome(SelectOutcome::SetInput("beta".to_string()));
            let (suggester, _view) = setup(strategy);
            suggester.update("al").await;
            suggester.use_selected(SelectMode::Default).await;

            assert_eq!(suggester.input(), "beta");
            assert_eq!(suggester.source().suggestions(), vec!["beta"]);
        })
        .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_destroy_detaches_and_ignores() {
        run_local(async {
            let (suggester, view) = setup(ListStrategy::new(&["alpha"]));
            let input: EventBus<InputEvent> = EventBus::new();
            suggester.bind_input(&input);
            assert_eq!(input.listener_count(), 1);

            suggester.update("a").await;
            suggester.destroy();

            assert_eq!(input.listener_count(), 0);
            assert_eq!(suggester.state(), SuggesterState::Closed);
            assert!(!view.is_mounted());

            suggester.update("al").await;
            assert_eq!(suggester.state(), SuggesterState::Closed);
            assert!(matches!(
                suggester.set_strategy(ListStrategy::new(&[])),
                Err(SuggestError::Destroyed)
            ));
        })
        .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_bound_input_events() {
        run_local(async {
            let (suggester, _view) = setup(ListStrategy::new(&["alpha"]));
            let input: EventBus<InputEvent> = EventBus::new();
            suggester.bind_input(&input);

            input.emit(&InputEvent::Changed("al".to_string()));
            tokio::time::sleep(Duration::from_millis(1)).await;
            assert!(suggester.is_open());

            input.emit(&InputEvent::Blur);
            assert_eq!(suggester.state(), SuggesterState::Closing);
        })
        .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_strategy_swap_keeps_wiring() {
        run_local(async {
            let (suggester, _view) = setup(ListStrategy::new(&["alpha"]));
            let input: EventBus<InputEvent> = EventBus::new();
            suggester.bind_input(&input);

            suggester.set_strategy(ListStrategy::new(&["omega"])).unwrap();
            input.emit(&InputEvent::Changed("om".to_string()));
            tokio::time::sleep(Duration::from_millis(1)).await;

            assert_eq!(suggester.source().suggestions(), vec!["omega"]);
            assert_eq!(suggester.component_key(), ComponentKey::FileSuggestion);
        })
        .await;
    }
}
