//! Ranked suggestion list with a wrapping selection cursor

use crate::host::{EventBus, Subscription};
use std::cell::{Cell, RefCell};

/// What changed in a [`SuggestionSource`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceChange {
    Suggestions,
    SelectedIndex,
}

/// Current suggestions and the selected index
///
/// The index is always in range when the list is non-empty. Observers run
/// after the state is updated; replacing the list notifies `Suggestions`
/// and then `SelectedIndex`.
pub struct SuggestionSource<T> {
    suggestions: RefCell<Vec<T>>,
    selected_index: Cell<usize>,
    changes: EventBus<SourceChange>,
}

impl<T: Clone> Default for SuggestionSource<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> SuggestionSource<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            suggestions: RefCell::new(Vec::new()),
            selected_index: Cell::new(0),
            changes: EventBus::new(),
        }
    }

    /// Replace the list and reset the selection to the first entry
    pub fn set_suggestions(&self, suggestions: Vec<T>) {
        *self.suggestions.borrow_mut() = suggestions;
        self.selected_index.set(0);
        self.changes.emit(&SourceChange::Suggestions);
        self.changes.emit(&SourceChange::SelectedIndex);
    }

    /// Select `index`, wrapping past either end
    pub fn set_selected_index(&self, index: isize) {
        let len = self.len();
        let wrapped = match usize::try_from(index) {
            Err(_) => len.saturating_sub(1),
            Ok(i) if i >= len => 0,
            Ok(i) => i,
        };
        self.selected_index.set(wrapped);
        self.changes.emit(&SourceChange::SelectedIndex);
    }

    pub fn select_next(&self) {
        self.set_selected_index(self.offset_index(1));
    }

    pub fn select_prev(&self) {
        self.set_selected_index(self.offset_index(-1));
    }

    pub fn clear(&self) {
        self.set_suggestions(Vec::new());
    }

    #[must_use]
    pub fn selected_index(&self) -> usize {
        self.selected_index.get()
    }

    #[must_use]
    pub fn selected(&self) -> Option<T> {
        self.suggestion(self.selected_index())
    }

    #[must_use]
    pub fn suggestion(&self, index: usize) -> Option<T> {
        self.suggestions.borrow().get(index).cloned()
    }

    #[must_use]
    pub fn suggestions(&self) -> Vec<T> {
        self.suggestions.borrow().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.suggestions.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.suggestions.borrow().is_empty()
    }

    /// Observe list and selection changes
    #[must_use = "dropping the subscription detaches the observer"]
    pub fn subscribe(&self, observer: impl Fn(&SourceChange) + 'static) -> Subscription {
        self.changes.subscribe(observer)
    }

    fn offset_index(&self, delta: isize) -> isize {
        isize::try_from(self.selected_index()).map_or(0, |i| i + delta)
    }
}
