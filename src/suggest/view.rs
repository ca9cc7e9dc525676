//! Presentation hooks of a suggester popup
//!
//! Rendering is up to the host. The suggester only tells the view when to
//! mount, unmount and which row to bring into view; the rows themselves are
//! read from the [`super::SuggestionSource`].

use std::cell::RefCell;

pub trait SuggestionView {
    /// Show the popup
    fn mount(&self);

    /// Remove the popup after the closing transition
    fn unmount(&self);

    /// Make row `index` visible
    fn scroll_into_view(&self, index: usize);
}

/// View that renders nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NullView;

impl SuggestionView for NullView {
    fn mount(&self) {}

    fn unmount(&self) {}

    fn scroll_into_view(&self, _index: usize) {}
}

/// Calls a [`SuggestionView`] received
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewCall {
    Mount,
    Unmount,
    Scroll(usize),
}

/// View that records every call, for hosts that poll instead of render
#[derive(Debug, Default)]
pub struct RecordingView {
    calls: RefCell<Vec<ViewCall>>,
}

impl RecordingView {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn calls(&self) -> Vec<ViewCall> {
        self.calls.borrow().clone()
    }

    /// Whether the popup is currently mounted
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.calls
            .borrow()
            .iter()
            .rev()
            .find(|c| matches!(c, ViewCall::Mount | ViewCall::Unmount))
            .is_some_and(|c| *c == ViewCall::Mount)
    }

    #[must_use]
    pub fn count(&self, call: ViewCall) -> usize {
        self.calls.borrow().iter().filter(|c| **c == call).count()
    }
}

impl SuggestionView for RecordingView {
    fn mount(&self) {
        self.calls.borrow_mut().push(ViewCall::Mount);
    }

    fn unmount(&self) {
        self.calls.borrow_mut().push(ViewCall::Unmount);
    }

    fn scroll_into_view(&self, index: usize) {
        self.calls.borrow_mut().push(ViewCall::Scroll(index));
    }
}
