//! Suggester strategies
//!
//! A strategy decides where suggestions come from, how an item is displayed
//! and what selecting it does. The [`crate::suggest::TextInputSuggester`]
//! owns the lifecycle and asks the active strategy for everything else.

pub mod default;
pub mod delegated;
pub mod font;
pub mod icon;
pub mod image;
pub mod web;

pub use default::{DefaultStrategy, FileStrategyOptions, file_search_options};
pub use delegated::{
    DelegatedOptions, DelegatedResult, DelegatedStrategy, FullTextSearch, highlight_excerpt,
};
pub use font::{FontProvider, FontStrategy, StaticFonts, SystemFonts};
pub use icon::{IconCatalog, IconStrategy};
pub use image::ImageStrategy;
pub use web::{WebBackend, WebStrategy, resolve_url};

use crate::suggest::error::Result;
use crate::suggest::keymap::{HotkeyHint, KeyChord, ScopeAction, SelectMode, base_hints};
use async_trait::async_trait;
use serde::Serialize;

/// Which presentation component renders an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComponentKey {
    FileSuggestion,
    DelegatedSuggestion,
    WebSuggestion,
    IconSuggestion,
    FontSuggestion,
    ImageSuggestion,
}

/// Piece of text with an optional highlight
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextSegment {
    pub text: String,
    pub highlighted: bool,
}

impl TextSegment {
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            highlighted: false,
        }
    }

    #[must_use]
    pub fn highlighted(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            highlighted: true,
        }
    }
}

/// Presentation-agnostic fields of one suggestion
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DisplayProps {
    /// Main line
    pub label: String,
    /// Character positions of `label` that matched the query
    pub label_matches: Vec<u32>,
    /// Secondary line such as a path or url
    pub detail: Option<String>,
    /// Short tag such as an extension or link type
    pub badge: Option<String>,
    pub icon: Option<String>,
    /// Excerpt with matched words highlighted
    pub excerpt: Vec<TextSegment>,
}

/// What the suggester does when a fetch came back empty
#[derive(Debug, Clone, PartialEq)]
pub enum NoSuggestion<T> {
    Close,
    /// Show these items instead
    Show(Vec<T>),
}

/// What the suggester does after an item was used
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOutcome {
    Close,
    /// Put this value into the input and refresh suggestions
    SetInput(String),
    Keep,
}

/// Behaviour plugged into a [`crate::suggest::TextInputSuggester`]
#[async_trait(?Send)]
pub trait SuggesterStrategy {
    type Item: Clone + 'static;

    /// Candidates for `input`; failures are logged and yield an empty list
    async fn get_suggestions(&self, input: &str) -> Vec<Self::Item>;

    /// Act on a chosen item
    async fn use_selected_item(
        &self,
        item: Self::Item,
        mode: SelectMode,
        input: &str,
    ) -> Result<SelectOutcome>;

    fn display_props(&self, item: &Self::Item, input: &str) -> DisplayProps;

    fn component_key(&self) -> ComponentKey;

    fn on_no_suggestion(&self, _input: &str) -> NoSuggestion<Self::Item> {
        NoSuggestion::Close
    }

    /// Chords layered on top of the base key scope
    fn key_bindings(&self) -> Vec<(KeyChord, ScopeAction)> {
        Vec::new()
    }

    fn hotkey_hints(&self) -> Vec<HotkeyHint> {
        base_hints()
    }
}
