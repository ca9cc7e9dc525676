//! Suggestion list, key scope and the text-input suggester

pub mod error;
pub mod keymap;
pub mod source;
pub mod suggester;
pub mod view;

pub use error::{Result, SuggestError};
pub use keymap::{HotkeyHint, KeyChord, KeyScope, ScopeAction, SelectMode};
pub use source::{SourceChange, SuggestionSource};
pub use suggester::{
    CLOSE_DELAY, InputEvent, KeyOutcome, SuggesterOptions, SuggesterState, TextInputSuggester,
};
pub use view::{NullView, RecordingView, SuggestionView, ViewCall};
