//! Key scope of an open suggester
//!
//! Chords use the `modifier-key` format, e.g. `"mod-enter"` or
//! `"shift-mod-enter"`. `mod` is the platform's primary modifier and maps
//! to Control.

use super::error::{Result, SuggestError};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::Serialize;

/// How a selected item should be used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SelectMode {
    #[default]
    Default,
    NewTab,
    /// Create the typed note even when something matched
    Create,
    CreateNewTab,
}

impl SelectMode {
    #[must_use]
    pub const fn new_tab(self) -> bool {
        matches!(self, Self::NewTab | Self::CreateNewTab)
    }

    #[must_use]
    pub const fn create(self) -> bool {
        matches!(self, Self::Create | Self::CreateNewTab)
    }
}

/// What a bound key does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeAction {
    SelectPrev,
    SelectNext,
    Select(SelectMode),
    Close,
}

/// Key code plus modifiers, ignoring press/release state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyChord {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyChord {
    #[must_use]
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Parse a chord string like `"ctrl-t"` or `"shift-mod-enter"`
    ///
    /// # Errors
    /// Returns [`SuggestError::InvalidKey`] for unknown modifiers or keys.
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = || SuggestError::InvalidKey(s.to_string());
        let parts: Vec<&str> = s.split('-').collect();
        let key_part = parts.last().filter(|p| !p.is_empty()).ok_or_else(invalid)?;

        let mut modifiers = KeyModifiers::NONE;
        for part in &parts[..parts.len().saturating_sub(1)] {
            match part.to_lowercase().as_str() {
                "mod" | "ctrl" | "control" => modifiers |= KeyModifiers::CONTROL,
                "alt" | "option" => modifiers |= KeyModifiers::ALT,
                "shift" => modifiers |= KeyModifiers::SHIFT,
                _ => return Err(invalid()),
            }
        }

        let code = match key_part.to_lowercase().as_str() {
            "enter" => KeyCode::Enter,
            "esc" | "escape" => KeyCode::Esc,
            "tab" => KeyCode::Tab,
            "up" | "arrowup" => KeyCode::Up,
            "down" | "arrowdown" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pgup" | "pageup" => KeyCode::PageUp,
            "pgdn" | "pagedown" => KeyCode::PageDown,
            k if k.starts_with('f') && k.len() > 1 => {
                k[1..].parse().map(KeyCode::F).map_err(|_| invalid())?
            }
            k if k.chars().count() == 1 => KeyCode::Char(k.chars().next().ok_or_else(invalid)?),
            _ => return Err(invalid()),
        };

        Ok(Self::new(code, modifiers))
    }
}

impl From<KeyEvent> for KeyChord {
    fn from(key: KeyEvent) -> Self {
        Self::new(key.code, key.modifiers)
    }
}

impl std::fmt::Display for KeyChord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.modifiers.contains(KeyModifiers::SHIFT) {
            f.write_str("shift-")?;
        }
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            f.write_str("mod-")?;
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            f.write_str("alt-")?;
        }
        match self.code {
            KeyCode::Char(c) => write!(f, "{c}"),
            KeyCode::Enter => f.write_str("enter"),
            KeyCode::Esc => f.write_str("esc"),
            KeyCode::Tab => f.write_str("tab"),
            KeyCode::Up => f.write_str("up"),
            KeyCode::Down => f.write_str("down"),
            KeyCode::Left => f.write_str("left"),
            KeyCode::Right => f.write_str("right"),
            KeyCode::Home => f.write_str("home"),
            KeyCode::End => f.write_str("end"),
            KeyCode::PageUp => f.write_str("pgup"),
            KeyCode::PageDown => f.write_str("pgdn"),
            KeyCode::F(n) => write!(f, "f{n}"),
            other => write!(f, "{other:?}"),
        }
    }
}

/// Chord to action bindings; later bindings shadow earlier ones
#[derive(Debug, Clone, Default)]
pub struct KeyScope {
    bindings: Vec<(KeyChord, ScopeAction)>,
}

impl KeyScope {
    /// Arrow navigation, enter to select and escape to close
    #[must_use]
    pub fn base() -> Self {
        Self {
            bindings: vec![
                (KeyChord::new(KeyCode::Up, KeyModifiers::NONE), ScopeAction::SelectPrev),
                (KeyChord::new(KeyCode::Down, KeyModifiers::NONE), ScopeAction::SelectNext),
                (
                    KeyChord::new(KeyCode::Enter, KeyModifiers::NONE),
                    ScopeAction::Select(SelectMode::Default),
                ),
                (KeyChord::new(KeyCode::Esc, KeyModifiers::NONE), ScopeAction::Close),
            ],
        }
    }

    pub fn bind(&mut self, chord: KeyChord, action: ScopeAction) {
        self.bindings.push((chord, action));
    }

    /// Bind a chord given as a string
    ///
    /// # Errors
    /// Returns [`SuggestError::InvalidKey`] when the chord does not parse.
    pub fn bind_str(&mut self, chord: &str, action: ScopeAction) -> Result<()> {
        self.bind(KeyChord::parse(chord)?, action);
        Ok(())
    }

    /// Layer extra bindings on top of this scope
    #[must_use]
    pub fn layered(mut self, extra: impl IntoIterator<Item = (KeyChord, ScopeAction)>) -> Self {
        self.bindings.extend(extra);
        self
    }

    #[must_use]
    pub fn action_for(&self, key: &KeyEvent) -> Option<ScopeAction> {
        let chord = KeyChord::from(*key);
        self.bindings
            .iter()
            .rev()
            .find(|(bound, _)| *bound == chord)
            .map(|(_, action)| *action)
    }
}

/// `mod-enter` opens in a new tab
#[must_use]
pub fn new_tab_bindings() -> Vec<(KeyChord, ScopeAction)> {
    vec![(
        KeyChord::new(KeyCode::Enter, KeyModifiers::CONTROL),
        ScopeAction::Select(SelectMode::NewTab),
    )]
}

/// Chords for opening in a new tab and creating notes
#[must_use]
pub fn file_bindings() -> Vec<(KeyChord, ScopeAction)> {
    let mut bindings = new_tab_bindings();
    bindings.extend([
        (
            KeyChord::new(KeyCode::Enter, KeyModifiers::SHIFT),
            ScopeAction::Select(SelectMode::Create),
        ),
        (
            KeyChord::new(KeyCode::Enter, KeyModifiers::SHIFT | KeyModifiers::CONTROL),
            ScopeAction::Select(SelectMode::CreateNewTab),
        ),
    ]);
    bindings
}

/// Footer hint such as "↵ to open"
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HotkeyHint {
    pub keys: String,
    pub action: String,
}

impl HotkeyHint {
    #[must_use]
    pub fn new(keys: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            keys: keys.into(),
            action: action.into(),
        }
    }
}

/// Hints shown for every suggester
#[must_use]
pub fn base_hints() -> Vec<HotkeyHint> {
    vec![
        HotkeyHint::new("↑↓", "to navigate"),
        HotkeyHint::new("↵", "to open"),
        HotkeyHint::new("ctrl ↵", "to open in new tab"),
        HotkeyHint::new("esc", "to dismiss"),
    ]
}

/// Base hints plus the create chord, placed before dismiss
#[must_use]
pub fn file_hints() -> Vec<HotkeyHint> {
    let mut hints = base_hints();
    let at = hints.len().saturating_sub(1);
    hints.insert(at, HotkeyHint::new("shift ↵", "to create"));
    hints
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chords() {
        let chord = KeyChord::parse("mod-enter").unwrap();
        assert_eq!(chord, KeyChord::new(KeyCode::Enter, KeyModifiers::CONTROL));

        let chord = KeyChord::parse("shift-mod-enter").unwrap();
        assert_eq!(
            chord.modifiers,
            KeyModifiers::SHIFT | KeyModifiers::CONTROL
        );

        assert_eq!(KeyChord::parse("ctrl-t").unwrap().code, KeyCode::Char('t'));
        assert_eq!(KeyChord::parse("f2").unwrap().code, KeyCode::F(2));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            KeyChord::parse("hyper-enter"),
            Err(SuggestError::InvalidKey(_))
        ));
        assert!(KeyChord::parse("").is_err());
        assert!(KeyChord::parse("mod-").is_err());
        assert!(KeyChord::parse("nonsense").is_err());
    }

    #[test]
    fn test_display_roundtrip() {
        for s in ["mod-enter", "shift-mod-enter", "esc", "alt-x"] {
            assert_eq!(KeyChord::parse(s).unwrap().to_string(), s);
        }
    }

    #[test]
    fn test_base_scope() {
        let scope = KeyScope::base();
        let up = KeyEvent::new(KeyCode::Up, KeyModifiers::NONE);
        let esc = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
        let letter = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE);

        assert_eq!(scope.action_for(&up), Some(ScopeAction::SelectPrev));
        assert_eq!(scope.action_for(&esc), Some(ScopeAction::Close));
        assert_eq!(scope.action_for(&letter), None);
    }

    #[test]
    fn test_layered_bindings_do_not_replace_base() {
        let scope = KeyScope::base().layered(file_bindings());
        let enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        let mod_enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::CONTROL);

        assert_eq!(
            scope.action_for(&enter),
            Some(ScopeAction::Select(SelectMode::Default))
        );
        assert_eq!(
            scope.action_for(&mod_enter),
            Some(ScopeAction::Select(SelectMode::NewTab))
        );
    }

    #[test]
    fn test_later_binding_shadows() {
        let mut scope = KeyScope::base();
        scope.bind_str("esc", ScopeAction::SelectNext).unwrap();
        let esc = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(scope.action_for(&esc), Some(ScopeAction::SelectNext));
    }

    #[test]
    fn test_file_hints() {
        let hints = file_hints();
        assert_eq!(hints.len(), 5);
        assert_eq!(hints[3], HotkeyHint::new("shift ↵", "to create"));
        assert_eq!(hints[4].keys, "esc");
    }

    #[test]
    fn test_select_mode_flags() {
        assert!(SelectMode::CreateNewTab.new_tab());
        assert!(SelectMode::CreateNewTab.create());
        assert!(!SelectMode::Default.new_tab());
    }
}
