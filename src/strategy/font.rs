//! Font picker

use super::{ComponentKey, DisplayProps, NoSuggestion, SelectOutcome, SuggesterStrategy};
use crate::fuzzy::{FuzzySearch, SearchOptions, SearchResult};
use crate::host::Result as HostResult;
use crate::suggest::error::Result;
use crate::suggest::keymap::SelectMode;
use async_trait::async_trait;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::rc::Rc;

const SCORE_THRESHOLD: f64 = 0.25;
const MAX_RESULTS: usize = 15;
const FONT_EXTENSIONS: [&str; 4] = ["ttf", "otf", "ttc", "woff2"];

/// Source of installed font names
#[async_trait(?Send)]
pub trait FontProvider {
    async fn fonts(&self) -> HostResult<Vec<String>>;
}

/// Fixed font list
#[derive(Debug, Clone, Default)]
pub struct StaticFonts(pub Vec<String>);

#[async_trait(?Send)]
impl FontProvider for StaticFonts {
    async fn fonts(&self) -> HostResult<Vec<String>> {
        Ok(self.0.clone())
    }
}

/// Font files found under the system and user font folders
#[derive(Debug, Clone)]
pub struct SystemFonts {
    dirs: Vec<PathBuf>,
}

impl SystemFonts {
    #[must_use]
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }
}

impl Default for SystemFonts {
    fn default() -> Self {
        let mut folders: Vec<PathBuf> =
            ["/usr/share/fonts", "/usr/local/share/fonts", "/Library/Fonts"]
                .into_iter()
                .map(PathBuf::from)
                .collect();
        folders.extend(dirs::font_dir());
        Self::new(folders)
    }
}

#[async_trait(?Send)]
impl FontProvider for SystemFonts {
    /// File stems of font files, deduplicated and sorted
    async fn fonts(&self) -> HostResult<Vec<String>> {
        let mut names = BTreeSet::new();
        for dir in self.dirs.iter().filter(|d| d.is_dir()) {
            let pattern = dir.join("**").join("*");
            let entries = glob::glob(&pattern.to_string_lossy())
                .map_err(|e| crate::host::HostError::Backend(e.to_string()))?;
            for path in entries.flatten() {
                let is_font = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| FONT_EXTENSIONS.contains(&e.to_lowercase().as_str()));
                if is_font && let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.insert(stem.to_string());
                }
            }
        }
        Ok(names.into_iter().collect())
    }
}

/// Picks a font family and writes it into the input
pub struct FontStrategy {
    provider: Rc<dyn FontProvider>,
    fonts: RefCell<Option<Rc<FuzzySearch<String>>>>,
}

impl FontStrategy {
    #[must_use]
    pub fn new(provider: Rc<dyn FontProvider>) -> Self {
        Self {
            provider,
            fonts: RefCell::new(None),
        }
    }

    /// Installed fonts, loaded once; a failing provider yields none
    async fn fonts(&self) -> Rc<FuzzySearch<String>> {
        if let Some(fonts) = self.fonts.borrow().as_ref() {
            return Rc::clone(fonts);
        }
        let names = self.provider.fonts().await.unwrap_or_else(|e| {
            tracing::warn!("Failed to get system fonts: {e}");
            Vec::new()
        });
        let fonts = Rc::new(FuzzySearch::new(names, SearchOptions::default()));
        self.fonts.replace(Some(Rc::clone(&fonts)));
        fonts
    }
}

fn unquote(name: &str) -> String {
    name.replace('"', "")
}

#[async_trait(?Send)]
impl SuggesterStrategy for FontStrategy {
    type Item = SearchResult<String>;

    async fn get_suggestions(&self, input: &str) -> Vec<Self::Item> {
        self.fonts()
            .await
            .filtered_search(input, SCORE_THRESHOLD, MAX_RESULTS)
    }

    async fn use_selected_item(
        &self,
        result: Self::Item,
        _mode: SelectMode,
        _input: &str,
    ) -> Result<SelectOutcome> {
        Ok(SelectOutcome::SetInput(unquote(&result.item)))
    }

    fn display_props(&self, result: &Self::Item, _input: &str) -> DisplayProps {
        DisplayProps {
            label: unquote(&result.item),
            label_matches: result
                .matches
                .first()
                .map(|m| m.indices.clone())
                .unwrap_or_default(),
            ..DisplayProps::default()
        }
    }

    fn component_key(&self) -> ComponentKey {
        ComponentKey::FontSuggestion
    }

    /// Blank input lists every font
    fn on_no_suggestion(&self, input: &str) -> NoSuggestion<Self::Item> {
        if !input.is_empty() {
            return NoSuggestion::Close;
        }
        match self.fonts.borrow().as_ref() {
            Some(fonts) => NoSuggestion::Show(
                fonts
                    .records()
                    .iter()
                    .cloned()
                    .map(SearchResult::synthetic)
                    .collect(),
            ),
            None => NoSuggestion::Close,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HostError;

    struct BrokenFonts;

    #[async_trait(?Send)]
    impl FontProvider for BrokenFonts {
        async fn fonts(&self) -> HostResult<Vec<String>> {
            Err(HostError::Backend("font-list unavailable".to_string()))
        }
    }

    fn fonts() -> FontStrategy {
        FontStrategy::new(Rc::new(StaticFonts(vec![
            "Fira Code".to_string(),
            "\"JetBrains Mono\"".to_string(),
            "Inter".to_string(),
        ])))
    }

    #[tokio::test]
    async fn test_blank_input_shows_all_fonts() {
        let strategy = fonts();
        assert!(strategy.get_suggestions("").await.is_empty());
        let NoSuggestion::Show(all) = strategy.on_no_suggestion("") else {
            panic!("expected every font");
        };
        assert_eq!(all.len(), 3);
        assert_eq!(strategy.on_no_suggestion("zzz"), NoSuggestion::Close);
    }

    #[tokio::test]
    async fn test_quotes_are_stripped() {
        let strategy = fonts();
        let item = strategy.get_suggestions("jetbrains").await.remove(0);
        assert_eq!(strategy.display_props(&item, "jetbrains").label, "JetBrains Mono");
        assert_eq!(
            strategy
                .use_selected_item(item, SelectMode::Default, "jetbrains")
                .await
                .unwrap(),
            SelectOutcome::SetInput("JetBrains Mono".to_string())
        );
    }

    #[tokio::test]
    async fn test_provider_failure_yields_empty() {
        let strategy = FontStrategy::new(Rc::new(BrokenFonts));
        assert!(strategy.get_suggestions("fira").await.is_empty());
        assert_eq!(strategy.on_no_suggestion(""), NoSuggestion::Show(Vec::new()));
    }

    #[tokio::test]
    async fn test_system_fonts_scan() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("truetype")).unwrap();
        std::fs::write(dir.path().join("truetype/Roboto.ttf"), b"").unwrap();
        std::fs::write(dir.path().join("Lato.OTF"), b"").unwrap();
        std::fs::write(dir.path().join("readme.txt"), b"").unwrap();

        let provider = SystemFonts::new(vec![dir.path().to_path_buf()]);
        assert_eq!(provider.fonts().await.unwrap(), vec!["Lato", "Roboto"]);
    }
}
