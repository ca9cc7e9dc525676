//! Icon picker
//!
//! Icons come from a bundled table of ids and search tags, built once into
//! an immutable [`IconCatalog`].

use super::{ComponentKey, DisplayProps, SelectOutcome, SuggesterStrategy};
use crate::fuzzy::{FuzzySearch, KEY_NAME, KEY_TAGS, SearchKey, SearchOptions, SearchResult};
use crate::model::IconRecord;
use crate::suggest::error::Result;
use crate::suggest::keymap::SelectMode;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::LazyLock;

const MAX_RESULTS: usize = 100;
const ICON_PREFIX: &str = "lucide-";

/// Icon ids as the host registers them
const ICON_IDS: &[&str] = &[
    "lucide-activity",
    "lucide-alarm-clock",
    "lucide-archive",
    "lucide-book",
    "lucide-book-open",
    "lucide-bookmark",
    "lucide-calendar",
    "lucide-camera",
    "lucide-check",
    "lucide-clipboard",
    "lucide-clock",
    "lucide-cloud",
    "lucide-code",
    "lucide-coffee",
    "lucide-compass",
    "lucide-database",
    "lucide-download",
    "lucide-file",
    "lucide-file-text",
    "lucide-folder",
    "lucide-folder-open",
    "lucide-git-branch",
    "lucide-globe",
    "lucide-heart",
    "lucide-home",
    "lucide-image",
    "lucide-inbox",
    "lucide-key",
    "lucide-layers",
    "lucide-link",
    "lucide-list",
    "lucide-lock",
    "lucide-mail",
    "lucide-map",
    "lucide-music",
    "lucide-pencil",
    "lucide-search",
    "lucide-settings",
    "lucide-star",
    "lucide-sun",
    "lucide-tag",
    "lucide-terminal",
    "lucide-trash",
    "lucide-user",
    "lucide-video",
    "obsidian",
];

/// Search tags per icon name, without prefix
const ICON_TAGS: &[(&str, &[&str])] = &[
    ("activity", &["pulse", "health", "action", "motion"]),
    ("alarm-clock", &["morning", "wake", "timer"]),
    ("archive", &["box", "storage", "old"]),
    ("book", &["reading", "library", "knowledge"]),
    ("book-open", &["reading", "library", "study"]),
    ("bookmark", &["save", "favorite", "ribbon"]),
    ("calendar", &["date", "month", "event", "schedule"]),
    ("camera", &["photo", "picture", "lens"]),
    ("check", &["done", "tick", "complete"]),
    ("clipboard", &["copy", "paste", "board"]),
    ("clock", &["time", "watch", "hour"]),
    ("cloud", &["weather", "sync", "upload"]),
    ("code", &["source", "programming", "brackets"]),
    ("coffee", &["drink", "cup", "break", "morning"]),
    ("compass", &["navigation", "direction", "explore"]),
    ("database", &["storage", "data", "table"]),
    ("download", &["import", "save", "arrow"]),
    ("file", &["document", "page"]),
    ("file-text", &["document", "note", "page", "text"]),
    ("folder", &["directory", "collection"]),
    ("folder-open", &["directory", "browse"]),
    ("git-branch", &["version", "source", "fork"]),
    ("globe", &["world", "web", "internet", "earth"]),
    ("heart", &["love", "like", "favorite"]),
    ("home", &["house", "start", "living"]),
    ("image", &["photo", "picture", "media"]),
    ("inbox", &["mail", "capture", "receive"]),
    ("key", &["password", "login", "unlock"]),
    ("layers", &["stack", "overlap"]),
    ("link", &["chain", "url", "connect"]),
    ("list", &["items", "todo", "bullets"]),
    ("lock", &["secure", "private", "password"]),
    ("mail", &["email", "letter", "message"]),
    ("map", &["location", "travel", "navigation"]),
    ("music", &["audio", "song", "sound"]),
    ("pencil", &["edit", "write", "draw"]),
    ("search", &["find", "magnifier", "lookup"]),
    ("settings", &["gear", "preferences", "options"]),
    ("star", &["favorite", "rating", "bookmark"]),
    ("sun", &["weather", "day", "light", "bright"]),
    ("tag", &["label", "category", "price"]),
    ("terminal", &["console", "shell", "command"]),
    ("trash", &["delete", "remove", "garbage"]),
    ("user", &["person", "account", "profile"]),
    ("video", &["movie", "film", "camera"]),
];

static BUNDLED: LazyLock<IconCatalog> = LazyLock::new(|| IconCatalog::new(ICON_IDS, ICON_TAGS));

/// Icon names with their tags
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IconCatalog {
    icons: Vec<IconRecord>,
}

impl IconCatalog {
    /// One record per id; the `lucide-` prefix is dropped and ids without
    /// an entry in `tags` get none
    #[must_use]
    pub fn new(ids: &[&str], tags: &[(&str, &[&str])]) -> Self {
        let tags: HashMap<&str, &[&str]> = tags.iter().copied().collect();
        let icons = ids
            .iter()
            .map(|id| {
                let name = id.strip_prefix(ICON_PREFIX).unwrap_or(id);
                let icon_tags = tags
                    .get(name)
                    .map(|t| t.iter().map(ToString::to_string).collect())
                    .unwrap_or_default();
                IconRecord::new(name, icon_tags)
            })
            .collect();
        Self { icons }
    }

    /// The catalog shipped with the crate
    #[must_use]
    pub fn bundled() -> &'static Self {
        &BUNDLED
    }

    #[must_use]
    pub fn icons(&self) -> &[IconRecord] {
        &self.icons
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&IconRecord> {
        self.icons.iter().find(|icon| icon.name == name)
    }
}

/// Picks an icon and writes its name into the input
pub struct IconStrategy {
    search: FuzzySearch<IconRecord>,
}

impl IconStrategy {
    #[must_use]
    pub fn new(catalog: &IconCatalog) -> Self {
        let options = SearchOptions::default()
            .with_keys(vec![SearchKey::new(KEY_NAME, 0.95), SearchKey::new(KEY_TAGS, 0.05)]);
        Self {
            search: FuzzySearch::new(catalog.icons().to_vec(), options),
        }
    }
}

impl Default for IconStrategy {
    fn default() -> Self {
        Self::new(IconCatalog::bundled())
    }
}

#[async_trait(?Send)]
impl SuggesterStrategy for IconStrategy {
    type Item = SearchResult<IconRecord>;

    async fn get_suggestions(&self, input: &str) -> Vec<Self::Item> {
        self.search.raw_search(input, Some(MAX_RESULTS))
    }

    async fn use_selected_item(
        &self,
        result: Self::Item,
        _mode: SelectMode,
        _input: &str,
    ) -> Result<SelectOutcome> {
        Ok(SelectOutcome::SetInput(result.item.name))
    }

    fn display_props(&self, result: &Self::Item, _input: &str) -> DisplayProps {
        DisplayProps {
            label: result.item.name.clone(),
            label_matches: result
                .matched_key(KEY_NAME)
                .map(|m| m.indices.clone())
                .unwrap_or_default(),
            icon: Some(result.item.name.clone()),
            ..DisplayProps::default()
        }
    }

    fn component_key(&self) -> ComponentKey {
        ComponentKey::IconSuggestion
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_strips_prefix_and_attaches_tags() {
        let catalog = IconCatalog::bundled();
        let home = catalog.get("home").unwrap();
        assert!(home.tags.contains(&"house".to_string()));
        assert!(catalog.get("lucide-home").is_none());

        let untagged = catalog.get("obsidian").unwrap();
        assert!(untagged.tags.is_empty());
        assert_eq!(catalog.icons().len(), ICON_IDS.len());
    }

    #[tokio::test]
    async fn test_name_outranks_tags() {
        let strategy = IconStrategy::default();
        let results = strategy.get_suggestions("calendar").await;
        assert_eq!(results[0].item.name, "calendar");

        let by_tag = strategy.get_suggestions("garbage").await;
        assert_eq!(by_tag[0].item.name, "trash");
    }

    #[tokio::test]
    async fn test_select_sets_input() {
        let strategy = IconStrategy::default();
        let item = strategy.get_suggestions("globe").await.remove(0);
        let outcome = strategy
            .use_selected_item(item.clone(), SelectMode::Default, "globe")
            .await
            .unwrap();
        assert_eq!(outcome, SelectOutcome::SetInput("globe".to_string()));
        assert_eq!(strategy.display_props(&item, "globe").icon.as_deref(), Some("globe"));
    }
}
