//! Configuration module for hometab
//!
//! Settings live in `settings.toml` under the user's config directory and
//! are loaded with the `config` crate. Missing keys fall back to their
//! defaults, so older files keep working as settings are added.

mod store;
mod validate;

pub use store::{SAVE_DELAY, SettingsStore};
pub use validate::{PatternValidator, ValidationError};

use crate::fuzzy::SearchOptions;
use crate::index::IndexOptions;
use crate::strategy::{DelegatedOptions, FileStrategyOptions, file_search_options};
use crate::suggest::SuggesterOptions;
use config::{Config, ConfigError, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Persisted recent file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentFileEntry {
    pub filepath: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

/// Persisted bookmarked file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkEntry {
    pub filepath: String,
}

/// Application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HomeTabSettings {
    /// Open the matched heading instead of the top of the file
    pub auto_jump_to_heading: bool,
    pub max_results: usize,
    pub show_recent_files: bool,
    pub show_bookmarked_files: bool,
    pub max_recent_files: usize,
    pub store_recent_files: bool,
    pub show_path: bool,
    pub show_shortcuts: bool,
    pub markdown_only: bool,
    /// Offer link targets that have no file yet
    pub unresolved_links: bool,
    pub search_title: bool,
    pub search_headings: bool,
    /// Debounce of the search input in milliseconds
    pub search_delay: u64,
    /// Use the full-text backend when the search bar switches to it
    pub omnisearch: bool,
    pub show_omnisearch_excerpt: bool,
    pub jump_to_first_match: bool,
    /// Search-engine template, `{query}` is replaced
    pub search_engine: String,
    /// CSS length of the start page title
    pub font_size: String,
    pub recent_files_store: Vec<RecentFileEntry>,
    pub bookmarked_file_store: Vec<BookmarkEntry>,
}

impl Default for HomeTabSettings {
    fn default() -> Self {
        Self {
            auto_jump_to_heading: true,
            max_results: 12,
            show_recent_files: true,
            show_bookmarked_files: true,
            max_recent_files: 8,
            store_recent_files: true,
            show_path: true,
            show_shortcuts: true,
            markdown_only: false,
            unresolved_links: false,
            search_title: false,
            search_headings: true,
            search_delay: 0,
            omnisearch: false,
            show_omnisearch_excerpt: true,
            jump_to_first_match: true,
            search_engine: "https://duckduckgo.com/?q={query}".to_string(),
            font_size: "4em".to_string(),
            recent_files_store: Vec::new(),
            bookmarked_file_store: Vec::new(),
        }
    }
}

impl HomeTabSettings {
    /// Get the path to the settings file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the system config directory cannot be determined.
    pub fn settings_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfigError::Message("Could not determine config directory".to_string()))?;
        Ok(config_dir.join("hometab").join("settings.toml"))
    }

    /// Load settings from the default location, writing defaults on first run
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read, parsed, or created.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::settings_path()?)
    }

    /// Load settings from `path`, writing defaults when it does not exist
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read, parsed, or created.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let defaults = Self::default();
            defaults.save_to(path)?;
            return Ok(defaults);
        }

        let settings = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml))
            .build()?;
        settings.try_deserialize()
    }

    /// Save settings to the default location
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the settings cannot be written.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::settings_path()?)
    }

    /// Save settings to `path`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the directory cannot be created, the settings
    /// cannot be serialized to TOML, or the file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ConfigError::Message(format!("Failed to create config directory: {e}"))
            })?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Message(format!("Failed to serialize settings: {e}")))?;

        fs::write(path, toml_string)
            .map_err(|e| ConfigError::Message(format!("Failed to write settings file: {e}")))?;

        Ok(())
    }

    /// Check text fields that follow a pattern
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Rejected`] for the first invalid field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        PatternValidator::css_unit()?.check("font_size", &self.font_size)
    }

    #[must_use]
    pub const fn index_options(&self) -> IndexOptions {
        IndexOptions::new(self.unresolved_links, self.markdown_only)
    }

    #[must_use]
    pub fn search_options(&self) -> SearchOptions {
        file_search_options(self.search_title, self.search_headings)
    }

    #[must_use]
    pub const fn file_strategy_options(&self) -> FileStrategyOptions {
        FileStrategyOptions {
            max_results: self.max_results,
            auto_jump_to_heading: self.auto_jump_to_heading,
            show_path: self.show_path,
            search_headings: self.search_headings,
        }
    }

    #[must_use]
    pub const fn delegated_options(&self) -> DelegatedOptions {
        DelegatedOptions {
            max_results: self.max_results,
            show_path: self.show_path,
            show_excerpt: self.show_omnisearch_excerpt,
            jump_to_first_match: self.jump_to_first_match,
        }
    }

    #[must_use]
    pub fn suggester_options(&self) -> SuggesterOptions {
        SuggesterOptions::default().with_debounce(Duration::from_millis(self.search_delay))
    }

    /// Search-engine URL for `query`
    #[must_use]
    pub fn search_engine_url(&self, query: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
        self.search_engine.replace("{query}", &encoded)
    }
}
