//! Search filters selected from the search bar

use super::file_type::{FileType, SUPPORTED_FILE_TYPES, supported_extensions};
use serde::{Deserialize, Serialize};

/// Kind of filter narrowing the search bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterType {
    /// One file extension (`option` holds the extension)
    FileExt,
    /// One file category (`option` holds the category name)
    FileType,
    /// Web bookmarks, history and search engine
    Web,
    /// External full-text search backend
    DelegatedSearch,
    /// Plain vault search
    Default,
}

impl FilterType {
    /// Whether this filter narrows the default strategy's files
    #[must_use]
    pub const fn is_file_filter(self) -> bool {
        matches!(self, Self::FileExt | Self::FileType)
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::FileExt => "file-ext",
            Self::FileType => "file-type",
            Self::Web => "web",
            Self::DelegatedSearch => "omnisearch",
            Self::Default => "default",
        }
    }
}

/// Active filter of the search bar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub filter_type: FilterType,
    pub option: Option<String>,
}

impl FilterSpec {
    #[must_use]
    pub fn new(filter_type: FilterType, option: Option<String>) -> Self {
        Self {
            filter_type,
            option,
        }
    }

    /// Unfiltered vault search
    #[must_use]
    pub fn default_search() -> Self {
        Self::new(FilterType::Default, Some("default".to_string()))
    }

    #[must_use]
    pub fn extension(ext: impl Into<String>) -> Self {
        Self::new(FilterType::FileExt, Some(ext.into()))
    }

    #[must_use]
    pub fn file_type(ty: FileType) -> Self {
        Self::new(FilterType::FileType, Some(ty.as_str().to_string()))
    }

    /// Whether a file filter restricts results away from markdown notes
    #[must_use]
    pub fn excludes_markdown(&self) -> bool {
        self.filter_type.is_file_filter()
            && !matches!(self.option.as_deref(), Some("markdown" | "md"))
    }

    /// Whether a record with this extension and type passes the filter
    #[must_use]
    pub fn accepts(&self, extension: Option<&str>, file_type: FileType) -> bool {
        match self.filter_type {
            FilterType::FileExt => self.option.as_deref() == extension,
            FilterType::FileType => self.option.as_deref() == Some(file_type.as_str()),
            _ => true,
        }
    }

    /// Resolve a filter key typed by the user
    ///
    /// Keys are checked in precedence order: default, delegated search,
    /// web, file-type names, then extensions. Returns `None` for unknown keys.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        let filter_type = filter_type_for_key(key)?;
        let option = if filter_type.is_file_filter() {
            Some(key.to_string())
        } else {
            None
        };
        Some(Self::new(filter_type, option))
    }
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self::default_search()
    }
}

/// Find the filter type a key belongs to
#[must_use]
pub fn filter_type_for_key(key: &str) -> Option<FilterType> {
    match key {
        "default" => Some(FilterType::Default),
        "omnisearch" | "omni" => Some(FilterType::DelegatedSearch),
        "web" | "internet" | "webviewer" => Some(FilterType::Web),
        _ if SUPPORTED_FILE_TYPES.iter().any(|ty| ty.as_str() == key) => {
            Some(FilterType::FileType)
        }
        _ if supported_extensions().contains(&key) => Some(FilterType::FileExt),
        _ => None,
    }
}
