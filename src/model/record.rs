//! Searchable record types
//!
//! A record is one candidate the fuzzy matcher can rank: a vault file, a
//! not-yet-created link target, an icon, or a web link.

use super::file_type::FileType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Source kind of a [`SearchRecord`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecordKind {
    /// Existing vault file
    File,
    /// Link target that has no backing file yet
    UnresolvedFile,
    /// Icon from the bundled icon table
    Icon,
    /// Bookmark, history entry or synthesized web entry
    WebLink,
}

/// A file (or would-be file) candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRecord {
    /// File name including extension
    pub name: String,
    /// File name without extension
    pub basename: String,
    /// Vault-relative path, stable key of the record
    pub path: String,
    /// Front-matter aliases
    pub aliases: Option<Vec<String>>,
    /// Front-matter title
    pub title: Option<String>,
    /// Document headings in order
    pub headings: Option<Vec<String>>,
    /// False for link targets that do not exist as files
    pub is_created: bool,
    /// Synthesized from an unresolved link
    pub is_unresolved: bool,
    pub file_type: FileType,
    /// Lowercase extension, absent for some synthetic records
    pub extension: Option<String>,
}

impl SearchRecord {
    /// Record for an existing file, without metadata
    #[must_use]
    pub fn file(path: impl Into<String>) -> Self {
        let path = path.into();
        let name = path.rsplit('/').next().unwrap_or(&path).to_string();
        let (basename, extension) = match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => (stem.to_string(), Some(ext.to_lowercase())),
            _ => (name.clone(), None),
        };
        let file_type = extension
            .as_deref()
            .map_or(FileType::Unknown, FileType::from_extension);

        Self {
            name,
            basename,
            path,
            aliases: None,
            title: None,
            headings: None,
            is_created: true,
            is_unresolved: false,
            file_type,
            extension,
        }
    }

    /// Placeholder offering to create `<input>.md`
    #[must_use]
    pub fn create_placeholder(input: &str) -> Self {
        Self {
            name: format!("{input}.md"),
            basename: input.to_string(),
            path: format!("{input}.md"),
            aliases: None,
            title: None,
            headings: None,
            is_created: false,
            is_unresolved: false,
            file_type: FileType::Markdown,
            extension: Some("md".to_string()),
        }
    }

    /// Attach metadata fields
    #[must_use]
    pub fn with_metadata(
        mut self,
        title: Option<String>,
        aliases: Vec<String>,
        headings: Option<Vec<String>>,
    ) -> Self {
        self.title = title;
        self.aliases = Some(aliases);
        self.headings = headings;
        self
    }

    #[must_use]
    pub const fn kind(&self) -> RecordKind {
        if self.is_unresolved {
            RecordKind::UnresolvedFile
        } else {
            RecordKind::File
        }
    }

    #[must_use]
    pub fn is_markdown(&self) -> bool {
        self.file_type == FileType::Markdown
    }
}

/// An icon id with its search tags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconRecord {
    pub name: String,
    pub tags: Vec<String>,
}

impl IconRecord {
    #[must_use]
    pub fn new(name: impl Into<String>, tags: Vec<String>) -> Self {
        Self {
            name: name.into(),
            tags,
        }
    }
}

/// Origin of a [`LinkRecord`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    Bookmark,
    History,
    /// Search-engine query for the raw input
    Search,
    /// Direct navigation to URL-like input
    Goto,
}

impl LinkType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Bookmark => "bookmark",
            Self::History => "history",
            Self::Search => "search",
            Self::Goto => "goto",
        }
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A web link candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub title: String,
    pub url: String,
    pub link_type: LinkType,
}

impl LinkRecord {
    #[must_use]
    pub fn new(title: impl Into<String>, url: impl Into<String>, link_type: LinkType) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            link_type,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> RecordKind {
        RecordKind::WebLink
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_record_from_path() {
        let record = SearchRecord::file("notes/Daily.MD");
        assert_eq!(record.name, "Daily.MD");
        assert_eq!(record.basename, "Daily");
        assert_eq!(record.extension.as_deref(), Some("md"));
        assert_eq!(record.file_type, FileType::Markdown);
        assert!(record.is_created);
        assert_eq!(record.kind(), RecordKind::File);
    }

    #[test]
    fn test_file_record_without_extension() {
        let record = SearchRecord::file("bin/Makefile");
        assert_eq!(record.basename, "Makefile");
        assert_eq!(record.extension, None);
        assert_eq!(record.file_type, FileType::Unknown);

        let dotfile = SearchRecord::file(".gitignore");
        assert_eq!(dotfile.basename, ".gitignore");
        assert_eq!(dotfile.extension, None);
    }

    #[test]
    fn test_create_placeholder() {
        let record = SearchRecord::create_placeholder("newnote");
        assert_eq!(record.path, "newnote.md");
        assert!(!record.is_created);
        assert!(!record.is_unresolved);
        assert!(record.is_markdown());
    }
}
