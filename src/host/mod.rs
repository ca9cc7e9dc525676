//! Host application abstractions
//!
//! The host owns file storage, derived metadata and the workspace that
//! displays files. Everything here is injected into the index and the
//! strategies so the engine can run against an in-memory vault in tests,
//! a directory on disk from the CLI, or a real editor.

pub mod error;
pub mod events;
pub mod frontmatter;
pub mod fs;
pub mod memory;

pub use error::{HostError, Result};
pub use events::{EventBus, Subscription, VaultEvent};
pub use frontmatter::parse_metadata;
pub use fs::{FsVault, SystemWorkspace};
pub use memory::{MemoryVault, RecordingWorkspace, WorkspaceAction};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::rc::Rc;

/// A file as the host reports it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VaultFile {
    /// Vault-relative path with `/` separators
    pub path: String,
    pub name: String,
    pub basename: String,
    /// Lowercase extension, empty when the name has none
    pub extension: String,
}

impl VaultFile {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let name = path.rsplit('/').next().unwrap_or(&path).to_string();
        let (basename, extension) = match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => (stem.to_string(), ext.to_lowercase()),
            _ => (name.clone(), String::new()),
        };
        Self {
            path,
            name,
            basename,
            extension,
        }
    }

    #[must_use]
    pub fn is_markdown(&self) -> bool {
        self.extension == "md"
    }

    /// Folder part of the path, empty at the vault root
    #[must_use]
    pub fn parent(&self) -> &str {
        self.path.rsplit_once('/').map_or("", |(parent, _)| parent)
    }
}

/// Aliases as they appear in front matter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AliasValue {
    List(Vec<String>),
    /// `"[a, b]"` or `"a, b"`
    Text(String),
}

impl AliasValue {
    /// Trimmed, non-empty aliases
    #[must_use]
    pub fn to_list(&self) -> Vec<String> {
        match self {
            Self::List(items) => items
                .iter()
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty())
                .collect(),
            Self::Text(text) => text
                .replace(['[', ']'], "")
                .split(',')
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty())
                .collect(),
        }
    }
}

/// Derived metadata of one file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileMetadata {
    pub title: Option<String>,
    pub aliases: Option<AliasValue>,
    /// Headings in document order; `None` when the file has none
    pub headings: Option<Vec<String>>,
    /// Raw link texts found in the file
    pub links: Vec<String>,
}

impl FileMetadata {
    #[must_use]
    pub fn aliases(&self) -> Vec<String> {
        self.aliases.as_ref().map(AliasValue::to_list).unwrap_or_default()
    }
}

/// File storage of the host
#[async_trait(?Send)]
pub trait Vault {
    fn files(&self) -> Vec<VaultFile>;

    fn markdown_files(&self) -> Vec<VaultFile> {
        self.files().into_iter().filter(VaultFile::is_markdown).collect()
    }

    fn file_by_path(&self, path: &str) -> Option<VaultFile>;

    /// Folder new notes are placed in, empty for the vault root
    fn default_new_file_parent(&self) -> String;

    /// Event stream for file and metadata changes
    fn events(&self) -> EventBus<VaultEvent>;

    async fn create_file(&self, path: &str, content: &str) -> Result<VaultFile>;

    async fn create_folder(&self, path: &str) -> Result<()>;

    async fn exists(&self, path: &str) -> Result<bool>;
}

/// Derived metadata of the host
pub trait MetadataCache {
    fn metadata(&self, path: &str) -> Option<FileMetadata>;

    /// Link texts that point to no existing file, duplicates allowed
    fn unresolved_links(&self) -> Vec<String>;
}

/// How to open a target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OpenOptions {
    pub new_tab: bool,
}

impl OpenOptions {
    #[must_use]
    pub const fn new_tab(new_tab: bool) -> Self {
        Self { new_tab }
    }
}

/// The part of the host that displays things
#[async_trait(?Send)]
pub trait Workspace {
    async fn open_file(&self, path: &str, options: OpenOptions) -> Result<()>;

    /// Open `path#heading` style link text
    async fn open_link_text(&self, link: &str, options: OpenOptions) -> Result<()>;

    async fn open_url(&self, url: &str, options: OpenOptions) -> Result<()>;

    /// Scroll the open file so that character `offset` is visible
    async fn scroll_to_offset(&self, path: &str, offset: usize) -> Result<()>;
}

/// Everything the engine needs from the host
#[derive(Clone)]
pub struct HostContext {
    pub vault: Rc<dyn Vault>,
    pub metadata: Rc<dyn MetadataCache>,
    pub workspace: Rc<dyn Workspace>,
}

impl HostContext {
    #[must_use]
    pub fn new(
        vault: Rc<dyn Vault>,
        metadata: Rc<dyn MetadataCache>,
        workspace: Rc<dyn Workspace>,
    ) -> Self {
        Self {
            vault,
            metadata,
            workspace,
        }
    }
}

/// Distinct link texts from `links` that no file in `files` satisfies
///
/// A link resolves by full path, by path without the `.md` extension, by
/// file name, or by the basename of a markdown file.
pub(crate) fn unresolved_link_texts(files: &[VaultFile], links: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    links
        .into_iter()
        .filter(|link| {
            !files.iter().any(|f| {
                f.path == *link
                    || f.name == *link
                    || (f.is_markdown()
                        && (f.basename == *link
                            || f.path.strip_suffix(".md") == Some(link.as_str())))
            })
        })
        .filter(|link| seen.insert(link.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vault_file_parts() {
        let file = VaultFile::new("notes/daily/2024.MD");
        assert_eq!(file.name, "2024.MD");
        assert_eq!(file.basename, "2024");
        assert_eq!(file.extension, "md");
        assert_eq!(file.parent(), "notes/daily");
        assert!(file.is_markdown());

        let root = VaultFile::new("README");
        assert_eq!(root.parent(), "");
        assert_eq!(root.extension, "");
    }

    #[test]
    fn test_alias_list_is_trimmed() {
        let aliases = AliasValue::List(vec![" one ".into(), String::new(), "two".into()]);
        assert_eq!(aliases.to_list(), vec!["one", "two"]);
    }

    #[test]
    fn test_alias_bracketed_text() {
        let aliases = AliasValue::Text("[first, second , ,third]".into());
        assert_eq!(aliases.to_list(), vec!["first", "second", "third"]);

        let single = AliasValue::Text("solo".into());
        assert_eq!(single.to_list(), vec!["solo"]);
    }

    #[test]
    fn test_metadata_aliases_default_empty() {
        assert!(FileMetadata::default().aliases().is_empty());
    }
}
