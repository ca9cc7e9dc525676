//! Bookmarked files
//!
//! The host keeps the bookmark tree; this module mirrors its file entries
//! into a flat list and persists their paths so the start page can show them
//! before the host has loaded.

use crate::config::{BookmarkEntry, SettingsStore};
use crate::host::{HostError, Result as HostResult, Vault};
use crate::model::{FileType, LinkRecord, LinkType};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// One node of the host bookmark tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HostBookmark {
    File {
        path: String,
        #[serde(default)]
        title: Option<String>,
    },
    Url {
        url: String,
        #[serde(default)]
        title: Option<String>,
    },
    Group {
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        items: Vec<HostBookmark>,
    },
    #[serde(other)]
    Other,
}

impl HostBookmark {
    /// Depth-first walk over the node and its group members
    fn flatten<'a>(&'a self, out: &mut Vec<&'a HostBookmark>) {
        match self {
            Self::Group { items, .. } => items.iter().for_each(|item| item.flatten(out)),
            other => out.push(other),
        }
    }
}

/// Source of the host's bookmark tree
pub trait BookmarkSource {
    /// # Errors
    ///
    /// Returns a [`HostError`] when the bookmarks cannot be read.
    fn bookmarks(&self) -> HostResult<Vec<HostBookmark>>;
}

#[derive(Debug, Deserialize)]
struct BookmarksFile {
    #[serde(default)]
    items: Vec<HostBookmark>,
}

/// Bookmarks stored as JSON in the vault's config folder
#[derive(Debug, Clone)]
pub struct JsonBookmarks {
    path: PathBuf,
}

impl JsonBookmarks {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<vault>/.obsidian/bookmarks.json`
    #[must_use]
    pub fn for_vault(root: &Path) -> Self {
        Self::new(root.join(".obsidian").join("bookmarks.json"))
    }

    /// URL bookmarks as web links
    #[must_use]
    pub fn links(&self) -> Vec<LinkRecord> {
        let tree = self.bookmarks().unwrap_or_else(|e| {
            tracing::warn!("Failed to read bookmarks: {e}");
            Vec::new()
        });
        flatten(&tree)
            .into_iter()
            .filter_map(|bookmark| match bookmark {
                HostBookmark::Url { url, title } => Some(LinkRecord::new(
                    title.clone().unwrap_or_default(),
                    url.clone(),
                    LinkType::Bookmark,
                )),
                _ => None,
            })
            .collect()
    }
}

impl BookmarkSource for JsonBookmarks {
    /// A missing file means no bookmarks
    fn bookmarks(&self) -> HostResult<Vec<HostBookmark>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let text = std::fs::read_to_string(&self.path)?;
        let file: BookmarksFile = serde_json::from_str(&text)
            .map_err(|e| HostError::Backend(format!("{}: {e}", self.path.display())))?;
        Ok(file.items)
    }
}

fn flatten(tree: &[HostBookmark]) -> Vec<&HostBookmark> {
    let mut out = Vec::new();
    tree.iter().for_each(|node| node.flatten(&mut out));
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkedFile {
    pub path: String,
    pub icon_id: Option<String>,
}

impl BookmarkedFile {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let icon_id = icon_for(&path).map(str::to_string);
        Self { path, icon_id }
    }
}

fn icon_for(path: &str) -> Option<&'static str> {
    let extension = path.rsplit_once('.').map(|(_, ext)| ext.to_lowercase())?;
    match FileType::from_extension(&extension) {
        FileType::Markdown => Some("file-text"),
        FileType::Image => Some("image"),
        FileType::Audio => Some("music"),
        FileType::Video => Some("video"),
        FileType::Database => Some("database"),
        FileType::Unknown => None,
        _ => Some("file"),
    }
}

/// Mirrors host file bookmarks and keeps the stored copy current
pub struct BookmarkedFileManager {
    files: RefCell<Vec<BookmarkedFile>>,
    source: Rc<dyn BookmarkSource>,
    store: SettingsStore,
    vault: Rc<dyn Vault>,
}

impl BookmarkedFileManager {
    /// Start from the stored list, dropping files that no longer exist
    #[must_use]
    pub fn new(source: Rc<dyn BookmarkSource>, store: SettingsStore, vault: Rc<dyn Vault>) -> Self {
        let stored = store.read(|s| s.bookmarked_file_store.clone());
        let files = stored
            .into_iter()
            .filter(|entry| vault.file_by_path(&entry.filepath).is_some())
            .map(|entry| BookmarkedFile::new(entry.filepath))
            .collect();
        Self {
            files: RefCell::new(files),
            source,
            store,
            vault,
        }
    }

    #[must_use]
    pub fn files(&self) -> Vec<BookmarkedFile> {
        self.files.borrow().clone()
    }

    /// Re-read the host bookmarks and persist the file entries
    ///
    /// A failing source leaves the current list untouched.
    pub fn refresh(&self) {
        let tree = match self.source.bookmarks() {
            Ok(tree) => tree,
            Err(e) => {
                tracing::warn!("Failed to read bookmarks: {e}");
                return;
            }
        };
        let files: Vec<BookmarkedFile> = flatten(&tree)
            .into_iter()
            .filter_map(|bookmark| match bookmark {
                HostBookmark::File { path, .. } if !path.is_empty() => Some(path.as_str()),
                _ => None,
            })
            .filter(|path| self.vault.file_by_path(path).is_some())
            .map(BookmarkedFile::new)
            .collect();
        tracing::debug!("Mirrored {} bookmarked files", files.len());

        let entries = files
            .iter()
            .map(|f| BookmarkEntry {
                filepath: f.path.clone(),
            })
            .collect();
        self.files.replace(files);
        self.store.update(|s| s.bookmarked_file_store = entries);
    }
}
