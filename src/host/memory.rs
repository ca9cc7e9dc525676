//! In-memory host for tests and embedding

use super::{
    EventBus, FileMetadata, HostError, MetadataCache, OpenOptions, Result, Vault, VaultEvent,
    VaultFile, Workspace, parse_metadata, unresolved_link_texts,
};
use async_trait::async_trait;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone)]
struct MemoryFile {
    file: VaultFile,
    content: String,
    metadata: FileMetadata,
}

/// Vault and metadata cache backed by maps
///
/// Mutations made through the [`Vault`] trait or the helper methods emit
/// the matching [`VaultEvent`]; [`MemoryVault::add_file`] is silent so
/// fixtures can be set up before an index is built.
#[derive(Default)]
pub struct MemoryVault {
    files: RefCell<BTreeMap<String, MemoryFile>>,
    folders: RefCell<BTreeSet<String>>,
    new_file_parent: String,
    events: EventBus<VaultEvent>,
}

impl MemoryVault {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Place new notes under `folder`
    #[must_use]
    pub fn with_new_file_parent(mut self, folder: impl Into<String>) -> Self {
        self.new_file_parent = folder.into();
        self.register_folders(&self.new_file_parent.clone());
        self
    }

    /// Add a file without emitting an event; markdown content is parsed
    pub fn add_file(&self, path: &str, content: &str) -> VaultFile {
        let file = VaultFile::new(path);
        self.register_folders(file.parent());
        let metadata = if file.is_markdown() {
            parse_metadata(content)
        } else {
            FileMetadata::default()
        };
        self.files.borrow_mut().insert(
            path.to_string(),
            MemoryFile {
                file: file.clone(),
                content: content.to_string(),
                metadata,
            },
        );
        file
    }

    /// Replace the metadata of a file and announce it
    ///
    /// # Errors
    /// Returns [`HostError::NotFound`] for unknown paths.
    pub fn set_metadata(&self, path: &str, metadata: FileMetadata) -> Result<()> {
        let file = {
            let mut files = self.files.borrow_mut();
            let entry = files
                .get_mut(path)
                .ok_or_else(|| HostError::NotFound(path.to_string()))?;
            entry.metadata = metadata;
            entry.file.clone()
        };
        self.events.emit(&VaultEvent::MetadataResolved(file));
        Ok(())
    }

    /// Remove a file and announce it
    pub fn delete(&self, path: &str) -> Option<VaultFile> {
        let removed = self.files.borrow_mut().remove(path)?;
        self.events.emit(&VaultEvent::Deleted(removed.file.clone()));
        Some(removed.file)
    }

    /// Move a file and announce it
    ///
    /// # Errors
    /// Returns [`HostError::NotFound`] when `old_path` is absent and
    /// [`HostError::AlreadyExists`] when `new_path` is taken.
    pub fn rename(&self, old_path: &str, new_path: &str) -> Result<VaultFile> {
        let file = {
            let mut files = self.files.borrow_mut();
            if files.contains_key(new_path) {
                return Err(HostError::AlreadyExists(new_path.to_string()));
            }
            let mut entry = files
                .remove(old_path)
                .ok_or_else(|| HostError::NotFound(old_path.to_string()))?;
            entry.file = VaultFile::new(new_path);
            let file = entry.file.clone();
            files.insert(new_path.to_string(), entry);
            file
        };
        self.register_folders(file.parent());
        self.events.emit(&VaultEvent::Renamed {
            file: file.clone(),
            old_path: old_path.to_string(),
        });
        Ok(file)
    }

    /// Announce that derived metadata has settled
    pub fn settle(&self) {
        self.events.emit(&VaultEvent::CacheSettled);
    }

    #[must_use]
    pub fn content(&self, path: &str) -> Option<String> {
        self.files.borrow().get(path).map(|f| f.content.clone())
    }

    #[must_use]
    pub fn has_folder(&self, path: &str) -> bool {
        path.is_empty() || self.folders.borrow().contains(path)
    }

    fn register_folders(&self, folder: &str) {
        let mut folders = self.folders.borrow_mut();
        let mut current = String::new();
        for part in folder.split('/').filter(|p| !p.is_empty()) {
            if !current.is_empty() {
                current.push('/');
            }
            current.push_str(part);
            folders.insert(current.clone());
        }
    }
}

#[async_trait(?Send)]
impl Vault for MemoryVault {
    fn files(&self) -> Vec<VaultFile> {
        self.files.borrow().values().map(|f| f.file.clone()).collect()
    }

    fn file_by_path(&self, path: &str) -> Option<VaultFile> {
        self.files.borrow().get(path).map(|f| f.file.clone())
    }

    fn default_new_file_parent(&self) -> String {
        self.new_file_parent.clone()
    }

    fn events(&self) -> EventBus<VaultEvent> {
        self.events.clone()
    }

    async fn create_file(&self, path: &str, content: &str) -> Result<VaultFile> {
        if self.files.borrow().contains_key(path) {
            return Err(HostError::AlreadyExists(path.to_string()));
        }
        let parent = VaultFile::new(path).parent().to_string();
        if !self.has_folder(&parent) {
            return Err(HostError::NotFound(parent));
        }
        let file = self.add_file(path, content);
        self.events.emit(&VaultEvent::Created(file.clone()));
        Ok(file)
    }

    async fn create_folder(&self, path: &str) -> Result<()> {
        self.register_folders(path);
        Ok(())
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        Ok(self.files.borrow().contains_key(path) || self.has_folder(path))
    }
}

impl MetadataCache for MemoryVault {
    fn metadata(&self, path: &str) -> Option<FileMetadata> {
        self.files.borrow().get(path).map(|f| f.metadata.clone())
    }

    fn unresolved_links(&self) -> Vec<String> {
        let files = self.files();
        let links: Vec<String> = self
            .files
            .borrow()
            .values()
            .flat_map(|f| f.metadata.links.clone())
            .collect();
        unresolved_link_texts(&files, links)
    }
}

/// Something a [`RecordingWorkspace`] was asked to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceAction {
    OpenFile { path: String, new_tab: bool },
    OpenLinkText { link: String, new_tab: bool },
    OpenUrl { url: String, new_tab: bool },
    Scroll { path: String, offset: usize },
}

/// Workspace that only records requests
#[derive(Debug, Default)]
pub struct RecordingWorkspace {
    actions: RefCell<Vec<WorkspaceAction>>,
}

impl RecordingWorkspace {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn actions(&self) -> Vec<WorkspaceAction> {
        self.actions.borrow().clone()
    }

    #[must_use]
    pub fn last_action(&self) -> Option<WorkspaceAction> {
        self.actions.borrow().last().cloned()
    }

    fn record(&self, action: WorkspaceAction) {
        self.actions.borrow_mut().push(action);
    }
}

#[async_trait(?Send)]
impl Workspace for RecordingWorkspace {
    async fn open_file(&self, path: &str, options: OpenOptions) -> Result<()> {
        self.record(WorkspaceAction::OpenFile {
            path: path.to_string(),
            new_tab: options.new_tab,
        });
        Ok(())
    }

    async fn open_link_text(&self, link: &str, options: OpenOptions) -> Result<()> {
        self.record(WorkspaceAction::OpenLinkText {
            link: link.to_string(),
            new_tab: options.new_tab,
        });
        Ok(())
    }

    async fn open_url(&self, url: &str, options: OpenOptions) -> Result<()> {
        self.record(WorkspaceAction::OpenUrl {
            url: url.to_string(),
            new_tab: options.new_tab,
        });
        Ok(())
    }

    async fn scroll_to_offset(&self, path: &str, offset: usize) -> Result<()> {
        self.record(WorkspaceAction::Scroll {
            path: path.to_string(),
            offset,
        });
        Ok(())
    }
}
