//! Directory-backed host
//!
//! [`FsVault`] treats a directory as the vault and parses markdown on demand
//! to answer metadata queries. [`SystemWorkspace`] hands files and URLs to
//! the desktop's default application.

use super::{
    EventBus, FileMetadata, HostError, MetadataCache, OpenOptions, Result, Vault, VaultEvent,
    VaultFile, Workspace, parse_metadata, unresolved_link_texts,
};
use async_trait::async_trait;
use glob::Pattern as GlobPattern;
use std::path::{Path, PathBuf};

/// Vault rooted at a directory
pub struct FsVault {
    root: PathBuf,
    new_file_parent: String,
    excludes: Vec<GlobPattern>,
    events: EventBus<VaultEvent>,
}

impl FsVault {
    /// Open the directory at `root`
    ///
    /// # Errors
    /// Returns [`HostError::NotFound`] when `root` is not a directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(HostError::NotFound(root.display().to_string()));
        }
        Ok(Self {
            root,
            new_file_parent: String::new(),
            excludes: Vec::new(),
            events: EventBus::new(),
        })
    }

    #[must_use]
    pub fn with_new_file_parent(mut self, folder: impl Into<String>) -> Self {
        self.new_file_parent = folder.into();
        self
    }

    /// Skip vault paths matching a glob such as `archive/**`
    ///
    /// # Errors
    /// Returns [`HostError::Backend`] for an invalid glob.
    pub fn exclude(mut self, pattern: &str) -> Result<Self> {
        let pattern =
            GlobPattern::new(pattern).map_err(|e| HostError::Backend(format!("{pattern}: {e}")))?;
        self.excludes.push(pattern);
        Ok(self)
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn absolute(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }

    fn relative(&self, absolute: &Path) -> Option<String> {
        let relative = absolute.strip_prefix(&self.root).ok()?;
        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        if parts.iter().any(|p| p.starts_with('.')) {
            return None;
        }
        Some(parts.join("/"))
    }

    fn is_excluded(&self, path: &str) -> bool {
        self.excludes.iter().any(|p| p.matches(path))
    }

    fn read_metadata(&self, file: &VaultFile) -> Option<FileMetadata> {
        if !file.is_markdown() {
            return Some(FileMetadata::default());
        }
        match std::fs::read_to_string(self.absolute(&file.path)) {
            Ok(content) => Some(parse_metadata(&content)),
            Err(e) => {
                tracing::warn!("Cannot read {}: {e}", file.path);
                None
            }
        }
    }
}

#[async_trait(?Send)]
impl Vault for FsVault {
    fn files(&self) -> Vec<VaultFile> {
        let pattern = format!(
            "{}/**/*",
            GlobPattern::escape(&self.root.to_string_lossy())
        );
        let entries = match glob::glob(&pattern) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Cannot list vault files: {e}");
                return Vec::new();
            }
        };

        let mut files: Vec<VaultFile> = entries
            .filter_map(std::result::Result::ok)
            .filter(|p| p.is_file())
            .filter_map(|p| self.relative(&p))
            .filter(|p| !self.is_excluded(p))
            .map(VaultFile::new)
            .collect();
        files.sort_by(|a, b| a.path.cmp(&b.path));
        files
    }

    fn file_by_path(&self, path: &str) -> Option<VaultFile> {
        let absolute = self.absolute(path);
        (absolute.is_file() && !self.is_excluded(path)).then(|| VaultFile::new(path))
    }

    fn default_new_file_parent(&self) -> String {
        self.new_file_parent.clone()
    }

    fn events(&self) -> EventBus<VaultEvent> {
        self.events.clone()
    }

    async fn create_file(&self, path: &str, content: &str) -> Result<VaultFile> {
        let absolute = self.absolute(path);
        if tokio::fs::try_exists(&absolute).await? {
            return Err(HostError::AlreadyExists(path.to_string()));
        }
        tokio::fs::write(&absolute, content).await?;

        let file = VaultFile::new(path);
        tracing::debug!("Created {}", file.path);
        self.events.emit(&VaultEvent::Created(file.clone()));
        Ok(file)
    }

    async fn create_folder(&self, path: &str) -> Result<()> {
        tokio::fs::create_dir_all(self.absolute(path)).await?;
        Ok(())
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        Ok(tokio::fs::try_exists(self.absolute(path)).await?)
    }
}

impl MetadataCache for FsVault {
    fn metadata(&self, path: &str) -> Option<FileMetadata> {
        self.read_metadata(&self.file_by_path(path)?)
    }

    fn unresolved_links(&self) -> Vec<String> {
        let files = self.files();
        let links: Vec<String> = files
            .iter()
            .filter(|f| f.is_markdown())
            .filter_map(|f| self.read_metadata(f))
            .flat_map(|m| m.links)
            .collect();
        unresolved_link_texts(&files, links)
    }
}

/// Opens files and URLs with the desktop default handler
pub struct SystemWorkspace {
    root: PathBuf,
}

impl SystemWorkspace {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait(?Send)]
impl Workspace for SystemWorkspace {
    async fn open_file(&self, path: &str, _options: OpenOptions) -> Result<()> {
        open::that(self.root.join(path))?;
        Ok(())
    }

    async fn open_link_text(&self, link: &str, options: OpenOptions) -> Result<()> {
        let target = link.split('#').next().unwrap_or(link);
        let path = if VaultFile::new(target).extension.is_empty() {
            format!("{target}.md")
        } else {
            target.to_string()
        };
        self.open_file(&path, options).await
    }

    async fn open_url(&self, url: &str, _options: OpenOptions) -> Result<()> {
        open::that(url)?;
        Ok(())
    }

    async fn scroll_to_offset(&self, path: &str, offset: usize) -> Result<()> {
        tracing::debug!("Scrolling is not supported outside an editor ({path}@{offset})");
        Ok(())
    }
}
