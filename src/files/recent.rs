//! Recently opened files
//!
//! A capped list ordered newest first. When the list is full, opening a new
//! file replaces the oldest entry. The list follows deletes and renames in
//! the vault and is persisted through the settings store.

use crate::config::{RecentFileEntry, SettingsStore};
use crate::host::{Subscription, Vault, VaultEvent};
use chrono::{DateTime, Utc};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentFile {
    pub path: String,
    pub timestamp: DateTime<Utc>,
}

/// Capped list of recent files
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecentFiles {
    files: Vec<RecentFile>,
    max: usize,
}

impl RecentFiles {
    #[must_use]
    pub const fn new(max: usize) -> Self {
        Self {
            files: Vec::new(),
            max,
        }
    }

    #[must_use]
    pub fn files(&self) -> &[RecentFile] {
        &self.files
    }

    #[must_use]
    pub const fn max(&self) -> usize {
        self.max
    }

    pub fn on_open(&mut self, path: &str) {
        self.on_open_at(path, Utc::now());
    }

    /// Record that `path` was opened at `at`
    pub fn on_open_at(&mut self, path: &str, at: DateTime<Utc>) {
        if let Some(existing) = self.files.iter_mut().find(|f| f.path == path) {
            existing.timestamp = at;
        } else {
            let entry = RecentFile {
                path: path.to_string(),
                timestamp: at,
            };
            if self.max == 0 {
                return;
            }
            if self.files.len() >= self.max {
                if let Some(oldest) = self.files.last_mut() {
                    *oldest = entry;
                }
            } else {
                self.files.push(entry);
            }
        }
        self.files.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    }

    /// Returns whether an entry was removed
    pub fn remove(&mut self, path: &str) -> bool {
        let before = self.files.len();
        self.files.retain(|f| f.path != path);
        self.files.len() != before
    }

    /// Returns whether an entry was renamed
    pub fn rename(&mut self, old_path: &str, new_path: &str) -> bool {
        match self.files.iter_mut().find(|f| f.path == old_path) {
            Some(file) => {
                file.path = new_path.to_string();
                true
            }
            None => false,
        }
    }

    /// Change the cap, dropping the oldest entries beyond it
    pub fn set_max(&mut self, max: usize) {
        self.max = max;
        self.files.truncate(max);
    }

    #[must_use]
    pub fn to_store(&self) -> Vec<RecentFileEntry> {
        self.files
            .iter()
            .map(|f| RecentFileEntry {
                filepath: f.path.clone(),
                timestamp: f.timestamp.timestamp_millis(),
            })
            .collect()
    }

    /// Restore stored entries whose file still exists
    pub fn rehydrate(&mut self, entries: &[RecentFileEntry], vault: &dyn Vault) {
        self.files = entries
            .iter()
            .filter(|entry| vault.file_by_path(&entry.filepath).is_some())
            .filter_map(|entry| {
                DateTime::from_timestamp_millis(entry.timestamp).map(|timestamp| RecentFile {
                    path: entry.filepath.clone(),
                    timestamp,
                })
            })
            .collect();
        self.files.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        self.files.truncate(self.max);
    }
}

/// Keeps [`RecentFiles`] in sync with the vault and the settings
pub struct RecentFileManager {
    files: Rc<RefCell<RecentFiles>>,
    store: SettingsStore,
    vault: Rc<dyn Vault>,
}

impl RecentFileManager {
    /// Load the stored list when persistence is enabled
    #[must_use]
    pub fn new(store: SettingsStore, vault: Rc<dyn Vault>) -> Self {
        let (max, persisted, entries) = store.read(|s| {
            (
                s.max_recent_files,
                s.store_recent_files,
                s.recent_files_store.clone(),
            )
        });
        let mut files = RecentFiles::new(max);
        if persisted {
            files.rehydrate(&entries, vault.as_ref());
            tracing::debug!("Loaded {} recent files", files.files().len());
        }
        Self {
            files: Rc::new(RefCell::new(files)),
            store,
            vault,
        }
    }

    #[must_use]
    pub fn files(&self) -> Vec<RecentFile> {
        self.files.borrow().files().to_vec()
    }

    /// Record an opened file; paths outside the vault are ignored
    pub fn record_open(&self, path: &str) {
        if self.vault.file_by_path(path).is_none() {
            return;
        }
        self.files.borrow_mut().on_open(path);
        persist(&self.files, &self.store);
    }

    pub fn remove(&self, path: &str) {
        if self.files.borrow_mut().remove(path) {
            persist(&self.files, &self.store);
        }
    }

    pub fn set_max(&self, max: usize) {
        self.files.borrow_mut().set_max(max);
        self.store.update(|s| s.max_recent_files = max);
        persist(&self.files, &self.store);
    }

    /// Follow deletes and renames until the subscription is dropped
    #[must_use = "dropping the subscription stops tracking vault changes"]
    pub fn attach(&self) -> Subscription {
        let files = Rc::clone(&self.files);
        let store = self.store.clone();
        self.vault.events().subscribe(move |event| {
            let changed = match event {
                VaultEvent::Deleted(file) => files.borrow_mut().remove(&file.path),
                VaultEvent::Renamed { file, old_path } => {
                    files.borrow_mut().rename(old_path, &file.path)
                }
                _ => false,
            };
            if changed {
                persist(&files, &store);
            }
        })
    }
}

fn persist(files: &Rc<RefCell<RecentFiles>>, store: &SettingsStore) {
    if !store.read(|s| s.store_recent_files) {
        return;
    }
    let entries = files.borrow().to_store();
    store.update(|s| s.recent_files_store = entries);
}
