//! Live settings with debounced persistence
//!
//! Mutations go through [`SettingsStore::update`]. Each one restarts a short
//! timer on [`tokio::task::spawn_local`], so the store must be used inside a
//! `LocalSet`; a burst of changes ends in a single write.

use super::HomeTabSettings;
use std::cell::{Cell, RefCell};
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Quiet period between the last change and the write
pub const SAVE_DELAY: Duration = Duration::from_millis(20);

struct StoreInner {
    settings: RefCell<HomeTabSettings>,
    path: Option<PathBuf>,
    pending: RefCell<Option<JoinHandle<()>>>,
    saves: Cell<usize>,
}

/// Shared handle to the current settings
#[derive(Clone)]
pub struct SettingsStore {
    inner: Rc<StoreInner>,
}

impl SettingsStore {
    /// Store persisting to `path`
    #[must_use]
    pub fn new(settings: HomeTabSettings, path: PathBuf) -> Self {
        Self::build(settings, Some(path))
    }

    /// Store that never touches disk
    #[must_use]
    pub fn in_memory(settings: HomeTabSettings) -> Self {
        Self::build(settings, None)
    }

    fn build(settings: HomeTabSettings, path: Option<PathBuf>) -> Self {
        Self {
            inner: Rc::new(StoreInner {
                settings: RefCell::new(settings),
                path,
                pending: RefCell::new(None),
                saves: Cell::new(0),
            }),
        }
    }

    /// Snapshot of the current settings
    #[must_use]
    pub fn get(&self) -> HomeTabSettings {
        self.inner.settings.borrow().clone()
    }

    /// Read one value without cloning everything
    pub fn read<R>(&self, f: impl FnOnce(&HomeTabSettings) -> R) -> R {
        f(&self.inner.settings.borrow())
    }

    /// Apply `f` and schedule a save
    pub fn update<R>(&self, f: impl FnOnce(&mut HomeTabSettings) -> R) -> R {
        let result = f(&mut self.inner.settings.borrow_mut());
        self.request_save();
        result
    }

    /// Restart the save timer
    pub fn request_save(&self) {
        if let Some(previous) = self.inner.pending.borrow_mut().take() {
            previous.abort();
        }
        let this = self.clone();
        let timer = tokio::task::spawn_local(async move {
            tokio::time::sleep(SAVE_DELAY).await;
            this.inner.pending.borrow_mut().take();
            this.write();
        });
        self.inner.pending.replace(Some(timer));
    }

    /// Write now, cancelling any scheduled save
    pub fn flush(&self) {
        if let Some(pending) = self.inner.pending.borrow_mut().take() {
            pending.abort();
        }
        self.write();
    }

    #[must_use]
    pub fn is_save_pending(&self) -> bool {
        self.inner.pending.borrow().is_some()
    }

    /// Writes performed so far
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.inner.saves.get()
    }

    fn write(&self) {
        self.inner.saves.set(self.inner.saves.get() + 1);
        let Some(path) = &self.inner.path else {
            return;
        };
        let settings = self.get();
        match settings.save_to(path) {
            Ok(()) => tracing::debug!("Saved settings to {}", path.display()),
            Err(e) => tracing::warn!("Failed to save settings: {e}"),
        }
    }
}
