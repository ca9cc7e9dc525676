//! Search file index
//!
//! Builds the [`SearchRecord`] set from the host vault and keeps it in step
//! with file events. The index owns the [`FuzzySearch`] used by the default
//! strategy and replaces its collection after every mutation, filtered by
//! the active [`FilterSpec`].

pub mod paths;

use crate::fuzzy::{FuzzySearch, SearchOptions};
use crate::host::{FileMetadata, HostContext, Subscription, VaultEvent, VaultFile};
use crate::model::{FileType, FilterSpec, SearchRecord};
use paths::{has_extension, join_path, last_segment};
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::{Rc, Weak};

/// What the index includes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IndexOptions {
    /// Add records for link targets that have no file yet
    pub include_unresolved: bool,
    /// Only index markdown files
    pub markdown_only: bool,
}

impl IndexOptions {
    #[must_use]
    pub const fn new(include_unresolved: bool, markdown_only: bool) -> Self {
        Self {
            include_unresolved,
            markdown_only,
        }
    }
}

/// Live candidate set of the default strategy
pub struct SearchFileIndex {
    host: HostContext,
    options: IndexOptions,
    records: Vec<SearchRecord>,
    filter: Option<FilterSpec>,
    search: FuzzySearch<SearchRecord>,
    pending_rebuild: bool,
    generation: u64,
}

impl SearchFileIndex {
    /// Build the index from the current vault content
    #[must_use]
    pub fn new(host: HostContext, options: IndexOptions, search_options: SearchOptions) -> Self {
        let mut index = Self {
            host,
            options,
            records: Vec::new(),
            filter: None,
            search: FuzzySearch::new(Vec::new(), search_options),
            pending_rebuild: false,
            generation: 0,
        };
        index.rebuild();
        index
    }

    /// Enumerate the vault into records
    ///
    /// Unresolved records are added once per distinct link text that has
    /// no extension and no record at its path.
    #[must_use]
    pub fn build(&self, include_unresolved: bool, markdown_only: bool) -> Vec<SearchRecord> {
        let files = if markdown_only {
            self.host.vault.markdown_files()
        } else {
            self.host.vault.files()
        };

        let mut records: Vec<SearchRecord> = files
            .iter()
            .map(|file| record_for(file, self.host.metadata.metadata(&file.path)))
            .collect();

        if include_unresolved {
            let unresolved = self.unresolved_records(&records);
            records.extend(unresolved);
        }
        records
    }

    /// Rebuild from scratch with the configured options
    pub fn rebuild(&mut self) {
        self.records = self.build(self.options.include_unresolved, self.options.markdown_only);
        self.pending_rebuild = false;
        tracing::debug!("Indexed {} records", self.records.len());
        self.repoint();
    }

    /// Swap options and rebuild
    pub fn set_options(&mut self, options: IndexOptions) {
        self.options = options;
        self.rebuild();
    }

    #[must_use]
    pub const fn options(&self) -> IndexOptions {
        self.options
    }

    /// Narrow the matcher to one extension or file type; `None` clears it
    pub fn set_filter(&mut self, filter: Option<FilterSpec>) {
        self.filter = filter.filter(|f| f.filter_type.is_file_filter());
        self.repoint();
    }

    #[must_use]
    pub const fn filter(&self) -> Option<&FilterSpec> {
        self.filter.as_ref()
    }

    /// Every record, unfiltered
    #[must_use]
    pub fn records(&self) -> &[SearchRecord] {
        &self.records
    }

    #[must_use]
    pub fn record(&self, path: &str) -> Option<&SearchRecord> {
        self.records.iter().find(|r| r.path == path)
    }

    /// Matcher over the filtered records
    #[must_use]
    pub const fn search(&self) -> &FuzzySearch<SearchRecord> {
        &self.search
    }

    /// Bumped whenever the matcher collection is replaced
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub const fn has_pending_rebuild(&self) -> bool {
        self.pending_rebuild
    }

    /// Existing markdown file whose basename equals `basename`
    #[must_use]
    pub fn markdown_by_basename(&self, basename: &str) -> Option<&SearchRecord> {
        self.records
            .iter()
            .find(|r| r.is_created && r.is_markdown() && r.basename == basename)
    }

    /// Insert a record for a new file, replacing an unresolved one at its path
    pub fn on_create(&mut self, file: &VaultFile) {
        if self.options.markdown_only && !file.is_markdown() {
            return;
        }
        let record = record_for(file, self.host.metadata.metadata(&file.path));
        match self.records.iter().position(|r| r.path == file.path) {
            Some(pos) => self.records[pos] = record,
            None => self.records.push(record),
        }
        self.mark_stale();
        self.repoint();
    }

    /// Move a record; an unknown old path behaves like a create
    pub fn on_rename(&mut self, file: &VaultFile, old_path: &str) {
        let before = self.records.len();
        self.records.retain(|r| r.path != old_path);
        if self.options.markdown_only && !file.is_markdown() {
            // the new path is not indexed, only the removal is visible
            if self.records.len() != before {
                self.mark_stale();
                self.repoint();
            }
            return;
        }
        self.on_create(file);
    }

    /// Drop the record at `path`; unknown paths are ignored
    pub fn on_delete(&mut self, path: &str) {
        let before = self.records.len();
        self.records.retain(|r| r.path != path);
        if self.records.len() != before {
            self.repoint();
        }
    }

    /// Refresh derived fields of one file and pick up new unresolved links
    pub fn on_metadata_resolved(&mut self, file: &VaultFile) {
        let metadata = self.host.metadata.metadata(&file.path);
        if let Some(record) = self.records.iter_mut().find(|r| r.path == file.path) {
            *record = record_for(file, metadata);
        }
        if self.options.include_unresolved {
            let unresolved = self.unresolved_records(&self.records);
            self.records.extend(unresolved);
        }
        self.mark_stale();
        self.repoint();
    }

    /// Run a rebuild that was deferred while metadata was settling
    pub fn on_cache_settled(&mut self) {
        if self.pending_rebuild {
            self.rebuild();
        }
    }

    /// Dispatch a host event
    pub fn handle_event(&mut self, event: &VaultEvent) {
        match event {
            VaultEvent::Created(file) => self.on_create(file),
            VaultEvent::Deleted(file) => self.on_delete(&file.path),
            VaultEvent::Renamed { file, old_path } => self.on_rename(file, old_path),
            VaultEvent::MetadataResolved(file) => self.on_metadata_resolved(file),
            VaultEvent::CacheSettled => self.on_cache_settled(),
        }
    }

    /// Follow the vault's events until the subscription is dropped
    #[must_use = "dropping the subscription stops index updates"]
    pub fn attach(index: &Rc<RefCell<Self>>) -> Subscription {
        let events = index.borrow().host.vault.events();
        let weak: Weak<RefCell<Self>> = Rc::downgrade(index);
        events.subscribe(move |event| {
            if let Some(index) = weak.upgrade() {
                index.borrow_mut().handle_event(event);
            }
        })
    }

    /// A filtered matcher works on derived fields; refresh once they settle
    fn mark_stale(&mut self) {
        if self.filter.is_some() {
            self.pending_rebuild = true;
        }
    }

    fn repoint(&mut self) {
        let records = match &self.filter {
            Some(filter) => self
                .records
                .iter()
                .filter(|r| filter.accepts(r.extension.as_deref(), r.file_type))
                .cloned()
                .collect(),
            None => self.records.clone(),
        };
        self.search.update_collection(records);
        self.generation += 1;
    }

    fn unresolved_records(&self, existing: &[SearchRecord]) -> Vec<SearchRecord> {
        let new_file_parent = self.host.vault.default_new_file_parent();
        let mut taken: HashSet<String> = existing.iter().map(|r| r.path.clone()).collect();

        self.host
            .metadata
            .unresolved_links()
            .into_iter()
            .filter(|link| !has_extension(link))
            .map(|link| unresolved_record(&link, &new_file_parent))
            .filter(|record| taken.insert(record.path.clone()))
            .collect()
    }
}

/// Record for a vault file with whatever metadata is known
#[must_use]
pub fn record_for(file: &VaultFile, metadata: Option<FileMetadata>) -> SearchRecord {
    let record = SearchRecord::file(file.path.clone());
    match metadata {
        Some(metadata) => {
            let aliases = metadata.aliases();
            record.with_metadata(metadata.title, aliases, metadata.headings)
        }
        None => record,
    }
}

/// Not-yet-created note a link points to
///
/// A link without a folder lands in the host's folder for new notes.
#[must_use]
pub fn unresolved_record(link: &str, new_file_parent: &str) -> SearchRecord {
    let basename = last_segment(link).to_string();
    let path = if link.contains('/') {
        format!("{link}.md")
    } else {
        join_path(new_file_parent, &format!("{link}.md"))
    };
    SearchRecord {
        name: format!("{basename}.md"),
        basename,
        path,
        aliases: None,
        title: None,
        headings: None,
        is_created: false,
        is_unresolved: true,
        file_type: FileType::Markdown,
        extension: Some("md".to_string()),
    }
}
