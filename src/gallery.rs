// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Gallery service: the collection bound to its file store and persistence
//!
//! Every mutation rewrites the whole collection. Collaborator failures are
//! logged and swallowed; the in-memory collection stays authoritative for
//! the rest of the session.

use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::collection::{Collection, ImageRecord, PinOutcome, ReorderError, Session};
use crate::config::{AppConfig, StorageBackend};
use crate::db::{KeyValueStore, MemoryStore, SqliteStore};
use crate::files::FileStore;
use crate::import::{import_assets, PickedAsset};
use crate::migration::{MigrationReport, Migrator};
use crate::persistence::CollectionStore;
use crate::Result;

pub struct Gallery {
    collection: Collection,
    session: Session,
    files: FileStore,
    store: CollectionStore,
    cache_marker: String,
    default_extension: String,
}

impl Gallery {
    /// Open the configured backend and load the stored collection
    pub async fn open(config: &AppConfig) -> Result<Self> {
        let kv: Arc<dyn KeyValueStore> = match config.storage.backend {
            StorageBackend::Sqlite => Arc::new(SqliteStore::open(config.db_path())?),
            StorageBackend::Memory => Arc::new(MemoryStore::new()),
        };
        let mut gallery = Self::new(config, kv);
        gallery.load().await;
        Ok(gallery)
    }

    /// An empty gallery over `kv`; call [`Gallery::load`] to read stored data
    pub fn new(config: &AppConfig, kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            collection: Collection::new(),
            session: Session::new(),
            files: FileStore::new(config.images_dir(), config.cache_dir()),
            store: CollectionStore::new(kv, config.storage.key.clone()),
            cache_marker: config.migration.cache_marker.clone(),
            default_extension: config.migration.default_extension.clone(),
        }
    }

    /// Read, migrate and install the stored collection.
    ///
    /// A store that cannot be read, or a blob that is not a JSON array,
    /// leaves an empty collection. Unreadable entries are skipped.
    pub async fn load(&mut self) -> MigrationReport {
        let decoded = match self.store.load() {
            Ok(Some(decoded)) => decoded,
            Ok(None) => {
                debug!("No stored collection under '{}'", self.store.key());
                self.collection = Collection::new();
                return MigrationReport::default();
            }
            Err(e) => {
                error!("Failed to load collection: {}", e);
                self.collection = Collection::new();
                return MigrationReport::default();
            }
        };

        let migrator = Migrator::new(&self.files, &self.cache_marker, &self.default_extension);
        let (records, mut report) = migrator.migrate(decoded.records).await;
        report.skipped = decoded.skipped;
        if report.skipped > 0 {
            warn!("Dropped {} unreadable stored records; the rest were kept", report.skipped);
        }
        let before = records.clone();
        let collection = Collection::from_records(records);
        let normalized = collection.records() != before.as_slice();

        self.collection = collection;
        self.session.reset();
        info!("Loaded {} images ({} pinned)", self.collection.len(), self.collection.pinned_count());

        if report.changed() || normalized {
            self.persist();
        }
        report
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    pub fn records(&self) -> &[ImageRecord] {
        self.collection.records()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn files(&self) -> &FileStore {
        &self.files
    }

    pub fn selected(&self) -> Option<&ImageRecord> {
        self.session.selected().and_then(|id| self.collection.get(id))
    }

    /// Import picked images; new records land right after the pinned block
    pub async fn import(&mut self, assets: &[PickedAsset]) -> Vec<ImageRecord> {
        if self.session.is_editing_caption() {
            debug!("Import ignored while a caption edit is active");
            return Vec::new();
        }
        if assets.is_empty() {
            return Vec::new();
        }

        let records = import_assets(&self.files, assets).await;
        self.collection.add_batch(records.clone());
        info!("Imported {} images", records.len());
        self.persist();
        records
    }

    /// Delete a record and its file; false if it does not exist
    pub async fn remove(&mut self, id: &str) -> bool {
        if self.session.is_editing_caption() {
            debug!("Remove ignored while a caption edit is active");
            return false;
        }
        let Some(record) = self.collection.remove(id) else {
            warn!("Remove: no image with id {}", id);
            return false;
        };

        self.files.delete(&record.filename).await;
        self.session.forget(id);
        self.persist();
        true
    }

    pub async fn remove_selected(&mut self) -> bool {
        match self.session.selected().map(str::to_string) {
            Some(id) => self.remove(&id).await,
            None => false,
        }
    }

    pub fn can_toggle_pin(&self, id: &str) -> bool {
        self.collection.can_toggle_pin(id)
    }

    pub fn toggle_pin(&mut self, id: &str) -> PinOutcome {
        let outcome = self.collection.toggle_pin(id);
        match outcome {
            PinOutcome::Pinned | PinOutcome::Unpinned => self.persist(),
            PinOutcome::LimitReached => debug!("Pin refused for {}: limit reached", id),
            PinOutcome::NotFound => warn!("Pin: no image with id {}", id),
        }
        outcome
    }

    pub fn set_caption(&mut self, id: &str, caption: impl Into<String>) -> bool {
        if !self.collection.set_caption(id, caption) {
            warn!("Caption: no image with id {}", id);
            return false;
        }
        self.persist();
        true
    }

    /// Apply a drag result; malformed orders are rejected and logged
    pub fn reorder(&mut self, ids: &[String]) -> std::result::Result<(), ReorderError> {
        if let Err(e) = self.collection.reorder(ids) {
            warn!("Rejected reorder: {}", e);
            return Err(e);
        }
        self.persist();
        Ok(())
    }

    /// Tap on a record; refused while a caption edit is active
    pub fn select(&mut self, id: &str) -> bool {
        if self.session.is_editing_caption() || self.collection.get(id).is_none() {
            return false;
        }
        self.session.toggle_selection(id);
        true
    }

    /// Start editing the selected record's caption; returns the draft
    pub fn begin_caption_edit(&mut self) -> Option<&str> {
        if !self.session.is_editing_caption() {
            let caption = self.selected()?.caption.clone();
            self.session.begin_caption_edit(&caption);
        }
        self.session.caption_draft()
    }

    pub fn update_caption_draft(&mut self, text: impl Into<String>) {
        self.session.update_caption_draft(text);
    }

    /// Save the draft onto the selected record
    pub fn commit_caption_edit(&mut self) -> bool {
        let Some(draft) = self.session.take_caption_draft() else {
            return false;
        };
        match self.session.selected().map(str::to_string) {
            Some(id) => self.set_caption(&id, draft),
            None => false,
        }
    }

    pub fn cancel_caption_edit(&mut self) {
        self.session.take_caption_draft();
    }

    /// Remove the stored record and every image file
    pub async fn reset(&mut self) {
        if let Err(e) = self.store.clear() {
            error!("Failed to clear stored collection: {}", e);
        }
        if let Err(e) = self.files.delete_all().await {
            error!("Failed to delete image directory: {}", e);
        }
        self.collection.clear();
        self.session.reset();
        info!("All gallery data deleted");
    }

    pub async fn clear_cache(&self) -> usize {
        self.files.clear_cache().await
    }

    pub async fn list_files(&self) -> Vec<String> {
        self.files.list_contents().await
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(&self.collection) {
            error!("Failed to save collection: {}", e);
        }
    }
}
