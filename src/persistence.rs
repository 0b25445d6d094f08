// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! The collection as one JSON blob under a fixed key

use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use tracing::warn;

use crate::collection::{Collection, ImageRecord};
use crate::db::KeyValueStore;
use crate::Result;

/// A stored record as read back, tolerant of every historical shape.
///
/// Older builds wrote `key` instead of `id`, had no `filename` or `caption`
/// and kept a `uri` into the picker cache. The lock flags are not read; they
/// are always re-derived from `pinned`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecord {
    #[serde(default, alias = "key")]
    pub id: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default, deserialize_with = "null_as_false")]
    pub pinned: bool,
    #[serde(default)]
    pub uri: Option<String>,
}

fn null_as_false<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

impl RawRecord {
    /// Current-schema record, `None` if any field still needs migrating
    pub fn into_current(self) -> Option<ImageRecord> {
        if self.uri.is_some() {
            return None;
        }
        Some(ImageRecord {
            id: self.id?,
            filename: self.filename?,
            caption: self.caption?,
            pinned: self.pinned,
        })
    }
}

impl From<&ImageRecord> for RawRecord {
    fn from(record: &ImageRecord) -> Self {
        Self {
            id: Some(record.id.clone()),
            filename: Some(record.filename.clone()),
            caption: Some(record.caption.clone()),
            pinned: record.pinned,
            uri: None,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoredRecord<'a> {
    id: &'a str,
    filename: &'a str,
    caption: &'a str,
    pinned: bool,
    drag_locked: bool,
    reorder_locked: bool,
}

impl<'a> From<&'a ImageRecord> for StoredRecord<'a> {
    fn from(record: &'a ImageRecord) -> Self {
        Self {
            id: &record.id,
            filename: &record.filename,
            caption: &record.caption,
            pinned: record.pinned,
            drag_locked: record.locked_for_interaction(),
            reorder_locked: record.locked_for_interaction(),
        }
    }
}

/// Serialize records in the persisted wire shape
pub fn encode(records: &[ImageRecord]) -> Result<String> {
    let stored: Vec<StoredRecord<'_>> = records.iter().map(StoredRecord::from).collect();
    Ok(serde_json::to_string(&stored)?)
}

/// Records read from a blob, plus how many entries were unreadable
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decoded {
    pub records: Vec<RawRecord>,
    pub skipped: usize,
}

/// Parse a persisted blob of any historical shape.
///
/// Only a blob that is not a JSON array is an error; entries that do not
/// parse as a record are logged and skipped.
pub fn decode(blob: &str) -> Result<Decoded> {
    let entries: Vec<serde_json::Value> = serde_json::from_str(blob)?;
    let mut decoded = Decoded {
        records: Vec::with_capacity(entries.len()),
        skipped: 0,
    };
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<RawRecord>(entry) {
            Ok(record) => decoded.records.push(record),
            Err(e) => {
                warn!("Skipping unreadable stored record #{}: {}", index, e);
                decoded.skipped += 1;
            }
        }
    }
    Ok(decoded)
}

/// Reads and writes the whole collection under one key
#[derive(Clone)]
pub struct CollectionStore {
    kv: Arc<dyn KeyValueStore>,
    key: String,
}

impl CollectionStore {
    pub fn new(kv: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self { kv, key: key.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Stored records, `None` if nothing was ever saved
    pub fn load(&self) -> Result<Option<Decoded>> {
        match self.kv.get(&self.key)? {
            Some(blob) => Ok(Some(decode(&blob)?)),
            None => Ok(None),
        }
    }

    /// Overwrite the stored blob with the whole collection
    pub fn save(&self, collection: &Collection) -> Result<()> {
        self.save_records(collection.records())
    }

    pub fn save_records(&self, records: &[ImageRecord]) -> Result<()> {
        let blob = encode(records)?;
        self.kv.set(&self.key, &blob)?;
        tracing::debug!("Saved {} records under '{}'", records.len(), self.key);
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        self.kv.remove(&self.key)
    }

    /// The raw blob as stored, for byte-level comparisons
    pub fn raw(&self) -> Result<Option<String>> {
        self.kv.get(&self.key)
    }
}
