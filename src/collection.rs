// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Ordered image collection with pinning, captions and drag reordering
//!
//! Invariants held by every operation:
//! - at most [`PIN_LIMIT`] records are pinned
//! - pinned records form a contiguous prefix of the collection

use serde::Serialize;
use std::collections::HashSet;
use thiserror::Error;

/// Maximum number of pinned records
pub const PIN_LIMIT: usize = 3;

/// A single image in the collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    pub id: String,
    /// Name of the file inside the images directory
    pub filename: String,
    pub caption: String,
    pub pinned: bool,
}

impl ImageRecord {
    pub fn new(id: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            filename: filename.into(),
            caption: String::new(),
            pinned: false,
        }
    }

    /// Pinned records can be neither dragged nor displaced by a drag
    pub fn locked_for_interaction(&self) -> bool {
        self.pinned
    }
}

/// Result of a pin toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinOutcome {
    Pinned,
    Unpinned,
    /// The record is unpinned and the pin limit is already reached
    LimitReached,
    NotFound,
}

/// Why a drag result was refused
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReorderError {
    #[error("expected {expected} ids, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("unknown id: {0}")]
    UnknownId(String),

    #[error("duplicate id: {0}")]
    DuplicateId(String),

    #[error("pinned record {0} cannot change position")]
    PinnedMoved(String),
}

/// The ordered collection; display order is persisted order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collection {
    records: Vec<ImageRecord>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection from stored records, restoring the invariants.
    ///
    /// Pins past the limit are dropped in stored order, then pinned records
    /// are moved to the front.
    pub fn from_records(records: Vec<ImageRecord>) -> Self {
        let mut collection = Self { records };
        let mut seen = 0;
        for record in collection.records.iter_mut().filter(|r| r.pinned) {
            seen += 1;
            if seen > PIN_LIMIT {
                tracing::warn!("Unpinning {} (pin limit {} exceeded in stored data)", record.id, PIN_LIMIT);
                record.pinned = false;
            }
        }
        collection.partition_pinned();
        collection
    }

    pub fn records(&self) -> &[ImageRecord] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&ImageRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn pinned_count(&self) -> usize {
        self.records.iter().filter(|r| r.pinned).count()
    }

    pub fn ids(&self) -> Vec<String> {
        self.records.iter().map(|r| r.id.clone()).collect()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Insert a batch of new imports right after the pinned block.
    ///
    /// New records are never pinned.
    pub fn add_batch(&mut self, batch: Vec<ImageRecord>) {
        let existing = std::mem::take(&mut self.records);
        let (pinned, unpinned): (Vec<_>, Vec<_>) = existing.into_iter().partition(|r| r.pinned);

        self.records.reserve(pinned.len() + batch.len() + unpinned.len());
        self.records.extend(pinned);
        self.records.extend(batch.into_iter().map(|mut r| {
            r.pinned = false;
            r
        }));
        self.records.extend(unpinned);
    }

    pub fn remove(&mut self, id: &str) -> Option<ImageRecord> {
        let index = self.position(id)?;
        Some(self.records.remove(index))
    }

    /// Whether the pin control for `id` is enabled
    pub fn can_toggle_pin(&self, id: &str) -> bool {
        match self.get(id) {
            Some(record) => record.pinned || self.pinned_count() < PIN_LIMIT,
            None => false,
        }
    }

    /// Flip the pin state of `id` and move pinned records to the front
    pub fn toggle_pin(&mut self, id: &str) -> PinOutcome {
        let Some(index) = self.position(id) else {
            return PinOutcome::NotFound;
        };
        if !self.records[index].pinned && self.pinned_count() >= PIN_LIMIT {
            return PinOutcome::LimitReached;
        }

        let record = &mut self.records[index];
        record.pinned = !record.pinned;
        let outcome = if record.pinned { PinOutcome::Pinned } else { PinOutcome::Unpinned };

        self.partition_pinned();
        outcome
    }

    /// Replace the caption of `id`; false if no such record
    pub fn set_caption(&mut self, id: &str, caption: impl Into<String>) -> bool {
        match self.records.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                record.caption = caption.into();
                true
            }
            None => false,
        }
    }

    /// Apply a drag result.
    ///
    /// `ids` must be exactly a permutation of the current ids and every
    /// pinned record must keep its index. On error nothing changes.
    pub fn reorder(&mut self, ids: &[String]) -> std::result::Result<(), ReorderError> {
        if ids.len() != self.records.len() {
            return Err(ReorderError::LengthMismatch {
                expected: self.records.len(),
                actual: ids.len(),
            });
        }

        let mut seen = HashSet::with_capacity(ids.len());
        let mut reordered = Vec::with_capacity(ids.len());
        for (index, id) in ids.iter().enumerate() {
            if !seen.insert(id.as_str()) {
                return Err(ReorderError::DuplicateId(id.clone()));
            }
            let record = self.get(id).ok_or_else(|| ReorderError::UnknownId(id.clone()))?;
            if record.locked_for_interaction() && self.records[index].id != *id {
                return Err(ReorderError::PinnedMoved(id.clone()));
            }
            reordered.push(record.clone());
        }

        self.records = reordered;
        Ok(())
    }

    // Stable: relative order inside each block is kept
    fn partition_pinned(&mut self) {
        self.records.sort_by_key(|r| !r.pinned);
    }
}

/// Per-session UI state; never persisted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    selected: Option<String>,
    caption_draft: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_editing_caption(&self) -> bool {
        self.caption_draft.is_some()
    }

    pub fn caption_draft(&self) -> Option<&str> {
        self.caption_draft.as_deref()
    }

    /// Tap on a record: select it, or clear the selection if it was selected
    pub fn toggle_selection(&mut self, id: &str) {
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        } else {
            self.selected = Some(id.to_string());
        }
    }

    /// Drop the selection if it points at `id`
    pub fn forget(&mut self, id: &str) {
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
            self.caption_draft = None;
        }
    }

    pub fn begin_caption_edit(&mut self, current: &str) {
        self.caption_draft = Some(current.to_string());
    }

    /// Replace the draft text; ignored when no edit is active
    pub fn update_caption_draft(&mut self, text: impl Into<String>) {
        if let Some(draft) = self.caption_draft.as_mut() {
            *draft = text.into();
        }
    }

    pub fn take_caption_draft(&mut self) -> Option<String> {
        self.caption_draft.take()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
