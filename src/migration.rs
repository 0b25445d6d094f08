// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Upgrade stored records to the current schema
//!
//! Each record is handled on its own: missing captions become empty, missing
//! filenames are derived or generated, bytes still sitting in the volatile
//! cache are copied into the image directory and the `uri` field is dropped.
//! All copies are awaited before the collection is handed back.

use futures_util::future::join_all;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

use crate::collection::ImageRecord;
use crate::config::AppConfig;
use crate::files::FileStore;
use crate::persistence::RawRecord;

/// What a migration pass did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub records: usize,
    /// Records that were not already in the current schema
    pub upgraded: usize,
    pub copied: usize,
    pub failed_copies: usize,
    /// Stored entries that could not be read at all
    pub skipped: usize,
}

impl MigrationReport {
    pub fn changed(&self) -> bool {
        self.upgraded > 0
    }
}

/// Runs the per-record upgrade against a file store
pub struct Migrator<'a> {
    files: &'a FileStore,
    cache_marker: String,
    default_extension: String,
}

struct CopyJob {
    source: PathBuf,
    filename: String,
}

impl<'a> Migrator<'a> {
    pub fn new(files: &'a FileStore, cache_marker: impl Into<String>, default_extension: impl Into<String>) -> Self {
        Self {
            files,
            cache_marker: cache_marker.into(),
            default_extension: default_extension.into(),
        }
    }

    pub fn from_config(files: &'a FileStore, config: &AppConfig) -> Self {
        Self::new(files, &config.migration.cache_marker, &config.migration.default_extension)
    }

    /// Upgrade every record; never fails, copy errors are only counted
    pub async fn migrate(&self, raw: Vec<RawRecord>) -> (Vec<ImageRecord>, MigrationReport) {
        let mut report = MigrationReport {
            records: raw.len(),
            ..Default::default()
        };
        let mut records = Vec::with_capacity(raw.len());
        let mut jobs = Vec::new();

        for item in raw {
            let (record, job, upgraded) = self.upgrade(item);
            if upgraded {
                report.upgraded += 1;
            }
            if let Some(job) = job {
                jobs.push(job);
            }
            records.push(record);
        }

        let results = join_all(jobs.iter().map(|job| self.files.store(&job.source, &job.filename))).await;
        for (job, ok) in jobs.iter().zip(results) {
            if ok {
                report.copied += 1;
            } else {
                report.failed_copies += 1;
                warn!("Migration copy failed for {:?}; record {} kept without its file", job.source, job.filename);
            }
        }

        if report.changed() {
            info!(
                "Migrated {} of {} records ({} files copied, {} failed)",
                report.upgraded, report.records, report.copied, report.failed_copies
            );
        }
        (records, report)
    }

    fn upgrade(&self, raw: RawRecord) -> (ImageRecord, Option<CopyJob>, bool) {
        let mut upgraded = raw.uri.is_some();

        let id = raw.id.unwrap_or_else(|| {
            upgraded = true;
            Uuid::new_v4().to_string()
        });

        let caption = raw.caption.unwrap_or_else(|| {
            upgraded = true;
            String::new()
        });

        let source = raw.uri.as_deref().map(uri_to_path);
        let from_cache = raw.uri.as_deref().is_some_and(|uri| self.is_cache_uri(uri));

        let filename = match raw.filename {
            Some(filename) => filename,
            None => {
                upgraded = true;
                source
                    .as_deref()
                    .filter(|_| !from_cache)
                    .and_then(|path| self.permanent_name(path))
                    .unwrap_or_else(|| format!("{}.{}", Uuid::new_v4(), self.default_extension))
            }
        };

        let job = match source {
            Some(source) if from_cache => {
                debug!("Record {} needs its file copied out of the cache", id);
                Some(CopyJob { source, filename: filename.clone() })
            }
            _ => None,
        };

        let record = ImageRecord {
            id,
            filename,
            caption,
            pinned: raw.pinned,
        };
        (record, job, upgraded)
    }

    fn is_cache_uri(&self, uri: &str) -> bool {
        uri.contains(&self.cache_marker) || uri_to_path(uri).starts_with(self.files.cache_dir())
    }

    // Legacy URIs that already point into the image directory keep their name
    fn permanent_name(&self, path: &Path) -> Option<String> {
        let in_images = path.starts_with(self.files.images_dir())
            || path.parent().and_then(Path::file_name).is_some_and(|dir| dir == "images");
        if !in_images {
            return None;
        }
        path.file_name().map(|name| name.to_string_lossy().into_owned())
    }
}

/// `file:///a/My%20Pics/b.jpg` -> `/a/My Pics/b.jpg`; plain paths pass through
pub fn uri_to_path(uri: &str) -> PathBuf {
    if !uri.starts_with("file:") {
        return PathBuf::from(uri);
    }
    Url::parse(uri)
        .ok()
        .and_then(|url| url.to_file_path().ok())
        .unwrap_or_else(|| {
            debug!("Unparseable file URI {}; using it as a path", uri);
            PathBuf::from(uri)
        })
}
