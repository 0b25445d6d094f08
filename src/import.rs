// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Picker results to stored files and fresh records

use image::ImageFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::collection::ImageRecord;
use crate::files::FileStore;

const FALLBACK_EXTENSION: &str = "jpg";

/// One image returned by the picker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickedAsset {
    pub source_path: PathBuf,
    pub original_name: Option<String>,
    pub mime_type: Option<String>,
}

impl PickedAsset {
    pub fn new(source_path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            original_name: None,
            mime_type: None,
        }
    }

    /// Asset for a local file, name taken from the path
    pub fn from_path(path: &Path) -> Self {
        Self {
            source_path: path.to_path_buf(),
            original_name: path.file_name().map(|n| n.to_string_lossy().into_owned()),
            mime_type: None,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

/// Filename for a newly imported image with the given id.
///
/// `<id>-<original name>` when the picker knows the name, otherwise
/// `<id>.<ext>` with the extension taken from the MIME type.
pub fn filename_for(id: &str, asset: &PickedAsset) -> String {
    if let Some(name) = asset.original_name.as_deref().map(sanitize).filter(|n| !n.is_empty()) {
        return format!("{}-{}", id, name);
    }
    let ext = asset
        .mime_type
        .as_deref()
        .and_then(extension_for_mime)
        .unwrap_or(FALLBACK_EXTENSION);
    format!("{}.{}", id, ext)
}

fn extension_for_mime(mime: &str) -> Option<&'static str> {
    ImageFormat::from_mime_type(mime)
        .and_then(|format| format.extensions_str().first().copied())
}

// The image directory is flat
fn sanitize(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | '\0') { '_' } else { c })
        .collect()
}

/// Copy each asset into the store and build its record.
///
/// A failed copy still yields a record; the file store has already logged it.
pub async fn import_assets(files: &FileStore, assets: &[PickedAsset]) -> Vec<ImageRecord> {
    let mut records = Vec::with_capacity(assets.len());
    for asset in assets {
        let id = Uuid::new_v4().to_string();
        let filename = filename_for(&id, asset);
        if !files.store(&asset.source_path, &filename).await {
            tracing::warn!("Imported {} without its file ({:?})", id, asset.source_path);
        }
        records.push(ImageRecord::new(id, filename));
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_filename_prefers_original_name() {
        let asset = PickedAsset {
            source_path: PathBuf::from("/tmp/x"),
            original_name: Some("IMG_0001.HEIC".to_string()),
            mime_type: Some("image/heic".to_string()),
        };
        assert_eq!(filename_for("id1", &asset), "id1-IMG_0001.HEIC");
    }

    #[test]
    fn test_filename_from_mime_type() {
        let asset = PickedAsset::new("/tmp/x").with_mime_type("image/png");
        assert_eq!(filename_for("id1", &asset), "id1.png");
    }

    #[test]
    fn test_filename_fallback() {
        assert_eq!(filename_for("id1", &PickedAsset::new("/tmp/x")), "id1.jpg");
        let odd = PickedAsset::new("/tmp/x").with_mime_type("application/x-nothing");
        assert_eq!(filename_for("id1", &odd), "id1.jpg");
    }

    #[test]
    fn test_filename_strips_separators() {
        let asset = PickedAsset {
            original_name: Some("../etc/passwd".to_string()),
            ..PickedAsset::new("/tmp/x")
        };
        assert_eq!(filename_for("id1", &asset), "id1-.._etc_passwd");
    }

    #[tokio::test]
    async fn test_import_assets() {
        let dir = TempDir::new().unwrap();
        let files = FileStore::new(dir.path().join("images"), dir.path().join("cache"));
        let source = dir.path().join("beach.png");
        std::fs::write(&source, b"png").unwrap();

        let assets = vec![PickedAsset::from_path(&source), PickedAsset::new(dir.path().join("missing.jpg"))];
        let records = import_assets(&files, &assets).await;

        assert_eq!(records.len(), 2);
        assert!(records[0].filename.starts_with(&records[0].id));
        assert!(records[0].filename.ends_with("-beach.png"));
        assert!(files.path_for(&records[0].filename).exists());
        assert!(!files.path_for(&records[1].filename).exists());
        assert!(records.iter().all(|r| !r.pinned && r.caption.is_empty()));
    }
}
