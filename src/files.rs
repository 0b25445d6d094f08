// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Image file store and cache housekeeping
//!
//! Every operation here is best effort: failures are logged and reported as
//! `false` (or skipped), never propagated into the collection logic.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, error, info, warn};

use crate::Result;

/// App-owned image directory plus the volatile cache next to it
#[derive(Debug, Clone)]
pub struct FileStore {
    images_dir: PathBuf,
    cache_dir: PathBuf,
}

impl FileStore {
    pub fn new(images_dir: impl Into<PathBuf>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            images_dir: images_dir.into(),
            cache_dir: cache_dir.into(),
        }
    }

    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Absolute path of `filename` inside the image directory
    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.images_dir.join(filename)
    }

    /// Copy `source` into the image directory as `filename`
    pub async fn store(&self, source: &Path, filename: &str) -> bool {
        if let Err(e) = fs::create_dir_all(&self.images_dir).await {
            error!("Failed to create image directory {:?}: {}", self.images_dir, e);
            return false;
        }

        let destination = self.path_for(filename);
        match fs::copy(source, &destination).await {
            Ok(bytes) => {
                debug!("Stored {:?} -> {:?} ({} bytes)", source, destination, bytes);
                true
            }
            Err(e) => {
                error!("Failed to store {:?} as {}: {}", source, filename, e);
                false
            }
        }
    }

    /// Remove `filename` from the image directory
    pub async fn delete(&self, filename: &str) -> bool {
        match fs::remove_file(self.path_for(filename)).await {
            Ok(()) => {
                debug!("Deleted image file {}", filename);
                true
            }
            Err(e) => {
                error!("Failed to delete image file {}: {}", filename, e);
                false
            }
        }
    }

    /// Names of everything in the image directory (diagnostics only)
    pub async fn list_contents(&self) -> Vec<String> {
        let mut names = Vec::new();
        let mut entries = match fs::read_dir(&self.images_dir).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Cannot read image directory {:?}: {}", self.images_dir, e);
                return names;
            }
        };

        loop {
            match entries.next_entry().await {
                Ok(Some(entry)) => names.push(entry.file_name().to_string_lossy().into_owned()),
                Ok(None) => break,
                Err(e) => {
                    warn!("Error while listing {:?}: {}", self.images_dir, e);
                    break;
                }
            }
        }

        names.sort();
        names
    }

    /// Recursively remove the image directory; missing directory is fine
    pub async fn delete_all(&self) -> Result<()> {
        match fs::remove_dir_all(&self.images_dir).await {
            Ok(()) => {
                info!("Removed image directory {:?}", self.images_dir);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete every entry directly under the cache directory.
    ///
    /// Returns how many entries were removed.
    pub async fn clear_cache(&self) -> usize {
        let mut entries = match fs::read_dir(&self.cache_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return 0,
            Err(e) => {
                error!("Cannot read cache directory {:?}: {}", self.cache_dir, e);
                return 0;
            }
        };

        let mut removed = 0;
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    error!("Error while listing cache {:?}: {}", self.cache_dir, e);
                    break;
                }
            };

            let path = entry.path();
            let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
            let result = if is_dir {
                fs::remove_dir_all(&path).await
            } else {
                fs::remove_file(&path).await
            };

            match result {
                Ok(()) => removed += 1,
                Err(e) => error!("Failed to delete cache entry {:?}: {}", path, e),
            }
        }

        info!("Cleared {} cache entries", removed);
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> FileStore {
        FileStore::new(dir.path().join("images"), dir.path().join("cache"))
    }

    #[tokio::test]
    async fn test_store_creates_directory_and_copies() {
        let dir = TempDir::new().unwrap();
        let files = store_in(&dir);
        let source = dir.path().join("picked.png");
        std::fs::write(&source, b"png bytes").unwrap();

        assert!(files.store(&source, "abc-picked.png").await);
        assert_eq!(std::fs::read(files.path_for("abc-picked.png")).unwrap(), b"png bytes");

        // second store into an existing directory
        assert!(files.store(&source, "def.png").await);
        assert_eq!(files.list_contents().await, vec!["abc-picked.png", "def.png"]);
    }

    #[tokio::test]
    async fn test_store_missing_source_reports_failure() {
        let dir = TempDir::new().unwrap();
        let files = store_in(&dir);
        assert!(!files.store(&dir.path().join("gone.jpg"), "x.jpg").await);
        assert!(!files.path_for("x.jpg").exists());
    }

    #[tokio::test]
    async fn test_delete() {
        let dir = TempDir::new().unwrap();
        let files = store_in(&dir);
        std::fs::create_dir_all(files.images_dir()).unwrap();
        std::fs::write(files.path_for("a.jpg"), b"a").unwrap();

        assert!(files.delete("a.jpg").await);
        assert!(!files.delete("a.jpg").await);
        assert!(files.list_contents().await.is_empty());
    }

    #[tokio::test]
    async fn test_list_contents_without_directory() {
        let dir = TempDir::new().unwrap();
        assert!(store_in(&dir).list_contents().await.is_empty());
    }

    #[tokio::test]
    async fn test_delete_all_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let files = store_in(&dir);
        std::fs::create_dir_all(files.images_dir().join("nested")).unwrap();
        std::fs::write(files.path_for("a.jpg"), b"a").unwrap();

        files.delete_all().await.unwrap();
        assert!(!files.images_dir().exists());
        files.delete_all().await.unwrap();
    }

    #[tokio::test]
    async fn test_clear_cache_leaves_images_alone() {
        let dir = TempDir::new().unwrap();
        let files = store_in(&dir);
        std::fs::create_dir_all(files.cache_dir().join("ImagePicker")).unwrap();
        std::fs::write(files.cache_dir().join("ImagePicker").join("1.jpg"), b"1").unwrap();
        std::fs::write(files.cache_dir().join("2.jpg"), b"2").unwrap();
        std::fs::create_dir_all(files.images_dir()).unwrap();
        std::fs::write(files.path_for("keep.jpg"), b"k").unwrap();

        assert_eq!(files.clear_cache().await, 2);
        assert!(files.cache_dir().exists());
        assert_eq!(std::fs::read_dir(files.cache_dir()).unwrap().count(), 0);
        assert!(files.path_for("keep.jpg").exists());

        // missing cache directory is a no-op
        std::fs::remove_dir_all(files.cache_dir()).unwrap();
        assert_eq!(files.clear_cache().await, 0);
    }
}
