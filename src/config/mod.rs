// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Configuration management for pingallery

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// App-private root; images live under `<data_dir>/images`
    pub data_dir: String,

    /// Volatile cache directory (disposable scratch space)
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,

    /// Key-value storage settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Legacy record migration settings
    #[serde(default)]
    pub migration: MigrationConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Sqlite,
    Memory,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_backend")]
    pub backend: StorageBackend,
    /// Database path; relative paths resolve against `data_dir`
    #[serde(default = "default_db_path")]
    pub path: String,
    /// The single key the collection is stored under
    #[serde(default = "default_collection_key")]
    pub key: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MigrationConfig {
    /// Path segment identifying URIs inside the volatile cache
    #[serde(default = "default_cache_marker")]
    pub cache_marker: String,
    /// Extension for filenames generated during migration
    #[serde(default = "default_extension")]
    pub default_extension: String,
}

// Default value functions
fn default_cache_dir() -> String { "./gallery/cache".to_string() }
fn default_backend() -> StorageBackend { StorageBackend::Sqlite }
fn default_db_path() -> String { "gallery.db".to_string() }
fn default_collection_key() -> String { "imageData".to_string() }
fn default_cache_marker() -> String { "Library/Caches".to_string() }
fn default_extension() -> String { "jpg".to_string() }

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: "./gallery".to_string(),
            cache_dir: default_cache_dir(),
            storage: StorageConfig::default(),
            migration: MigrationConfig::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            path: default_db_path(),
            key: default_collection_key(),
        }
    }
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            cache_marker: default_cache_marker(),
            default_extension: default_extension(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = serde_json::from_str(&content)
                .map_err(|e| crate::GalleryError::Config(format!("Failed to parse config: {}", e)))?;
            config.validate()?;
            Ok(config)
        } else {
            tracing::info!("Config file not found at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject settings that would make the store unusable
    pub fn validate(&self) -> crate::Result<()> {
        if self.data_dir.trim().is_empty() {
            return Err(crate::GalleryError::Config("data_dir must not be empty".to_string()));
        }
        if self.storage.key.trim().is_empty() {
            return Err(crate::GalleryError::Config("storage.key must not be empty".to_string()));
        }
        if self.migration.cache_marker.is_empty() {
            return Err(crate::GalleryError::Config(
                "migration.cache_marker must not be empty".to_string(),
            ));
        }
        let extension = &self.migration.default_extension;
        if extension.is_empty() || !extension.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(crate::GalleryError::Config(format!(
                "migration.default_extension must be a bare extension like \"jpg\", got {:?}",
                extension
            )));
        }
        Ok(())
    }

    /// Directory holding image bytes
    pub fn images_dir(&self) -> PathBuf {
        Path::new(&self.data_dir).join("images")
    }

    pub fn cache_dir(&self) -> PathBuf {
        PathBuf::from(&self.cache_dir)
    }

    /// Resolved database path
    pub fn db_path(&self) -> PathBuf {
        let path = Path::new(&self.storage.path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            Path::new(&self.data_dir).join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig::load(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config.storage.key, "imageData");
        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
        assert_eq!(config.migration.cache_marker, "Library/Caches");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"data_dir": "/var/gallery", "storage": {"backend": "memory"}}"#).unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.data_dir, "/var/gallery");
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.storage.path, "gallery.db");
        assert_eq!(config.images_dir(), PathBuf::from("/var/gallery/images"));
        assert_eq!(config.db_path(), PathBuf::from("/var/gallery/gallery.db"));
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let mut config = AppConfig::default();
        config.storage.key = "photos".to_string();
        config.save(&path).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded.storage.key, "photos");
    }

    #[test]
    fn test_empty_key_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"data_dir": "x", "storage": {"key": " "}}"#).unwrap();
        assert!(matches!(AppConfig::load(&path), Err(crate::GalleryError::Config(_))));
    }

    #[test]
    fn test_bad_default_extension_rejected() {
        for extension in ["", " ", ".jpg", "a/b"] {
            let mut config = AppConfig::default();
            config.migration.default_extension = extension.to_string();
            assert!(
                matches!(config.validate(), Err(crate::GalleryError::Config(_))),
                "{:?} should be rejected",
                extension
            );
        }

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"migration": {"default_extension": ""}}"#).unwrap();
        assert!(matches!(AppConfig::load(&path), Err(crate::GalleryError::Config(_))));

        let mut config = AppConfig::default();
        config.migration.default_extension = "heic".to_string();
        assert!(config.validate().is_ok());
    }
}
