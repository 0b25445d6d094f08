// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! pingallery: local photo gallery store
//!
//! Keeps an ordered collection of imported images with up to three pinned
//! favorites, captions and drag ordering. Image bytes live in a private
//! `images/` directory; the collection itself is one JSON blob under a fixed
//! key in a key-value store.

pub mod collection;
pub mod config;
pub mod db;
pub mod error;
pub mod files;
pub mod gallery;
pub mod import;
pub mod migration;
pub mod persistence;

pub use collection::{Collection, ImageRecord, PinOutcome, Session, PIN_LIMIT};
pub use config::AppConfig;
pub use error::{GalleryError, Result};
pub use gallery::Gallery;
pub use import::PickedAsset;
