//! Object storage client.
//!
//! This crate provides:
//! - The [`ObjectStore`] trait (get/put/paginated list/delete)
//! - An S3 implementation and an in-memory implementation
//! - File download/upload helpers
//! - Background track selection

pub mod client;
pub mod error;
pub mod memory;
pub mod music;
pub mod store;

pub use client::{S3Config, S3Store};
pub use error::{StorageError, StorageResult};
pub use memory::MemoryStore;
pub use music::{list_track_pages, pick_track, DEFAULT_MUSIC_PREFIX};
pub use store::{download_to_file, upload_from_file, ObjectStore, VIDEO_CONTENT_TYPE};
