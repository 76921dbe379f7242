//! The object store seam and file helpers built on it.

use std::path::Path;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};

/// Content type of published montages.
pub const VIDEO_CONTENT_TYPE: &str = "video/mp4";

/// Bucket/key addressed blob storage.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch an object's bytes.
    async fn get(&self, bucket: &str, key: &str) -> StorageResult<Vec<u8>>;

    /// Store `data` under `key`, replacing any existing object.
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<()>;

    /// Store the file at `path` under `key`.
    ///
    /// The default reads the file into memory and calls [`ObjectStore::put`].
    async fn put_file(
        &self,
        bucket: &str,
        key: &str,
        path: &Path,
        content_type: &str,
    ) -> StorageResult<()> {
        let data = tokio::fs::read(path).await.map_err(|e| {
            StorageError::upload_failed(format!("Failed to read {}: {}", path.display(), e))
        })?;
        self.put(bucket, key, data, content_type).await
    }

    /// List keys under `prefix`, one inner vector per listing page.
    async fn list(&self, bucket: &str, prefix: &str) -> StorageResult<Vec<Vec<String>>>;

    /// Delete an object. Deleting a missing key is not an error.
    async fn delete(&self, bucket: &str, key: &str) -> StorageResult<()>;
}

/// Download `key` into `path`, creating parent directories.
pub async fn download_to_file(
    store: &dyn ObjectStore,
    bucket: &str,
    key: &str,
    path: impl AsRef<Path>,
) -> StorageResult<()> {
    let path = path.as_ref();
    debug!("Downloading {}/{} to {}", bucket, key, path.display());

    let bytes = store.get(bucket, key).await?;

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            StorageError::download_failed(format!("Failed to create directory: {}", e))
        })?;
    }

    tokio::fs::write(path, &bytes)
        .await
        .map_err(|e| StorageError::download_failed(format!("Failed to write file: {}", e)))?;

    info!("Downloaded {}/{} ({} bytes)", bucket, key, bytes.len());
    Ok(())
}

/// Upload the file at `path` to `key`.
pub async fn upload_from_file(
    store: &dyn ObjectStore,
    bucket: &str,
    key: &str,
    path: impl AsRef<Path>,
    content_type: &str,
) -> StorageResult<()> {
    let path = path.as_ref();
    let size = tokio::fs::metadata(path)
        .await
        .map_err(|e| StorageError::upload_failed(format!("Failed to read {}: {}", path.display(), e)))?
        .len();

    store.put_file(bucket, key, path, content_type).await?;

    info!("Uploaded {} to {}/{} ({} bytes)", path.display(), bucket, key, size);
    Ok(())
}
