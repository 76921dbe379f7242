//! In-process [`ObjectStore`], used by local runs and tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{StorageError, StorageResult};
use crate::store::ObjectStore;

/// Default number of keys per listing page, matching S3.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// Object store held in memory.
#[derive(Debug)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<(String, String), Vec<u8>>>,
    page_size: usize,
    requests: AtomicUsize,
    reject_uploads: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            objects: Mutex::new(BTreeMap::new()),
            page_size: DEFAULT_PAGE_SIZE,
            requests: AtomicUsize::new(0),
            reject_uploads: AtomicBool::new(false),
        }
    }

    /// Split listings into pages of `page_size` keys.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Seed an object without counting a request.
    pub fn insert(&self, bucket: &str, key: &str, data: impl Into<Vec<u8>>) {
        self.lock()
            .insert((bucket.to_string(), key.to_string()), data.into());
    }

    /// Current contents of an object.
    pub fn object(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.lock()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    /// Number of trait calls served so far.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Make every subsequent `put` fail.
    pub fn reject_uploads(&self) {
        self.reject_uploads.store(true, Ordering::SeqCst);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<(String, String), Vec<u8>>> {
        self.objects
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn count(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn get(&self, bucket: &str, key: &str) -> StorageResult<Vec<u8>> {
        self.count();
        self.object(bucket, key)
            .ok_or_else(|| StorageError::not_found(bucket, key))
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        data: Vec<u8>,
        _content_type: &str,
    ) -> StorageResult<()> {
        self.count();
        if self.reject_uploads.load(Ordering::SeqCst) {
            return Err(StorageError::upload_failed(format!(
                "upload of {}/{} rejected",
                bucket, key
            )));
        }
        self.insert(bucket, key, data);
        Ok(())
    }

    async fn list(&self, bucket: &str, prefix: &str) -> StorageResult<Vec<Vec<String>>> {
        self.count();
        let keys: Vec<String> = self
            .lock()
            .keys()
            .filter(|(b, k)| b == bucket && k.starts_with(prefix))
            .map(|(_, k)| k.clone())
            .collect();

        if keys.is_empty() {
            return Ok(vec![Vec::new()]);
        }
        Ok(keys.chunks(self.page_size).map(<[String]>::to_vec).collect())
    }

    async fn delete(&self, bucket: &str, key: &str) -> StorageResult<()> {
        self.count();
        self.lock().remove(&(bucket.to_string(), key.to_string()));
        Ok(())
    }
}
