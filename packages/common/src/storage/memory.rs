use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use super::error::StorageError;
use super::key::ObjectKey;
use super::traits::{BoxReader, ObjectMeta, ObjectStore};

#[derive(Clone)]
struct StoredObject {
    data: Vec<u8>,
    content_type: Option<String>,
    etag: String,
}

/// In-memory object store with per-operation counters.
///
/// Used by tests as a spy: the counters record how often each operation
/// reached the store, so tests can assert that rejected requests never
/// touched storage.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<String, StoredObject>>,
    puts: AtomicU64,
    gets: AtomicU64,
    stats: AtomicU64,
    deletes: AtomicU64,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_count(&self) -> u64 {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn get_count(&self) -> u64 {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn stat_count(&self) -> u64 {
        self.stats.load(Ordering::SeqCst)
    }

    pub fn delete_count(&self) -> u64 {
        self.deletes.load(Ordering::SeqCst)
    }

    /// Total number of operations that reached the store.
    pub fn op_count(&self) -> u64 {
        self.put_count() + self.get_count() + self.stat_count() + self.delete_count()
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether an object exists at `key`, without counting as an operation.
    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }

    fn etag_for(data: &[u8]) -> String {
        let digest = Sha256::digest(data);
        hex::encode(&digest[..16])
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(
        &self,
        key: &ObjectKey,
        data: &[u8],
        content_type: Option<&str>,
    ) -> Result<u64, StorageError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        let stored = StoredObject {
            data: data.to_vec(),
            content_type: content_type.map(str::to_string),
            etag: Self::etag_for(data),
        };
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), stored);
        Ok(data.len() as u64)
    }

    async fn get(&self, key: &ObjectKey) -> Result<(ObjectMeta, BoxReader), StorageError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        let stored = self
            .objects
            .lock()
            .unwrap()
            .get(key.as_str())
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))?;

        let meta = ObjectMeta {
            size: stored.data.len() as u64,
            etag: stored.etag,
            content_type: stored.content_type,
        };
        let reader: BoxReader = Box::new(Cursor::new(stored.data));
        Ok((meta, reader))
    }

    async fn stat(&self, key: &ObjectKey) -> Result<ObjectMeta, StorageError> {
        self.stats.fetch_add(1, Ordering::SeqCst);
        let objects = self.objects.lock().unwrap();
        let stored = objects
            .get(key.as_str())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))?;

        Ok(ObjectMeta {
            size: stored.data.len() as u64,
            etag: stored.etag.clone(),
            content_type: stored.content_type.clone(),
        })
    }

    async fn delete(&self, key: &ObjectKey) -> Result<bool, StorageError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        Ok(self.objects.lock().unwrap().remove(key.as_str()).is_some())
    }
}
