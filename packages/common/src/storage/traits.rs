use async_trait::async_trait;
use tokio::io::AsyncRead;

use super::error::StorageError;
use super::key::ObjectKey;

/// Type alias for a boxed async reader.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// Metadata describing a stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMeta {
    /// Object size in bytes.
    pub size: u64,
    /// Opaque entity tag for caching, without surrounding quotes.
    pub etag: String,
    /// MIME type, if the backend knows one.
    pub content_type: Option<String>,
}

/// Path-keyed object storage.
///
/// The store is the source of truth for bytes; callers are responsible for
/// producing canonical, collision-free keys (see `paths`).
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `data` at `key`, replacing any existing object. Returns the
    /// number of bytes written.
    async fn put(
        &self,
        key: &ObjectKey,
        data: &[u8],
        content_type: Option<&str>,
    ) -> Result<u64, StorageError>;

    /// Retrieve the object at `key` as metadata plus a streaming reader.
    async fn get(&self, key: &ObjectKey) -> Result<(ObjectMeta, BoxReader), StorageError>;

    /// Retrieve only the metadata for the object at `key`.
    async fn stat(&self, key: &ObjectKey) -> Result<ObjectMeta, StorageError>;

    /// Delete the object at `key`.
    ///
    /// Returns `true` if an object was deleted, `false` if none existed.
    async fn delete(&self, key: &ObjectKey) -> Result<bool, StorageError>;
}
