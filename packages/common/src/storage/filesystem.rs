use std::path::PathBuf;
use std::time::UNIX_EPOCH;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::BufReader;

use super::error::StorageError;
use super::key::ObjectKey;
use super::traits::{BoxReader, ObjectMeta, ObjectStore};

/// Filesystem-backed object store.
///
/// Objects live under `{root}/{key}` mirroring the key hierarchy. Writes
/// go through a temp file plus rename so readers never observe partial
/// objects. Content types are guessed from the key extension; the entity
/// tag is derived from mtime and size.
pub struct FilesystemObjectStore {
    root: PathBuf,
}

impl FilesystemObjectStore {
    /// Create a filesystem store rooted at `root`.
    pub async fn new(root: PathBuf) -> Result<Self, StorageError> {
        fs::create_dir_all(&root).await?;
        fs::create_dir_all(root.join(".tmp")).await?;
        Ok(Self { root })
    }

    /// Compute the filesystem path for a key. Key validation has already
    /// rejected traversal, so the join stays under the root.
    fn object_path(&self, key: &ObjectKey) -> PathBuf {
        self.root.join(key.as_str())
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.root
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }

    fn meta_from(&self, key: &ObjectKey, fs_meta: &std::fs::Metadata) -> ObjectMeta {
        let mtime = fs_meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs())
            .unwrap_or(0);

        ObjectMeta {
            size: fs_meta.len(),
            etag: format!("{:x}-{:x}", fs_meta.len(), mtime),
            content_type: key.guess_content_type(),
        }
    }
}

#[async_trait]
impl ObjectStore for FilesystemObjectStore {
    async fn put(
        &self,
        key: &ObjectKey,
        data: &[u8],
        _content_type: Option<&str>,
    ) -> Result<u64, StorageError> {
        let object_path = self.object_path(key);
        let temp_path = self.temp_path();

        if let Err(e) = fs::write(&temp_path, data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        if let Some(parent) = object_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        if let Err(e) = fs::rename(&temp_path, &object_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(data.len() as u64)
    }

    async fn get(&self, key: &ObjectKey) -> Result<(ObjectMeta, BoxReader), StorageError> {
        let object_path = self.object_path(key);
        let file = match fs::File::open(&object_path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(key.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let fs_meta = file.metadata().await?;
        let meta = self.meta_from(key, &fs_meta);
        let reader: BoxReader = Box::new(BufReader::new(file));
        Ok((meta, reader))
    }

    async fn stat(&self, key: &ObjectKey) -> Result<ObjectMeta, StorageError> {
        let object_path = self.object_path(key);
        match fs::metadata(&object_path).await {
            Ok(fs_meta) => Ok(self.meta_from(key, &fs_meta)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, key: &ObjectKey) -> Result<bool, StorageError> {
        let object_path = self.object_path(key);
        match fs::remove_file(&object_path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
