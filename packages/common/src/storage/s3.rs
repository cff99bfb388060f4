use std::io::Cursor;

use async_trait::async_trait;
use s3::Bucket;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::region::Region;

use super::error::StorageError;
use super::key::ObjectKey;
use super::traits::{BoxReader, ObjectMeta, ObjectStore};

/// S3-compatible object store (AWS S3, Cloudflare R2, MinIO).
///
/// Uses path-style addressing against a custom endpoint so self-hosted
/// backends work without DNS bucket tricks.
pub struct S3ObjectStore {
    bucket: Box<Bucket>,
}

impl S3ObjectStore {
    pub fn new(
        endpoint: &str,
        region: &str,
        bucket_name: &str,
        access_key: &str,
        secret_key: &str,
    ) -> Result<Self, StorageError> {
        let region = Region::Custom {
            region: region.to_string(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
        };
        let credentials = Credentials::new(Some(access_key), Some(secret_key), None, None, None)
            .map_err(|e| StorageError::Backend(format!("invalid S3 credentials: {e}")))?;
        let bucket = Bucket::new(bucket_name, region, credentials)
            .map_err(|e| StorageError::Backend(format!("failed to configure bucket: {e}")))?
            .with_path_style();

        Ok(Self { bucket })
    }

    fn map_err(key: &ObjectKey, err: S3Error) -> StorageError {
        if is_not_found(&err) {
            StorageError::NotFound(key.to_string())
        } else {
            StorageError::Backend(err.to_string())
        }
    }
}

fn is_not_found(err: &S3Error) -> bool {
    matches!(err, S3Error::HttpFailWithBody(404, _))
}

fn trim_etag(raw: &str) -> String {
    raw.trim_matches('"').to_string()
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(
        &self,
        key: &ObjectKey,
        data: &[u8],
        content_type: Option<&str>,
    ) -> Result<u64, StorageError> {
        let content_type = content_type
            .map(str::to_string)
            .or_else(|| key.guess_content_type())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        self.bucket
            .put_object_with_content_type(key.as_str(), data, &content_type)
            .await
            .map_err(|e| Self::map_err(key, e))?;

        Ok(data.len() as u64)
    }

    async fn get(&self, key: &ObjectKey) -> Result<(ObjectMeta, BoxReader), StorageError> {
        let response = self
            .bucket
            .get_object(key.as_str())
            .await
            .map_err(|e| Self::map_err(key, e))?;

        let headers = response.headers();
        let etag = headers
            .get("etag")
            .map(|v| trim_etag(v))
            .unwrap_or_default();
        let content_type = headers
            .get("content-type")
            .cloned()
            .or_else(|| key.guess_content_type());

        let data = response.to_vec();
        let meta = ObjectMeta {
            size: data.len() as u64,
            etag,
            content_type,
        };
        let reader: BoxReader = Box::new(Cursor::new(data));
        Ok((meta, reader))
    }

    async fn stat(&self, key: &ObjectKey) -> Result<ObjectMeta, StorageError> {
        let (head, _status) = self
            .bucket
            .head_object(key.as_str())
            .await
            .map_err(|e| Self::map_err(key, e))?;

        Ok(ObjectMeta {
            size: head.content_length.unwrap_or(0).max(0) as u64,
            etag: head.e_tag.as_deref().map(trim_etag).unwrap_or_default(),
            content_type: head.content_type.or_else(|| key.guess_content_type()),
        })
    }

    async fn delete(&self, key: &ObjectKey) -> Result<bool, StorageError> {
        // S3 DELETE is idempotent and reports success for absent keys,
        // so distinguish by checking existence first.
        let existed = match self.bucket.head_object(key.as_str()).await {
            Ok(_) => true,
            Err(e) if is_not_found(&e) => false,
            Err(e) => return Err(Self::map_err(key, e)),
        };

        self.bucket
            .delete_object(key.as_str())
            .await
            .map_err(|e| Self::map_err(key, e))?;

        Ok(existed)
    }
}
