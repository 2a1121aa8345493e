//! Durable object storage for call recordings.

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;

/// A successfully stored object.
#[derive(Debug, Clone)]
pub struct StoredObject {
    /// Storage-relative path (bucket key).
    pub path: String,
    /// Public or signed URL for playback, when the backend provides one.
    pub url: Option<String>,
}

/// Errors from the storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    Upload(String),
}

/// Narrow interface over durable object storage.
#[async_trait]
pub trait RecordingStorage: Send + Sync {
    /// Upload `bytes` under `key` with the given content type.
    async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredObject, StorageError>;
}

// ---------------------------------------------------------------------------
// S3 implementation
// ---------------------------------------------------------------------------

/// S3-backed recording storage.
pub struct S3RecordingStorage {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3RecordingStorage {
    /// Create storage against an existing S3 client and bucket.
    pub fn new(client: aws_sdk_s3::Client, bucket: String) -> Self {
        Self { client, bucket }
    }

    /// Build storage from the ambient AWS environment configuration.
    pub async fn from_env(bucket: String) -> Self {
        let config = aws_config::load_from_env().await;
        Self::new(aws_sdk_s3::Client::new(&config), bucket)
    }
}

#[async_trait]
impl RecordingStorage for S3RecordingStorage {
    async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| StorageError::Upload(e.to_string()))?;

        tracing::debug!(bucket = %self.bucket, key, "Uploaded recording object");

        Ok(StoredObject {
            path: key.to_string(),
            url: Some(format!("s3://{}/{key}", self.bucket)),
        })
    }
}
