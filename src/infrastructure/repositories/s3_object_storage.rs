use super::object_storage::{ObjectHandle, ObjectStorage, StorageError};
use super::speech_provider::is_aws_auth_code;
use async_trait::async_trait;
use aws_sdk_s3::{
    error::ProvideErrorMetadata, presigning::PresigningConfig, primitives::ByteStream,
    Client as S3Client,
};
use std::sync::Arc;
use std::time::Duration;

/// S3 implementation of object storage
pub struct S3ObjectStorage {
    s3_client: Arc<S3Client>,
    bucket: String,
    prefix: String,
}

impl S3ObjectStorage {
    pub fn new(s3_client: Arc<S3Client>, bucket: String, prefix: String) -> Self {
        Self {
            s3_client,
            bucket,
            prefix,
        }
    }

    fn full_key(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}/{}", self.prefix.trim_end_matches('/'), key)
        }
    }

    fn classify<E: ProvideErrorMetadata + std::fmt::Debug>(operation: &str, err: E) -> StorageError {
        tracing::error!(operation = operation, error = ?err, error_code = ?err.code(), "S3 request failed");
        if is_aws_auth_code(err.code()) {
            StorageError::Auth(format!("S3 {}: {:?}", operation, err.code()))
        } else {
            StorageError::Request(format!("S3 {}: {:?}", operation, err))
        }
    }
}

#[async_trait]
impl ObjectStorage for S3ObjectStorage {
    async fn upload(&self, bytes: Vec<u8>, key: &str) -> Result<ObjectHandle, StorageError> {
        let key = self.full_key(key);
        let size = bytes.len();

        self.s3_client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type("audio/wav")
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| Self::classify("put_object", e))?;

        tracing::debug!(bucket = %self.bucket, key = %key, size_bytes = size, "Object uploaded");
        Ok(ObjectHandle { key })
    }

    async fn signed_url(&self, handle: &ObjectHandle, ttl: Duration) -> Result<String, StorageError> {
        let presigning = PresigningConfig::expires_in(ttl)
            .map_err(|e| StorageError::Request(format!("invalid presigning ttl: {}", e)))?;

        let request = self
            .s3_client
            .get_object()
            .bucket(&self.bucket)
            .key(&handle.key)
            .presigned(presigning)
            .await
            .map_err(|e| Self::classify("presign get_object", e))?;

        Ok(request.uri().to_string())
    }

    async fn delete(&self, handle: &ObjectHandle) -> Result<(), StorageError> {
        self.s3_client
            .delete_object()
            .bucket(&self.bucket)
            .key(&handle.key)
            .send()
            .await
            .map_err(|e| Self::classify("delete_object", e))?;

        tracing::debug!(bucket = %self.bucket, key = %handle.key, "Object deleted");
        Ok(())
    }
}
