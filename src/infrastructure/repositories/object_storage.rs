use async_trait::async_trait;
use std::time::Duration;

/// Reference to an uploaded object
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectHandle {
    pub key: String,
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage credentials rejected: {0}")]
    Auth(String),
    #[error("storage request failed: {0}")]
    Request(String),
}

/// Object storage used by the streaming remote merge
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn upload(&self, bytes: Vec<u8>, key: &str) -> Result<ObjectHandle, StorageError>;

    /// Short-lived URL the muxer can read the object from
    async fn signed_url(&self, handle: &ObjectHandle, ttl: Duration) -> Result<String, StorageError>;

    async fn delete(&self, handle: &ObjectHandle) -> Result<(), StorageError>;
}
