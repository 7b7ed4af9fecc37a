use std::io;
use std::time::Duration;

use bytes::Bytes;

use crate::domain::ObjectKey;

/// Container-level expiry rule. Objects older than `max_age_days` are
/// deleted by the store regardless of explicit deletes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub max_age_days: u32,
}

impl RetentionPolicy {
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(u64::from(self.max_age_days) * 24 * 60 * 60)
    }
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self { max_age_days: 1 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerSetup {
    Existing,
    Created,
}

#[async_trait::async_trait]
pub trait StagingStore: Send + Sync {
    fn bucket(&self) -> &str;

    /// Locator the recognizer reads the object from.
    fn uri_for(&self, key: &ObjectKey) -> String;

    /// Creates the container with `retention` if it does not exist yet.
    /// A concurrent creator winning the race counts as success.
    async fn ensure_container(
        &self,
        retention: &RetentionPolicy,
    ) -> Result<ContainerSetup, StagingStoreError>;

    async fn put(
        &self,
        key: &ObjectKey,
        data: Bytes,
        content_type: &str,
    ) -> Result<u64, StagingStoreError>;

    async fn delete(&self, key: &ObjectKey) -> Result<(), StagingStoreError>;

    async fn signed_upload_url(
        &self,
        key: &ObjectKey,
        content_type: &str,
        expires_in: Duration,
    ) -> Result<String, StagingStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StagingStoreError {
    #[error("container setup failed: {0}")]
    ContainerSetupFailed(String),
    #[error("upload failed: {0}")]
    UploadFailed(String),
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("delete failed: {0}")]
    DeleteFailed(String),
    #[error("signing failed: {0}")]
    SigningFailed(String),
    #[error("not supported by this store: {0}")]
    Unsupported(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
