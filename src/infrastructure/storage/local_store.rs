use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::Utc;
use futures::StreamExt;
use object_store::local::LocalFileSystem;
use object_store::path::Path as StorePath;
use object_store::{ObjectStore, PutPayload};
use tokio::sync::OnceCell;

use crate::application::ports::{
    ContainerSetup, RetentionPolicy, StagingStore, StagingStoreError,
};
use crate::domain::ObjectKey;

/// Directory-backed staging for development. The directory stands in for the
/// bucket; retention is enforced by sweeping on setup and on every put.
pub struct LocalStagingStore {
    inner: Arc<LocalFileSystem>,
    root: PathBuf,
    bucket: String,
    retention: OnceCell<RetentionPolicy>,
}

impl LocalStagingStore {
    pub fn new(base_path: PathBuf, bucket: &str) -> Result<Self, StagingStoreError> {
        let root = base_path.join(bucket);
        std::fs::create_dir_all(&root).map_err(StagingStoreError::Io)?;
        let root = root.canonicalize().map_err(StagingStoreError::Io)?;
        let fs = LocalFileSystem::new_with_prefix(&root)
            .map_err(|e| StagingStoreError::ContainerSetupFailed(e.to_string()))?;
        Ok(Self {
            inner: Arc::new(fs),
            root,
            bucket: bucket.to_string(),
            retention: OnceCell::new(),
        })
    }

    /// Deletes objects older than the retention window. A no-op until the
    /// container has been ensured.
    pub async fn sweep_expired(&self) -> Result<usize, StagingStoreError> {
        let Some(retention) = self.retention.get() else {
            return Ok(0);
        };
        let max_age = chrono::Duration::from_std(retention.max_age())
            .map_err(|e| StagingStoreError::Unsupported(e.to_string()))?;
        let now = Utc::now();

        let mut expired = Vec::new();
        let mut listing = self.inner.list(None);
        while let Some(entry) = listing.next().await {
            let meta = entry.map_err(|e| StagingStoreError::DeleteFailed(e.to_string()))?;
            if meta.last_modified + max_age <= now {
                expired.push(meta.location);
            }
        }
        drop(listing);

        let mut removed = 0;
        for location in expired {
            match self.inner.delete(&location).await {
                Ok(()) => removed += 1,
                Err(object_store::Error::NotFound { .. }) => {}
                Err(e) => return Err(StagingStoreError::DeleteFailed(e.to_string())),
            }
        }

        if removed > 0 {
            tracing::debug!(removed, bucket = %self.bucket, "Swept expired staged objects");
        }
        Ok(removed)
    }
}

#[async_trait::async_trait]
impl StagingStore for LocalStagingStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn uri_for(&self, key: &ObjectKey) -> String {
        format!("file://{}/{}", self.root.display(), key)
    }

    async fn ensure_container(
        &self,
        retention: &RetentionPolicy,
    ) -> Result<ContainerSetup, StagingStoreError> {
        let setup = if self.retention.set(*retention).is_ok() {
            ContainerSetup::Created
        } else {
            ContainerSetup::Existing
        };
        self.sweep_expired().await?;
        Ok(setup)
    }

    async fn put(
        &self,
        key: &ObjectKey,
        data: Bytes,
        _content_type: &str,
    ) -> Result<u64, StagingStoreError> {
        self.sweep_expired().await?;

        let store_path = StorePath::from(key.as_str());
        let size = data.len() as u64;
        self.inner
            .put(&store_path, PutPayload::from(data))
            .await
            .map_err(|e| StagingStoreError::UploadFailed(e.to_string()))?;

        Ok(size)
    }

    async fn delete(&self, key: &ObjectKey) -> Result<(), StagingStoreError> {
        let store_path = StorePath::from(key.as_str());
        self.inner
            .delete(&store_path)
            .await
            .map_err(|e| match e {
                object_store::Error::NotFound { .. } => StagingStoreError::NotFound(key.to_string()),
                other => StagingStoreError::DeleteFailed(other.to_string()),
            })
    }

    async fn signed_upload_url(
        &self,
        _key: &ObjectKey,
        _content_type: &str,
        _expires_in: Duration,
    ) -> Result<String, StagingStoreError> {
        Err(StagingStoreError::Unsupported(
            "the local store cannot issue signed upload URLs".to_string(),
        ))
    }
}
