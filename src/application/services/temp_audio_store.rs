use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::Utc;
use tokio::sync::OnceCell;

use crate::application::ports::{
    ContainerSetup, RetentionPolicy, StagingStore, StagingStoreError,
};
use crate::domain::{ObjectKey, StagedAudio};

/// Stages audio for the recognizer and guarantees it does not outlive the
/// container's retention window.
pub struct TempAudioStore {
    store: Arc<dyn StagingStore>,
    retention: RetentionPolicy,
    setup: OnceCell<ContainerSetup>,
}

/// Write-only URL a client uploads to directly, plus the URI to submit later.
#[derive(Debug, Clone, PartialEq)]
pub struct StagedUpload {
    pub upload_url: String,
    pub storage_uri: String,
}

impl TempAudioStore {
    pub fn new(store: Arc<dyn StagingStore>, retention: RetentionPolicy) -> Self {
        Self {
            store,
            retention,
            setup: OnceCell::new(),
        }
    }

    /// Runs container setup once per process. A failed attempt is retried by
    /// the next caller.
    pub async fn ensure_container(&self) -> Result<ContainerSetup, StagingStoreError> {
        let setup = self
            .setup
            .get_or_try_init(|| async {
                let setup = self.store.ensure_container(&self.retention).await?;
                tracing::info!(
                    bucket = %self.store.bucket(),
                    retention_days = self.retention.max_age_days,
                    created = matches!(setup, ContainerSetup::Created),
                    "Staging container ready"
                );
                Ok::<_, StagingStoreError>(setup)
            })
            .await?;
        Ok(*setup)
    }

    #[tracing::instrument(skip(self, data), fields(bytes = data.len()))]
    pub async fn stage(
        &self,
        data: Bytes,
        suggested_name: &str,
        content_type: &str,
    ) -> Result<StagedAudio, StagingStoreError> {
        self.ensure_container().await?;

        let now = Utc::now();
        let key = ObjectKey::for_audio(suggested_name, now);
        let written = self.store.put(&key, data, content_type).await?;

        tracing::debug!(key = %key, bytes = written, "Audio staged");

        Ok(StagedAudio {
            bucket: self.store.bucket().to_string(),
            uri: self.store.uri_for(&key),
            key,
            retention_deadline: now + self.retention_window(),
        })
    }

    /// Takes ownership of a caller-supplied URI when it points into the
    /// staging container. Foreign URIs are never released.
    pub fn adopt_uri(&self, uri: &str) -> Option<StagedAudio> {
        let prefix = self.store.uri_for(&ObjectKey::from_raw(""));
        let key = uri.strip_prefix(&prefix).filter(|k| !k.is_empty())?;

        Some(StagedAudio {
            bucket: self.store.bucket().to_string(),
            key: ObjectKey::from_raw(key),
            uri: uri.to_string(),
            retention_deadline: Utc::now() + self.retention_window(),
        })
    }

    /// Best-effort delete. Failures are logged and otherwise ignored; the
    /// container's lifecycle rule reclaims anything left behind.
    pub async fn release(&self, staged: &StagedAudio) {
        match self.store.delete(&staged.key).await {
            Ok(()) => tracing::debug!(key = %staged.key, "Staged audio released"),
            Err(StagingStoreError::NotFound(_)) => {
                tracing::debug!(key = %staged.key, "Staged audio already gone")
            }
            Err(e) => tracing::warn!(
                error = %e,
                key = %staged.key,
                retention_deadline = %staged.retention_deadline,
                "Failed to release staged audio; leaving it to the retention rule"
            ),
        }
    }

    pub async fn signed_upload(
        &self,
        file_name: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> Result<StagedUpload, StagingStoreError> {
        self.ensure_container().await?;

        let key = ObjectKey::for_upload(file_name, Utc::now());
        let upload_url = self
            .store
            .signed_upload_url(&key, content_type, expires_in)
            .await?;

        Ok(StagedUpload {
            upload_url,
            storage_uri: self.store.uri_for(&key),
        })
    }

    fn retention_window(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.retention.max_age_days))
    }
}
