use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use object_store::gcp::{GoogleCloudStorage, GoogleCloudStorageBuilder};
use object_store::path::Path as StorePath;
use object_store::signer::Signer;
use object_store::{Attribute, Attributes, ObjectStore, PutOptions, PutPayload};
use reqwest::Method;

use crate::application::ports::{
    ContainerSetup, RetentionPolicy, StagingStore, StagingStoreError,
};
use crate::domain::ObjectKey;
use crate::infrastructure::google::GoogleCredentials;

use super::gcs_bucket_admin::GcsBucketAdmin;

/// Staging bucket on Google Cloud Storage. Objects go through `object_store`;
/// bucket administration goes through the JSON API.
pub struct GcsStagingStore {
    inner: Arc<GoogleCloudStorage>,
    admin: GcsBucketAdmin,
    bucket: String,
}

impl GcsStagingStore {
    pub fn new(
        credentials: &GoogleCredentials,
        project_id: &str,
        bucket: &str,
        location: &str,
        storage_base_url: &str,
    ) -> Result<Self, StagingStoreError> {
        let key_json = credentials
            .key
            .to_json()
            .map_err(|e| StagingStoreError::ContainerSetupFailed(e.to_string()))?;

        let store = GoogleCloudStorageBuilder::new()
            .with_bucket_name(bucket)
            .with_service_account_key(key_json)
            .build()
            .map_err(|e| StagingStoreError::ContainerSetupFailed(e.to_string()))?;

        let admin = GcsBucketAdmin::new(
            storage_base_url,
            project_id,
            bucket,
            location,
            Arc::clone(&credentials.tokens),
        );

        Ok(Self {
            inner: Arc::new(store),
            admin,
            bucket: bucket.to_string(),
        })
    }
}

#[async_trait::async_trait]
impl StagingStore for GcsStagingStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn uri_for(&self, key: &ObjectKey) -> String {
        format!("gs://{}/{}", self.bucket, key)
    }

    async fn ensure_container(
        &self,
        retention: &RetentionPolicy,
    ) -> Result<ContainerSetup, StagingStoreError> {
        self.admin.ensure_bucket(retention).await
    }

    async fn put(
        &self,
        key: &ObjectKey,
        data: Bytes,
        content_type: &str,
    ) -> Result<u64, StagingStoreError> {
        let store_path = StorePath::from(key.as_str());
        let size = data.len() as u64;

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.to_string().into());
        let options = PutOptions {
            attributes,
            ..Default::default()
        };

        self.inner
            .put_opts(&store_path, PutPayload::from(data), options)
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
        key: &ObjectKey,
        content_type: &str,
        expires_in: Duration,
    ) -> Result<String, StagingStoreError> {
        let store_path = StorePath::from(key.as_str());
        let url = self
            .inner
            .signed_url(Method::PUT, &store_path, expires_in)
            .await
            .map_err(|e| StagingStoreError::SigningFailed(e.to_string()))?;

        tracing::debug!(key = %key, content_type, expires_in_secs = expires_in.as_secs(), "Signed upload URL issued");
        Ok(url.to_string())
    }
}
