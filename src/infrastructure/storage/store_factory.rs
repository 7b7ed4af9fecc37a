use std::path::PathBuf;
use std::sync::Arc;

use crate::application::ports::{StagingStore, StagingStoreError};
use crate::infrastructure::google::GoogleCredentials;
use crate::presentation::config::{GoogleSettings, StorageProviderSetting, StorageSettings};

use super::gcs_store::GcsStagingStore;
use super::local_store::LocalStagingStore;

const LOCAL_PROJECT: &str = "local";

pub struct StagingStoreFactory;

impl StagingStoreFactory {
    pub fn create(
        storage: &StorageSettings,
        google: &GoogleSettings,
        credentials: Option<&GoogleCredentials>,
    ) -> Result<Arc<dyn StagingStore>, StagingStoreError> {
        let project_id = google
            .project_id
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .or_else(|| credentials.map(GoogleCredentials::project_id));

        match storage.provider {
            StorageProviderSetting::Local => {
                let bucket = storage.bucket_name(project_id.unwrap_or(LOCAL_PROJECT));
                let store = LocalStagingStore::new(PathBuf::from(&storage.local_path), &bucket)?;
                Ok(Arc::new(store))
            }
            StorageProviderSetting::Gcs => {
                let credentials = credentials.ok_or_else(|| {
                    StagingStoreError::ContainerSetupFailed(
                        "google credentials required for the gcs store".into(),
                    )
                })?;
                let project_id = project_id.unwrap_or(credentials.project_id());
                let bucket = storage.bucket_name(project_id);
                let store = GcsStagingStore::new(
                    credentials,
                    project_id,
                    &bucket,
                    &storage.location,
                    &google.storage_base_url,
                )?;
                Ok(Arc::new(store))
            }
        }
    }
}
