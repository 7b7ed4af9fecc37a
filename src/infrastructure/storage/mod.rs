mod gcs_bucket_admin;
mod gcs_store;
mod local_store;
mod store_factory;

pub use gcs_bucket_admin::{DEFAULT_STORAGE_BASE_URL, GcsBucketAdmin};
pub use gcs_store::GcsStagingStore;
pub use local_store::LocalStagingStore;
pub use store_factory::StagingStoreFactory;
