use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{JobId, TranscriptionJob};

use super::RepositoryError;

#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn create(&self, job: &TranscriptionJob) -> Result<(), RepositoryError>;

    async fn get_by_id(&self, id: &JobId) -> Result<Option<TranscriptionJob>, RepositoryError>;

    async fn save(&self, job: &TranscriptionJob) -> Result<(), RepositoryError>;

    /// Drops terminal jobs completed before `finished_before` and jobs still
    /// pending that were created before `abandoned_before`. Returns how many
    /// were removed.
    async fn purge_expired(
        &self,
        finished_before: DateTime<Utc>,
        abandoned_before: DateTime<Utc>,
    ) -> Result<usize, RepositoryError>;
}
