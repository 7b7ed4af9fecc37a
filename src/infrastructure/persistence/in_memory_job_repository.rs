use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::application::ports::{JobRepository, RepositoryError};
use crate::domain::{JobId, TranscriptionJob};

/// Process-local job table. Jobs do not survive a restart; unknown handles
/// are re-adopted on their next check.
#[derive(Default)]
pub struct InMemoryJobRepository {
    jobs: DashMap<JobId, TranscriptionJob>,
}

impl InMemoryJobRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

#[async_trait]
impl JobRepository for InMemoryJobRepository {
    async fn create(&self, job: &TranscriptionJob) -> Result<(), RepositoryError> {
        match self.jobs.entry(job.id.clone()) {
            Entry::Occupied(_) => Err(RepositoryError::AlreadyExists(job.id.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(job.clone());
                Ok(())
            }
        }
    }

    async fn get_by_id(&self, id: &JobId) -> Result<Option<TranscriptionJob>, RepositoryError> {
        Ok(self.jobs.get(id).map(|entry| entry.value().clone()))
    }

    async fn save(&self, job: &TranscriptionJob) -> Result<(), RepositoryError> {
        match self.jobs.get_mut(&job.id) {
            Some(mut entry) => {
                *entry = job.clone();
                Ok(())
            }
            None => Err(RepositoryError::NotFound(job.id.to_string())),
        }
    }

    async fn purge_expired(
        &self,
        finished_before: DateTime<Utc>,
        abandoned_before: DateTime<Utc>,
    ) -> Result<usize, RepositoryError> {
        let before = self.jobs.len();
        self.jobs.retain(|_, job| {
            if job.is_terminal() {
                !job.completed_at.is_some_and(|at| at < finished_before)
            } else {
                job.created_at >= abandoned_before
            }
        });
        Ok(before.saturating_sub(self.jobs.len()))
    }
}
