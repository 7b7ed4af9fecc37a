use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::Instant;

use crate::application::ports::{OperationStatus, RecognizerError, SpeechRecognizer};
use crate::domain::{
    FailureReason, InvalidTransition, JobOutcome, JobState, RecognitionSegment, TranscriptionJob,
};

#[derive(Debug, Clone, PartialEq)]
pub struct PollingPolicy {
    pub interval: Duration,
    pub backoff_multiplier: f64,
    pub max_interval: Duration,
    /// Total time a job may stay non-terminal before local waiting stops.
    pub budget: Duration,
    pub max_consecutive_query_failures: u32,
}

impl Default for PollingPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            backoff_multiplier: 1.0,
            max_interval: Duration::from_secs(30),
            budget: Duration::from_secs(9 * 60),
            max_consecutive_query_failures: 3,
        }
    }
}

impl PollingPolicy {
    pub fn next_delay(&self, current: Duration) -> Duration {
        let scaled = current.mul_f64(self.backoff_multiplier.max(1.0));
        scaled.min(self.max_interval.max(self.interval))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Pending { progress_percent: Option<u32> },
    /// Recognition finished; the caller settles the job after aggregation.
    Completed(Vec<RecognitionSegment>),
    Failed { message: String },
    TimedOut { waited: Duration },
    /// The job was already terminal; no query was issued.
    AlreadyTerminal(JobState),
}

#[derive(Debug, thiserror::Error)]
pub enum PollingError {
    #[error("status query failed: {0}")]
    Query(#[from] RecognizerError),
    #[error(transparent)]
    Transition(#[from] InvalidTransition),
}

/// Drives a job's state from status queries.
pub struct PollingScheduler {
    recognizer: Arc<dyn SpeechRecognizer>,
    policy: PollingPolicy,
}

impl PollingScheduler {
    pub fn new(recognizer: Arc<dyn SpeechRecognizer>, policy: PollingPolicy) -> Self {
        Self { recognizer, policy }
    }

    pub fn policy(&self) -> &PollingPolicy {
        &self.policy
    }

    /// One status query. The budget is measured from the job's creation, so
    /// a caller-driven poll loop times out the same way the blocking one does.
    pub async fn poll_once(&self, job: &mut TranscriptionJob) -> Result<PollOutcome, PollingError> {
        if job.is_terminal() {
            return Ok(PollOutcome::AlreadyTerminal(job.state()));
        }

        let outcome = self.observe(job).await?;
        if let PollOutcome::Pending { .. } = outcome {
            let age = job.age(Utc::now()).to_std().unwrap_or_default();
            if age >= self.policy.budget {
                return self.time_out(job, age);
            }
        }
        Ok(outcome)
    }

    /// Blocks between queries until the job is terminal or the budget is spent.
    pub async fn wait_until_terminal(
        &self,
        job: &mut TranscriptionJob,
    ) -> Result<PollOutcome, PollingError> {
        if job.is_terminal() {
            return Ok(PollOutcome::AlreadyTerminal(job.state()));
        }

        let started = Instant::now();
        let mut delay = self.policy.interval;
        let mut consecutive_failures = 0u32;

        loop {
            match self.observe(job).await {
                Ok(PollOutcome::Pending { .. }) => consecutive_failures = 0,
                Ok(terminal) => return Ok(terminal),
                Err(PollingError::Query(e)) => {
                    consecutive_failures += 1;
                    tracing::warn!(
                        job_id = %job.id,
                        error = %e,
                        attempt = consecutive_failures,
                        "Status query failed"
                    );
                    if consecutive_failures >= self.policy.max_consecutive_query_failures {
                        return Err(PollingError::Query(e));
                    }
                }
                Err(e) => return Err(e),
            }

            let waited = started.elapsed();
            if waited >= self.policy.budget {
                return self.time_out(job, waited);
            }

            tokio::time::sleep(delay.min(self.policy.budget - waited)).await;
            delay = self.policy.next_delay(delay);
        }
    }

    async fn observe(&self, job: &mut TranscriptionJob) -> Result<PollOutcome, PollingError> {
        let status = self.recognizer.status(&job.id).await?;

        match status {
            OperationStatus::Running { progress_percent } => {
                job.mark_running(progress_percent)?;
                tracing::debug!(job_id = %job.id, progress = ?progress_percent, "Job still running");
                Ok(PollOutcome::Pending { progress_percent })
            }
            OperationStatus::Done(segments) => {
                tracing::debug!(job_id = %job.id, segments = segments.len(), "Job done");
                Ok(PollOutcome::Completed(segments))
            }
            OperationStatus::Failed { code, message } => {
                tracing::warn!(job_id = %job.id, code = ?code, message = %message, "Job failed upstream");
                job.finish(JobOutcome::Failed {
                    reason: FailureReason::Recognition,
                    message: message.clone(),
                })?;
                Ok(PollOutcome::Failed { message })
            }
        }
    }

    fn time_out(
        &self,
        job: &mut TranscriptionJob,
        waited: Duration,
    ) -> Result<PollOutcome, PollingError> {
        tracing::warn!(
            job_id = %job.id,
            waited_secs = waited.as_secs(),
            budget_secs = self.policy.budget.as_secs(),
            "Polling budget exhausted"
        );
        job.finish(JobOutcome::TimedOut)?;
        Ok(PollOutcome::TimedOut { waited })
    }
}
