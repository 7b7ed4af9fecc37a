use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::Utc;

use crate::application::ports::{JobRepository, RepositoryError};
use crate::domain::{
    AudioSource, ConfigOverrides, FailureReason, JobId, JobOutcome, TranscriptionJob,
    TranscriptionResult,
};

use super::{
    AggregationError, JobSubmitter, PollOutcome, PollingError, PollingScheduler,
    ResultAggregator, StagedUpload, TempAudioStore, TranscriptionError,
};

const DEFAULT_CONTENT_TYPE: &str = "audio/mpeg";
const DEFAULT_FILE_NAME: &str = "file";

#[derive(Debug, Clone)]
pub struct ServiceOptions {
    pub max_audio_bytes: usize,
    /// How long finished jobs stay answerable before they are purged.
    pub finished_job_retention: Duration,
    pub upload_url_ttl: Duration,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            max_audio_bytes: 10 * 1024 * 1024,
            finished_job_retention: Duration::from_secs(60 * 60),
            upload_url_ttl: Duration::from_secs(15 * 60),
        }
    }
}

/// Result of a `check` that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckResponse {
    Processing { progress_percent: Option<u32> },
    Done(TranscriptionResult),
}

/// Composes staging, submission, polling and aggregation into the job
/// lifecycle exposed to callers.
pub struct TranscriptionService {
    store: TempAudioStore,
    submitter: JobSubmitter,
    scheduler: PollingScheduler,
    aggregator: ResultAggregator,
    jobs: Arc<dyn JobRepository>,
    options: ServiceOptions,
}

impl TranscriptionService {
    pub fn new(
        store: TempAudioStore,
        submitter: JobSubmitter,
        scheduler: PollingScheduler,
        jobs: Arc<dyn JobRepository>,
        options: ServiceOptions,
    ) -> Self {
        Self {
            store,
            submitter,
            scheduler,
            aggregator: ResultAggregator,
            jobs,
            options,
        }
    }

    pub fn options(&self) -> &ServiceOptions {
        &self.options
    }

    /// Stages the audio if needed and starts recognition. Nothing is recorded
    /// unless the recognizer accepted the job.
    #[tracing::instrument(skip(self, source, overrides))]
    pub async fn submit(
        &self,
        source: AudioSource,
        overrides: ConfigOverrides,
    ) -> Result<JobId, TranscriptionError> {
        self.purge_expired_jobs().await;

        let job = self.start_job(source, &overrides).await?;
        self.jobs.create(&job).await?;

        tracing::info!(
            job_id = %job.id,
            language = %job.config.language_code,
            staged = job.source.is_some(),
            "Transcription job submitted"
        );
        Ok(job.id)
    }

    /// Issues at most one status query. Terminal outcomes are cached, so
    /// repeated checks are answered locally.
    #[tracing::instrument(skip(self), fields(job_id = %job_id))]
    pub async fn check(&self, job_id: &JobId) -> Result<CheckResponse, TranscriptionError> {
        let (mut job, adopted) = match self.jobs.get_by_id(job_id).await? {
            Some(job) => (job, false),
            None => (self.adopt(job_id), true),
        };

        if let Some(outcome) = job.outcome() {
            return outcome_response(&job, outcome);
        }

        // An adopted handle is only recorded once the recognizer has
        // confirmed it, so unknown ids never reach the job table.
        let outcome = match self.scheduler.poll_once(&mut job).await {
            Ok(outcome) => outcome,
            Err(e) => return Err(polling_error(e)),
        };

        let response = self.settle(&mut job, outcome).await;
        if adopted {
            self.record_adopted(&job).await?;
        } else {
            self.jobs.save(&job).await?;
        }
        response
    }

    /// Submits and waits in-process until the job is terminal.
    #[tracing::instrument(skip(self, source, overrides))]
    pub async fn transcribe(
        &self,
        source: AudioSource,
        overrides: ConfigOverrides,
    ) -> Result<TranscriptionResult, TranscriptionError> {
        let mut job = self.start_job(source, &overrides).await?;
        self.jobs.create(&job).await?;

        let waited = self.scheduler.wait_until_terminal(&mut job).await;
        let response = match waited {
            Ok(outcome) => self.settle(&mut job, outcome).await,
            Err(e) => Err(polling_error(e)),
        };
        self.jobs.save(&job).await?;

        match response? {
            CheckResponse::Done(result) => Ok(result),
            CheckResponse::Processing { .. } => Err(TranscriptionError::Internal(format!(
                "job {} left the wait loop without a terminal state",
                job.id
            ))),
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn stage_upload(
        &self,
        file_name: &str,
        content_type: &str,
    ) -> Result<StagedUpload, TranscriptionError> {
        if content_type.trim().is_empty() {
            return Err(TranscriptionError::Validation(
                "contentType is required".to_string(),
            ));
        }

        let upload = self
            .store
            .signed_upload(file_name, content_type.trim(), self.options.upload_url_ttl)
            .await?;

        tracing::info!(storage_uri = %upload.storage_uri, "Upload URL issued");
        Ok(upload)
    }

    async fn start_job(
        &self,
        source: AudioSource,
        overrides: &ConfigOverrides,
    ) -> Result<TranscriptionJob, TranscriptionError> {
        // Validate and resolve first so a bad request never leaves a staged
        // object behind.
        self.validate_source(&source)?;
        let config = self
            .submitter
            .build_config(source.encoding_hint(), overrides)?;

        match source {
            AudioSource::Bytes {
                data,
                mime_type_or_extension,
                file_name,
            } => {
                let content_type = mime_type_or_extension
                    .as_deref()
                    .filter(|m| m.contains('/'))
                    .unwrap_or(DEFAULT_CONTENT_TYPE);
                let name = file_name.as_deref().unwrap_or(DEFAULT_FILE_NAME);

                let staged = self
                    .store
                    .stage(Bytes::from(data), name, content_type)
                    .await?;
                let uri = staged.uri.clone();

                match self
                    .submitter
                    .submit(&uri, Some(staged.clone()), config)
                    .await
                {
                    Ok(job) => Ok(job),
                    Err(e) => {
                        self.store.release(&staged).await;
                        Err(e)
                    }
                }
            }
            AudioSource::Uri { uri, .. } => {
                let uri = uri.trim();
                let adopted = self.store.adopt_uri(uri);
                self.submitter.submit(uri, adopted, config).await
            }
        }
    }

    fn validate_source(&self, source: &AudioSource) -> Result<(), TranscriptionError> {
        match source {
            AudioSource::Bytes { data, .. } if data.is_empty() => Err(
                TranscriptionError::Validation("no audio received".to_string()),
            ),
            AudioSource::Bytes { data, .. } if data.len() > self.options.max_audio_bytes => {
                Err(TranscriptionError::Validation(format!(
                    "audio is {} bytes; the limit is {} bytes",
                    data.len(),
                    self.options.max_audio_bytes
                )))
            }
            AudioSource::Uri { uri, .. } if uri.trim().is_empty() => Err(
                TranscriptionError::Validation("audio URI must not be empty".to_string()),
            ),
            _ => Ok(()),
        }
    }

    /// Applies a poll outcome to the job and releases staged audio once the
    /// job has finished. Timed-out jobs keep their audio: recognition may
    /// still be running upstream, and the retention rule reclaims it.
    async fn settle(
        &self,
        job: &mut TranscriptionJob,
        outcome: PollOutcome,
    ) -> Result<CheckResponse, TranscriptionError> {
        match outcome {
            PollOutcome::Pending { progress_percent } => {
                return Ok(CheckResponse::Processing { progress_percent });
            }
            PollOutcome::Completed(segments) => {
                let finished = match self.aggregator.aggregate(&segments) {
                    Ok(result) => JobOutcome::Done(result),
                    Err(AggregationError::NoSpeechDetected) => JobOutcome::Failed {
                        reason: FailureReason::NoSpeechDetected,
                        message: AggregationError::NoSpeechDetected.to_string(),
                    },
                };
                job.finish(finished)?;
                self.release_source(job).await;
            }
            PollOutcome::Failed { .. } => self.release_source(job).await,
            PollOutcome::TimedOut { .. } | PollOutcome::AlreadyTerminal(_) => {}
        }

        match job.outcome() {
            Some(outcome) => {
                tracing::info!(job_id = %job.id, state = %job.state(), "Job settled");
                outcome_response(job, outcome)
            }
            None => Err(TranscriptionError::Internal(format!(
                "job {} is {} without an outcome",
                job.id,
                job.state()
            ))),
        }
    }

    async fn release_source(&self, job: &mut TranscriptionJob) {
        if let Some(staged) = job.take_source() {
            self.store.release(&staged).await;
        }
    }

    fn adopt(&self, job_id: &JobId) -> TranscriptionJob {
        tracing::info!(job_id = %job_id, "Adopting job submitted elsewhere");
        TranscriptionJob::new(job_id.clone(), None, self.submitter.default_config())
    }

    /// A concurrent check may have recorded the same handle first; the later
    /// observation wins.
    async fn record_adopted(&self, job: &TranscriptionJob) -> Result<(), TranscriptionError> {
        match self.jobs.create(job).await {
            Err(RepositoryError::AlreadyExists(_)) => Ok(self.jobs.save(job).await?),
            other => Ok(other?),
        }
    }

    /// Finished jobs go after the retention window. Jobs nobody finished
    /// (never checked, or abandoned after a failed query) go once the polling
    /// budget and the retention window have both passed.
    async fn purge_expired_jobs(&self) {
        let retention = chrono::Duration::from_std(self.options.finished_job_retention)
            .unwrap_or_else(|_| chrono::Duration::hours(1));
        let budget = chrono::Duration::from_std(self.scheduler.policy().budget)
            .unwrap_or_else(|_| chrono::Duration::minutes(9));
        let now = Utc::now();

        match self
            .jobs
            .purge_expired(now - retention, now - (budget + retention))
            .await
        {
            Ok(0) => {}
            Ok(purged) => tracing::debug!(purged, "Purged expired jobs"),
            Err(e) => tracing::warn!(error = %e, "Failed to purge expired jobs"),
        }
    }
}

fn outcome_response(
    job: &TranscriptionJob,
    outcome: &JobOutcome,
) -> Result<CheckResponse, TranscriptionError> {
    match outcome {
        JobOutcome::Done(result) => Ok(CheckResponse::Done(result.clone())),
        JobOutcome::Failed {
            reason: FailureReason::Recognition,
            message,
        } => Err(TranscriptionError::UpstreamRecognition(message.clone())),
        JobOutcome::Failed {
            reason: FailureReason::NoSpeechDetected,
            ..
        } => Err(TranscriptionError::NoSpeechDetected),
        JobOutcome::TimedOut => Err(TranscriptionError::Timeout {
            job_id: job.id.to_string(),
            waited_secs: job
                .completed_at
                .map(|at| (at - job.created_at).num_seconds().max(0) as u64)
                .unwrap_or_default(),
        }),
    }
}

fn polling_error(err: PollingError) -> TranscriptionError {
    match err {
        PollingError::Query(e) => TranscriptionError::from_status_query(e),
        PollingError::Transition(e) => e.into(),
    }
}
