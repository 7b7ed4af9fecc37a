use async_trait::async_trait;

use crate::domain::{JobId, RecognitionSegment, TranscriptionConfig};

/// Start request for a long-running recognition.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionRequest {
    pub config: TranscriptionConfig,
    pub audio_uri: String,
}

/// Snapshot of a recognition job as reported by the recognizer.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationStatus {
    Running { progress_percent: Option<u32> },
    Done(Vec<RecognitionSegment>),
    Failed { code: Option<i32>, message: String },
}

#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Starts an asynchronous recognition and returns its handle.
    async fn start(&self, request: &RecognitionRequest) -> Result<JobId, RecognizerError>;

    /// Reads the job status. Idempotent; never mutates the job.
    async fn status(&self, job_id: &JobId) -> Result<OperationStatus, RecognizerError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RecognizerError {
    #[error("request rejected: {0}")]
    Rejected(String),
    #[error("request failed: {0}")]
    RequestFailed(String),
    #[error("credentials unavailable: {0}")]
    Credentials(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}
