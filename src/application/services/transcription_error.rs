use crate::application::ports::{RecognizerError, RepositoryError, StagingStoreError};
use crate::domain::InvalidTransition;

/// Failure kinds surfaced to callers of the transcription service.
#[derive(Debug, thiserror::Error)]
pub enum TranscriptionError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Configuration(String),
    #[error("recognizer rejected the job: {0}")]
    UpstreamSubmission(String),
    #[error("recognition failed: {0}")]
    UpstreamRecognition(String),
    #[error(
        "stopped waiting for job {job_id} after {waited_secs}s; it may still complete upstream"
    )]
    Timeout { job_id: String, waited_secs: u64 },
    #[error("no speech detected in the audio")]
    NoSpeechDetected,
    #[error("storage: {0}")]
    Storage(#[from] StagingStoreError),
    #[error("{0}")]
    Internal(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Configuration,
    UpstreamSubmission,
    UpstreamRecognition,
    Timeout,
    NoSpeechDetected,
    Storage,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation_error",
            ErrorKind::Configuration => "configuration_error",
            ErrorKind::UpstreamSubmission => "upstream_submission_error",
            ErrorKind::UpstreamRecognition => "upstream_recognition_error",
            ErrorKind::Timeout => "timeout_error",
            ErrorKind::NoSpeechDetected => "no_speech_detected",
            ErrorKind::Storage => "storage_error",
            ErrorKind::Internal => "internal_error",
        }
    }
}

impl TranscriptionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TranscriptionError::Validation(_) => ErrorKind::Validation,
            TranscriptionError::Configuration(_) => ErrorKind::Configuration,
            TranscriptionError::UpstreamSubmission(_) => ErrorKind::UpstreamSubmission,
            TranscriptionError::UpstreamRecognition(_) => ErrorKind::UpstreamRecognition,
            TranscriptionError::Timeout { .. } => ErrorKind::Timeout,
            TranscriptionError::NoSpeechDetected => ErrorKind::NoSpeechDetected,
            TranscriptionError::Storage(_) => ErrorKind::Storage,
            TranscriptionError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Maps a failed start call. Local credential problems are configuration
    /// errors; everything the recognizer said no to is a submission error.
    pub(crate) fn from_submission(err: RecognizerError) -> Self {
        match err {
            RecognizerError::Credentials(msg) => TranscriptionError::Configuration(msg),
            other => TranscriptionError::UpstreamSubmission(other.to_string()),
        }
    }

    pub(crate) fn from_status_query(err: RecognizerError) -> Self {
        match err {
            RecognizerError::Credentials(msg) => TranscriptionError::Configuration(msg),
            other => TranscriptionError::UpstreamRecognition(format!("status query failed: {other}")),
        }
    }
}

impl From<RepositoryError> for TranscriptionError {
    fn from(err: RepositoryError) -> Self {
        TranscriptionError::Internal(format!("job repository: {err}"))
    }
}

impl From<InvalidTransition> for TranscriptionError {
    fn from(err: InvalidTransition) -> Self {
        TranscriptionError::Internal(err.to_string())
    }
}
