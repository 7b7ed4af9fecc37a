mod job_repository;
mod repository_error;
mod speech_recognizer;
mod staging_store;

pub use job_repository::JobRepository;
pub use repository_error::RepositoryError;
pub use speech_recognizer::{
    OperationStatus, RecognitionRequest, RecognizerError, SpeechRecognizer,
};
pub use staging_store::{ContainerSetup, RetentionPolicy, StagingStore, StagingStoreError};
