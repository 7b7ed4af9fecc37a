mod encoding_resolver;
mod job_submitter;
mod polling_scheduler;
mod result_aggregator;
mod temp_audio_store;
mod transcription_error;
mod transcription_service;

pub use encoding_resolver::{EncodingResolver, UnknownEncodingPolicy, lookup_encoding};
pub use job_submitter::JobSubmitter;
pub use polling_scheduler::{PollOutcome, PollingError, PollingPolicy, PollingScheduler};
pub use result_aggregator::{AggregationError, ResultAggregator};
pub use temp_audio_store::{StagedUpload, TempAudioStore};
pub use transcription_error::{ErrorKind, TranscriptionError};
pub use transcription_service::{CheckResponse, ServiceOptions, TranscriptionService};
