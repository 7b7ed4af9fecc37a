mod audio_encoding;
mod job;
mod job_id;
mod job_state;
mod object_key;
mod recognition_config;
mod recognition_segment;
mod staged_audio;
mod transcript;

pub use audio_encoding::{AudioEncoding, ResolvedEncoding};
pub use job::{FailureReason, InvalidTransition, JobOutcome, TranscriptionJob};
pub use job_id::JobId;
pub use job_state::JobState;
pub use object_key::{ObjectKey, sanitize_name};
pub use recognition_config::{ConfigOverrides, RecognitionDefaults, TranscriptionConfig};
pub use recognition_segment::{
    RecognitionAlternative, RecognitionSegment, RecognizedWord, TimeOffset,
};
pub use staged_audio::{AudioSource, StagedAudio};
pub use transcript::{TranscriptionResult, Word};
