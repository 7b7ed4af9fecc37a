use std::sync::Arc;

use voicescribe::application::ports::RecognizerError;
use voicescribe::application::services::{
    EncodingResolver, ErrorKind, JobSubmitter, UnknownEncodingPolicy,
};
use voicescribe::domain::{
    AudioEncoding, ConfigOverrides, JobState, RecognitionDefaults,
};

use crate::helpers::FakeRecognizer;

fn submitter(recognizer: &Arc<FakeRecognizer>) -> JobSubmitter {
    JobSubmitter::new(
        recognizer.clone(),
        EncodingResolver::new(UnknownEncodingPolicy::DefaultMp3),
        RecognitionDefaults::default(),
    )
}

#[tokio::test]
async fn given_wav_hint_when_submitting_then_request_has_linear16_and_word_details() {
    let recognizer = Arc::new(FakeRecognizer::new());
    let submitter = submitter(&recognizer);
    let config = submitter
        .build_config(Some("audio/wav"), &ConfigOverrides::default())
        .unwrap();

    let job = submitter
        .submit("gs://bucket/audio_1_a.wav", None, config)
        .await
        .unwrap();

    let request = recognizer.last_request().unwrap();
    assert_eq!(job.id.as_str(), "op-1");
    assert_eq!(job.state(), JobState::Submitted);
    assert_eq!(request.audio_uri, "gs://bucket/audio_1_a.wav");
    assert_eq!(request.config.encoding, Some(AudioEncoding::Linear16));
    assert_eq!(request.config.sample_rate_hertz, None);
    assert!(request.config.enable_word_timestamps);
    assert!(request.config.enable_word_confidence);
}

#[tokio::test]
async fn given_overrides_when_building_config_then_caller_values_win() {
    let recognizer = Arc::new(FakeRecognizer::new());
    let overrides = ConfigOverrides {
        language_code: Some("en-US".to_string()),
        model: Some("phone_call".to_string()),
        enable_punctuation: Some(false),
    };

    let config = submitter(&recognizer)
        .build_config(Some("flac"), &overrides)
        .unwrap();

    assert_eq!(config.language_code, "en-US");
    assert_eq!(config.model, "phone_call");
    assert!(!config.enable_punctuation);
    assert_eq!(config.encoding, Some(AudioEncoding::Flac));
}

#[tokio::test]
async fn given_recognizer_rejection_when_submitting_then_upstream_submission_error() {
    let recognizer = Arc::new(
        FakeRecognizer::new()
            .rejecting(RecognizerError::Rejected("status 400: bad uri".to_string())),
    );
    let submitter = submitter(&recognizer);
    let config = submitter.default_config();

    let err = submitter
        .submit("gs://bucket/x", None, config)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UpstreamSubmission);
    assert!(err.to_string().contains("bad uri"));
    assert_eq!(recognizer.start_calls(), 1);
}

#[tokio::test]
async fn given_missing_credentials_when_submitting_then_configuration_error() {
    let recognizer = Arc::new(
        FakeRecognizer::new()
            .rejecting(RecognizerError::Credentials("GOOGLE_CREDENTIALS is not set".to_string())),
    );
    let submitter = submitter(&recognizer);

    let err = submitter
        .submit("gs://bucket/x", None, submitter.default_config())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn given_default_config_when_built_then_encoding_is_left_to_detection() {
    let recognizer = Arc::new(FakeRecognizer::new());

    let config = submitter(&recognizer).default_config();

    assert_eq!(config.encoding, None);
    assert_eq!(config.language_code, "es-MX");
}
