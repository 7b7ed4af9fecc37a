use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use voicescribe::application::ports::{
    OperationStatus, RecognitionRequest, RecognizerError, SpeechRecognizer,
};
use voicescribe::domain::{
    AudioEncoding, ConfigOverrides, JobId, RecognitionDefaults, ResolvedEncoding, TimeOffset,
    TranscriptionConfig,
};
use voicescribe::infrastructure::google::{
    AccessTokenProvider, CredentialsError, GoogleSpeechRecognizer, StaticTokenProvider,
    parse_duration,
};

struct FailingTokenProvider {
    exchange_failed: bool,
}

#[async_trait::async_trait]
impl AccessTokenProvider for FailingTokenProvider {
    async fn access_token(&self) -> Result<String, CredentialsError> {
        if self.exchange_failed {
            Err(CredentialsError::TokenExchange(
                "request: connection reset".to_string(),
            ))
        } else {
            Err(CredentialsError::Malformed("private key".to_string()))
        }
    }
}

#[derive(Clone)]
struct MockSpeech {
    status: u16,
    body: &'static str,
    captured: Arc<Mutex<Vec<(String, Option<String>, Value)>>>,
}

async fn start_handler(
    State(mock): State<MockSpeech>,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let json = serde_json::from_str(&body).unwrap_or(Value::Null);
    mock.captured
        .lock()
        .unwrap()
        .push(("start".to_string(), auth, json));
    (StatusCode::from_u16(mock.status).unwrap(), mock.body)
}

async fn operation_handler(
    State(mock): State<MockSpeech>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    mock.captured
        .lock()
        .unwrap()
        .push((name, None, Value::Null));
    (StatusCode::from_u16(mock.status).unwrap(), mock.body)
}

async fn start_mock_speech_server(
    status: u16,
    body: &'static str,
) -> (String, MockSpeech, oneshot::Sender<()>) {
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let mock = MockSpeech {
        status,
        body,
        captured: Arc::new(Mutex::new(Vec::new())),
    };

    let app = Router::new()
        .route("/v1/speech:longrunningrecognize", post(start_handler))
        .route("/v1/operations/{name}", get(operation_handler))
        .with_state(mock.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{}", addr);

    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            })
            .await
            .ok();
    });

    (base_url, mock, shutdown_tx)
}

fn recognizer(base_url: &str) -> GoogleSpeechRecognizer {
    GoogleSpeechRecognizer::new(base_url, Arc::new(StaticTokenProvider::new("test-token")))
}

fn request(encoding: ResolvedEncoding) -> RecognitionRequest {
    RecognitionRequest {
        config: TranscriptionConfig::build(
            &RecognitionDefaults::default(),
            &ConfigOverrides::default(),
            encoding,
        ),
        audio_uri: "gs://test-bucket/audio_1_a.wav".to_string(),
    }
}

#[tokio::test]
async fn given_accepted_request_when_starting_then_operation_name_becomes_job_id() {
    let (base_url, mock, shutdown_tx) =
        start_mock_speech_server(200, r#"{"name": "7412365987"}"#).await;

    let job_id = recognizer(&base_url)
        .start(&request(ResolvedEncoding::explicit(AudioEncoding::Linear16)))
        .await
        .unwrap();

    assert_eq!(job_id.as_str(), "7412365987");
    let captured = mock.captured.lock().unwrap().clone();
    let (_, auth, body) = &captured[0];
    assert_eq!(auth.as_deref(), Some("Bearer test-token"));
    assert_eq!(body["audio"]["uri"], "gs://test-bucket/audio_1_a.wav");
    assert_eq!(body["config"]["encoding"], "LINEAR16");
    assert_eq!(body["config"]["languageCode"], "es-MX");
    assert_eq!(body["config"]["enableWordTimeOffsets"], true);
    assert_eq!(body["config"]["enableWordConfidence"], true);
    assert!(body["config"].get("sampleRateHertz").is_none());
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_amr_audio_when_starting_then_narrowband_rate_is_sent() {
    let (base_url, mock, shutdown_tx) = start_mock_speech_server(200, r#"{"name": "op"}"#).await;

    recognizer(&base_url)
        .start(&request(ResolvedEncoding::explicit(AudioEncoding::Amr)))
        .await
        .unwrap();

    let captured = mock.captured.lock().unwrap().clone();
    assert_eq!(captured[0].2["config"]["encoding"], "AMR");
    assert_eq!(captured[0].2["config"]["sampleRateHertz"], 8000);
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_auto_detect_when_starting_then_encoding_is_omitted() {
    let (base_url, mock, shutdown_tx) = start_mock_speech_server(200, r#"{"name": "op"}"#).await;

    recognizer(&base_url)
        .start(&request(ResolvedEncoding::auto_detect()))
        .await
        .unwrap();

    let captured = mock.captured.lock().unwrap().clone();
    assert!(captured[0].2["config"].get("encoding").is_none());
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_client_error_when_starting_then_request_is_rejected() {
    let (base_url, _mock, shutdown_tx) = start_mock_speech_server(
        400,
        r#"{"error": {"code": 400, "message": "Invalid recognition 'config': bad encoding"}}"#,
    )
    .await;

    let err = recognizer(&base_url)
        .start(&request(ResolvedEncoding::auto_detect()))
        .await
        .unwrap_err();

    assert!(matches!(err, RecognizerError::Rejected(ref m) if m.contains("bad encoding")));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_server_error_when_starting_then_request_failed() {
    let (base_url, _mock, shutdown_tx) = start_mock_speech_server(503, "unavailable").await;

    let err = recognizer(&base_url)
        .start(&request(ResolvedEncoding::auto_detect()))
        .await
        .unwrap_err();

    assert!(matches!(err, RecognizerError::RequestFailed(_)));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_empty_operation_name_when_starting_then_invalid_response() {
    let (base_url, _mock, shutdown_tx) = start_mock_speech_server(200, r#"{"name": ""}"#).await;

    let err = recognizer(&base_url)
        .start(&request(ResolvedEncoding::auto_detect()))
        .await
        .unwrap_err();

    assert!(matches!(err, RecognizerError::InvalidResponse(_)));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_running_operation_when_querying_then_progress_is_reported() {
    let (base_url, mock, shutdown_tx) = start_mock_speech_server(
        200,
        r#"{"name": "42", "metadata": {"progressPercent": 35}, "done": false}"#,
    )
    .await;

    let status = recognizer(&base_url)
        .status(&JobId::new("42"))
        .await
        .unwrap();

    assert_eq!(
        status,
        OperationStatus::Running {
            progress_percent: Some(35)
        }
    );
    assert_eq!(mock.captured.lock().unwrap()[0].0, "42");
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_done_operation_when_querying_then_segments_and_word_offsets_are_parsed() {
    let (base_url, _mock, shutdown_tx) = start_mock_speech_server(
        200,
        r#"{
            "name": "42",
            "done": true,
            "response": {
                "results": [{
                    "alternatives": [{
                        "transcript": "hola mundo",
                        "confidence": 0.92,
                        "words": [
                            {"word": "hola", "startTime": "0s", "endTime": "0.400s", "confidence": 0.95},
                            {"word": "mundo", "startTime": {"seconds": 1, "nanos": 100000000}, "endTime": "1.5s"}
                        ]
                    }]
                }]
            }
        }"#,
    )
    .await;

    let status = recognizer(&base_url)
        .status(&JobId::new("42"))
        .await
        .unwrap();

    let OperationStatus::Done(segments) = status else {
        panic!("expected a finished operation, got {status:?}");
    };
    let alternative = &segments[0].alternatives[0];
    assert_eq!(alternative.transcript, "hola mundo");
    assert_eq!(alternative.words[0].end, Some(TimeOffset::new(0, 400_000_000)));
    assert_eq!(alternative.words[1].start, Some(TimeOffset::new(1, 100_000_000)));
    assert_eq!(alternative.words[1].end, Some(TimeOffset::new(1, 500_000_000)));
    assert_eq!(alternative.words[1].confidence, None);
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_done_operation_without_results_when_querying_then_no_segments() {
    let (base_url, _mock, shutdown_tx) =
        start_mock_speech_server(200, r#"{"name": "42", "done": true, "response": {}}"#).await;

    let status = recognizer(&base_url)
        .status(&JobId::new("42"))
        .await
        .unwrap();

    assert_eq!(status, OperationStatus::Done(vec![]));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_failed_operation_when_querying_then_upstream_message_is_kept() {
    let (base_url, _mock, shutdown_tx) = start_mock_speech_server(
        200,
        r#"{"name": "42", "done": true, "error": {"code": 3, "message": "Audio data does not appear to be in a supported encoding"}}"#,
    )
    .await;

    let status = recognizer(&base_url)
        .status(&JobId::new("42"))
        .await
        .unwrap();

    assert_eq!(
        status,
        OperationStatus::Failed {
            code: Some(3),
            message: "Audio data does not appear to be in a supported encoding".to_string()
        }
    );
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_unknown_operation_when_querying_then_request_failed() {
    let (base_url, _mock, shutdown_tx) = start_mock_speech_server(404, "not found").await;

    let err = recognizer(&base_url)
        .status(&JobId::new("missing"))
        .await
        .unwrap_err();

    assert!(matches!(err, RecognizerError::RequestFailed(ref m) if m.contains("404")));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_token_exchange_failure_when_starting_then_request_failed() {
    let recognizer = GoogleSpeechRecognizer::new(
        "http://127.0.0.1:9",
        Arc::new(FailingTokenProvider {
            exchange_failed: true,
        }),
    );

    let err = recognizer
        .start(&request(ResolvedEncoding::auto_detect()))
        .await
        .unwrap_err();

    assert!(matches!(err, RecognizerError::RequestFailed(ref m) if m.contains("token exchange")));
}

#[tokio::test]
async fn given_malformed_credentials_when_querying_then_credentials_error() {
    let recognizer = GoogleSpeechRecognizer::new(
        "http://127.0.0.1:9",
        Arc::new(FailingTokenProvider {
            exchange_failed: false,
        }),
    );

    let err = recognizer.status(&JobId::new("op-1")).await.unwrap_err();

    assert!(matches!(err, RecognizerError::Credentials(_)));
}

#[test]
fn given_fractional_duration_when_parsing_then_nanos_are_exact() {
    assert_eq!(parse_duration("3.250s").unwrap(), TimeOffset::new(3, 250_000_000));
    assert_eq!(parse_duration("0.000000001s").unwrap(), TimeOffset::new(0, 1));
    assert_eq!(parse_duration("12s").unwrap(), TimeOffset::new(12, 0));
    assert_eq!(parse_duration(".5s").unwrap(), TimeOffset::new(0, 500_000_000));
}

#[test]
fn given_negative_duration_when_parsing_then_both_parts_are_negative() {
    assert_eq!(parse_duration("-1.5s").unwrap(), TimeOffset::new(-1, -500_000_000));
}

#[test]
fn given_malformed_duration_when_parsing_then_error() {
    assert!(parse_duration("3.25").is_err());
    assert!(parse_duration("s").is_err());
    assert!(parse_duration("1.0000000001s").is_err());
    assert!(parse_duration("abcs").is_err());
}
