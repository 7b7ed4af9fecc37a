use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::infrastructure::observability::request_id_middleware;
use crate::presentation::handlers::{
    check_handler, health_handler, job_status_handler, submit_handler, transcribe_handler,
    upload_url_handler,
};
use crate::presentation::state::AppState;

/// Room for the JSON envelope and the other request fields around the audio.
const BODY_ENVELOPE_BYTES: usize = 64 * 1024;

/// Largest request body that can still carry `max_audio_bytes` of base64 audio.
pub fn body_limit(max_audio_bytes: usize) -> usize {
    max_audio_bytes
        .div_ceil(3)
        .saturating_mul(4)
        .saturating_add(BODY_ENVELOPE_BYTES)
}

pub fn create_router(state: AppState) -> Router {
    let max_body = body_limit(state.transcription_service.options().max_audio_bytes);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/v1/transcriptions", post(submit_handler))
        .route("/api/v1/transcriptions/check", post(check_handler))
        .route("/api/v1/transcriptions/{job_id}", get(job_status_handler))
        .route("/api/v1/transcribe", post(transcribe_handler))
        .route("/api/v1/uploads", post(upload_url_handler))
        .layer(DefaultBodyLimit::max(max_body))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}
