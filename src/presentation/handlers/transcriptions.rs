use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::domain::JobId;
use crate::presentation::state::AppState;

use super::ApiError;
use super::transcription_types::{
    CheckRequest, StatusResponse, SubmitResponse, TranscriptionRequest,
};

#[tracing::instrument(skip(state, body))]
pub async fn submit_handler(
    State(state): State<AppState>,
    body: Result<Json<TranscriptionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = body?;
    let max_audio_bytes = state.transcription_service.options().max_audio_bytes;
    let (source, overrides) = request.into_parts(max_audio_bytes)?;

    let job_id = state
        .transcription_service
        .submit(source, overrides)
        .await?;

    Ok((StatusCode::ACCEPTED, Json(SubmitResponse::new(job_id))))
}

#[tracing::instrument(skip(state))]
pub async fn job_status_handler(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let job_id = job_id.trim();
    if job_id.is_empty() {
        return Err(ApiError::validation("jobId is required"));
    }

    let response = state
        .transcription_service
        .check(&JobId::new(job_id))
        .await?;

    Ok((StatusCode::OK, Json(StatusResponse::from(response))))
}

#[tracing::instrument(skip(state, body))]
pub async fn check_handler(
    State(state): State<AppState>,
    body: Result<Json<CheckRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = body?;
    let job_id = request.job_id()?;

    let response = state.transcription_service.check(&job_id).await?;

    Ok((StatusCode::OK, Json(StatusResponse::from(response))))
}

/// Submits and holds the connection until the transcript is ready.
#[tracing::instrument(skip(state, body))]
pub async fn transcribe_handler(
    State(state): State<AppState>,
    body: Result<Json<TranscriptionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = body?;
    let max_audio_bytes = state.transcription_service.options().max_audio_bytes;
    let (source, overrides) = request.into_parts(max_audio_bytes)?;

    let result = state
        .transcription_service
        .transcribe(source, overrides)
        .await?;

    Ok((StatusCode::OK, Json(StatusResponse::Done(result))))
}
