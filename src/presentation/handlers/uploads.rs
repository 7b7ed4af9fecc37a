use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::presentation::state::AppState;

use super::ApiError;
use super::transcription_types::{UploadUrlRequest, UploadUrlResponse};

#[tracing::instrument(skip(state, body))]
pub async fn upload_url_handler(
    State(state): State<AppState>,
    body: Result<Json<UploadUrlRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = body?;

    let upload = state
        .transcription_service
        .stage_upload(&request.file_name, &request.content_type)
        .await?;

    Ok((StatusCode::OK, Json(UploadUrlResponse::from(upload))))
}
