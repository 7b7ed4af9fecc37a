use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::services::{ErrorKind, TranscriptionError};

/// Error body shared by every route: `{error, message}` plus the job id when
/// the caller can keep checking it.
#[derive(Debug)]
pub struct ApiError {
    kind: ErrorKind,
    message: String,
    job_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponse {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    job_id: Option<String>,
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Validation,
            message: message.into(),
            job_id: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    fn status(&self) -> StatusCode {
        match self.kind {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::NoSpeechDetected => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::UpstreamSubmission | ErrorKind::UpstreamRecognition => {
                StatusCode::BAD_GATEWAY
            }
            ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ErrorKind::Configuration | ErrorKind::Storage | ErrorKind::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind.as_str(), self.message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::info!(error = %self, "Request rejected");
        }

        let body = ErrorResponse {
            error: self.kind.as_str(),
            message: self.message,
            job_id: self.job_id,
        };
        (status, Json(body)).into_response()
    }
}

impl From<TranscriptionError> for ApiError {
    fn from(err: TranscriptionError) -> Self {
        let job_id = match &err {
            TranscriptionError::Timeout { job_id, .. } => Some(job_id.clone()),
            _ => None,
        };
        Self {
            kind: err.kind(),
            message: err.to_string(),
            job_id,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}
