use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::application::services::{CheckResponse, StagedUpload};
use crate::domain::{AudioSource, ConfigOverrides, JobId, TranscriptionResult};

use super::ApiError;

/// Body of the submit and transcribe routes. Exactly one of `audioBase64`
/// and `audioUri` must be present.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionRequest {
    pub audio_base64: Option<String>,
    #[serde(alias = "gcsUri")]
    pub audio_uri: Option<String>,
    pub mime_type: Option<String>,
    pub file_name: Option<String>,
    pub language_code: Option<String>,
    pub model: Option<String>,
    pub enable_automatic_punctuation: Option<bool>,
}

impl TranscriptionRequest {
    pub fn into_parts(
        self,
        max_audio_bytes: usize,
    ) -> Result<(AudioSource, ConfigOverrides), ApiError> {
        let overrides = ConfigOverrides {
            language_code: self.language_code,
            model: self.model,
            enable_punctuation: self.enable_automatic_punctuation,
        };

        let encoded = self.audio_base64.filter(|s| !s.trim().is_empty());
        let uri = self.audio_uri.filter(|s| !s.trim().is_empty());

        let source = match (encoded, uri) {
            (Some(_), Some(_)) => {
                return Err(ApiError::validation(
                    "provide either audioBase64 or audioUri, not both",
                ));
            }
            (None, None) => {
                return Err(ApiError::validation("audioBase64 or audioUri is required"));
            }
            (Some(encoded), None) => {
                let (data_url_mime, payload) = split_data_url(&encoded);
                let data = decode_audio(payload, max_audio_bytes)?;
                AudioSource::Bytes {
                    data,
                    mime_type_or_extension: self.mime_type.or(data_url_mime),
                    file_name: self.file_name,
                }
            }
            (None, Some(uri)) => AudioSource::Uri {
                uri,
                mime_type_or_extension: self.mime_type,
            },
        };

        Ok((source, overrides))
    }
}

/// Accepts both bare base64 and `data:<mime>;base64,<payload>` URLs.
fn split_data_url(encoded: &str) -> (Option<String>, &str) {
    let trimmed = encoded.trim();
    let Some(rest) = trimmed.strip_prefix("data:") else {
        return (None, trimmed);
    };
    match rest.split_once(',') {
        Some((meta, payload)) => {
            let mime = meta
                .split(';')
                .next()
                .filter(|m| !m.is_empty())
                .map(str::to_string);
            (mime, payload)
        }
        None => (None, trimmed),
    }
}

fn decode_audio(payload: &str, max_audio_bytes: usize) -> Result<Vec<u8>, ApiError> {
    // Reject before decoding so an oversized body is never materialised twice.
    let estimated = payload.len() / 4 * 3;
    if estimated > max_audio_bytes.saturating_add(3) {
        return Err(ApiError::validation(format!(
            "audio is about {} bytes; the limit is {} bytes",
            estimated, max_audio_bytes
        )));
    }

    STANDARD
        .decode(payload)
        .map_err(|e| ApiError::validation(format!("audioBase64 is not valid base64: {}", e)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckRequest {
    #[serde(alias = "operationName")]
    pub job_id: Option<String>,
}

impl CheckRequest {
    pub fn job_id(self) -> Result<JobId, ApiError> {
        self.job_id
            .filter(|id| !id.trim().is_empty())
            .map(|id| JobId::new(id.trim()))
            .ok_or_else(|| ApiError::validation("jobId is required"))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub job_id: String,
    /// Same value as `jobId`, under the name older clients poll with.
    pub operation_name: String,
    pub status: &'static str,
}

impl SubmitResponse {
    pub fn new(job_id: JobId) -> Self {
        Self {
            operation_name: job_id.to_string(),
            job_id: job_id.to_string(),
            status: "SUBMITTED",
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusResponse {
    Processing {
        #[serde(rename = "progressPercent", skip_serializing_if = "Option::is_none")]
        progress_percent: Option<u32>,
    },
    Done(TranscriptionResult),
}

impl From<CheckResponse> for StatusResponse {
    fn from(response: CheckResponse) -> Self {
        match response {
            CheckResponse::Processing { progress_percent } => {
                StatusResponse::Processing { progress_percent }
            }
            CheckResponse::Done(result) => StatusResponse::Done(result),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlRequest {
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub content_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlResponse {
    pub upload_url: String,
    pub storage_uri: String,
}

impl From<StagedUpload> for UploadUrlResponse {
    fn from(upload: StagedUpload) -> Self {
        Self {
            upload_url: upload.upload_url,
            storage_uri: upload.storage_uri,
        }
    }
}
