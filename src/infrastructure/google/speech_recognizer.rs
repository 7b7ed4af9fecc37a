use std::sync::Arc;

use async_trait::async_trait;

use crate::application::ports::{
    OperationStatus, RecognitionRequest, RecognizerError, SpeechRecognizer,
};
use crate::domain::JobId;

use super::speech_wire::{LongRunningRecognizeRequest, OperationHandle, OperationResponse};
use super::{AccessTokenProvider, CredentialsError};

pub const DEFAULT_SPEECH_BASE_URL: &str = "https://speech.googleapis.com";

/// Long-running recognition over the Speech-to-Text v1 REST API.
pub struct GoogleSpeechRecognizer {
    client: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn AccessTokenProvider>,
}

impl GoogleSpeechRecognizer {
    pub fn new(base_url: &str, tokens: Arc<dyn AccessTokenProvider>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
        }
    }

    /// A failed token exchange is a transport problem and may succeed on
    /// retry. Only unusable credentials are reported as such.
    async fn bearer(&self) -> Result<String, RecognizerError> {
        self.tokens.access_token().await.map_err(|e| match e {
            CredentialsError::TokenExchange(_) => RecognizerError::RequestFailed(e.to_string()),
            other => RecognizerError::Credentials(other.to_string()),
        })
    }
}

#[async_trait]
impl SpeechRecognizer for GoogleSpeechRecognizer {
    #[tracing::instrument(skip(self, request), fields(uri = %request.audio_uri))]
    async fn start(&self, request: &RecognitionRequest) -> Result<JobId, RecognizerError> {
        let endpoint = format!("{}/v1/speech:longrunningrecognize", self.base_url);
        let token = self.bearer().await?;

        tracing::debug!(endpoint = %endpoint, "Starting long-running recognition");

        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(token)
            .json(&LongRunningRecognizeRequest::from(request))
            .send()
            .await
            .map_err(|e| RecognizerError::RequestFailed(format!("request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            let message = format!("status {}: {}", status, body);
            return Err(if status.is_client_error() {
                RecognizerError::Rejected(message)
            } else {
                RecognizerError::RequestFailed(message)
            });
        }

        let handle: OperationHandle = response
            .json()
            .await
            .map_err(|e| RecognizerError::InvalidResponse(format!("parse response: {}", e)))?;

        if handle.name.trim().is_empty() {
            return Err(RecognizerError::InvalidResponse(
                "operation name is empty".to_string(),
            ));
        }

        Ok(JobId::new(handle.name))
    }

    #[tracing::instrument(skip(self), fields(job_id = %job_id))]
    async fn status(&self, job_id: &JobId) -> Result<OperationStatus, RecognizerError> {
        let endpoint = format!(
            "{}/v1/operations/{}",
            self.base_url,
            urlencoding::encode(job_id.as_str())
        );
        let token = self.bearer().await?;

        let response = self
            .client
            .get(&endpoint)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| RecognizerError::RequestFailed(format!("request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(RecognizerError::RequestFailed(format!(
                "status {}: {}",
                status, body
            )));
        }

        let operation: OperationResponse = response
            .json()
            .await
            .map_err(|e| RecognizerError::InvalidResponse(format!("parse response: {}", e)))?;

        operation
            .into_status()
            .map_err(RecognizerError::InvalidResponse)
    }
}
