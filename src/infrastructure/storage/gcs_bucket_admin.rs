use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::json;

use crate::application::ports::{ContainerSetup, RetentionPolicy, StagingStoreError};
use crate::infrastructure::google::AccessTokenProvider;

pub const DEFAULT_STORAGE_BASE_URL: &str = "https://storage.googleapis.com";

/// Bucket existence check and creation through the GCS JSON API.
pub struct GcsBucketAdmin {
    client: reqwest::Client,
    base_url: String,
    project_id: String,
    bucket: String,
    location: String,
    tokens: Arc<dyn AccessTokenProvider>,
}

impl GcsBucketAdmin {
    pub fn new(
        base_url: &str,
        project_id: &str,
        bucket: &str,
        location: &str,
        tokens: Arc<dyn AccessTokenProvider>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            project_id: project_id.to_string(),
            bucket: bucket.to_string(),
            location: location.to_string(),
            tokens,
        }
    }

    #[tracing::instrument(skip(self), fields(bucket = %self.bucket))]
    pub async fn ensure_bucket(
        &self,
        retention: &RetentionPolicy,
    ) -> Result<ContainerSetup, StagingStoreError> {
        let token = self
            .tokens
            .access_token()
            .await
            .map_err(|e| StagingStoreError::ContainerSetupFailed(e.to_string()))?;

        let lookup = format!(
            "{}/storage/v1/b/{}",
            self.base_url,
            urlencoding::encode(&self.bucket)
        );
        let response = self
            .client
            .get(&lookup)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| StagingStoreError::ContainerSetupFailed(format!("lookup: {}", e)))?;

        match response.status() {
            status if status.is_success() => return Ok(ContainerSetup::Existing),
            StatusCode::NOT_FOUND => {}
            status => {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "unknown error".to_string());
                return Err(StagingStoreError::ContainerSetupFailed(format!(
                    "lookup status {}: {}",
                    status, body
                )));
            }
        }

        tracing::info!(location = %self.location, "Creating staging bucket");
        self.create_bucket(&token, retention).await
    }

    async fn create_bucket(
        &self,
        token: &str,
        retention: &RetentionPolicy,
    ) -> Result<ContainerSetup, StagingStoreError> {
        let endpoint = format!("{}/storage/v1/b", self.base_url);
        let body = json!({
            "name": self.bucket,
            "location": self.location,
            "storageClass": "STANDARD",
            "lifecycle": {
                "rule": [{
                    "action": { "type": "Delete" },
                    "condition": { "age": retention.max_age_days }
                }]
            },
            "cors": [{
                "origin": ["*"],
                "method": ["PUT", "POST"],
                "responseHeader": ["Content-Type"],
                "maxAgeSeconds": 3600
            }]
        });

        let response = self
            .client
            .post(&endpoint)
            .query(&[("project", self.project_id.as_str())])
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| StagingStoreError::ContainerSetupFailed(format!("create: {}", e)))?;

        match response.status() {
            status if status.is_success() => Ok(ContainerSetup::Created),
            // Someone else created it between our lookup and create.
            StatusCode::CONFLICT => Ok(ContainerSetup::Existing),
            status => {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "unknown error".to_string());
                Err(StagingStoreError::ContainerSetupFailed(format!(
                    "create status {}: {}",
                    status, body
                )))
            }
        }
    }
}
