use std::sync::Arc;

use crate::application::ports::{RecognitionRequest, SpeechRecognizer};
use crate::domain::{
    ConfigOverrides, RecognitionDefaults, ResolvedEncoding, StagedAudio, TranscriptionConfig,
    TranscriptionJob,
};

use super::{EncodingResolver, TranscriptionError};

/// Builds recognition requests and starts jobs. Rejections are surfaced
/// immediately; a malformed request does not succeed on retry.
pub struct JobSubmitter {
    recognizer: Arc<dyn SpeechRecognizer>,
    resolver: EncodingResolver,
    defaults: RecognitionDefaults,
}

impl JobSubmitter {
    pub fn new(
        recognizer: Arc<dyn SpeechRecognizer>,
        resolver: EncodingResolver,
        defaults: RecognitionDefaults,
    ) -> Self {
        Self {
            recognizer,
            resolver,
            defaults,
        }
    }

    pub fn build_config(
        &self,
        encoding_hint: Option<&str>,
        overrides: &ConfigOverrides,
    ) -> Result<TranscriptionConfig, TranscriptionError> {
        let encoding = match encoding_hint {
            Some(hint) => self.resolver.resolve(hint)?,
            None => self.resolver.resolve_missing()?,
        };
        Ok(TranscriptionConfig::build(&self.defaults, overrides, encoding))
    }

    /// Configuration recorded for jobs this process did not submit itself.
    pub fn default_config(&self) -> TranscriptionConfig {
        TranscriptionConfig::build(
            &self.defaults,
            &ConfigOverrides::default(),
            ResolvedEncoding::auto_detect(),
        )
    }

    #[tracing::instrument(skip(self, source, config), fields(encoding = ?config.encoding, model = %config.model))]
    pub async fn submit(
        &self,
        audio_uri: &str,
        source: Option<StagedAudio>,
        config: TranscriptionConfig,
    ) -> Result<TranscriptionJob, TranscriptionError> {
        let request = RecognitionRequest {
            config,
            audio_uri: audio_uri.to_string(),
        };

        let job_id = self
            .recognizer
            .start(&request)
            .await
            .map_err(TranscriptionError::from_submission)?;

        tracing::info!(job_id = %job_id, "Recognition job started");

        Ok(TranscriptionJob::new(job_id, source, request.config))
    }
}
