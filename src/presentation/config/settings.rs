use std::time::Duration;

use config::{Config, ConfigError, File};
use serde::Deserialize;

use crate::application::ports::RetentionPolicy;
use crate::application::services::{PollingPolicy, ServiceOptions, UnknownEncodingPolicy};
use crate::domain::RecognitionDefaults;

use super::Environment;

pub const ENV_PREFIX: &str = "VOICESCRIBE";
pub const ENVIRONMENT_VAR: &str = "APP_ENVIRONMENT";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub google: GoogleSettings,
    pub storage: StorageSettings,
    pub recognition: RecognitionSettings,
    pub polling: PollingSettings,
    pub jobs: JobSettings,
    pub limits: LimitSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleSettings {
    /// Falls back to the project of the service-account key when unset.
    pub project_id: Option<String>,
    pub credentials_json: Option<String>,
    pub credentials_path: Option<String>,
    pub speech_base_url: String,
    pub storage_base_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageProviderSetting {
    Gcs,
    Local,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    pub provider: StorageProviderSetting,
    /// Defaults to `<project>-voicescribe-temp` when unset.
    pub bucket: Option<String>,
    pub location: String,
    pub retention_days: u32,
    pub local_path: String,
    pub upload_url_ttl_secs: u64,
}

impl StorageSettings {
    pub fn bucket_name(&self, project_id: &str) -> String {
        self.bucket
            .as_deref()
            .filter(|b| !b.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("{project_id}-voicescribe-temp"))
    }

    pub fn retention(&self) -> RetentionPolicy {
        RetentionPolicy {
            max_age_days: self.retention_days,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecognitionSettings {
    pub language_code: String,
    pub model: String,
    pub enable_punctuation: bool,
    pub unknown_encoding: UnknownEncodingSetting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownEncodingSetting {
    DefaultMp3,
    AutoDetect,
    Reject,
}

impl From<UnknownEncodingSetting> for UnknownEncodingPolicy {
    fn from(setting: UnknownEncodingSetting) -> Self {
        match setting {
            UnknownEncodingSetting::DefaultMp3 => UnknownEncodingPolicy::DefaultMp3,
            UnknownEncodingSetting::AutoDetect => UnknownEncodingPolicy::AutoDetect,
            UnknownEncodingSetting::Reject => UnknownEncodingPolicy::Reject,
        }
    }
}

impl RecognitionSettings {
    pub fn defaults(&self) -> RecognitionDefaults {
        RecognitionDefaults {
            language_code: self.language_code.clone(),
            model: self.model.clone(),
            enable_punctuation: self.enable_punctuation,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollingSettings {
    pub interval_secs: u64,
    pub backoff_multiplier: f64,
    pub max_interval_secs: u64,
    pub budget_secs: u64,
    pub max_consecutive_query_failures: u32,
}

impl PollingSettings {
    pub fn policy(&self) -> PollingPolicy {
        PollingPolicy {
            interval: Duration::from_secs(self.interval_secs.max(1)),
            backoff_multiplier: self.backoff_multiplier,
            max_interval: Duration::from_secs(self.max_interval_secs),
            budget: Duration::from_secs(self.budget_secs),
            max_consecutive_query_failures: self.max_consecutive_query_failures.max(1),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobSettings {
    pub finished_retention_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LimitSettings {
    pub max_audio_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    pub json: bool,
}

impl Settings {
    /// Layers built-in defaults, `appsettings.toml`, the per-environment
    /// file and `VOICESCRIBE__SECTION__KEY` environment variables.
    pub fn load(environment: Environment) -> Result<Self, ConfigError> {
        let env_file = format!("appsettings.{}", environment.as_str());

        Self::builder_with_defaults()?
            .add_source(File::with_name("appsettings").required(false))
            .add_source(File::with_name(&env_file).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Built-in defaults only, without files or environment.
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::builder_with_defaults()?.build()?.try_deserialize()
    }

    pub fn service_options(&self) -> ServiceOptions {
        ServiceOptions {
            max_audio_bytes: self.limits.max_audio_bytes,
            finished_job_retention: Duration::from_secs(self.jobs.finished_retention_secs),
            upload_url_ttl: Duration::from_secs(self.storage.upload_url_ttl_secs),
        }
    }

    fn builder_with_defaults()
    -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("google.speech_base_url", "https://speech.googleapis.com")?
            .set_default("google.storage_base_url", "https://storage.googleapis.com")?
            .set_default("storage.provider", "gcs")?
            .set_default("storage.location", "US")?
            .set_default("storage.retention_days", 1)?
            .set_default("storage.local_path", "./staging")?
            .set_default("storage.upload_url_ttl_secs", 15 * 60)?
            .set_default("recognition.language_code", "es-MX")?
            .set_default("recognition.model", "latest_long")?
            .set_default("recognition.enable_punctuation", true)?
            .set_default("recognition.unknown_encoding", "default_mp3")?
            .set_default("polling.interval_secs", 5)?
            .set_default("polling.backoff_multiplier", 1.0)?
            .set_default("polling.max_interval_secs", 30)?
            .set_default("polling.budget_secs", 540)?
            .set_default("polling.max_consecutive_query_failures", 3)?
            .set_default("jobs.finished_retention_secs", 3600)?
            .set_default("limits.max_audio_bytes", 10 * 1024 * 1024)?
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)
    }
}
