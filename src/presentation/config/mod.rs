mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    ENV_PREFIX, ENVIRONMENT_VAR, GoogleSettings, JobSettings, LimitSettings, LoggingSettings,
    PollingSettings, RecognitionSettings, ServerSettings, Settings, StorageProviderSetting,
    StorageSettings, UnknownEncodingSetting,
};
