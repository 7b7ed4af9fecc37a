mod credentials;
mod speech_recognizer;
mod speech_wire;
mod token_provider;

pub use credentials::{
    CREDENTIALS_ENV_VAR, CredentialsError, GoogleCredentials, ServiceAccountKey,
    normalize_private_key,
};
pub use speech_recognizer::{DEFAULT_SPEECH_BASE_URL, GoogleSpeechRecognizer};
pub use speech_wire::parse_duration;
pub use token_provider::{
    AccessTokenProvider, CLOUD_PLATFORM_SCOPE, ServiceAccountTokenProvider, StaticTokenProvider,
};
