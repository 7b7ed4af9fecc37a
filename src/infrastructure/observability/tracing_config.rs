use crate::presentation::config::{Environment, LoggingSettings};

/// Configuration for tracing initialization.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    pub environment: String,
    pub json_format: bool,
    /// Used when `RUST_LOG` is not set.
    pub default_filter: String,
}

impl TracingConfig {
    pub fn from_settings(logging: &LoggingSettings, environment: Environment) -> Self {
        let level = match logging.level.trim() {
            "" => "info",
            level => level,
        };
        Self {
            environment: environment.to_string(),
            json_format: logging.json,
            default_filter: format!("{level},voicescribe={level},tower_http=debug"),
        }
    }
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default().to_string(),
            json_format: false,
            default_filter: "info,voicescribe=debug,tower_http=debug".to_string(),
        }
    }
}
