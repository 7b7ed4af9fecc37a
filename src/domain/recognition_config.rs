use super::{AudioEncoding, ResolvedEncoding};

/// Defaults applied to caller options that are absent or blank.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionDefaults {
    pub language_code: String,
    pub model: String,
    pub enable_punctuation: bool,
}

impl Default for RecognitionDefaults {
    fn default() -> Self {
        Self {
            language_code: "es-MX".to_string(),
            model: "latest_long".to_string(),
            enable_punctuation: true,
        }
    }
}

/// Options a caller may set per submission.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub language_code: Option<String>,
    pub model: Option<String>,
    pub enable_punctuation: Option<bool>,
}

/// Recognition settings for one job. Immutable once the job is submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptionConfig {
    pub language_code: String,
    pub model: String,
    pub encoding: Option<AudioEncoding>,
    pub sample_rate_hertz: Option<u32>,
    pub enable_punctuation: bool,
    pub enable_word_timestamps: bool,
    pub enable_word_confidence: bool,
}

impl TranscriptionConfig {
    pub fn build(
        defaults: &RecognitionDefaults,
        overrides: &ConfigOverrides,
        encoding: ResolvedEncoding,
    ) -> Self {
        Self {
            language_code: non_blank(overrides.language_code.as_deref())
                .unwrap_or(&defaults.language_code)
                .to_string(),
            model: non_blank(overrides.model.as_deref())
                .unwrap_or(&defaults.model)
                .to_string(),
            encoding: encoding.encoding,
            sample_rate_hertz: encoding.sample_rate_hertz,
            enable_punctuation: overrides
                .enable_punctuation
                .unwrap_or(defaults.enable_punctuation),
            enable_word_timestamps: true,
            enable_word_confidence: true,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
