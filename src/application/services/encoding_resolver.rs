use crate::domain::{AudioEncoding, ResolvedEncoding};

use super::TranscriptionError;

const MEDIA_TYPE_PREFIXES: [&str; 3] = ["audio/", "video/", "application/"];

/// What to do with a hint that is not in the encoding table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownEncodingPolicy {
    #[default]
    DefaultMp3,
    AutoDetect,
    Reject,
}

/// Maps a MIME type, file extension or file name to a recognizer encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct EncodingResolver {
    policy: UnknownEncodingPolicy,
}

impl EncodingResolver {
    pub fn new(policy: UnknownEncodingPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> UnknownEncodingPolicy {
        self.policy
    }

    pub fn resolve(&self, hint: &str) -> Result<ResolvedEncoding, TranscriptionError> {
        if hint.trim().is_empty() {
            return Err(TranscriptionError::Validation(
                "encoding hint must not be empty".to_string(),
            ));
        }

        match lookup_encoding(hint) {
            Some(encoding) => Ok(ResolvedEncoding::explicit(encoding)),
            None => self.fallback(Some(hint)),
        }
    }

    /// Resolution when the caller gave no hint at all.
    pub fn resolve_missing(&self) -> Result<ResolvedEncoding, TranscriptionError> {
        self.fallback(None)
    }

    fn fallback(&self, hint: Option<&str>) -> Result<ResolvedEncoding, TranscriptionError> {
        match self.policy {
            UnknownEncodingPolicy::DefaultMp3 => Ok(ResolvedEncoding::explicit(AudioEncoding::Mp3)),
            UnknownEncodingPolicy::AutoDetect => Ok(ResolvedEncoding::auto_detect()),
            UnknownEncodingPolicy::Reject => Err(TranscriptionError::Validation(match hint {
                Some(h) => format!("unsupported audio format: {}", h),
                None => "audio format is required".to_string(),
            })),
        }
    }
}

pub fn lookup_encoding(hint: &str) -> Option<AudioEncoding> {
    match normalize_hint(hint).as_str() {
        "wav" => Some(AudioEncoding::Linear16),
        "flac" => Some(AudioEncoding::Flac),
        "ogg" | "opus" => Some(AudioEncoding::OggOpus),
        "webm" => Some(AudioEncoding::WebmOpus),
        "amr" => Some(AudioEncoding::Amr),
        "mp3" | "mpeg" | "aac" | "m4a" => Some(AudioEncoding::Mp3),
        _ => None,
    }
}

/// Reduces `audio/x-wav; codecs=1`, `.WAV` or `talk.wav` to `wav`.
fn normalize_hint(hint: &str) -> String {
    let lowered = hint.trim().to_ascii_lowercase();
    let without_params = lowered.split(';').next().unwrap_or_default().trim();

    let token = match MEDIA_TYPE_PREFIXES
        .iter()
        .find_map(|prefix| without_params.strip_prefix(prefix))
    {
        Some(subtype) => subtype,
        None => without_params
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .unwrap_or(without_params),
    };

    token.strip_prefix("x-").unwrap_or(token).to_string()
}
