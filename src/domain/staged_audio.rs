use chrono::{DateTime, Utc};

use super::ObjectKey;

/// Audio written to the staging container on behalf of one job.
#[derive(Debug, Clone, PartialEq)]
pub struct StagedAudio {
    pub bucket: String,
    pub key: ObjectKey,
    pub uri: String,
    pub retention_deadline: DateTime<Utc>,
}

/// What a caller hands to `submit`.
#[derive(Debug, Clone)]
pub enum AudioSource {
    Bytes {
        data: Vec<u8>,
        mime_type_or_extension: Option<String>,
        file_name: Option<String>,
    },
    Uri {
        uri: String,
        mime_type_or_extension: Option<String>,
    },
}

impl AudioSource {
    /// The hint used for encoding resolution. Falls back to the file name
    /// (or the URI) so the extension can still be used.
    pub fn encoding_hint(&self) -> Option<&str> {
        match self {
            AudioSource::Bytes {
                mime_type_or_extension,
                file_name,
                ..
            } => non_blank(mime_type_or_extension.as_deref())
                .or_else(|| non_blank(file_name.as_deref())),
            AudioSource::Uri {
                uri,
                mime_type_or_extension,
            } => non_blank(mime_type_or_extension.as_deref()).or_else(|| non_blank(Some(uri))),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
