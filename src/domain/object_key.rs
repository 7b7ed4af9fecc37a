use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

const UPLOADS_PREFIX: &str = "uploads/";
const FALLBACK_NAME: &str = "file";
const NONCE_LEN: usize = 8;

/// Key of a staged object inside the staging container.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Key for audio staged by the service itself:
    /// `audio_<millis>_<nonce>_<name>`.
    pub fn for_audio(suggested_name: &str, now: DateTime<Utc>) -> Self {
        Self(format!(
            "audio_{}_{}_{}",
            now.timestamp_millis(),
            nonce(),
            sanitize_name(suggested_name)
        ))
    }

    /// Key for audio the client uploads directly through a signed URL.
    pub fn for_upload(suggested_name: &str, now: DateTime<Utc>) -> Self {
        Self(format!(
            "{}{}_{}_{}",
            UPLOADS_PREFIX,
            now.timestamp_millis(),
            nonce(),
            sanitize_name(suggested_name)
        ))
    }

    pub fn from_raw(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Same-millisecond stages of the same name must not share a key.
fn nonce() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(NONCE_LEN);
    id
}

/// Reduces a name to `[A-Za-z0-9._-]` with path separators dropped. Anything
/// else would be percent-encoded by the object store and no longer match the
/// key.
pub fn sanitize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_whitespace = false;
    for c in name.trim().chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                out.push('_');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        match c {
            '/' | '\\' => {}
            c if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') => out.push(c),
            _ => out.push('_'),
        }
    }

    if out.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        out
    }
}
