use std::fmt;

/// Audio encodings understood by the recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioEncoding {
    Linear16,
    Flac,
    OggOpus,
    WebmOpus,
    Amr,
    Mp3,
}

impl AudioEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioEncoding::Linear16 => "LINEAR16",
            AudioEncoding::Flac => "FLAC",
            AudioEncoding::OggOpus => "OGG_OPUS",
            AudioEncoding::WebmOpus => "WEBM_OPUS",
            AudioEncoding::Amr => "AMR",
            AudioEncoding::Mp3 => "MP3",
        }
    }

    /// Sample rate the recognizer requires for this encoding, if it cannot
    /// be read from the file itself.
    pub fn mandatory_sample_rate(&self) -> Option<u32> {
        match self {
            AudioEncoding::Amr => Some(8000),
            _ => None,
        }
    }
}

impl fmt::Display for AudioEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of encoding resolution. `encoding: None` leaves detection to the
/// recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedEncoding {
    pub encoding: Option<AudioEncoding>,
    pub sample_rate_hertz: Option<u32>,
}

impl ResolvedEncoding {
    pub fn explicit(encoding: AudioEncoding) -> Self {
        Self {
            encoding: Some(encoding),
            sample_rate_hertz: encoding.mandatory_sample_rate(),
        }
    }

    pub fn auto_detect() -> Self {
        Self {
            encoding: None,
            sample_rate_hertz: None,
        }
    }
}
