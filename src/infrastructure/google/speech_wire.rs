//! JSON shapes of the Speech-to-Text v1 REST API.

use serde::{Deserialize, Serialize};

use crate::application::ports::{OperationStatus, RecognitionRequest};
use crate::domain::{RecognitionAlternative, RecognitionSegment, RecognizedWord, TimeOffset};

#[derive(Debug, Serialize)]
pub(crate) struct LongRunningRecognizeRequest<'a> {
    config: RecognitionConfigBody<'a>,
    audio: RecognitionAudioBody<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognitionConfigBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    encoding: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sample_rate_hertz: Option<u32>,
    language_code: &'a str,
    model: &'a str,
    enable_automatic_punctuation: bool,
    enable_word_time_offsets: bool,
    enable_word_confidence: bool,
}

#[derive(Debug, Serialize)]
struct RecognitionAudioBody<'a> {
    uri: &'a str,
}

impl<'a> From<&'a RecognitionRequest> for LongRunningRecognizeRequest<'a> {
    fn from(request: &'a RecognitionRequest) -> Self {
        let config = &request.config;
        Self {
            config: RecognitionConfigBody {
                encoding: config.encoding.map(|e| e.as_str()),
                sample_rate_hertz: config.sample_rate_hertz,
                language_code: &config.language_code,
                model: &config.model,
                enable_automatic_punctuation: config.enable_punctuation,
                enable_word_time_offsets: config.enable_word_timestamps,
                enable_word_confidence: config.enable_word_confidence,
            },
            audio: RecognitionAudioBody {
                uri: &request.audio_uri,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct OperationHandle {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OperationResponse {
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    metadata: Option<OperationMetadata>,
    #[serde(default)]
    error: Option<StatusBody>,
    #[serde(default)]
    response: Option<RecognizeResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OperationMetadata {
    #[serde(default)]
    progress_percent: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct StatusBody {
    #[serde(default)]
    code: Option<i32>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    results: Vec<SpeechResult>,
}

#[derive(Debug, Deserialize)]
struct SpeechResult {
    #[serde(default)]
    alternatives: Vec<SpeechAlternative>,
}

#[derive(Debug, Deserialize)]
struct SpeechAlternative {
    #[serde(default)]
    transcript: String,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    words: Vec<WordInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WordInfo {
    #[serde(default)]
    word: String,
    #[serde(default)]
    start_time: Option<DurationValue>,
    #[serde(default)]
    end_time: Option<DurationValue>,
    #[serde(default)]
    confidence: Option<f64>,
}

/// Protobuf durations are strings in JSON, but some clients emit the
/// structured form.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DurationValue {
    Text(String),
    Parts {
        #[serde(default)]
        seconds: i64,
        #[serde(default)]
        nanos: i32,
    },
}

impl DurationValue {
    fn to_offset(&self) -> Result<TimeOffset, String> {
        match self {
            DurationValue::Text(text) => parse_duration(text),
            DurationValue::Parts { seconds, nanos } => Ok(TimeOffset::new(*seconds, *nanos)),
        }
    }
}

impl OperationResponse {
    pub(crate) fn into_status(self) -> Result<OperationStatus, String> {
        if !self.done {
            return Ok(OperationStatus::Running {
                progress_percent: self.metadata.and_then(|m| m.progress_percent),
            });
        }

        if let Some(error) = self.error {
            return Ok(OperationStatus::Failed {
                code: error.code,
                message: error
                    .message
                    .unwrap_or_else(|| "recognition failed without a message".to_string()),
            });
        }

        let results = self.response.map(|r| r.results).unwrap_or_default();
        let segments = results
            .into_iter()
            .map(into_segment)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(OperationStatus::Done(segments))
    }
}

fn into_segment(result: SpeechResult) -> Result<RecognitionSegment, String> {
    let alternatives = result
        .alternatives
        .into_iter()
        .map(|alt| {
            let words = alt
                .words
                .into_iter()
                .map(into_word)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(RecognitionAlternative {
                transcript: alt.transcript,
                confidence: alt.confidence,
                words,
            })
        })
        .collect::<Result<Vec<_>, String>>()?;

    Ok(RecognitionSegment { alternatives })
}

fn into_word(word: WordInfo) -> Result<RecognizedWord, String> {
    Ok(RecognizedWord {
        start: word.start_time.as_ref().map(DurationValue::to_offset).transpose()?,
        end: word.end_time.as_ref().map(DurationValue::to_offset).transpose()?,
        word: word.word,
        confidence: word.confidence,
    })
}

/// Parses a protobuf JSON duration such as `"3.250s"` without going through
/// floating point.
pub fn parse_duration(text: &str) -> Result<TimeOffset, String> {
    let body = text
        .trim()
        .strip_suffix('s')
        .ok_or_else(|| format!("duration {text:?} lacks the 's' suffix"))?;

    let (negative, body) = match body.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, body),
    };

    let (whole, fraction) = body.split_once('.').unwrap_or((body, ""));
    if whole.is_empty() && fraction.is_empty() {
        return Err(format!("duration {text:?} has no digits"));
    }

    let seconds: i64 = if whole.is_empty() {
        0
    } else {
        whole
            .parse()
            .map_err(|_| format!("duration {text:?} has invalid seconds"))?
    };

    if fraction.len() > 9 || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("duration {text:?} has an invalid fraction"));
    }
    let nanos: i32 = if fraction.is_empty() {
        0
    } else {
        format!("{fraction:0<9}")
            .parse()
            .map_err(|_| format!("duration {text:?} has an invalid fraction"))?
    };

    if negative {
        Ok(TimeOffset::new(-seconds, -nanos))
    } else {
        Ok(TimeOffset::new(seconds, nanos))
    }
}
