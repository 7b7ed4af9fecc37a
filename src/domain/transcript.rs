use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    pub text: String,
    pub start_offset_seconds: f64,
    pub end_offset_seconds: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl Word {
    pub fn duration_seconds(&self) -> f64 {
        self.end_offset_seconds - self.start_offset_seconds
    }
}

/// Unified transcript of a completed job.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionResult {
    pub text: String,
    pub confidence: Option<f64>,
    pub words: Vec<Word>,
}
