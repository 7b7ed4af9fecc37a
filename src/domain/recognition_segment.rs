/// Offset into the audio as reported by the recognizer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeOffset {
    pub seconds: i64,
    pub nanos: i32,
}

impl TimeOffset {
    pub fn new(seconds: i64, nanos: i32) -> Self {
        Self { seconds, nanos }
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.seconds as f64 + f64::from(self.nanos) / 1_000_000_000.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedWord {
    pub word: String,
    pub start: Option<TimeOffset>,
    pub end: Option<TimeOffset>,
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionAlternative {
    pub transcript: String,
    pub confidence: Option<f64>,
    pub words: Vec<RecognizedWord>,
}

/// One consecutive stretch of audio; alternatives are ranked best first.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionSegment {
    pub alternatives: Vec<RecognitionAlternative>,
}

impl RecognitionSegment {
    pub fn top_alternative(&self) -> Option<&RecognitionAlternative> {
        self.alternatives.first()
    }
}
