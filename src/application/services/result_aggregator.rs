use crate::domain::{RecognitionSegment, RecognizedWord, TranscriptionResult, Word};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AggregationError {
    #[error("no speech detected in the audio")]
    NoSpeechDetected,
}

/// Folds segment-structured recognizer output into a single transcript.
///
/// Only the top-ranked alternative of each segment is used. Confidence is the
/// plain mean over the segments that reported one, not weighted by length.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultAggregator;

impl ResultAggregator {
    pub fn aggregate(
        &self,
        segments: &[RecognitionSegment],
    ) -> Result<TranscriptionResult, AggregationError> {
        let mut text = String::new();
        let mut confidence_sum = 0.0_f64;
        let mut confidence_count = 0usize;
        let mut words = Vec::new();

        for alternative in segments.iter().filter_map(RecognitionSegment::top_alternative) {
            let transcript = alternative.transcript.trim();
            if !transcript.is_empty() {
                if !text.is_empty() {
                    text.push(' ');
                }
                text.push_str(transcript);
            }

            if let Some(confidence) = alternative.confidence {
                confidence_sum += confidence;
                confidence_count += 1;
            }

            words.extend(alternative.words.iter().map(to_word));
        }

        if text.is_empty() {
            return Err(AggregationError::NoSpeechDetected);
        }

        Ok(TranscriptionResult {
            text,
            confidence: (confidence_count > 0).then(|| confidence_sum / confidence_count as f64),
            words,
        })
    }
}

fn to_word(word: &RecognizedWord) -> Word {
    let start = word.start.map(|o| o.as_secs_f64()).unwrap_or_default();
    let end = word.end.map(|o| o.as_secs_f64()).unwrap_or_default();

    Word {
        text: word.word.clone(),
        start_offset_seconds: start,
        end_offset_seconds: end.max(start),
        confidence: word.confidence,
    }
}
