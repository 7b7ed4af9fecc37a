use chrono::{DateTime, Utc};

use super::{JobId, JobState, StagedAudio, TranscriptionConfig, TranscriptionResult};

/// Terminal outcome cached on the job so repeated checks are answered
/// without querying the recognizer again.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    Done(TranscriptionResult),
    Failed { reason: FailureReason, message: String },
    TimedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    Recognition,
    NoSpeechDetected,
}

impl JobOutcome {
    pub fn state(&self) -> JobState {
        match self {
            JobOutcome::Done(_) => JobState::Done,
            JobOutcome::Failed { .. } => JobState::Failed,
            JobOutcome::TimedOut => JobState::TimedOut,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid job state transition from {from} to {to}")]
pub struct InvalidTransition {
    pub from: JobState,
    pub to: JobState,
}

#[derive(Debug, Clone)]
pub struct TranscriptionJob {
    pub id: JobId,
    pub source: Option<StagedAudio>,
    pub config: TranscriptionConfig,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub progress_percent: Option<u32>,
    state: JobState,
    outcome: Option<JobOutcome>,
}

impl TranscriptionJob {
    pub fn new(id: JobId, source: Option<StagedAudio>, config: TranscriptionConfig) -> Self {
        Self {
            id,
            source,
            config,
            created_at: Utc::now(),
            completed_at: None,
            progress_percent: None,
            state: JobState::Submitted,
            outcome: None,
        }
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn outcome(&self) -> Option<&JobOutcome> {
        self.outcome.as_ref()
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.created_at
    }

    /// Records that the recognizer is still working on the job.
    pub fn mark_running(&mut self, progress_percent: Option<u32>) -> Result<(), InvalidTransition> {
        self.transition_to(JobState::Running)?;
        if progress_percent.is_some() {
            self.progress_percent = progress_percent;
        }
        Ok(())
    }

    pub fn finish(&mut self, outcome: JobOutcome) -> Result<(), InvalidTransition> {
        self.transition_to(outcome.state())?;
        self.completed_at = Some(Utc::now());
        self.outcome = Some(outcome);
        Ok(())
    }

    /// Hands the staged audio over for release. Returns `None` once taken.
    pub fn take_source(&mut self) -> Option<StagedAudio> {
        self.source.take()
    }

    fn transition_to(&mut self, next: JobState) -> Result<(), InvalidTransition> {
        let allowed = if self.state.is_terminal() {
            false
        } else {
            next.rank() > self.state.rank() || next == self.state
        };

        if !allowed {
            return Err(InvalidTransition {
                from: self.state,
                to: next,
            });
        }

        self.state = next;
        Ok(())
    }
}
