use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Prompt, SessionId};

/// Longest attempt the ledger accepts, in seconds.
pub const MAX_SESSION_SECS: u32 = 60 * 60;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionDraftError {
    #[error("session duration {secs}s exceeds the {max}s limit")]
    DurationOutOfRange { secs: u32, max: u32 },
}

/// Point/Proof/Purpose notes captured alongside an attempt.
///
/// `None` means the field was never filled in; `Some("")` means the user
/// submitted it empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeNotes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
}

impl PracticeNotes {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.point.is_none() && self.proof.is_none() && self.purpose.is_none()
    }
}

/// An attempt as submitted by the caller, before the ledger stamps it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDraft {
    pub prompt: Prompt,
    pub duration_secs: u32,
    pub completed: bool,
    pub notes: PracticeNotes,
}

impl SessionDraft {
    #[must_use]
    pub fn new(prompt: Prompt, duration_secs: u32, completed: bool) -> Self {
        Self {
            prompt,
            duration_secs,
            completed,
            notes: PracticeNotes::default(),
        }
    }

    #[must_use]
    pub fn with_notes(mut self, notes: PracticeNotes) -> Self {
        self.notes = notes;
        self
    }

    /// Stamp the draft into an immutable session record.
    ///
    /// # Errors
    ///
    /// Returns `SessionDraftError::DurationOutOfRange` if the duration is
    /// longer than [`MAX_SESSION_SECS`].
    pub fn stamp(
        self,
        id: SessionId,
        date: NaiveDate,
        timestamp: DateTime<Utc>,
    ) -> Result<PracticeSession, SessionDraftError> {
        if self.duration_secs > MAX_SESSION_SECS {
            return Err(SessionDraftError::DurationOutOfRange {
                secs: self.duration_secs,
                max: MAX_SESSION_SECS,
            });
        }
        Ok(PracticeSession {
            id,
            prompt: self.prompt,
            date,
            timestamp,
            duration: self.duration_secs,
            completed: self.completed,
            notes: self.notes,
        })
    }
}

/// One recorded attempt. Never mutated after it enters the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeSession {
    id: SessionId,
    prompt: Prompt,
    date: NaiveDate,
    timestamp: DateTime<Utc>,
    duration: u32,
    completed: bool,
    #[serde(flatten)]
    notes: PracticeNotes,
}

impl PracticeSession {
    #[must_use]
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &Prompt {
        &self.prompt
    }

    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Elapsed seconds in the attempt.
    #[must_use]
    pub fn duration(&self) -> u32 {
        self.duration
    }

    #[must_use]
    pub fn completed(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn notes(&self) -> &PracticeNotes {
        &self.notes
    }

    #[must_use]
    pub fn has_notes(&self) -> bool {
        !self.notes.is_empty()
    }

    /// True when `date` lies in the inclusive range; a missing bound is open.
    #[must_use]
    pub fn falls_within(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> bool {
        start.is_none_or(|s| self.date >= s) && end.is_none_or(|e| self.date <= e)
    }
}
