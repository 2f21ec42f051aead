use serde::Serialize;

use crate::model::PracticeSession;

/// Aggregate figures over a window of practice sessions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeStats {
    total_sessions: u32,
    completed_sessions: u32,
    completion_rate: u32,
    average_duration: u32,
}

impl PracticeStats {
    /// Summarize a set of sessions.
    ///
    /// Completion rate is a whole percentage; average duration covers
    /// completed sessions only. Both are rounded to the nearest integer and
    /// are zero when there is nothing to average.
    #[must_use]
    pub fn from_sessions<'a, I>(sessions: I) -> Self
    where
        I: IntoIterator<Item = &'a PracticeSession>,
    {
        let mut total = 0_u32;
        let mut completed = 0_u32;
        let mut completed_secs = 0_u64;

        for session in sessions {
            total = total.saturating_add(1);
            if session.completed() {
                completed = completed.saturating_add(1);
                completed_secs += u64::from(session.duration());
            }
        }

        Self {
            total_sessions: total,
            completed_sessions: completed,
            completion_rate: rounded_ratio(u64::from(completed) * 100, u64::from(total)),
            average_duration: rounded_ratio(completed_secs, u64::from(completed)),
        }
    }

    #[must_use]
    pub fn total_sessions(&self) -> u32 {
        self.total_sessions
    }

    #[must_use]
    pub fn completed_sessions(&self) -> u32 {
        self.completed_sessions
    }

    /// Percentage of sessions that ran to completion (0-100).
    #[must_use]
    pub fn completion_rate(&self) -> u32 {
        self.completion_rate
    }

    /// Mean seconds across completed sessions.
    #[must_use]
    pub fn average_duration(&self) -> u32 {
        self.average_duration
    }
}

fn rounded_ratio(numerator: u64, denominator: u64) -> u32 {
    if denominator == 0 {
        return 0;
    }
    let rounded = (numerator + denominator / 2) / denominator;
    u32::try_from(rounded).unwrap_or(u32::MAX)
}
