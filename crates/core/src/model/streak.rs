use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Running practice-streak aggregate.
///
/// Updated incrementally, one completed session at a time, in insertion
/// order. `longest_streak >= current_streak` holds after every update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakData {
    current_streak: u32,
    longest_streak: u32,
    #[serde(default, deserialize_with = "empty_as_none")]
    last_practice_date: Option<NaiveDate>,
    sessions_today: u32,
    total_sessions: u32,
}

impl StreakData {
    /// Fold one completed session, recorded on `date`, into the aggregate.
    ///
    /// A completion on the day after `last_practice_date` extends the streak;
    /// any other new day (a gap, or a date earlier than the last one) starts
    /// over at 1. Further completions on the same day only bump
    /// `sessions_today`.
    pub fn record_completion(&mut self, date: NaiveDate) {
        self.total_sessions = self.total_sessions.saturating_add(1);

        if self.last_practice_date == Some(date) {
            self.sessions_today = self.sessions_today.saturating_add(1);
        } else {
            let yesterday = date.pred_opt();
            self.current_streak = match self.last_practice_date {
                Some(last) if Some(last) == yesterday => self.current_streak.saturating_add(1),
                Some(_) | None => 1,
            };
            if self.current_streak > self.longest_streak {
                self.longest_streak = self.current_streak;
            }
            self.sessions_today = 1;
        }

        self.last_practice_date = Some(date);
    }

    #[must_use]
    pub fn current_streak(&self) -> u32 {
        self.current_streak
    }

    #[must_use]
    pub fn longest_streak(&self) -> u32 {
        self.longest_streak
    }

    #[must_use]
    pub fn last_practice_date(&self) -> Option<NaiveDate> {
        self.last_practice_date
    }

    /// Completed sessions on `last_practice_date`.
    #[must_use]
    pub fn sessions_today(&self) -> u32 {
        self.sessions_today
    }

    #[must_use]
    pub fn total_sessions(&self) -> u32 {
        self.total_sessions
    }

    /// Fraction of the daily goal met, capped at 1.0. Zero when `goal` is 0.
    #[must_use]
    pub fn goal_progress(&self, goal: u32) -> f64 {
        if goal == 0 {
            return 0.0;
        }
        (f64::from(self.sessions_today) / f64::from(goal)).min(1.0)
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}
