use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::PromptCategory;

pub const DEFAULT_TIMER_SECS: u32 = 60;
pub const DEFAULT_STREAK_GOAL: u32 = 3;
pub const DEFAULT_REMINDER_TIME: &str = "18:00";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PreferencesError {
    #[error("timer duration must be > 0 seconds")]
    InvalidTimerDuration,

    #[error("at least one prompt category must be selected")]
    NoCategoriesSelected,

    #[error("streak goal must be > 0 sessions per day")]
    InvalidStreakGoal,

    #[error("reminder time must be HH:MM, got {0:?}")]
    InvalidReminderTime(String),
}

/// User-tunable settings read by the practice screens.
///
/// Deserialization fills any missing field from [`UserPreferences::default`],
/// so stored values written by older builds still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPreferences {
    timer_duration: u32,
    enable_sounds: bool,
    enable_vibration: bool,
    selected_prompt_categories: Vec<PromptCategory>,
    dark_mode: bool,
    reminder_enabled: bool,
    reminder_time: String,
    streak_goal: u32,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            timer_duration: DEFAULT_TIMER_SECS,
            enable_sounds: true,
            enable_vibration: true,
            selected_prompt_categories: PromptCategory::BUILT_IN.to_vec(),
            dark_mode: false,
            reminder_enabled: false,
            reminder_time: DEFAULT_REMINDER_TIME.to_string(),
            streak_goal: DEFAULT_STREAK_GOAL,
        }
    }
}

impl UserPreferences {
    /// Check every invariant and normalize the category list.
    ///
    /// # Errors
    ///
    /// Returns `PreferencesError` naming the first field that is out of range.
    pub fn validate(mut self) -> Result<Self, PreferencesError> {
        if self.timer_duration == 0 {
            return Err(PreferencesError::InvalidTimerDuration);
        }
        if self.streak_goal == 0 {
            return Err(PreferencesError::InvalidStreakGoal);
        }
        let mut categories = Vec::with_capacity(self.selected_prompt_categories.len());
        for category in self.selected_prompt_categories {
            if !categories.contains(&category) {
                categories.push(category);
            }
        }
        if categories.is_empty() {
            return Err(PreferencesError::NoCategoriesSelected);
        }
        self.selected_prompt_categories = categories;
        self.reminder_time = parse_reminder_time(&self.reminder_time)?
            .format("%H:%M")
            .to_string();
        Ok(self)
    }

    /// Apply a partial update and re-validate the result.
    ///
    /// # Errors
    ///
    /// Returns `PreferencesError` if the merged preferences are invalid.
    pub fn apply(&self, patch: PreferencesPatch) -> Result<Self, PreferencesError> {
        let current = self.clone();
        Self {
            timer_duration: patch.timer_duration.unwrap_or(current.timer_duration),
            enable_sounds: patch.enable_sounds.unwrap_or(current.enable_sounds),
            enable_vibration: patch.enable_vibration.unwrap_or(current.enable_vibration),
            selected_prompt_categories: patch
                .selected_prompt_categories
                .unwrap_or(current.selected_prompt_categories),
            dark_mode: patch.dark_mode.unwrap_or(current.dark_mode),
            reminder_enabled: patch.reminder_enabled.unwrap_or(current.reminder_enabled),
            reminder_time: patch.reminder_time.unwrap_or(current.reminder_time),
            streak_goal: patch.streak_goal.unwrap_or(current.streak_goal),
        }
        .validate()
    }

    /// Countdown length in seconds.
    #[must_use]
    pub fn timer_duration(&self) -> u32 {
        self.timer_duration
    }

    #[must_use]
    pub fn enable_sounds(&self) -> bool {
        self.enable_sounds
    }

    #[must_use]
    pub fn enable_vibration(&self) -> bool {
        self.enable_vibration
    }

    #[must_use]
    pub fn selected_prompt_categories(&self) -> &[PromptCategory] {
        &self.selected_prompt_categories
    }

    #[must_use]
    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    #[must_use]
    pub fn reminder_enabled(&self) -> bool {
        self.reminder_enabled
    }

    #[must_use]
    pub fn reminder_time(&self) -> &str {
        &self.reminder_time
    }

    /// Completed sessions per day the user aims for.
    #[must_use]
    pub fn streak_goal(&self) -> u32 {
        self.streak_goal
    }
}

/// Partial update for [`UserPreferences`]; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferencesPatch {
    pub timer_duration: Option<u32>,
    pub enable_sounds: Option<bool>,
    pub enable_vibration: Option<bool>,
    pub selected_prompt_categories: Option<Vec<PromptCategory>>,
    pub dark_mode: Option<bool>,
    pub reminder_enabled: Option<bool>,
    pub reminder_time: Option<String>,
    pub streak_goal: Option<u32>,
}

impl PreferencesPatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn parse_reminder_time(raw: &str) -> Result<NaiveTime, PreferencesError> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map_err(|_| PreferencesError::InvalidReminderTime(raw.to_string()))
}
