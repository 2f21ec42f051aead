mod ids;
mod preferences;
mod prompt;
mod session;
mod stats;
mod streak;

pub use ids::{ParseIdError, PromptId, SessionId};

pub use preferences::{
    DEFAULT_REMINDER_TIME, DEFAULT_STREAK_GOAL, DEFAULT_TIMER_SECS, PreferencesError,
    PreferencesPatch, UserPreferences,
};
pub use prompt::{ParseCategoryError, Prompt, PromptCategory, PromptError, builtin_prompts};
pub use session::{MAX_SESSION_SECS, PracticeNotes, PracticeSession, SessionDraft, SessionDraftError};
pub use stats::PracticeStats;
pub use streak::StreakData;
