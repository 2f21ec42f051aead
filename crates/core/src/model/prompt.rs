use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::PromptId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PromptError {
    #[error("prompt text cannot be empty")]
    EmptyText,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown prompt category: {0}")]
pub struct ParseCategoryError(String);

//
// ─── CATEGORY ──────────────────────────────────────────────────────────────────
//

/// Topic grouping for prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptCategory {
    Professional,
    Personal,
    Leadership,
    Creativity,
    Communication,
    /// Default bucket for user-authored prompts.
    Custom,
}

impl PromptCategory {
    /// Every category, in declaration order.
    pub const ALL: [PromptCategory; 6] = [
        PromptCategory::Professional,
        PromptCategory::Personal,
        PromptCategory::Leadership,
        PromptCategory::Creativity,
        PromptCategory::Communication,
        PromptCategory::Custom,
    ];

    /// Categories that ship with built-in prompts.
    pub const BUILT_IN: [PromptCategory; 5] = [
        PromptCategory::Professional,
        PromptCategory::Personal,
        PromptCategory::Leadership,
        PromptCategory::Creativity,
        PromptCategory::Communication,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PromptCategory::Professional => "professional",
            PromptCategory::Personal => "personal",
            PromptCategory::Leadership => "leadership",
            PromptCategory::Creativity => "creativity",
            PromptCategory::Communication => "communication",
            PromptCategory::Custom => "custom",
        }
    }
}

impl fmt::Display for PromptCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PromptCategory {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PromptCategory::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseCategoryError(s.to_string()))
    }
}

//
// ─── PROMPT ────────────────────────────────────────────────────────────────────
//

/// A speaking-practice instruction.
///
/// Prompts are immutable once created: the catalog only ever appends or
/// removes whole prompts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PromptRecord")]
pub struct Prompt {
    id: PromptId,
    text: String,
    category: PromptCategory,
}

/// Stored shape of a [`Prompt`], validated on the way in.
#[derive(Deserialize)]
struct PromptRecord {
    id: PromptId,
    text: String,
    category: PromptCategory,
}

impl TryFrom<PromptRecord> for Prompt {
    type Error = PromptError;

    fn try_from(record: PromptRecord) -> Result<Self, Self::Error> {
        Prompt::new(record.id, record.text, record.category)
    }
}

impl Prompt {
    /// Creates a prompt, trimming surrounding whitespace from the text.
    ///
    /// # Errors
    ///
    /// Returns `PromptError::EmptyText` if the trimmed text is empty.
    pub fn new(
        id: PromptId,
        text: impl Into<String>,
        category: PromptCategory,
    ) -> Result<Self, PromptError> {
        let text = text.into().trim().to_string();
        if text.is_empty() {
            return Err(PromptError::EmptyText);
        }
        Ok(Self { id, text, category })
    }

    #[must_use]
    pub fn id(&self) -> &PromptId {
        &self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn category(&self) -> PromptCategory {
        self.category
    }

    /// Case-insensitive substring match against the prompt text.
    ///
    /// `needle` must already be lowercased.
    #[must_use]
    pub fn matches_lowercase(&self, needle: &str) -> bool {
        needle.is_empty() || self.text.to_lowercase().contains(needle)
    }
}

//
// ─── BUILT-IN DECK ─────────────────────────────────────────────────────────────
//

const BUILT_IN_TEXTS: &[(PromptCategory, &str)] = &[
    (PromptCategory::Professional, "Explain why setting clear goals is important"),
    (PromptCategory::Professional, "Describe your favorite productivity tool"),
    (PromptCategory::Professional, "Share a strategy for managing stress at work"),
    (PromptCategory::Professional, "Explain how to prioritize tasks effectively"),
    (PromptCategory::Professional, "Describe an effective meeting structure"),
    (PromptCategory::Personal, "Explain the benefits of regular exercise"),
    (PromptCategory::Personal, "Describe a book that changed your perspective"),
    (PromptCategory::Personal, "Share how you maintain work-life balance"),
    (PromptCategory::Personal, "Explain the importance of continuous learning"),
    (PromptCategory::Personal, "Describe a personal goal and your plan to achieve it"),
    (PromptCategory::Leadership, "Describe a time when teamwork led to a successful outcome"),
    (PromptCategory::Leadership, "Explain why diversity in teams is beneficial"),
    (PromptCategory::Leadership, "Explain what makes a good leader"),
    (PromptCategory::Leadership, "Share how you motivate team members"),
    (PromptCategory::Leadership, "Describe how to delegate tasks effectively"),
    (PromptCategory::Creativity, "Describe an innovative solution to a common problem"),
    (PromptCategory::Creativity, "Share how you overcome creative blocks"),
    (PromptCategory::Creativity, "Describe a technology trend you're excited about"),
    (PromptCategory::Creativity, "Explain how to foster innovation in a team"),
    (PromptCategory::Creativity, "Describe your approach to problem-solving"),
    (PromptCategory::Communication, "Share a technique for effective communication"),
    (PromptCategory::Communication, "Share a valuable lesson you learned from failure"),
    (PromptCategory::Communication, "Share a method for making difficult decisions"),
    (PromptCategory::Communication, "Explain how to give constructive feedback"),
    (
        PromptCategory::Communication,
        "Describe a situation where you had to adapt your communication style",
    ),
];

/// Returns the fixed built-in prompt deck.
///
/// Built-in ids are stable (`builtin-<category>-<n>`) so they survive restarts
/// and can never collide with generated custom ids.
#[must_use]
pub fn builtin_prompts() -> Vec<Prompt> {
    let mut counters = [0_usize; PromptCategory::ALL.len()];
    BUILT_IN_TEXTS
        .iter()
        .map(|(category, text)| {
            let slot = *category as usize;
            counters[slot] += 1;
            Prompt {
                id: PromptId::new(format!("builtin-{category}-{}", counters[slot])),
                text: (*text).to_string(),
                category: *category,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_text() {
        let err = Prompt::new(PromptId::generate(), "   ", PromptCategory::Custom).unwrap_err();
        assert_eq!(err, PromptError::EmptyText);
    }

    #[test]
    fn decoding_rejects_blank_text() {
        let json = r#"{"id":"p","text":"  ","category":"custom"}"#;
        assert!(serde_json::from_str::<Prompt>(json).is_err());

        let json = r#"{"id":"p","text":" Pitch it ","category":"custom"}"#;
        let prompt: Prompt = serde_json::from_str(json).unwrap();
        assert_eq!(prompt.text(), "Pitch it");
    }

    #[test]
    fn trims_text() {
        let prompt = Prompt::new(PromptId::new("p"), "  Pitch it  ", PromptCategory::Custom).unwrap();
        assert_eq!(prompt.text(), "Pitch it");
    }

    #[test]
    fn builtin_deck_covers_every_builtin_category() {
        let deck = builtin_prompts();
        assert_eq!(deck.len(), 25);
        for category in PromptCategory::BUILT_IN {
            assert_eq!(deck.iter().filter(|p| p.category() == category).count(), 5);
        }
        assert!(deck.iter().all(|p| p.category() != PromptCategory::Custom));
        assert_eq!(deck[0].id().as_str(), "builtin-professional-1");
        assert_eq!(deck[24].id().as_str(), "builtin-communication-5");
    }

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!("Leadership".parse::<PromptCategory>().unwrap(), PromptCategory::Leadership);
        assert!("sports".parse::<PromptCategory>().is_err());
    }

    #[test]
    fn category_serializes_lowercase() {
        let json = serde_json::to_string(&PromptCategory::Creativity).unwrap();
        assert_eq!(json, "\"creativity\"");
    }

    #[test]
    fn matching_is_case_insensitive() {
        let prompt = Prompt::new(PromptId::new("p"), "Explain What Makes", PromptCategory::Leadership)
            .unwrap();
        assert!(prompt.matches_lowercase("what makes"));
        assert!(prompt.matches_lowercase(""));
        assert!(!prompt.matches_lowercase("feedback"));
    }
}
