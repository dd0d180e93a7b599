//! Core types for the vocabulary drill.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::matching::{dedupe_by_ko, normalize};

/// One Korean/English vocabulary pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub ko: String,
    pub en: String,
    #[serde(default)]
    pub hint: String,
    #[serde(default)]
    pub synonyms: Vec<String>,
}

impl Term {
    /// Create a term without hint or synonyms.
    pub fn new(ko: impl Into<String>, en: impl Into<String>) -> Self {
        Self {
            ko: ko.into(),
            en: en.into(),
            hint: String::new(),
            synonyms: Vec::new(),
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = hint.into();
        self
    }

    pub fn with_synonyms<I, S>(mut self, synonyms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.synonyms = synonyms.into_iter().map(Into::into).collect();
        self
    }

    /// Identity key used for dedupe and override matching.
    pub fn key(&self) -> String {
        normalize(&self.ko)
    }

    /// The hint, if one is set.
    pub fn hint(&self) -> Option<&str> {
        if self.hint.trim().is_empty() {
            None
        } else {
            Some(&self.hint)
        }
    }
}

/// A graded lesson: a named, ordered set of terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub terms: Vec<Term>,
}

/// Catalog source document: `{ "levels": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogDocument {
    #[serde(default)]
    pub levels: Vec<Level>,
}

/// Locally imported term lists keyed by level id.
pub type Overrides = BTreeMap<String, Vec<Term>>;

/// Interaction mode of a drill session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuizMode {
    #[serde(rename = "mcq")]
    MultipleChoice,
    #[serde(rename = "typing")]
    Typing,
    #[serde(rename = "flash")]
    Flashcard,
}

impl Default for QuizMode {
    fn default() -> Self {
        Self::MultipleChoice
    }
}

impl QuizMode {
    pub const ALL: [QuizMode; 3] = [Self::MultipleChoice, Self::Typing, Self::Flashcard];

    /// Get the mode name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MultipleChoice => "mcq",
            Self::Typing => "typing",
            Self::Flashcard => "flash",
        }
    }

    /// Parse from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "mcq" => Some(Self::MultipleChoice),
            "typing" => Some(Self::Typing),
            "flash" => Some(Self::Flashcard),
            _ => None,
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::MultipleChoice => "Multiple Choice",
            Self::Typing => "Typing",
            Self::Flashcard => "Flashcards",
        }
    }

    /// Next mode in the cycle mcq -> typing -> flash -> mcq.
    pub fn next(self) -> Self {
        match self {
            Self::MultipleChoice => Self::Typing,
            Self::Typing => Self::Flashcard,
            Self::Flashcard => Self::MultipleChoice,
        }
    }
}

/// Merge policy for imported terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportMode {
    Append,
    Replace,
}

impl Default for ImportMode {
    fn default() -> Self {
        Self::Append
    }
}

impl ImportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Append => "append",
            Self::Replace => "replace",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "append" => Some(Self::Append),
            "replace" => Some(Self::Replace),
            _ => None,
        }
    }
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EndReason {
    /// Every queued term was presented.
    Completed,
    /// The learner ended the session early.
    Requested,
    /// Hearts reached zero.
    OutOfHearts,
}

impl EndReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Requested => "requested",
            Self::OutOfHearts => "out-of-hearts",
        }
    }
}

/// Learner's classification of one answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Correct,
    Incorrect,
}

impl Outcome {
    pub fn from_correct(correct: bool) -> Self {
        if correct {
            Self::Correct
        } else {
            Self::Incorrect
        }
    }

    pub fn is_correct(self) -> bool {
        self == Self::Correct
    }
}

/// Progression economy values that outlive a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub xp: u32,
    pub hearts: u32,
    pub streak: u32,
}

/// Per-level history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelStats {
    pub best_accuracy: f64,
    pub total_attempts: u32,
    #[serde(default)]
    pub mistakes: Vec<Term>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_session_at: Option<DateTime<Utc>>,
}

impl Default for LevelStats {
    fn default() -> Self {
        Self {
            best_accuracy: 0.0,
            total_attempts: 0,
            mistakes: Vec::new(),
            last_session_at: None,
        }
    }
}

impl LevelStats {
    /// Fold a finished session into the record.
    pub fn record(&mut self, accuracy: f64, missed: &[Term], ended_at: DateTime<Utc>) {
        self.best_accuracy = self.best_accuracy.max(accuracy.clamp(0.0, 1.0));
        self.total_attempts += 1;
        self.mistakes = dedupe_by_ko(missed.to_vec());
        self.last_session_at = Some(ended_at);
    }
}

/// Preferences and history persisted under the `state` key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    #[serde(default)]
    pub last_mode: QuizMode,
    #[serde(default)]
    pub per_level: BTreeMap<String, LevelStats>,
}

/// A level as listed on the selection screen.
#[derive(Debug, Clone, Serialize)]
pub struct LevelSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub term_count: usize,
    pub stats: LevelStats,
}

/// A learner-reported problem with a term. Kept in memory only.
#[derive(Debug, Clone, Serialize)]
pub struct IssueReport {
    pub id: Uuid,
    pub level_id: String,
    pub term: Term,
    pub note: String,
    pub reported_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn term_deserializes_without_optional_fields() {
        let term: Term = serde_json::from_str(r#"{"ko":"정수","en":"integer"}"#).unwrap();
        assert_eq!(term, Term::new("정수", "integer"));
    }

    #[test]
    fn mode_round_trips_through_str() {
        for mode in QuizMode::ALL {
            assert_eq!(QuizMode::from_str(mode.as_str()), Some(mode));
        }
        assert_eq!(QuizMode::from_str("quiz"), None);
    }

    #[test]
    fn mode_cycle_visits_every_mode() {
        let mode = QuizMode::MultipleChoice;
        assert_eq!(mode.next(), QuizMode::Typing);
        assert_eq!(mode.next().next(), QuizMode::Flashcard);
        assert_eq!(mode.next().next().next(), QuizMode::MultipleChoice);
    }

    #[test]
    fn end_reason_serializes_kebab_case() {
        let json = serde_json::to_string(&EndReason::OutOfHearts).unwrap();
        assert_eq!(json, "\"out-of-hearts\"");
    }

    #[test]
    fn persisted_state_uses_camel_case_keys() {
        let mut state = PersistedState::default();
        state.per_level.insert("ms-1-1".into(), LevelStats::default());
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["lastMode"], "mcq");
        assert_eq!(json["perLevel"]["ms-1-1"]["totalAttempts"], 0);
    }

    #[test]
    fn level_stats_keep_best_accuracy() {
        let mut stats = LevelStats::default();
        let now = Utc::now();
        stats.record(0.8, &[], now);
        stats.record(0.5, &[Term::new("정수", "integer")], now);
        assert_eq!(stats.best_accuracy, 0.8);
        assert_eq!(stats.total_attempts, 2);
        assert_eq!(stats.mistakes.len(), 1);
        assert_eq!(stats.last_session_at, Some(now));
    }

    #[test]
    fn blank_hint_is_none() {
        assert_eq!(Term::new("a", "b").with_hint("  ").hint(), None);
        assert_eq!(Term::new("a", "b").with_hint("h").hint(), Some("h"));
    }
}
