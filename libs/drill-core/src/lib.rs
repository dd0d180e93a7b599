//! Core vocabulary drill engine shared by the terminal application.
//!
//! Provides:
//! - Term catalog with local overrides
//! - CSV import/export codec
//! - Answer evaluation (normalization, synonyms)
//! - Multiple-choice distractor selection
//! - Session state machine and controller
//! - XP, hearts and streak progression over a pluggable key-value store

pub mod catalog;
pub mod controller;
pub mod csv;
pub mod distractor;
pub mod error;
pub mod matching;
pub mod progression;
pub mod session;
pub mod store;
pub mod types;

pub use catalog::Catalog;
pub use controller::{Controller, CsvExport, ImportSummary, Ticker};
pub use error::{CsvError, ImportError, IntentError, Result, SourceError, StoreError};
pub use matching::{dedupe_by_ko, is_correct, normalize};
pub use progression::Progression;
pub use session::{format_time, Advance, Choices, Feedback, Question, Session, SessionResults};
pub use store::{KeyValueStore, MemoryStore, Storage};
pub use types::{
    CatalogDocument, EndReason, ImportMode, IssueReport, Level, LevelStats, LevelSummary,
    Outcome, Overrides, PersistedState, ProgressSnapshot, QuizMode, Term,
};
