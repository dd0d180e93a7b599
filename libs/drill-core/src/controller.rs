//! Session controller: the single entry point for presentation intents.
//!
//! Owns the catalog, the progression economy, persisted preferences and the
//! live session. Each intent runs to completion and returns what the
//! presentation layer needs to render.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::csv;
use crate::error::{ImportError, IntentError, Result, SourceError};
use crate::matching::dedupe_by_ko;
use crate::progression::Progression;
use crate::session::{Advance, Feedback, Session, SessionResults};
use crate::store::{Storage, KEY_OVERRIDES, KEY_STATE};
use crate::types::{
    CatalogDocument, EndReason, ImportMode, IssueReport, LevelStats, LevelSummary, Overrides,
    PersistedState, ProgressSnapshot, QuizMode, Term,
};

/// Periodic display updater attached to the live session.
pub trait Ticker: Send {
    fn stop(&mut self);
}

/// Outcome of an applied import.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ImportSummary {
    pub level_id: String,
    pub mode: ImportMode,
    pub imported: usize,
    pub level_terms: usize,
}

/// A level rendered as CSV.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct CsvExport {
    pub file_name: String,
    pub content: String,
}

pub struct Controller<R = StdRng> {
    storage: Storage,
    catalog: Catalog,
    overrides: Overrides,
    progression: Progression,
    prefs: PersistedState,
    mode: QuizMode,
    session: Option<Session>,
    ticker: Option<Box<dyn Ticker>>,
    reports: Vec<IssueReport>,
    rng: R,
}

impl Controller<StdRng> {
    /// Controller seeded from the operating system.
    pub fn new(storage: Storage, fetched: Result<CatalogDocument, SourceError>) -> Self {
        Self::with_rng(storage, fetched, StdRng::from_os_rng())
    }
}

impl<R: Rng> Controller<R> {
    pub fn with_rng(
        storage: Storage,
        fetched: Result<CatalogDocument, SourceError>,
        rng: R,
    ) -> Self {
        let overrides: Overrides = storage.read_json(KEY_OVERRIDES).unwrap_or_default();
        let catalog = Catalog::load(fetched, &overrides);
        let progression = Progression::load(storage.clone());
        let prefs: PersistedState = storage.read_json(KEY_STATE).unwrap_or_default();
        let mode = prefs.last_mode;
        Self {
            storage,
            catalog,
            overrides,
            progression,
            prefs,
            mode,
            session: None,
            ticker: None,
            reports: Vec::new(),
            rng,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn mode(&self) -> QuizMode {
        self.mode
    }

    pub fn progress(&self) -> ProgressSnapshot {
        self.progression.snapshot()
    }

    pub fn reports(&self) -> &[IssueReport] {
        &self.reports
    }

    /// Stats for a level, defaulted when never played.
    pub fn level_stats(&self, level_id: &str) -> LevelStats {
        self.prefs
            .per_level
            .get(level_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn level_summaries(&self) -> Vec<LevelSummary> {
        self.catalog
            .levels()
            .iter()
            .map(|level| LevelSummary {
                id: level.id.clone(),
                name: level.name.clone(),
                description: level.description.clone(),
                term_count: level.terms.len(),
                stats: self.level_stats(&level.id),
            })
            .collect()
    }

    /// Attach the display ticker for the live session. Replaces and stops
    /// any previous one.
    pub fn attach_ticker(&mut self, ticker: Box<dyn Ticker>) {
        self.stop_ticker();
        self.ticker = Some(ticker);
    }

    /// Start a run over the whole level.
    pub fn start(&mut self, level_id: &str, mode: QuizMode) -> Result<&Session> {
        self.start_with_terms(level_id, mode, None)
    }

    /// Start a run, optionally over an explicit term list. Any previous
    /// session is abandoned.
    pub fn start_with_terms(
        &mut self,
        level_id: &str,
        mode: QuizMode,
        terms: Option<Vec<Term>>,
    ) -> Result<&Session> {
        let level = self
            .catalog
            .lookup(level_id)
            .ok_or_else(|| IntentError::UnknownLevel(level_id.to_string()))?;

        let session = Session::start(level, mode, terms, &mut self.rng, Utc::now());
        tracing::info!(
            level = level_id,
            mode = mode.as_str(),
            total = session.total(),
            "session started"
        );

        self.stop_ticker();

        self.set_mode(mode);
        let finished = session.results().cloned();
        self.session = Some(session);
        if let Some(results) = finished {
            self.on_finished(&results);
        }
        self.session.as_ref().ok_or(IntentError::NoSession)
    }

    pub fn submit_choice(&mut self, selected: usize) -> Option<Feedback> {
        let session = self.session.as_mut()?;
        let feedback = session.submit_choice(selected, &mut self.progression, Utc::now());
        self.after_feedback(feedback)
    }

    pub fn submit_typed(&mut self, input: &str) -> Option<Feedback> {
        let session = self.session.as_mut()?;
        let feedback = session.submit_typed(input, &mut self.progression, Utc::now());
        self.after_feedback(feedback)
    }

    pub fn flash_mark(&mut self, got_it: bool) -> Option<Feedback> {
        let session = self.session.as_mut()?;
        let feedback = session.flash_mark(got_it, &mut self.progression, Utc::now());
        self.after_feedback(feedback)
    }

    pub fn advance(&mut self) -> Advance {
        let Some(session) = self.session.as_mut() else {
            return Advance::Ignored;
        };
        let advance = session.advance(&mut self.rng, Utc::now());
        if let Advance::Finished(results) = &advance {
            self.on_finished(results);
        }
        advance
    }

    pub fn skip(&mut self) -> Advance {
        let Some(session) = self.session.as_mut() else {
            return Advance::Ignored;
        };
        let advance = session.skip(&mut self.rng, Utc::now());
        if let Advance::Finished(results) = &advance {
            self.on_finished(results);
        }
        advance
    }

    pub fn reveal_hint(&self) -> Option<String> {
        self.session.as_ref()?.hint().map(str::to_string)
    }

    /// End the live session early. No-op when it already ended.
    pub fn request_end(&mut self) -> Option<SessionResults> {
        let results = self
            .session
            .as_mut()?
            .finish(EndReason::Requested, Utc::now())?;
        self.on_finished(&results);
        Some(results)
    }

    /// Switch mode. A running session restarts in the new mode over its
    /// remaining terms.
    pub fn change_mode(&mut self, mode: QuizMode) -> Option<&Session> {
        self.set_mode(mode);
        let session = self.session.as_ref().filter(|s| !s.is_ended())?;
        let level_id = session.level_id().to_string();
        let remaining = session.remaining_terms();
        let terms = if remaining.is_empty() {
            session.queue().to_vec()
        } else {
            remaining
        };
        self.start_with_terms(&level_id, mode, Some(terms)).ok()
    }

    /// Start a new run over the terms missed in the last one.
    pub fn retry_missed(&mut self) -> Result<&Session> {
        let session = self.session.as_ref().ok_or(IntentError::NoSession)?;
        let missed = dedupe_by_ko(session.missed().to_vec());
        if missed.is_empty() {
            return Err(IntentError::NoMissedTerms);
        }
        let level_id = session.level_id().to_string();
        let mode = self.mode;
        self.start_with_terms(&level_id, mode, Some(missed))
    }

    /// Abandon the live session, as when navigating back to level selection.
    pub fn go_home(&mut self) {
        self.stop_ticker();
        self.session = None;
    }

    /// Record a note against the current term. Kept in memory only.
    pub fn report_issue(&mut self, note: &str) -> Result<&IssueReport> {
        let session = self.session.as_ref().ok_or(IntentError::NoSession)?;
        let term = session.current_term().ok_or(IntentError::NoSession)?.clone();
        self.reports.push(IssueReport {
            id: Uuid::new_v4(),
            level_id: session.level_id().to_string(),
            term,
            note: note.trim().to_string(),
            reported_at: Utc::now(),
        });
        self.reports.last().ok_or(IntentError::NoSession)
    }

    /// Import CSV text into a level. All-or-nothing: on any error the
    /// catalog and stored overrides are untouched.
    pub fn import_csv(
        &mut self,
        level_id: &str,
        text: &str,
        mode: ImportMode,
    ) -> Result<ImportSummary, ImportError> {
        let level = self
            .catalog
            .lookup(level_id)
            .ok_or_else(|| ImportError::UnknownLevel(level_id.to_string()))?;

        let incoming = match csv::import_terms(text) {
            Ok(terms) => terms,
            Err(e) => {
                tracing::warn!(level = level_id, error = %e, "import rejected");
                return Err(e);
            }
        };
        let imported = incoming.len();
        let merged = csv::merge_terms(&level.terms, incoming, mode);
        let level_terms = merged.len();

        self.catalog.replace_terms(level_id, merged.clone());
        self.overrides.insert(level_id.to_string(), merged);
        self.storage.write_json(KEY_OVERRIDES, &self.overrides);
        tracing::info!(
            level = level_id,
            mode = mode.as_str(),
            imported,
            level_terms,
            "import applied"
        );

        Ok(ImportSummary {
            level_id: level_id.to_string(),
            mode,
            imported,
            level_terms,
        })
    }

    pub fn export_csv(&self, level_id: &str) -> Result<CsvExport> {
        let level = self
            .catalog
            .lookup(level_id)
            .ok_or_else(|| IntentError::UnknownLevel(level_id.to_string()))?;
        Ok(CsvExport {
            file_name: csv::export_file_name(&level.id),
            content: csv::serialize(level),
        })
    }

    /// Forget all persisted progress and overrides, then rebuild the catalog
    /// from a fresh fetch of the source.
    pub fn reset(&mut self, fetched: Result<CatalogDocument, SourceError>) {
        self.stop_ticker();
        if let Some(session) = self.session.as_mut() {
            session.finish(EndReason::Requested, Utc::now());
        }
        self.session = None;

        self.storage.clear();
        self.prefs = PersistedState::default();
        self.mode = self.prefs.last_mode;
        self.overrides.clear();
        self.progression.reset();
        self.catalog = Catalog::load(fetched, &self.overrides);
        tracing::info!("progress reset");
    }

    fn set_mode(&mut self, mode: QuizMode) {
        self.mode = mode;
        self.prefs.last_mode = mode;
        self.storage.write_json(KEY_STATE, &self.prefs);
    }

    fn stop_ticker(&mut self) {
        if let Some(mut ticker) = self.ticker.take() {
            ticker.stop();
        }
    }

    fn after_feedback(&mut self, feedback: Option<Feedback>) -> Option<Feedback> {
        if let Some(results) = feedback.as_ref().and_then(|f| f.ended.as_ref()) {
            self.on_finished(results);
        }
        feedback
    }

    fn on_finished(&mut self, results: &SessionResults) {
        self.stop_ticker();
        tracing::info!(
            level = %results.level_id,
            reason = results.reason.as_str(),
            correct = results.correct,
            total = results.total,
            "session ended"
        );
        if results.total == 0 {
            return;
        }
        self.prefs
            .per_level
            .entry(results.level_id.clone())
            .or_default()
            .record(results.accuracy, &results.missed, results.ended_at);
        self.storage.write_json(KEY_STATE, &self.prefs);
    }
}
