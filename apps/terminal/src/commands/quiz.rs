//! Session commands: start, answer, navigate, end.

use drill_core::{
    Advance, Controller, Feedback, IntentError, IssueReport, ProgressSnapshot, Question,
    QuizMode, SessionResults,
};

use super::CommandError;
use crate::state::AppState;
use crate::ticker::ElapsedTicker;

/// What the front-end renders for the live session.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SessionView {
    pub level_id: String,
    pub mode: QuizMode,
    pub question: Option<Question>,
    /// `(current, total)` for display.
    pub position: (usize, usize),
    pub score: u32,
    pub streak: u32,
    pub progress: ProgressSnapshot,
    pub results: Option<SessionResults>,
}

impl SessionView {
    fn from_controller(ctl: &Controller) -> Result<Self, CommandError> {
        let session = ctl.session().ok_or(IntentError::NoSession)?;
        Ok(Self {
            level_id: session.level_id().to_string(),
            mode: session.mode(),
            question: session.question().cloned(),
            position: session.progress(),
            score: session.score(),
            streak: session.streak(),
            progress: ctl.progress(),
            results: session.results().cloned(),
        })
    }
}

/// Attach a fresh elapsed ticker to a session that is still running.
fn attach_ticker(state: &AppState, ctl: &mut Controller) {
    state.reset_elapsed();
    let Some(started_at) = ctl.session().filter(|s| !s.is_ended()).map(|s| s.started_at()) else {
        return;
    };
    ctl.attach_ticker(Box::new(ElapsedTicker::spawn(started_at, state.elapsed.clone())));
}

/// Start a session. Without a mode the last used one applies.
pub fn start_session(
    state: &AppState,
    level_id: &str,
    mode: Option<QuizMode>,
) -> Result<SessionView, CommandError> {
    let mut ctl = state.controller()?;
    let mode = mode.unwrap_or_else(|| ctl.mode());
    ctl.start(level_id, mode)?;
    attach_ticker(state, &mut ctl);
    SessionView::from_controller(&ctl)
}

pub fn current_session(state: &AppState) -> Result<SessionView, CommandError> {
    let ctl = state.controller()?;
    SessionView::from_controller(&ctl)
}

/// Multiple-choice answer by zero-based option index.
pub fn submit_choice(state: &AppState, index: usize) -> Result<Option<Feedback>, CommandError> {
    Ok(state.controller()?.submit_choice(index))
}

pub fn submit_typed(state: &AppState, input: &str) -> Result<Option<Feedback>, CommandError> {
    Ok(state.controller()?.submit_typed(input))
}

pub fn flash_mark(state: &AppState, got_it: bool) -> Result<Option<Feedback>, CommandError> {
    Ok(state.controller()?.flash_mark(got_it))
}

pub fn next_question(state: &AppState) -> Result<Advance, CommandError> {
    Ok(state.controller()?.advance())
}

pub fn skip_question(state: &AppState) -> Result<Advance, CommandError> {
    Ok(state.controller()?.skip())
}

pub fn reveal_hint(state: &AppState) -> Result<Option<String>, CommandError> {
    Ok(state.controller()?.reveal_hint())
}

pub fn end_session(state: &AppState) -> Result<Option<SessionResults>, CommandError> {
    Ok(state.controller()?.request_end())
}

/// Change mode; a running session restarts over its remaining terms.
pub fn change_mode(state: &AppState, mode: QuizMode) -> Result<Option<SessionView>, CommandError> {
    let mut ctl = state.controller()?;
    if ctl.change_mode(mode).is_none() {
        return Ok(None);
    }
    attach_ticker(state, &mut ctl);
    SessionView::from_controller(&ctl).map(Some)
}

/// Switch to the mode after the current one.
pub fn cycle_mode(state: &AppState) -> Result<(QuizMode, Option<SessionView>), CommandError> {
    let next = state.controller()?.mode().next();
    Ok((next, change_mode(state, next)?))
}

pub fn retry_missed(state: &AppState) -> Result<SessionView, CommandError> {
    let mut ctl = state.controller()?;
    ctl.retry_missed()?;
    attach_ticker(state, &mut ctl);
    SessionView::from_controller(&ctl)
}

pub fn report_issue(state: &AppState, note: &str) -> Result<IssueReport, CommandError> {
    let mut ctl = state.controller()?;
    let report = ctl.report_issue(note)?.clone();
    tracing::info!(
        id = %report.id,
        level = %report.level_id,
        ko = %report.term.ko,
        "issue reported"
    );
    Ok(report)
}

pub fn go_home(state: &AppState) -> Result<(), CommandError> {
    state.controller()?.go_home();
    state.reset_elapsed();
    Ok(())
}
