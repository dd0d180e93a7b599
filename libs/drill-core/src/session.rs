//! One drill run over a level: sequencing, scoring and end conditions.
//!
//! A session moves `active -> ended` and is never restarted; a new run is a
//! new `Session`. Every answer path funnels into [`Session::submit`], which
//! applies the shared score, streak and heart bookkeeping.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::distractor::{self, DISTRACTOR_COUNT};
use crate::matching::{self, normalize};
use crate::progression::Progression;
use crate::types::{EndReason, Level, Outcome, ProgressSnapshot, QuizMode, Term};

/// How far ahead a flashcard marked "again" is re-queued.
pub const REINSERT_OFFSET: usize = 3;

/// Shuffled options for a multiple-choice question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Choices {
    pub options: Vec<String>,
    pub correct_index: usize,
}

/// The question currently shown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Question {
    pub index: usize,
    pub term: Term,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices: Option<Choices>,
}

/// Result of an accepted answer.
#[derive(Debug, Clone, Serialize)]
pub struct Feedback {
    pub outcome: Outcome,
    pub term: Term,
    /// Hint surfaced after a wrong answer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    pub score: u32,
    pub streak: u32,
    pub progress: ProgressSnapshot,
    /// Set when this answer ended the session.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended: Option<SessionResults>,
}

/// Result of moving past the current question.
#[derive(Debug, Clone)]
pub enum Advance {
    /// The session had already ended.
    Ignored,
    Next(Question),
    Finished(SessionResults),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionResults {
    pub level_id: String,
    pub mode: QuizMode,
    pub reason: EndReason,
    pub total: usize,
    pub correct: u32,
    pub wrong: u32,
    pub skipped: u32,
    /// Fraction in `[0, 1]`.
    pub accuracy: f64,
    pub accuracy_percent: u32,
    pub elapsed_secs: u64,
    pub missed: Vec<Term>,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Session {
    mode: QuizMode,
    level_id: String,
    /// Distractor pool: the level's terms when the run started.
    pool: Vec<Term>,
    queue: Vec<Term>,
    /// Queue length at start; re-queued flashcards do not change it.
    total: usize,
    index: usize,
    score: u32,
    streak: u32,
    skipped: u32,
    missed: Vec<Term>,
    allow_answer: bool,
    started_at: DateTime<Utc>,
    question: Option<Question>,
    results: Option<SessionResults>,
}

impl Session {
    /// Start a run over `terms`, or over the whole level when `None`.
    ///
    /// An empty run ends immediately with zero accuracy.
    pub fn start<R: Rng + ?Sized>(
        level: &Level,
        mode: QuizMode,
        terms: Option<Vec<Term>>,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Self {
        let mut queue = terms.unwrap_or_else(|| level.terms.clone());
        queue.shuffle(rng);

        let mut session = Self {
            mode,
            level_id: level.id.clone(),
            pool: level.terms.clone(),
            total: queue.len(),
            queue,
            index: 0,
            score: 0,
            streak: 0,
            skipped: 0,
            missed: Vec::new(),
            allow_answer: true,
            started_at: now,
            question: None,
            results: None,
        };

        if session.queue.is_empty() {
            session.finish(EndReason::Completed, now);
        } else {
            session.render_question(rng);
        }
        session
    }

    pub fn mode(&self) -> QuizMode {
        self.mode
    }

    pub fn level_id(&self) -> &str {
        &self.level_id
    }

    pub fn queue(&self) -> &[Term] {
        &self.queue
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn missed(&self) -> &[Term] {
        &self.missed
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn is_ended(&self) -> bool {
        self.results.is_some()
    }

    pub fn results(&self) -> Option<&SessionResults> {
        self.results.as_ref()
    }

    /// Whether an answer would be accepted right now.
    pub fn accepts_answer(&self) -> bool {
        self.allow_answer && !self.is_ended()
    }

    pub fn current_term(&self) -> Option<&Term> {
        if self.is_ended() {
            return None;
        }
        self.queue.get(self.index)
    }

    pub fn question(&self) -> Option<&Question> {
        if self.is_ended() {
            return None;
        }
        self.question.as_ref()
    }

    /// Position for display: `(current, total)` over the live queue.
    pub fn progress(&self) -> (usize, usize) {
        let total = self.queue.len();
        ((self.index + 1).min(total), total)
    }

    /// Terms not yet presented, including the current one.
    pub fn remaining_terms(&self) -> Vec<Term> {
        self.queue.get(self.index..).map(<[Term]>::to_vec).unwrap_or_default()
    }

    /// Current term's hint, if it has one.
    pub fn hint(&self) -> Option<&str> {
        self.current_term().and_then(Term::hint)
    }

    /// Answer the multiple-choice question by option index.
    pub fn submit_choice(
        &mut self,
        selected: usize,
        progression: &mut Progression,
        now: DateTime<Utc>,
    ) -> Option<Feedback> {
        if self.mode != QuizMode::MultipleChoice || !self.accepts_answer() {
            return None;
        }
        let choices = self.question.as_ref()?.choices.as_ref()?;
        if selected >= choices.options.len() {
            return None;
        }
        let outcome = Outcome::from_correct(selected == choices.correct_index);
        self.submit(outcome, progression, now)
    }

    /// Answer a typed-recall question.
    pub fn submit_typed(
        &mut self,
        input: &str,
        progression: &mut Progression,
        now: DateTime<Utc>,
    ) -> Option<Feedback> {
        if self.mode != QuizMode::Typing {
            return None;
        }
        let term = self.current_term()?;
        let outcome = Outcome::from_correct(matching::is_correct(input, term));
        self.submit(outcome, progression, now)
    }

    /// Self-report on a flashcard.
    pub fn flash_mark(
        &mut self,
        got_it: bool,
        progression: &mut Progression,
        now: DateTime<Utc>,
    ) -> Option<Feedback> {
        if self.mode != QuizMode::Flashcard {
            return None;
        }
        self.submit(Outcome::from_correct(got_it), progression, now)
    }

    /// Apply a classified answer to the current term.
    ///
    /// Ignored (returns `None`) once the question was answered or the
    /// session ended.
    pub fn submit(
        &mut self,
        outcome: Outcome,
        progression: &mut Progression,
        now: DateTime<Utc>,
    ) -> Option<Feedback> {
        if !self.accepts_answer() {
            return None;
        }
        let term = self.queue.get(self.index)?.clone();
        self.allow_answer = false;

        let progress = match outcome {
            Outcome::Correct => {
                self.score += 1;
                self.streak += 1;
                progression.apply_correct()
            }
            Outcome::Incorrect => {
                self.streak = 0;
                self.missed.push(term.clone());
                if self.mode == QuizMode::Flashcard {
                    let at = self.queue.len().min(self.index + REINSERT_OFFSET);
                    self.queue.insert(at, term.clone());
                }
                progression.apply_incorrect()
            }
        };

        let ended = if outcome == Outcome::Incorrect && progression.is_out_of_hearts() {
            self.finish(EndReason::OutOfHearts, now)
        } else {
            None
        };

        Some(Feedback {
            outcome,
            hint: match outcome {
                Outcome::Incorrect => term.hint().map(str::to_string),
                Outcome::Correct => None,
            },
            term,
            score: self.score,
            streak: self.streak,
            progress,
            ended,
        })
    }

    /// Move to the next term, ending the run when the queue is exhausted.
    pub fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R, now: DateTime<Utc>) -> Advance {
        if self.is_ended() {
            return Advance::Ignored;
        }
        self.index += 1;
        if self.index >= self.queue.len() {
            return match self.finish(EndReason::Completed, now) {
                Some(results) => Advance::Finished(results),
                None => Advance::Ignored,
            };
        }
        self.allow_answer = true;
        match self.render_question(rng) {
            Some(question) => Advance::Next(question.clone()),
            None => Advance::Ignored,
        }
    }

    /// Skip the current term. Breaks the streak but costs no heart and is not
    /// counted as missed. A term already answered is not counted as skipped.
    pub fn skip<R: Rng + ?Sized>(&mut self, rng: &mut R, now: DateTime<Utc>) -> Advance {
        if self.is_ended() {
            return Advance::Ignored;
        }
        self.streak = 0;
        if self.accepts_answer() {
            self.skipped += 1;
        }
        self.advance(rng, now)
    }

    /// End the run. Returns the results only on the transition; ending an
    /// ended session changes nothing.
    pub fn finish(&mut self, reason: EndReason, now: DateTime<Utc>) -> Option<SessionResults> {
        if self.is_ended() {
            return None;
        }
        self.allow_answer = false;

        let accuracy = if self.total == 0 {
            0.0
        } else {
            f64::from(self.score) / self.total as f64
        };
        let elapsed_ms = (now - self.started_at).num_milliseconds().max(0);
        let results = SessionResults {
            level_id: self.level_id.clone(),
            mode: self.mode,
            reason,
            total: self.total,
            correct: self.score,
            wrong: (self.total as u32).saturating_sub(self.score),
            skipped: self.skipped,
            accuracy,
            accuracy_percent: (accuracy * 100.0).round() as u32,
            elapsed_secs: (elapsed_ms as f64 / 1000.0).round() as u64,
            missed: self.missed.clone(),
            started_at: self.started_at,
            ended_at: now,
        };
        self.results = Some(results.clone());
        Some(results)
    }

    fn render_question<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<&Question> {
        let term = self.queue.get(self.index)?.clone();
        let choices = match self.mode {
            QuizMode::MultipleChoice => Some(build_choices(&self.pool, &term, rng)),
            QuizMode::Typing | QuizMode::Flashcard => None,
        };
        self.question = Some(Question {
            index: self.index,
            term,
            choices,
        });
        self.question.as_ref()
    }
}

/// Shuffle the correct answer in with fresh distractors.
fn build_choices<R: Rng + ?Sized>(pool: &[Term], term: &Term, rng: &mut R) -> Choices {
    let mut options = vec![term.en.clone()];
    options.extend(
        distractor::pick(pool, term, DISTRACTOR_COUNT, rng)
            .into_iter()
            .map(|t| t.en),
    );
    options.shuffle(rng);
    let expected = normalize(&term.en);
    let correct_index = options
        .iter()
        .position(|o| normalize(o) == expected)
        .unwrap_or(0);
    Choices {
        options,
        correct_index,
    }
}

/// Format seconds as `mm:ss`.
pub fn format_time(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
