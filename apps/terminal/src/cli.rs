//! Line-oriented terminal front-end.
//!
//! Lines starting with `/` are commands; anything else answers the current
//! question. An empty line moves to the next question.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use drill_core::session::format_time;
use drill_core::{
    Advance, EndReason, Feedback, ImportMode, LevelSummary, ProgressSnapshot, QuizMode,
    SessionResults,
};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::commands::quiz::SessionView;
use crate::commands::{catalog, progress, quiz, CommandError};
use crate::state::AppState;

const HELP: &str = "\
Commands:
  /levels                         list levels
  /start <level> [mcq|typing|flash]
  /next  (or empty line)          next question
  /skip                           skip the current term
  /hint                           show the current hint
  /mode [mcq|typing|flash]        switch mode, or cycle to the next one
                                  (restarts with remaining terms)
  /end                            end the session
  /retry                          retry missed terms
  /report <note>                  report an issue with the current term
  /import <level> <file> [append|replace]
  /export <level> [dir]
  /progress                       xp, hearts, streak
  /time                           elapsed session time
  /reset                          forget all progress and imports
  /home                           leave the session
  /quit
Answers: option number (mcq), the English term (typing), y/n (flash).";

#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Help,
    Levels,
    Start {
        level_id: String,
        mode: Option<QuizMode>,
    },
    Choice(usize),
    Typed(String),
    Flash(bool),
    Next,
    Skip,
    Hint,
    Mode(QuizMode),
    NextMode,
    End,
    Retry,
    Report(String),
    Import {
        level_id: String,
        path: PathBuf,
        mode: ImportMode,
    },
    Export {
        level_id: String,
        dir: PathBuf,
    },
    Progress,
    Time,
    Reset,
    Home,
    Quit,
}

fn usage(text: &str) -> Result<Input, String> {
    Err(format!("Usage: {}", text))
}

fn parse_mode(word: &str) -> Result<QuizMode, String> {
    QuizMode::from_str(word)
        .ok_or_else(|| format!("Unknown mode '{}'. Use mcq, typing or flash.", word))
}

/// Parse one line of input. `active` is the mode of the running session.
pub fn parse_input(line: &str, active: Option<QuizMode>) -> Result<Input, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Input::Next);
    }

    let Some(command) = line.strip_prefix('/') else {
        return parse_answer(line, active);
    };

    let mut words = command.split_whitespace();
    let name = words.next().unwrap_or_default();
    let rest: Vec<&str> = words.collect();
    match (name, rest.as_slice()) {
        ("help" | "?", _) => Ok(Input::Help),
        ("levels", _) => Ok(Input::Levels),
        ("home", _) => Ok(Input::Home),
        ("start", [level]) => Ok(Input::Start {
            level_id: level.to_string(),
            mode: None,
        }),
        ("start", [level, mode]) => Ok(Input::Start {
            level_id: level.to_string(),
            mode: Some(parse_mode(mode)?),
        }),
        ("start", _) => usage("/start <level> [mcq|typing|flash]"),
        ("next", _) => Ok(Input::Next),
        ("skip", _) => Ok(Input::Skip),
        ("hint", _) => Ok(Input::Hint),
        ("mode", [mode]) => Ok(Input::Mode(parse_mode(mode)?)),
        ("mode", []) => Ok(Input::NextMode),
        ("mode", _) => usage("/mode [mcq|typing|flash]"),
        ("end", _) => Ok(Input::End),
        ("retry", _) => Ok(Input::Retry),
        ("report", []) => usage("/report <note>"),
        ("report", note) => Ok(Input::Report(note.join(" "))),
        ("import", [level, path, rest @ ..]) if rest.len() <= 1 => {
            let mode = match rest.first() {
                None => ImportMode::Append,
                Some(word) => ImportMode::from_str(word).ok_or_else(|| {
                    format!("Unknown import mode '{}'. Use append or replace.", word)
                })?,
            };
            Ok(Input::Import {
                level_id: level.to_string(),
                path: PathBuf::from(path),
                mode,
            })
        }
        ("import", _) => usage("/import <level> <file> [append|replace]"),
        ("export", [level]) => Ok(Input::Export {
            level_id: level.to_string(),
            dir: PathBuf::from("."),
        }),
        ("export", [level, dir]) => Ok(Input::Export {
            level_id: level.to_string(),
            dir: PathBuf::from(dir),
        }),
        ("export", _) => usage("/export <level> [dir]"),
        ("progress", _) => Ok(Input::Progress),
        ("time", _) => Ok(Input::Time),
        ("reset", _) => Ok(Input::Reset),
        ("quit" | "exit" | "q", _) => Ok(Input::Quit),
        _ => Err(format!("Unknown command '/{}'. Type /help.", name)),
    }
}

fn parse_answer(line: &str, active: Option<QuizMode>) -> Result<Input, String> {
    match active {
        None => Err("No active session. Type /levels, then /start <level>.".to_string()),
        Some(QuizMode::MultipleChoice) => match line.parse::<usize>() {
            Ok(n) if n >= 1 => Ok(Input::Choice(n - 1)),
            _ => Err("Enter an option number.".to_string()),
        },
        Some(QuizMode::Typing) => Ok(Input::Typed(line.to_string())),
        Some(QuizMode::Flashcard) => match line.to_lowercase().as_str() {
            "y" | "yes" | "got it" => Ok(Input::Flash(true)),
            "n" | "no" | "again" => Ok(Input::Flash(false)),
            _ => Err("Answer y (got it) or n (again).".to_string()),
        },
    }
}

pub fn render_levels(levels: &[LevelSummary]) -> String {
    if levels.is_empty() {
        return "No levels available.".to_string();
    }
    levels
        .iter()
        .map(|level| {
            let badge = if level.stats.total_attempts == 0 {
                "new".to_string()
            } else {
                format!(
                    "best {}% · {} attempts",
                    (level.stats.best_accuracy * 100.0).round() as u32,
                    level.stats.total_attempts
                )
            };
            format!(
                "  {:<10} {} ({} terms) [{}]",
                level.id, level.name, level.term_count, badge
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_status(progress: &ProgressSnapshot) -> String {
    format!(
        "xp {} · hearts {} · streak {}",
        progress.xp, progress.hearts, progress.streak
    )
}

pub fn render_question(view: &SessionView, elapsed: &str) -> String {
    let Some(question) = &view.question else {
        return String::new();
    };
    let (current, total) = view.position;
    let mut out = format!(
        "[{} · {}] {}/{} · score {} · {} · {}\n\n  {}\n",
        view.level_id,
        view.mode.label(),
        current,
        total,
        view.score,
        render_status(&view.progress),
        elapsed,
        question.term.ko
    );
    match (&question.choices, view.mode) {
        (Some(choices), _) => {
            for (i, option) in choices.options.iter().enumerate() {
                out.push_str(&format!("  {}) {}\n", i + 1, option));
            }
        }
        (None, QuizMode::Flashcard) => out.push_str("  (y = got it, n = again)\n"),
        (None, _) => out.push_str("  Type the English term.\n"),
    }
    out
}

pub fn render_feedback(feedback: &Feedback) -> String {
    let mut out = if feedback.outcome.is_correct() {
        format!("Correct! {} = {}", feedback.term.ko, feedback.term.en)
    } else {
        format!("Not quite. {} = {}", feedback.term.ko, feedback.term.en)
    };
    if let Some(hint) = &feedback.hint {
        out.push_str(&format!("\nHint: {}", hint));
    }
    out.push_str(&format!("\n{}", render_status(&feedback.progress)));
    out
}

pub fn render_results(results: &SessionResults) -> String {
    let heading = match results.reason {
        EndReason::Completed => "Session complete",
        EndReason::Requested => "Session ended",
        EndReason::OutOfHearts => "Out of hearts",
    };
    let mut out = format!(
        "{}: {}/{} correct ({}%) · {} wrong · {} skipped · {}",
        heading,
        results.correct,
        results.total,
        results.accuracy_percent,
        results.wrong,
        results.skipped,
        format_time(results.elapsed_secs)
    );
    if !results.missed.is_empty() {
        let missed = results
            .missed
            .iter()
            .map(|t| format!("{} ({})", t.ko, t.en))
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!("\nMissed: {}\nType /retry to practice them.", missed));
    }
    out
}

fn active_mode(state: &AppState) -> Option<QuizMode> {
    let ctl = state.controller().ok()?;
    ctl.session().filter(|s| !s.is_ended()).map(|s| s.mode())
}

fn show_question(state: &AppState) -> Result<(), CommandError> {
    let view = quiz::current_session(state)?;
    println!("{}", render_question(&view, &state.elapsed()));
    Ok(())
}

fn show_feedback(feedback: Option<Feedback>) {
    match feedback {
        Some(feedback) => {
            println!("{}", render_feedback(&feedback));
            match &feedback.ended {
                Some(results) => println!("{}", render_results(results)),
                None => println!("(press Enter for the next question)"),
            }
        }
        None => println!("Already answered. Press Enter for the next question."),
    }
}

fn show_advance(state: &AppState, advance: Advance) -> Result<(), CommandError> {
    match advance {
        Advance::Next(_) => show_question(state),
        Advance::Finished(results) => {
            println!("{}", render_results(&results));
            Ok(())
        }
        Advance::Ignored => {
            println!("No active session.");
            Ok(())
        }
    }
}

async fn dispatch(state: &AppState, input: Input) -> Result<(), CommandError> {
    match input {
        Input::Help => println!("{}", HELP),
        Input::Levels => println!("{}", render_levels(&catalog::list_levels(state)?)),
        Input::Start { level_id, mode } => {
            let view = quiz::start_session(state, &level_id, mode)?;
            match &view.results {
                Some(results) => println!("{}", render_results(results)),
                None => println!("{}", render_question(&view, &state.elapsed())),
            }
        }
        Input::Choice(index) => show_feedback(quiz::submit_choice(state, index)?),
        Input::Typed(text) => show_feedback(quiz::submit_typed(state, &text)?),
        Input::Flash(got_it) => show_feedback(quiz::flash_mark(state, got_it)?),
        Input::Next => show_advance(state, quiz::next_question(state)?)?,
        Input::Skip => show_advance(state, quiz::skip_question(state)?)?,
        Input::Hint => match quiz::reveal_hint(state)? {
            Some(hint) => println!("Hint: {}", hint),
            None => println!("No hint for this term."),
        },
        Input::Mode(mode) => match quiz::change_mode(state, mode)? {
            Some(view) => println!("{}", render_question(&view, &state.elapsed())),
            None => println!("Mode set to {}.", mode.label()),
        },
        Input::NextMode => match quiz::cycle_mode(state)? {
            (_, Some(view)) => println!("{}", render_question(&view, &state.elapsed())),
            (mode, None) => println!("Mode set to {}.", mode.label()),
        },
        Input::End => match quiz::end_session(state)? {
            Some(results) => println!("{}", render_results(&results)),
            None => println!("No active session."),
        },
        Input::Retry => {
            let view = quiz::retry_missed(state)?;
            println!("{}", render_question(&view, &state.elapsed()));
        }
        Input::Report(note) => {
            let report = quiz::report_issue(state, &note)?;
            println!("Thanks! Report {} saved for {}.", report.id, report.term.ko);
        }
        Input::Import {
            level_id,
            path,
            mode,
        } => {
            println!("Importing {} (Ctrl-C to cancel)...", path.display());
            tokio::select! {
                result = catalog::import_csv_file(state, &level_id, &path, mode) => {
                    let summary = result?;
                    println!(
                        "Imported {} terms into {} ({}); level now has {} terms.",
                        summary.imported,
                        summary.level_id,
                        summary.mode.as_str(),
                        summary.level_terms
                    );
                }
                _ = tokio::signal::ctrl_c() => {
                    catalog::cancel_import(state);
                    println!("Import cancelled.");
                }
            }
        }
        Input::Export { level_id, dir } => {
            let path = catalog::export_csv(state, &level_id, &dir).await?;
            println!("Exported to {}.", path.display());
        }
        Input::Progress => println!("{}", render_status(&progress::get_progress(state)?)),
        Input::Time => println!("{}", state.elapsed()),
        Input::Reset => {
            progress::reset_progress(state).await?;
            println!("Progress reset.");
        }
        Input::Home => {
            quiz::go_home(state)?;
            println!("{}", render_levels(&catalog::list_levels(state)?));
        }
        Input::Quit => {}
    }
    Ok(())
}

/// Read commands from stdin until `/quit` or end of input.
pub async fn run_repl(state: &AppState) -> anyhow::Result<()> {
    println!("KR-EN vocabulary drill. Type /help for commands.\n");
    println!("{}", render_levels(&catalog::list_levels(state)?));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush().context("failed to flush stdout")?;

        let Some(line) = lines.next_line().await.context("failed to read stdin")? else {
            break;
        };
        match parse_input(&line, active_mode(state)) {
            Ok(Input::Quit) => break,
            Ok(input) => {
                if let Err(e) = dispatch(state, input).await {
                    println!("{}", e);
                }
            }
            Err(message) => println!("{}", message),
        }
    }

    quiz::go_home(state)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use drill_core::{LevelStats, Outcome, Term};
    use pretty_assertions::assert_eq;

    #[test]
    fn answers_depend_on_mode() {
        assert_eq!(parse_input("2", Some(QuizMode::MultipleChoice)), Ok(Input::Choice(1)));
        assert!(parse_input("0", Some(QuizMode::MultipleChoice)).is_err());
        assert_eq!(
            parse_input(" rational number ", Some(QuizMode::Typing)),
            Ok(Input::Typed("rational number".into()))
        );
        assert_eq!(parse_input("Y", Some(QuizMode::Flashcard)), Ok(Input::Flash(true)));
        assert_eq!(parse_input("again", Some(QuizMode::Flashcard)), Ok(Input::Flash(false)));
        assert!(parse_input("integer", None).is_err());
        assert_eq!(parse_input("", None), Ok(Input::Next));
    }

    #[test]
    fn commands() {
        assert_eq!(
            parse_input("/start ms-1-1 typing", None),
            Ok(Input::Start {
                level_id: "ms-1-1".into(),
                mode: Some(QuizMode::Typing)
            })
        );
        assert_eq!(parse_input("/levels", None), Ok(Input::Levels));
        assert_eq!(parse_input("/home", None), Ok(Input::Home));
        assert_eq!(parse_input("/mode flash", None), Ok(Input::Mode(QuizMode::Flashcard)));
        assert!(parse_input("/mode cards", None).is_err());
        assert_eq!(parse_input("/mode", None), Ok(Input::NextMode));
        assert!(parse_input("/mode mcq flash", None).is_err());
        assert_eq!(
            parse_input("/report hint is wrong", None),
            Ok(Input::Report("hint is wrong".into()))
        );
        assert_eq!(
            parse_input("/import hs-1-1 terms.csv replace", None),
            Ok(Input::Import {
                level_id: "hs-1-1".into(),
                path: PathBuf::from("terms.csv"),
                mode: ImportMode::Replace
            })
        );
        assert!(parse_input("/import hs-1-1", None).is_err());
        assert_eq!(
            parse_input("/export hs-1-1", None),
            Ok(Input::Export {
                level_id: "hs-1-1".into(),
                dir: PathBuf::from(".")
            })
        );
        assert_eq!(parse_input("/quit", Some(QuizMode::Typing)), Ok(Input::Quit));
        assert!(parse_input("/dance", None).is_err());
    }

    #[test]
    fn level_badges() {
        let mut stats = LevelStats::default();
        let fresh = LevelSummary {
            id: "ms-1-1".into(),
            name: "Numbers".into(),
            description: String::new(),
            term_count: 40,
            stats: stats.clone(),
        };
        stats.record(0.756, &[], Utc::now());
        let played = LevelSummary {
            id: "hs-1-1".into(),
            stats,
            ..fresh.clone()
        };
        let text = render_levels(&[fresh, played]);
        assert!(text.contains("[new]"));
        assert!(text.contains("[best 76% · 1 attempts]"));
    }

    #[test]
    fn wrong_answer_shows_hint() {
        let feedback = Feedback {
            outcome: Outcome::Incorrect,
            term: Term::new("원점", "origin").with_hint("(0,0)"),
            hint: Some("(0,0)".into()),
            score: 0,
            streak: 0,
            progress: ProgressSnapshot { xp: 0, hearts: 4, streak: 0 },
            ended: None,
        };
        assert_eq!(
            render_feedback(&feedback),
            "Not quite. 원점 = origin\nHint: (0,0)\nxp 0 · hearts 4 · streak 0"
        );
    }
}
