//! Progression and reset commands.

use drill_core::{LevelStats, ProgressSnapshot};

use super::CommandError;
use crate::state::AppState;

pub fn get_progress(state: &AppState) -> Result<ProgressSnapshot, CommandError> {
    Ok(state.controller()?.progress())
}

pub fn level_stats(state: &AppState, level_id: &str) -> Result<LevelStats, CommandError> {
    Ok(state.controller()?.level_stats(level_id))
}

/// Forget everything stored and reload the catalog from its source.
pub async fn reset_progress(state: &AppState) -> Result<ProgressSnapshot, CommandError> {
    state.cancel_import();
    let fetched = state.fetcher.fetch().await;
    let mut ctl = state.controller()?;
    ctl.reset(fetched);
    state.reset_elapsed();
    Ok(ctl.progress())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::quiz;
    use crate::commands::tests::state_with;
    use drill_core::{MemoryStore, QuizMode};

    #[tokio::test]
    async fn reset_restores_defaults_and_seed() {
        let store = MemoryStore::new();
        let state = state_with(&store);
        quiz::start_session(&state, "ms-1-1", Some(QuizMode::Typing)).unwrap();
        quiz::submit_typed(&state, "wrong").unwrap();
        assert_eq!(get_progress(&state).unwrap().hearts, 4);

        let progress = reset_progress(&state).await.unwrap();
        assert_eq!(progress, ProgressSnapshot::default());
        assert_eq!(level_stats(&state, "ms-1-1").unwrap(), LevelStats::default());

        // The configured source is missing, so the embedded seed is loaded.
        let ids: Vec<_> = state
            .controller()
            .unwrap()
            .level_summaries()
            .into_iter()
            .map(|l| l.id)
            .collect();
        assert_eq!(ids, vec!["ms-1-1", "hs-1-1"]);
    }
}
