//! Level listing and CSV import/export commands.

use std::path::{Path, PathBuf};

use drill_core::{ImportError, ImportMode, ImportSummary, LevelSummary};

use super::CommandError;
use crate::state::AppState;

/// List all levels with their stats.
pub fn list_levels(state: &AppState) -> Result<Vec<LevelSummary>, CommandError> {
    Ok(state.controller()?.level_summaries())
}

/// Import a CSV file into a level.
///
/// The file is read without holding the controller. If another import began
/// or this one was cancelled meanwhile, the contents are discarded.
pub async fn import_csv_file(
    state: &AppState,
    level_id: &str,
    path: &Path,
    mode: ImportMode,
) -> Result<ImportSummary, CommandError> {
    let ticket = state.begin_import();
    let text = tokio::fs::read_to_string(path).await?;

    if !state.is_current(ticket) {
        tracing::info!(level = level_id, path = %path.display(), "stale import discarded");
        return Err(ImportError::Cancelled.into());
    }

    let mut ctl = state.controller()?;
    Ok(ctl.import_csv(level_id, &text, mode)?)
}

pub fn cancel_import(state: &AppState) {
    state.cancel_import();
}

/// Write a level's CSV export into `dir`. Returns the written path.
pub async fn export_csv(
    state: &AppState,
    level_id: &str,
    dir: &Path,
) -> Result<PathBuf, CommandError> {
    let export = state.controller()?.export_csv(level_id)?;
    let path = dir.join(&export.file_name);
    tokio::fs::write(&path, export.content).await?;
    tracing::info!(level = level_id, path = %path.display(), "level exported");
    Ok(path)
}
