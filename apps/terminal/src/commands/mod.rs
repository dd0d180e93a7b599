//! Intent-level commands invoked by the terminal front-end.

pub mod catalog;
pub mod progress;
pub mod quiz;

use drill_core::{ImportError, IntentError, SourceError};

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CommandError {
    pub message: String,
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CommandError {}

impl From<IntentError> for CommandError {
    fn from(e: IntentError) -> Self {
        Self { message: e.to_string() }
    }
}

impl From<ImportError> for CommandError {
    fn from(e: ImportError) -> Self {
        Self {
            message: e.messages().join("\n"),
        }
    }
}

impl From<SourceError> for CommandError {
    fn from(e: SourceError) -> Self {
        Self { message: e.to_string() }
    }
}

impl From<std::io::Error> for CommandError {
    fn from(e: std::io::Error) -> Self {
        Self { message: e.to_string() }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::source::{CatalogFetcher, CatalogSource};
    use crate::state::AppState;
    use drill_core::{CatalogDocument, Controller, Level, MemoryStore, Storage, Term};
    use std::sync::Arc;

    pub(crate) fn document() -> CatalogDocument {
        CatalogDocument {
            levels: vec![Level {
                id: "ms-1-1".into(),
                name: "Middle school 1-1".into(),
                description: "Numbers".into(),
                terms: vec![
                    Term::new("정수", "integer"),
                    Term::new("유리수", "rational number"),
                    Term::new("원점", "origin").with_hint("(0,0)"),
                    Term::new("좌표", "coordinate"),
                ],
            }],
        }
    }

    /// State over an in-memory store with a file source that does not exist,
    /// so reset falls back to the embedded seed.
    pub(crate) fn state_with(store: &MemoryStore) -> AppState {
        let controller = Controller::new(
            Storage::with_default_prefix(Arc::new(store.clone())),
            Ok(document()),
        );
        AppState::new(
            controller,
            CatalogFetcher::new(CatalogSource::parse("/nonexistent/kr_en_terms.json")),
        )
    }

    #[test]
    fn import_error_lists_each_row() {
        let err: CommandError = ImportError::Validation(vec![
            drill_core::CsvError::MissingField { row: 2 },
            drill_core::CsvError::MissingField { row: 5 },
        ])
        .into();
        assert_eq!(err.message, "Row 2: missing ko or en\nRow 5: missing ko or en");
    }
}
