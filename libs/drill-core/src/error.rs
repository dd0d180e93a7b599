//! Error types for drill-core.

use thiserror::Error;

/// Result type alias defaulting to IntentError.
pub type Result<T, E = IntentError> = std::result::Result<T, E>;

/// Problems found while reading CSV text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CsvError {
    #[error("Empty CSV")]
    Empty,

    #[error("Unclosed quote at end of file.")]
    UnclosedQuote,

    #[error("Header must include at least ko,en.")]
    MissingColumns,

    #[error("Row {row}: missing ko or en")]
    MissingField { row: usize },
}

/// A rejected import. The catalog is left unchanged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ImportError {
    #[error("CSV syntax error: {}", join(.0))]
    Syntax(Vec<CsvError>),

    #[error("CSV validation error: {}", join(.0))]
    Validation(Vec<CsvError>),

    #[error("unknown level: {0}")]
    UnknownLevel(String),

    #[error("import cancelled")]
    Cancelled,
}

impl ImportError {
    /// Itemized messages for display.
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::Syntax(errors) | Self::Validation(errors) => {
                errors.iter().map(ToString::to_string).collect()
            }
            other => vec![other.to_string()],
        }
    }
}

fn join(errors: &[CsvError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Persistence adapter failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("storage lock poisoned")]
    Poisoned,
}

/// Catalog source failures. Always degraded to seed data.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("catalog source unavailable: {0}")]
    Unavailable(String),

    #[error("malformed catalog document: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// An intent the controller could not carry out.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntentError {
    #[error("unknown level: {0}")]
    UnknownLevel(String),

    #[error("no active session")]
    NoSession,

    #[error("No missed terms to retry.")]
    NoMissedTerms,
}
