//! Environment configuration.

use std::path::PathBuf;

use drill_core::store::DEFAULT_PREFIX;

pub const ENV_CATALOG_SOURCE: &str = "DRILL_CATALOG_SOURCE";
pub const ENV_DB_PATH: &str = "DRILL_DB_PATH";
pub const ENV_STORAGE_PREFIX: &str = "DRILL_STORAGE_PREFIX";

pub const DEFAULT_CATALOG_SOURCE: &str = "data/kr_en_terms.json";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// `http(s)://` URL or file path of the catalog document.
    pub catalog_source: String,
    pub db_path: PathBuf,
    pub storage_prefix: String,
}

impl Config {
    /// Read from the process environment. Call after `dotenvy::dotenv()`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any variable lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        Self {
            catalog_source: var(ENV_CATALOG_SOURCE)
                .unwrap_or_else(|| DEFAULT_CATALOG_SOURCE.to_string()),
            db_path: var(ENV_DB_PATH)
                .map(PathBuf::from)
                .unwrap_or_else(default_db_path),
            storage_prefix: var(ENV_STORAGE_PREFIX).unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
        }
    }
}

/// Database under the platform's local data directory, falling back to the
/// current directory.
pub fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("kr-en-drill")
        .join("drill.db")
}
