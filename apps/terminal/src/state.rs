//! Application state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use drill_core::Controller;

use crate::commands::CommandError;
use crate::source::CatalogFetcher;
use crate::ticker::ElapsedDisplay;

/// Identifies one import attempt. Stale once another import begins or the
/// current one is cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportTicket(u64);

/// Global application state.
pub struct AppState {
    pub controller: Arc<Mutex<Controller>>,
    pub fetcher: CatalogFetcher,
    pub elapsed: Arc<ElapsedDisplay>,
    import_generation: AtomicU64,
}

impl AppState {
    pub fn new(controller: Controller, fetcher: CatalogFetcher) -> Self {
        Self {
            controller: Arc::new(Mutex::new(controller)),
            fetcher,
            elapsed: Arc::new(ElapsedDisplay::new()),
            import_generation: AtomicU64::new(0),
        }
    }

    pub fn controller(&self) -> Result<MutexGuard<'_, Controller>, CommandError> {
        self.controller.lock().map_err(|_| CommandError {
            message: "controller lock poisoned".to_string(),
        })
    }

    /// Latest `mm:ss` published by the session ticker.
    pub fn elapsed(&self) -> String {
        self.elapsed.get()
    }

    /// Back to `00:00`. Tickers attached before this call stop publishing.
    pub fn reset_elapsed(&self) {
        self.elapsed.reset();
    }

    pub fn begin_import(&self) -> ImportTicket {
        ImportTicket(self.import_generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Invalidate any import in flight.
    pub fn cancel_import(&self) {
        self.import_generation.fetch_add(1, Ordering::SeqCst);
    }

    pub fn is_current(&self, ticket: ImportTicket) -> bool {
        self.import_generation.load(Ordering::SeqCst) == ticket.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::CatalogSource;
    use drill_core::Storage;

    fn state() -> AppState {
        let controller = Controller::new(Storage::in_memory(), Ok(Default::default()));
        AppState::new(controller, CatalogFetcher::new(CatalogSource::parse("unused.json")))
    }

    #[test]
    fn newer_import_supersedes_older() {
        let state = state();
        let first = state.begin_import();
        let second = state.begin_import();
        assert!(!state.is_current(first));
        assert!(state.is_current(second));
        state.cancel_import();
        assert!(!state.is_current(second));
    }

    #[test]
    fn elapsed_starts_at_zero() {
        let state = state();
        assert_eq!(state.elapsed(), "00:00");
        assert!(state.elapsed.publish(state.elapsed.generation(), "03:10".into()));
        assert_eq!(state.elapsed(), "03:10");
        state.reset_elapsed();
        assert_eq!(state.elapsed(), "00:00");
    }
}
