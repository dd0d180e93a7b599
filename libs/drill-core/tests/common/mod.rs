//! Shared fixtures for drill-core integration tests.

pub mod fixtures;

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use drill_core::{CatalogDocument, Controller, MemoryStore, Storage};

/// Controller over an in-memory store with a fixed seed.
///
/// Controllers built from the same `store` share persisted state, which is
/// how the tests simulate a reload.
pub fn controller(store: &MemoryStore, document: CatalogDocument) -> Controller<StdRng> {
    Controller::with_rng(
        Storage::with_default_prefix(Arc::new(store.clone())),
        Ok(document),
        StdRng::seed_from_u64(42),
    )
}
