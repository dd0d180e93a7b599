//! Elapsed-time display ticker.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use drill_core::{format_time, Ticker};
use tokio::sync::watch;
use tokio::task::JoinHandle;

const TICK: Duration = Duration::from_secs(1);

/// The `mm:ss` shown next to the question.
///
/// Every reset starts a new generation. A ticker only publishes while its
/// generation is current, so a tick racing a reset cannot land afterwards.
pub struct ElapsedDisplay {
    tx: watch::Sender<String>,
    generation: AtomicU64,
}

impl ElapsedDisplay {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(format_time(0));
        Self {
            tx,
            generation: AtomicU64::new(0),
        }
    }

    pub fn get(&self) -> String {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.tx.subscribe()
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Show `00:00` and retire every ticker of earlier generations.
    pub fn reset(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.tx.send_replace(format_time(0));
    }

    /// Returns false when `generation` is no longer current.
    pub fn publish(&self, generation: u64, text: String) -> bool {
        // The check runs under the channel lock, serialized with `reset`.
        self.tx.send_if_modified(|value| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            *value = text;
            true
        })
    }
}

impl Default for ElapsedDisplay {
    fn default() -> Self {
        Self::new()
    }
}

/// Publishes `mm:ss` since `started_at` about once per second until stopped.
pub struct ElapsedTicker {
    handle: JoinHandle<()>,
}

impl ElapsedTicker {
    /// Spawn on the current tokio runtime, bound to the display's current
    /// generation.
    pub fn spawn(started_at: DateTime<Utc>, display: Arc<ElapsedDisplay>) -> Self {
        let generation = display.generation();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK);
            loop {
                interval.tick().await;
                let secs = (Utc::now() - started_at).num_seconds().max(0) as u64;
                if !display.publish(generation, format_time(secs)) {
                    break;
                }
            }
        });
        Self { handle }
    }
}

impl Ticker for ElapsedTicker {
    fn stop(&mut self) {
        self.handle.abort();
    }
}
