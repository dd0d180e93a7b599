//! XP, hearts and streak, shared by every session.
//!
//! This is the only code that reads or writes these values; callers get the
//! new snapshot back from each operation.

use crate::store::{Storage, KEY_HEARTS, KEY_STREAK, KEY_XP};
use crate::types::ProgressSnapshot;

pub const STARTING_HEARTS: u32 = 5;
pub const XP_PER_CORRECT: u32 = 10;

impl Default for ProgressSnapshot {
    fn default() -> Self {
        Self {
            xp: 0,
            hearts: STARTING_HEARTS,
            streak: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Progression {
    storage: Storage,
    snapshot: ProgressSnapshot,
}

impl Progression {
    /// Load persisted values. Missing, unreadable or zero hearts are refilled.
    pub fn load(storage: Storage) -> Self {
        let hearts = match storage.read_u32(KEY_HEARTS) {
            Some(0) | None => STARTING_HEARTS,
            Some(hearts) => hearts,
        };
        let snapshot = ProgressSnapshot {
            xp: storage.read_u32(KEY_XP).unwrap_or(0),
            hearts,
            streak: storage.read_u32(KEY_STREAK).unwrap_or(0),
        };
        Self { storage, snapshot }
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        self.snapshot
    }

    pub fn is_out_of_hearts(&self) -> bool {
        self.snapshot.hearts == 0
    }

    pub fn apply_correct(&mut self) -> ProgressSnapshot {
        self.snapshot.xp = self.snapshot.xp.saturating_add(XP_PER_CORRECT);
        self.snapshot.streak = self.snapshot.streak.saturating_add(1);
        self.storage.write_u32(KEY_XP, self.snapshot.xp);
        self.storage.write_u32(KEY_STREAK, self.snapshot.streak);
        self.snapshot
    }

    pub fn apply_incorrect(&mut self) -> ProgressSnapshot {
        self.snapshot.hearts = self.snapshot.hearts.saturating_sub(1);
        self.snapshot.streak = 0;
        self.storage.write_u32(KEY_HEARTS, self.snapshot.hearts);
        self.storage.write_u32(KEY_STREAK, self.snapshot.streak);
        self.snapshot
    }

    /// Restore defaults and write them through.
    pub fn reset(&mut self) -> ProgressSnapshot {
        self.snapshot = ProgressSnapshot::default();
        self.storage.write_u32(KEY_XP, self.snapshot.xp);
        self.storage.write_u32(KEY_HEARTS, self.snapshot.hearts);
        self.storage.write_u32(KEY_STREAK, self.snapshot.streak);
        self.snapshot
    }
}
