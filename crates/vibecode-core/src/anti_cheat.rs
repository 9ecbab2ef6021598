//! Shared anti-cheat counter.
//!
//! The counter is fed by an external monitor (focus loss, clipboard copy,
//! editor paste) that runs independently of the orchestrator. The orchestrator
//! only takes a snapshot when it submits a round for review.

use std::sync::{Arc, Mutex};
use tracing::debug;
use vibecode_proto::AntiCheatStats;

/// Cloneable handle to one session's violation counters.
#[derive(Debug, Clone, Default)]
pub struct AntiCheatCounter {
    stats: Arc<Mutex<AntiCheatStats>>,
}

impl AntiCheatCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_blur(&self) {
        self.update(AntiCheatStats::record_blur);
    }

    pub fn record_copy(&self) {
        self.update(AntiCheatStats::record_copy);
    }

    pub fn record_editor_paste(&self) {
        self.update(AntiCheatStats::record_editor_paste);
    }

    /// Returns a consistent copy of the counters.
    pub fn snapshot(&self) -> AntiCheatStats {
        // A poisoned lock still holds a consistent value: every update replaces
        // the whole struct.
        match self.stats.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn update(&self, apply: impl FnOnce(&mut AntiCheatStats)) {
        let mut guard = match self.stats.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        apply(&mut *guard);
        debug!(total = guard.total_violations(), "Anti-cheat violation recorded");
    }
}
