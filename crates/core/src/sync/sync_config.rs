//! Tunable timing knobs for the sync engine.

use std::time::Duration;

use crate::constants::{SYNC_INTERVAL_SECS, SYNC_JITTER_SECS};

/// Timing configuration for the periodic sync scheduler.
///
/// The scheduler sleeps `interval` plus a uniform draw from `[0, jitter)`
/// between passes so the platform can batch scheduled work instead of waking
/// every device at the exact same cadence.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub interval: Duration,
    pub jitter: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(SYNC_INTERVAL_SECS),
            jitter: Duration::from_secs(SYNC_JITTER_SECS),
        }
    }
}

impl SyncConfig {
    /// The next sleep duration, jittered.
    pub fn next_delay(&self) -> Duration {
        use rand::Rng;

        let jitter_ms = self.jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return self.interval;
        }
        let extra = rand::thread_rng().gen_range(0..jitter_ms);
        self.interval + Duration::from_millis(extra)
    }
}
