//! Wall-clock elapsed time for the task in progress.
//!
//! Elapsed time is always derived from `now - started_at`, or from the stored
//! offset while paused. Nothing is decremented per tick, so the value is
//! exact however irregularly the host polls.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Source of "now" in milliseconds since the Unix epoch.
pub trait TimeSource {
    fn now_ms(&self) -> u64;
}

/// System wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct WallClock;

impl TimeSource for WallClock {
    fn now_ms(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// Hand-driven clock shared between clones. Used for tests and replays.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_ms: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now_ms: Arc::new(AtomicU64::new(start_ms)),
        }
    }

    pub fn advance_ms(&self, delta_ms: u64) {
        self.now_ms.fetch_add(delta_ms, Ordering::SeqCst);
    }

    pub fn advance_secs(&self, secs: u64) {
        self.advance_ms(secs.saturating_mul(1000));
    }
}

impl TimeSource for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

/// Start timestamp plus paused offset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clock {
    #[serde(default)]
    started_at_epoch_ms: Option<u64>,
    #[serde(default)]
    paused_offset_ms: u64,
}

impl Clock {
    pub fn is_running(&self) -> bool {
        self.started_at_epoch_ms.is_some()
    }

    /// Begin or resume counting. No-op while already running.
    pub fn start(&mut self, now_ms: u64) -> bool {
        if self.is_running() {
            return false;
        }
        self.started_at_epoch_ms = Some(now_ms.saturating_sub(self.paused_offset_ms));
        true
    }

    /// Freeze the elapsed value. No-op unless running.
    pub fn pause(&mut self, now_ms: u64) -> bool {
        match self.started_at_epoch_ms.take() {
            Some(started) => {
                self.paused_offset_ms = now_ms.saturating_sub(started);
                true
            }
            None => false,
        }
    }

    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        match self.started_at_epoch_ms {
            Some(started) => now_ms.saturating_sub(started),
            None => self.paused_offset_ms,
        }
    }

    /// Elapsed whole seconds, floored.
    pub fn elapsed_secs(&self, now_ms: u64) -> u64 {
        self.elapsed_ms(now_ms) / 1000
    }

    /// Drop the accumulated time. A running clock keeps running from zero.
    pub fn reset(&mut self, now_ms: u64) {
        self.paused_offset_ms = 0;
        if self.is_running() {
            self.started_at_epoch_ms = Some(now_ms);
        }
    }

    /// Zero and running from `now_ms`.
    pub fn restart(&mut self, now_ms: u64) {
        self.paused_offset_ms = 0;
        self.started_at_epoch_ms = Some(now_ms);
    }

    /// Zero and stopped.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
