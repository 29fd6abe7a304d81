use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::matrix::TaskStatus;

/// Every session command reports what it changed as a list of events.
/// Renderers turn them into toasts and sounds; the engine never acts on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    Started {
        round: usize,
        slot: usize,
        at: DateTime<Utc>,
    },
    Paused {
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    TaskRestarted {
        round: usize,
        slot: usize,
        at: DateTime<Utc>,
    },
    TaskCompleted {
        round: usize,
        slot: usize,
        status: TaskStatus,
        actual_secs: u64,
        at: DateTime<Utc>,
    },
    TaskSkipped {
        round: usize,
        slot: usize,
        at: DateTime<Utc>,
    },
    /// Auto-continue finished the current task.
    AutoContinued {
        round: usize,
        slot: usize,
        at: DateTime<Utc>,
    },
    TaskEntered {
        round: usize,
        slot: usize,
        rollover_secs: u64,
        at: DateTime<Utc>,
    },
    RolloverApplied {
        secs: u64,
        at: DateTime<Utc>,
    },
    RoundCompleted {
        round: usize,
        at: DateTime<Utc>,
    },
    SessionCompleted {
        at: DateTime<Utc>,
    },
    SteppedBack {
        round: usize,
        slot: usize,
        at: DateTime<Utc>,
    },
    /// Remaining time for the current task reached zero.
    TimeUp {
        round: usize,
        slot: usize,
        at: DateTime<Utc>,
    },
    SessionReset {
        at: DateTime<Utc>,
    },
    TemplateLoaded {
        name: String,
        at: DateTime<Utc>,
    },
}

/// Convert engine milliseconds into a UTC timestamp.
pub(crate) fn timestamp(now_ms: u64) -> DateTime<Utc> {
    i64::try_from(now_ms)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .unwrap_or_default()
}
