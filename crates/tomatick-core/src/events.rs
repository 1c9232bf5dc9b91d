use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::history::SessionId;
use crate::notify::CycleEvent;
use crate::timer::TimerMode;

/// Every state change of a cycle produces an Event.
/// Front ends subscribe to them through the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        mode: TimerMode,
        duration_secs: u64,
        description: String,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// One or more seconds elapsed on a running countdown.
    TimerTick {
        mode: TimerMode,
        remaining_secs: u64,
    },
    /// Countdown reached zero and the cycle advanced.
    CycleCompleted {
        mode: TimerMode,
        next_mode: TimerMode,
        notification: CycleEvent,
        at: DateTime<Utc>,
    },
    /// A finished focus interval was written to history.
    SessionRecorded {
        session_id: SessionId,
        duration_minutes: u32,
        at: DateTime<Utc>,
    },
    TimerStopped {
        at: DateTime<Utc>,
    },
    ModeSelected {
        mode: TimerMode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
}
