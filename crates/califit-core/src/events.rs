use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{RunState, TimerMode};

/// Every state change of a timer session produces an Event.
/// Hosts render `Tick`s and advance the workout on `IntervalCompleted`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionConfigured {
        mode: TimerMode,
        duration_secs: u32,
        count_up: bool,
        at: DateTime<Utc>,
    },
    /// One value of the pre-start 3-2-1.
    CountdownTick {
        value: u8,
        at: DateTime<Utc>,
    },
    TimerStarted {
        mode: TimerMode,
        duration_secs: u32,
        count_up: bool,
        at: DateTime<Utc>,
    },
    Tick {
        seconds: i64,
        /// Ring fill for count-downs; absent for the stopwatch.
        progress_pct: Option<f64>,
        at: DateTime<Utc>,
    },
    TimerPaused {
        seconds: i64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        seconds: i64,
        at: DateTime<Utc>,
    },
    TimerReset {
        seconds: i64,
        at: DateTime<Utc>,
    },
    MuteToggled {
        muted: bool,
        at: DateTime<Utc>,
    },
    /// Fired at most once per run: natural expiry or manual completion.
    IntervalCompleted {
        mode: TimerMode,
        seconds: i64,
        manual: bool,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        mode: TimerMode,
        run_state: RunState,
        countdown: Option<u8>,
        seconds: i64,
        duration_secs: u32,
        progress_pct: Option<f64>,
        muted: bool,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn is_completion(&self) -> bool {
        matches!(self, Event::IntervalCompleted { .. })
    }

    /// Displayed seconds carried by the event, if any.
    pub fn seconds(&self) -> Option<i64> {
        match self {
            Event::Tick { seconds, .. }
            | Event::TimerPaused { seconds, .. }
            | Event::TimerResumed { seconds, .. }
            | Event::TimerReset { seconds, .. }
            | Event::IntervalCompleted { seconds, .. }
            | Event::StateSnapshot { seconds, .. } => Some(*seconds),
            _ => None,
        }
    }
}
