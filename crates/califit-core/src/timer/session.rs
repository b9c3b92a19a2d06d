use serde::{Deserialize, Serialize};

/// Rest length used when none (or zero) is configured.
pub const DEFAULT_REST_SECS: u32 = 60;

/// Which interval the timer is measuring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerMode {
    Exercise,
    Rest,
    /// Terminal display state after the last set. Controls are inert.
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Idle,
    Running,
    Paused,
}

/// Display-only labels. The timer carries them but never reads them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetLabel {
    pub exercise_name: String,
    pub set_number: u32,
    pub total_sets: u32,
}

/// Per-session input from the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub mode: TimerMode,
    /// Seconds. `0` selects count-up (stopwatch) for exercise sets.
    #[serde(default)]
    pub exercise_duration_secs: u32,
    /// Seconds. `0` falls back to [`DEFAULT_REST_SECS`].
    #[serde(default = "default_rest")]
    pub rest_duration_secs: u32,
    /// `Some` sets the mute state; `None` keeps the timer's current one
    /// (initially [`TimerSettings::cues_enabled`]).
    #[serde(default)]
    pub cues_enabled: Option<bool>,
    /// Start the exercise countdown as soon as the session is configured.
    #[serde(default)]
    pub auto_start: bool,
    #[serde(default)]
    pub label: Option<SetLabel>,
}

fn default_rest() -> u32 {
    DEFAULT_REST_SECS
}

impl SessionConfig {
    pub fn exercise(duration_secs: u32) -> Self {
        Self {
            mode: TimerMode::Exercise,
            exercise_duration_secs: duration_secs,
            rest_duration_secs: DEFAULT_REST_SECS,
            cues_enabled: None,
            auto_start: false,
            label: None,
        }
    }

    pub fn rest(duration_secs: u32) -> Self {
        Self {
            mode: TimerMode::Rest,
            exercise_duration_secs: 0,
            rest_duration_secs: duration_secs,
            cues_enabled: None,
            auto_start: false,
            label: None,
        }
    }

    pub fn complete() -> Self {
        Self {
            mode: TimerMode::Complete,
            ..Self::exercise(0)
        }
    }

    pub fn with_cues(mut self, enabled: bool) -> Self {
        self.cues_enabled = Some(enabled);
        self
    }

    pub fn with_auto_start(mut self, auto_start: bool) -> Self {
        self.auto_start = auto_start;
        self
    }

    pub fn with_label(mut self, label: SetLabel) -> Self {
        self.label = Some(label);
        self
    }

    pub fn rest_secs(&self) -> u32 {
        if self.rest_duration_secs == 0 {
            DEFAULT_REST_SECS
        } else {
            self.rest_duration_secs
        }
    }

    /// Length of the active interval; `0` for count-up and `Complete`.
    pub fn configured_secs(&self) -> u32 {
        match self.mode {
            TimerMode::Exercise => self.exercise_duration_secs,
            TimerMode::Rest => self.rest_secs(),
            TimerMode::Complete => 0,
        }
    }

    pub fn is_count_up(&self) -> bool {
        self.mode == TimerMode::Exercise && self.exercise_duration_secs == 0
    }
}

/// Process-wide defaults injected when an [`IntervalTimer`](super::IntervalTimer)
/// is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSettings {
    /// Period of the display tick schedule.
    pub tick_interval_ms: u64,
    /// First value of the pre-start countdown.
    pub countdown_from: u8,
    /// Mute state for sessions that do not say otherwise.
    pub cues_enabled: bool,
    pub vibration: bool,
    pub tick_vibration_ms: u32,
    pub final_vibration_ms: u32,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: 100,
            countdown_from: 3,
            cues_enabled: true,
            vibration: true,
            tick_vibration_ms: 100,
            final_vibration_ms: 200,
        }
    }
}

/// The two recurring callbacks a host may be asked to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleKind {
    /// Display refresh while running.
    Tick,
    /// 1Hz pre-start countdown.
    Countdown,
}

/// Ticket for one scheduled callback. Stale tickets are ignored by `fire()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScheduleToken {
    pub kind: ScheduleKind,
    pub epoch: u64,
}
