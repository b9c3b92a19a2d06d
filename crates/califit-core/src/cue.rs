//! Audio and haptic cues.
//!
//! The timer decides *when* a cue fires; a [`CueDispatcher`] decides *how*.
//! Dispatch is fire-and-forget: a failed cue is logged and dropped, it never
//! interrupts timing.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::error::CueError;

/// Every cue the application knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Cue {
    /// Pre-start 3-2-1 beep.
    Countdown,
    /// Last three seconds of a count-down.
    Tick,
    /// Count-down reached zero.
    #[serde(alias = "final")]
    FinalTick,
    ExerciseComplete,
    RestComplete,
    WorkoutComplete,
    Notification,
}

impl Cue {
    pub const ALL: [Cue; 7] = [
        Cue::Countdown,
        Cue::Tick,
        Cue::FinalTick,
        Cue::ExerciseComplete,
        Cue::RestComplete,
        Cue::WorkoutComplete,
        Cue::Notification,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Cue::Countdown => "countdown",
            Cue::Tick => "tick",
            Cue::FinalTick => "finalTick",
            Cue::ExerciseComplete => "exerciseComplete",
            Cue::RestComplete => "restComplete",
            Cue::WorkoutComplete => "workoutComplete",
            Cue::Notification => "notification",
        }
    }

    /// Bundled sound asset for this cue.
    pub fn default_asset(self) -> &'static str {
        match self {
            Cue::Countdown => "sounds/countdown.wav",
            Cue::Tick => "sounds/tick.wav",
            Cue::FinalTick => "sounds/final-tick.wav",
            Cue::ExerciseComplete => "sounds/exercise-complete.wav",
            Cue::RestComplete => "sounds/rest-complete.wav",
            Cue::WorkoutComplete => "sounds/workout-complete.wav",
            Cue::Notification => "sounds/notification.mp3",
        }
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Cue {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "final" => Ok(Cue::FinalTick),
            other => Cue::ALL
                .into_iter()
                .find(|cue| cue.as_str() == other)
                .ok_or_else(|| format!("unknown cue: {other}")),
        }
    }
}

/// Vibration pattern: alternating on/off durations in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HapticPattern(pub Vec<u32>);

impl HapticPattern {
    pub fn pulse(ms: u32) -> Self {
        Self(vec![ms])
    }
}

/// Platform adapter for sounds and vibration.
///
/// Implementations report failures through `CueError`; the caller logs and
/// discards them.
pub trait CueDispatcher: Send {
    fn play(&mut self, cue: Cue) -> Result<(), CueError>;

    /// Platforms without a vibration motor keep the default no-op.
    fn vibrate(&mut self, _pattern: &HapticPattern) -> Result<(), CueError> {
        Ok(())
    }
}

/// Dispatcher that does nothing. Used for headless hosts.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCueDispatcher;

impl CueDispatcher for NullCueDispatcher {
    fn play(&mut self, _cue: Cue) -> Result<(), CueError> {
        Ok(())
    }
}

/// One dispatched cue, as seen by [`RecordingCueDispatcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CueRecord {
    Played(Cue),
    Vibrated(HapticPattern),
}

/// Dispatcher that records what it was asked to do. Clones share the log,
/// so a host can keep one clone and hand the other to the timer.
#[derive(Debug, Clone, Default)]
pub struct RecordingCueDispatcher {
    log: Arc<Mutex<Vec<CueRecord>>>,
}

impl RecordingCueDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<CueRecord> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    /// Only the played cues, in order.
    pub fn played(&self) -> Vec<Cue> {
        self.records()
            .into_iter()
            .filter_map(|r| match r {
                CueRecord::Played(cue) => Some(cue),
                CueRecord::Vibrated(_) => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        if let Ok(mut log) = self.log.lock() {
            log.clear();
        }
    }

    fn push(&self, record: CueRecord) {
        if let Ok(mut log) = self.log.lock() {
            log.push(record);
        }
    }
}

impl CueDispatcher for RecordingCueDispatcher {
    fn play(&mut self, cue: Cue) -> Result<(), CueError> {
        self.push(CueRecord::Played(cue));
        Ok(())
    }

    fn vibrate(&mut self, pattern: &HapticPattern) -> Result<(), CueError> {
        self.push(CueRecord::Vibrated(pattern.clone()));
        Ok(())
    }
}

/// Play a cue and optional vibration, swallowing failures.
pub(crate) fn fire_and_forget(
    dispatcher: &mut dyn CueDispatcher,
    cue: Cue,
    haptic: Option<&HapticPattern>,
) {
    if let Err(e) = dispatcher.play(cue) {
        tracing::warn!(%cue, error = %e, "cue playback failed");
    }
    if let Some(pattern) = haptic {
        if let Err(e) = dispatcher.vibrate(pattern) {
            tracing::warn!(%cue, error = %e, "vibration failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    impl CueDispatcher for Broken {
        fn play(&mut self, cue: Cue) -> Result<(), CueError> {
            Err(CueError::PlaybackRejected {
                cue: cue.to_string(),
                message: "no audio device".into(),
            })
        }

        fn vibrate(&mut self, _pattern: &HapticPattern) -> Result<(), CueError> {
            Err(CueError::VibrationRejected("no motor".into()))
        }
    }

    #[test]
    fn cue_names_round_trip_through_from_str() {
        for cue in Cue::ALL {
            assert_eq!(cue.as_str().parse::<Cue>().unwrap(), cue);
        }
        assert_eq!("final".parse::<Cue>().unwrap(), Cue::FinalTick);
        assert!("airhorn".parse::<Cue>().is_err());
    }

    #[test]
    fn serde_uses_camel_case_names() {
        let json = serde_json::to_string(&Cue::ExerciseComplete).unwrap();
        assert_eq!(json, "\"exerciseComplete\"");
        let parsed: Cue = serde_json::from_str("\"final\"").unwrap();
        assert_eq!(parsed, Cue::FinalTick);
    }

    #[test]
    fn failures_are_swallowed() {
        let mut broken = Broken;
        fire_and_forget(&mut broken, Cue::Tick, Some(&HapticPattern::pulse(100)));
    }

    #[test]
    fn recording_dispatcher_shares_log_between_clones() {
        let recorder = RecordingCueDispatcher::new();
        let mut handed_out = recorder.clone();
        fire_and_forget(&mut handed_out, Cue::Tick, Some(&HapticPattern::pulse(100)));
        assert_eq!(
            recorder.records(),
            vec![
                CueRecord::Played(Cue::Tick),
                CueRecord::Vibrated(HapticPattern::pulse(100)),
            ]
        );
        assert_eq!(recorder.played(), vec![Cue::Tick]);
    }

    #[test]
    fn default_vibrate_is_noop() {
        let mut null = NullCueDispatcher;
        assert!(null.vibrate(&HapticPattern(vec![100, 50, 100])).is_ok());
    }
}
