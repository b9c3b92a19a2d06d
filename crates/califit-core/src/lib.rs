//! # Califit Core Library
//!
//! This library provides the client-side logic for the Califit calisthenics
//! tracker. Exercises, workouts and session history live on a remote backend;
//! what lives here is the guided-session machinery that has to keep correct
//! time on the device.
//!
//! ## Architecture
//!
//! - **Interval Timer**: A wall-clock-anchored state machine for one exercise
//!   set or one rest period. It owns no threads; the host runs the schedule the
//!   timer asks for and feeds the tokens back via `fire()`
//! - **Runner**: A tokio actor that hosts an `IntervalTimer` and drives its
//!   schedules, serializing every command through a single task
//! - **Cues**: Audio/haptic collaborator trait, invoked fire-and-forget
//! - **Workout Run**: Set/exercise progression across a whole workout plan
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`IntervalTimer`]: Core timer state machine
//! - [`TimerHandle`]: Async handle to a running timer actor
//! - [`WorkoutRun`]: Progression through a [`WorkoutPlan`]
//! - [`Config`]: Application configuration management

pub mod clock;
pub mod cue;
pub mod error;
pub mod events;
pub mod format;
pub mod storage;
pub mod timer;
pub mod workout;

pub use clock::{Clock, ManualClock, SystemClock};
pub use cue::{Cue, CueDispatcher, CueRecord, HapticPattern, NullCueDispatcher, RecordingCueDispatcher};
pub use error::{ConfigError, CoreError, CueError, PlanError};
pub use events::Event;
pub use storage::Config;
pub use timer::{
    IntervalTimer, RunState, ScheduleKind, ScheduleToken, SessionConfig, SetLabel, TimerCommand,
    TimerHandle, TimerMode, TimerSettings,
};
pub use workout::{PlannedExercise, RunStep, SetRecord, WorkoutPlan, WorkoutRun, WorkoutSummary};
