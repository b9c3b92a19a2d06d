mod engine;
mod runner;
mod session;

pub use engine::IntervalTimer;
pub use runner::{TimerCommand, TimerHandle};
pub use session::{
    RunState, ScheduleKind, ScheduleToken, SessionConfig, SetLabel, TimerMode, TimerSettings,
    DEFAULT_REST_SECS,
};
