//! Async host for an [`IntervalTimer`].
//!
//! One tokio task owns the timer. Control commands arrive over an mpsc
//! channel and the timer's active schedule is run with `tokio::time::interval`
//! inside the same `select!` loop, so a command always completes before the
//! next scheduled callback is looked at. When a command changes the schedule
//! the old interval is dropped before the next loop iteration.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

use super::engine::IntervalTimer;
use super::session::{ScheduleKind, ScheduleToken, SessionConfig};
use crate::error::{CoreError, Result};
use crate::events::Event;

/// Control operations accepted by the runner.
#[derive(Debug, Clone, PartialEq)]
pub enum TimerCommand {
    Configure(SessionConfig),
    Start,
    Toggle,
    Reset,
    CompleteNow,
    StartNext,
    ToggleMute,
    /// Publish a `StateSnapshot` event.
    Snapshot,
    Shutdown,
}

/// Cloneable handle to a running timer task.
#[derive(Debug, Clone)]
pub struct TimerHandle {
    commands: mpsc::UnboundedSender<TimerCommand>,
}

impl TimerHandle {
    /// Move `timer` onto a new task. Returns the handle, the event stream and
    /// the task's join handle. The task ends on `Shutdown` or when every
    /// handle is dropped.
    pub fn spawn(timer: IntervalTimer) -> (Self, mpsc::UnboundedReceiver<Event>, JoinHandle<()>) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(timer, cmd_rx, event_tx));
        (Self { commands: cmd_tx }, event_rx, task)
    }

    pub fn send(&self, command: TimerCommand) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| CoreError::RunnerClosed)
    }

    pub fn configure(&self, session: SessionConfig) -> Result<()> {
        self.send(TimerCommand::Configure(session))
    }

    pub fn start(&self) -> Result<()> {
        self.send(TimerCommand::Start)
    }

    pub fn toggle(&self) -> Result<()> {
        self.send(TimerCommand::Toggle)
    }

    pub fn reset(&self) -> Result<()> {
        self.send(TimerCommand::Reset)
    }

    pub fn complete_now(&self) -> Result<()> {
        self.send(TimerCommand::CompleteNow)
    }

    pub fn start_next(&self) -> Result<()> {
        self.send(TimerCommand::StartNext)
    }

    pub fn toggle_mute(&self) -> Result<()> {
        self.send(TimerCommand::ToggleMute)
    }

    pub fn snapshot(&self) -> Result<()> {
        self.send(TimerCommand::Snapshot)
    }

    pub fn shutdown(&self) -> Result<()> {
        self.send(TimerCommand::Shutdown)
    }
}

struct ActiveSchedule {
    token: ScheduleToken,
    interval: Interval,
}

async fn run(
    mut timer: IntervalTimer,
    mut commands: mpsc::UnboundedReceiver<TimerCommand>,
    events: mpsc::UnboundedSender<Event>,
) {
    let mut schedule: Option<ActiveSchedule> = None;

    loop {
        sync_schedule(&timer, &mut schedule);

        tokio::select! {
            command = commands.recv() => {
                let Some(command) = command else {
                    break;
                };
                if command == TimerCommand::Shutdown {
                    break;
                }
                publish(&events, apply(&mut timer, command));
            }
            token = next_fire(&mut schedule) => {
                publish(&events, timer.fire(token));
            }
        }
    }

    tracing::debug!("timer runner stopped");
}

fn apply(timer: &mut IntervalTimer, command: TimerCommand) -> Vec<Event> {
    match command {
        TimerCommand::Configure(session) => timer.configure(session),
        TimerCommand::Start => timer.start().into_iter().collect(),
        TimerCommand::Toggle => timer.toggle().into_iter().collect(),
        TimerCommand::Reset => timer.reset().into_iter().collect(),
        TimerCommand::CompleteNow => timer.complete_now().into_iter().collect(),
        TimerCommand::StartNext => timer.start_next().into_iter().collect(),
        TimerCommand::ToggleMute => timer.toggle_mute().into_iter().collect(),
        TimerCommand::Snapshot => vec![timer.snapshot()],
        TimerCommand::Shutdown => Vec::new(),
    }
}

/// Make the running interval match the timer's active schedule.
fn sync_schedule(timer: &IntervalTimer, schedule: &mut Option<ActiveSchedule>) {
    let wanted = timer.active_schedule();
    if schedule.as_ref().map(|s| s.token) == wanted {
        return;
    }
    *schedule = wanted.map(|token| {
        let period = Duration::from_millis(timer.period_ms(token.kind));
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(match token.kind {
            // Display ticks recompute from anchors; bunching them is useless.
            ScheduleKind::Tick => MissedTickBehavior::Skip,
            ScheduleKind::Countdown => MissedTickBehavior::Delay,
        });
        ActiveSchedule { token, interval }
    });
}

async fn next_fire(schedule: &mut Option<ActiveSchedule>) -> ScheduleToken {
    match schedule {
        Some(active) => {
            active.interval.tick().await;
            active.token
        }
        None => std::future::pending().await,
    }
}

fn publish(events: &mpsc::UnboundedSender<Event>, batch: Vec<Event>) {
    for event in batch {
        // A host that stopped listening does not stop the timer.
        let _ = events.send(event);
    }
}
