//! Interactive driver for one timer actor.
//!
//! Renders the actor's events to stdout and turns stdin lines into timer
//! commands:
//!
//! | line          | exercise          | rest                 |
//! |---------------|-------------------|----------------------|
//! | `p`           | start/pause/resume| pause/resume         |
//! | `r`           | reset             | reset                |
//! | `m`           | mute toggle       | mute toggle          |
//! | `d` / empty   | complete set      | start next exercise  |
//! | `q`           | quit              | quit                 |
//!
//! Anything else is handed back to the caller. After `d` no further line is
//! read until the interval's completion has arrived, so piped input is
//! applied to the interval it was typed for.

use std::error::Error;
use std::io::Write;

use califit_core::format::{format_clock, format_overtime};
use califit_core::{Event, SessionConfig, TimerHandle, TimerMode};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::mpsc::UnboundedReceiver;

type Input = Lines<BufReader<Stdin>>;

/// Why `next_outcome` returned.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Completed {
        mode: TimerMode,
        seconds: i64,
        manual: bool,
    },
    /// A stdin line the interval controls do not handle.
    Input(String),
    Quit,
}

pub struct Host {
    handle: TimerHandle,
    events: UnboundedReceiver<Event>,
    /// `None` after stdin reaches EOF; the timer keeps running unattended.
    input: Option<Input>,
    json: bool,
    mode: TimerMode,
    muted: bool,
    awaiting_completion: bool,
    last_shown: Option<i64>,
}

impl Host {
    pub fn new(
        handle: TimerHandle,
        events: UnboundedReceiver<Event>,
        json: bool,
        muted: bool,
    ) -> Self {
        Self {
            handle,
            events,
            input: Some(BufReader::new(tokio::io::stdin()).lines()),
            json,
            mode: TimerMode::Exercise,
            muted,
            awaiting_completion: false,
            last_shown: None,
        }
    }

    pub fn handle(&self) -> &TimerHandle {
        &self.handle
    }

    /// Hand the actor a new session. Input typed from now on targets it.
    pub fn configure(&mut self, session: SessionConfig) -> Result<(), Box<dyn Error>> {
        self.mode = session.mode;
        self.awaiting_completion = false;
        self.handle.configure(session)?;
        Ok(())
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn json(&self) -> bool {
        self.json
    }

    /// Run until the current interval completes, the user quits, or an
    /// unhandled line arrives.
    pub async fn next_outcome(&mut self) -> Result<Outcome, Box<dyn Error>> {
        loop {
            tokio::select! {
                event = self.events.recv() => {
                    let Some(event) = event else {
                        return Ok(Outcome::Quit);
                    };
                    self.render(&event)?;
                    if let Event::IntervalCompleted { mode, seconds, manual, .. } = event {
                        self.awaiting_completion = false;
                        return Ok(Outcome::Completed { mode, seconds, manual });
                    }
                }
                line = read_line(&mut self.input), if !self.awaiting_completion => {
                    match line? {
                        Some(line) => {
                            if let Some(outcome) = self.handle_line(line.trim())? {
                                return Ok(outcome);
                            }
                        }
                        None => {
                            tracing::debug!("stdin closed; timer continues unattended");
                            self.input = None;
                        }
                    }
                }
            }
        }
    }

    fn handle_line(&mut self, line: &str) -> Result<Option<Outcome>, Box<dyn Error>> {
        match line {
            "p" => self.handle.toggle()?,
            "r" => self.handle.reset()?,
            "m" => self.handle.toggle_mute()?,
            "" | "d" => match self.mode {
                TimerMode::Exercise => {
                    self.handle.complete_now()?;
                    self.awaiting_completion = true;
                }
                TimerMode::Rest => {
                    self.handle.start_next()?;
                    self.awaiting_completion = true;
                }
                TimerMode::Complete => {}
            },
            "q" => return Ok(Some(Outcome::Quit)),
            other => return Ok(Some(Outcome::Input(other.to_string()))),
        }
        Ok(None)
    }

    /// Print a line of text that is not an event, keeping JSON output clean.
    pub fn say(&mut self, text: &str) {
        if self.json {
            return;
        }
        self.end_clock_line();
        println!("{text}");
    }

    fn end_clock_line(&mut self) {
        if self.last_shown.take().is_some() {
            println!();
        }
    }

    fn render(&mut self, event: &Event) -> Result<(), Box<dyn Error>> {
        if let Event::MuteToggled { muted, .. } = event {
            self.muted = *muted;
        }

        if self.json {
            // Ticks arrive several times a second; only changes are printed.
            if let Event::Tick { seconds, .. } = event {
                if self.last_shown == Some(*seconds) {
                    return Ok(());
                }
                self.last_shown = Some(*seconds);
            }
            println!("{}", serde_json::to_string(event)?);
            return Ok(());
        }

        match event {
            Event::SessionConfigured {
                mode,
                duration_secs,
                count_up,
                ..
            } => {
                self.end_clock_line();
                let length = if *count_up {
                    "stopwatch".to_string()
                } else {
                    format_clock(*duration_secs as i64)
                };
                println!("{mode:?} ({length})");
            }
            Event::CountdownTick { value, .. } => {
                print!("\r{value}...   ");
                std::io::stdout().flush()?;
            }
            Event::TimerStarted { .. } => {
                print!("\rGo!      ");
                std::io::stdout().flush()?;
            }
            Event::Tick { seconds, .. } => {
                if self.last_shown != Some(*seconds) {
                    self.last_shown = Some(*seconds);
                    let overtime = format_overtime(*seconds)
                        .map(|o| format!("  overtime {o}"))
                        .unwrap_or_default();
                    print!("\r{}{overtime}   ", format_clock(*seconds));
                    std::io::stdout().flush()?;
                }
            }
            Event::TimerPaused { seconds, .. } => {
                self.end_clock_line();
                println!("paused at {}", format_clock(*seconds));
            }
            Event::TimerResumed { .. } => {}
            Event::TimerReset { seconds, .. } => {
                self.end_clock_line();
                println!("reset to {}", format_clock(*seconds));
            }
            Event::MuteToggled { muted, .. } => {
                self.end_clock_line();
                println!("{}", if *muted { "muted" } else { "sound on" });
            }
            Event::IntervalCompleted { mode, seconds, .. } => {
                self.end_clock_line();
                println!("{mode:?} done at {}", format_clock(*seconds));
            }
            Event::StateSnapshot { .. } => {}
        }
        Ok(())
    }
}

async fn read_line(input: &mut Option<Input>) -> std::io::Result<Option<String>> {
    match input {
        Some(lines) => lines.next_line().await,
        None => std::future::pending().await,
    }
}
