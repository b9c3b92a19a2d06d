use clap::{Args, Subcommand, ValueEnum};
use califit_core::{Config, IntervalTimer, SessionConfig, TimerHandle};

use crate::host::{Host, Outcome};
use crate::terminal_cues::TerminalCues;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Run one interval in the terminal (p pause, r reset, m mute, Enter done, q quit)
    Run(RunArgs),
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Exercise,
    Rest,
}

#[derive(Args)]
pub struct RunArgs {
    /// Interval type
    #[arg(long, value_enum, default_value_t = ModeArg::Exercise)]
    mode: ModeArg,
    /// Exercise length in seconds; 0 counts up
    #[arg(long)]
    exercise_duration: Option<u32>,
    /// Rest length in seconds; 0 means the default minute
    #[arg(long)]
    rest: Option<u32>,
    /// Start with cues muted
    #[arg(long)]
    mute: bool,
    /// Print events as JSON lines
    #[arg(long)]
    json: bool,
    /// Start the exercise countdown without waiting for `p`
    #[arg(long)]
    auto_start: bool,
}

impl RunArgs {
    fn session(&self, config: &Config) -> SessionConfig {
        let mut session = match self.mode {
            ModeArg::Exercise => config.exercise_session(),
            ModeArg::Rest => config.rest_session(),
        };
        if let Some(secs) = self.exercise_duration {
            session.exercise_duration_secs = secs;
        }
        if let Some(secs) = self.rest {
            session.rest_duration_secs = secs;
        }
        if self.mute {
            session = session.with_cues(false);
        }
        session.with_auto_start(self.auto_start)
    }
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        TimerAction::Run(args) => {
            let config = Config::load()?;
            let session = args.session(&config);
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            let result = runtime.block_on(run_interval(&config, session, args.json));
            // A pending stdin read would otherwise hold the runtime open.
            runtime.shutdown_background();
            result
        }
    }
}

async fn run_interval(
    config: &Config,
    session: SessionConfig,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let muted = session.cues_enabled.map_or(!config.cues.enabled, |on| !on);
    let timer = IntervalTimer::with_system_clock(
        config.timer_settings(),
        Box::new(TerminalCues::new(config)),
    );
    let (handle, events, task) = TimerHandle::spawn(timer);
    let mut host = Host::new(handle, events, json, muted);
    host.configure(session)?;

    loop {
        match host.next_outcome().await? {
            Outcome::Completed { .. } | Outcome::Quit => break,
            Outcome::Input(line) => host.say(&format!("unknown command: {line}")),
        }
    }

    if host.handle().shutdown().is_ok() {
        task.await?;
    }
    Ok(())
}
