use std::path::PathBuf;

use chrono::Utc;
use clap::Subcommand;
use califit_core::format::{format_clock, format_elapsed};
use califit_core::{
    Config, IntervalTimer, RunStep, TimerHandle, TimerMode, WorkoutPlan, WorkoutRun,
    WorkoutSummary,
};
use serde::Serialize;

use crate::host::{Host, Outcome};
use crate::terminal_cues::TerminalCues;

#[derive(Subcommand)]
pub enum WorkoutAction {
    /// Run a workout plan set by set (+/- or a number logs reps)
    Run {
        /// Plan file (TOML with [[exercise]] tables)
        plan: PathBuf,
        /// Print events as JSON lines
        #[arg(long)]
        json: bool,
        /// Start with cues muted
        #[arg(long)]
        mute: bool,
    },
    /// Check a plan file and print its outline
    Validate {
        /// Plan file
        plan: PathBuf,
        /// Print the parsed plan as JSON
        #[arg(long)]
        json: bool,
    },
}

/// JSON line emitted when the run moves on.
#[derive(Serialize)]
#[serde(tag = "type")]
enum ProgressLine<'a> {
    WorkoutStep {
        step: RunStep,
        exercise: &'a str,
        set_number: u32,
        progress_pct: f64,
    },
    WorkoutFinished {
        summary: &'a WorkoutSummary,
    },
}

pub fn run(action: WorkoutAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        WorkoutAction::Validate { plan, json } => {
            let plan = WorkoutPlan::load(&plan)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                print_outline(&plan);
            }
        }
        WorkoutAction::Run { plan, json, mute } => {
            let plan = WorkoutPlan::load(&plan)?;
            let config = Config::load()?;
            let mut run = WorkoutRun::new(plan, Utc::now())?;
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            let result = runtime.block_on(drive(&config, &mut run, json, mute));
            runtime.shutdown_background();
            result?;
            print_summary(&run.summary(Utc::now()), json)?;
        }
    }
    Ok(())
}

fn print_outline(plan: &WorkoutPlan) {
    println!(
        "{}: {} exercises, {} sets, about {}",
        plan.name,
        plan.exercises.len(),
        plan.total_sets(),
        format_elapsed(plan.planned_secs())
    );
    for exercise in &plan.exercises {
        let work = if exercise.duration_secs == 0 {
            format!("{} reps", exercise.target_reps)
        } else {
            format_clock(exercise.duration_secs as i64)
        };
        println!(
            "  {} {}x {} rest {}",
            exercise.name,
            exercise.sets,
            work,
            format_clock(exercise.rest_secs as i64)
        );
    }
}

fn print_summary(summary: &WorkoutSummary, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!(
            "{}",
            serde_json::to_string(&ProgressLine::WorkoutFinished { summary })?
        );
        return Ok(());
    }
    println!(
        "{}: {} in {}, {}/{} sets, {} reps",
        summary.name,
        if summary.completed_sets == summary.total_sets {
            "complete"
        } else {
            "stopped"
        },
        format_elapsed(summary.duration_secs),
        summary.completed_sets,
        summary.total_sets,
        summary.total_reps
    );
    for exercise in &summary.exercises {
        let reps: Vec<String> = exercise.reps.iter().map(u32::to_string).collect();
        println!(
            "  {} {}/{} [{}]",
            exercise.name,
            exercise.completed_sets,
            exercise.planned_sets,
            reps.join(" ")
        );
    }
    Ok(())
}

fn announce(host: &mut Host, run: &WorkoutRun) {
    let exercise = run.current_exercise();
    if run.is_resting() {
        host.say(&format!(
            "Rest. {} reps logged; +/- or a number to change, Enter for the next set",
            run.current_record().actual_reps
        ));
    } else {
        host.say(&format!(
            "{} set {}/{}, target {} reps. p starts, Enter when done",
            exercise.name,
            run.set_number(),
            exercise.sets,
            exercise.target_reps
        ));
    }
}

fn report_step(host: &mut Host, run: &WorkoutRun, step: RunStep) -> Result<(), Box<dyn std::error::Error>> {
    if host.json() {
        let line = ProgressLine::WorkoutStep {
            step,
            exercise: &run.current_exercise().name,
            set_number: run.set_number(),
            progress_pct: run.progress_pct(),
        };
        println!("{}", serde_json::to_string(&line)?);
    }
    Ok(())
}

/// Apply a reps edit typed during a set or its rest.
fn edit_reps(run: &mut WorkoutRun, line: &str) -> Option<u32> {
    match line {
        "+" => Some(run.adjust_reps(1)),
        "-" => Some(run.adjust_reps(-1)),
        other => {
            let reps = other.parse::<u32>().ok()?;
            run.set_reps(reps);
            Some(reps)
        }
    }
}

async fn drive(
    config: &Config,
    run: &mut WorkoutRun,
    json: bool,
    mute: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let muted = mute || !config.cues.enabled;
    let timer = IntervalTimer::with_system_clock(
        config.timer_settings(),
        Box::new(TerminalCues::new(config)),
    );
    let (handle, events, task) = TimerHandle::spawn(timer);
    let mut host = Host::new(handle, events, json, muted);
    let mut cues = TerminalCues::new(config);

    host.say(&format!(
        "{}: {} sets planned",
        run.plan().name,
        run.plan().total_sets()
    ));
    announce(&mut host, run);
    host.configure(run.current_session().with_cues(!muted))?;

    while !run.is_finished() {
        match host.next_outcome().await? {
            Outcome::Completed {
                mode: TimerMode::Exercise,
                seconds,
                manual,
            } => {
                tracing::info!(seconds, manual, exercise = %run.current_exercise().name, "Set finished");
                if let Some(step) = run.finish_exercise(seconds) {
                    cues.play_unless(host.is_muted(), step.cue());
                    report_step(&mut host, run, step)?;
                    announce(&mut host, run);
                    host.configure(run.current_session())?;
                }
            }
            Outcome::Completed {
                mode: TimerMode::Rest,
                ..
            } => {
                if let Some(step) = run.finish_rest(Utc::now()) {
                    cues.play_unless(host.is_muted(), step.cue());
                    report_step(&mut host, run, step)?;
                    if step != RunStep::Finished {
                        announce(&mut host, run);
                        host.configure(run.current_session())?;
                    }
                }
            }
            Outcome::Completed {
                mode: TimerMode::Complete,
                ..
            } => {}
            Outcome::Input(line) => match edit_reps(run, &line) {
                Some(reps) => host.say(&format!("{reps} reps")),
                None => host.say(&format!("unknown command: {line}")),
            },
            Outcome::Quit => break,
        }
    }

    if host.handle().shutdown().is_ok() {
        task.await?;
    }
    Ok(())
}
