//! Guided workout progression.
//!
//! A [`WorkoutRun`] walks a [`WorkoutPlan`] set by set, alternating exercise
//! and rest intervals, and hands the host the [`SessionConfig`](crate::SessionConfig)
//! for each interval. Timing stays in the interval timer; this module only
//! decides what comes next and keeps the per-set log.

mod plan;
mod run;

pub use plan::{PlannedExercise, WorkoutPlan};
pub use run::{ExerciseSummary, RunStep, SetRecord, WorkoutRun, WorkoutSummary};
