use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::plan::{PlannedExercise, WorkoutPlan};
use crate::cue::Cue;
use crate::error::PlanError;
use crate::timer::{SessionConfig, SetLabel, TimerMode};

/// Log entry for one planned set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetRecord {
    pub completed: bool,
    pub actual_reps: u32,
    /// Active seconds the set took, set when the exercise interval ends.
    pub time_taken_secs: Option<u32>,
}

/// What a progression call moved the run to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStep {
    Rest,
    NextSet,
    NextExercise,
    Finished,
}

impl RunStep {
    /// Cue the host plays for this step.
    pub fn cue(self) -> Cue {
        match self {
            RunStep::Rest => Cue::ExerciseComplete,
            RunStep::NextSet | RunStep::NextExercise => Cue::RestComplete,
            RunStep::Finished => Cue::WorkoutComplete,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseSummary {
    pub name: String,
    pub completed_sets: u32,
    pub planned_sets: u32,
    pub reps: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSummary {
    pub name: String,
    pub duration_secs: u64,
    pub total_sets: u32,
    pub completed_sets: u32,
    pub total_reps: u32,
    pub exercises: Vec<ExerciseSummary>,
}

/// Position and per-set log of one workout in progress.
///
/// Deserializing checks the position and log against the plan, so a saved
/// run can never index out of bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "SavedRun")]
pub struct WorkoutRun {
    plan: WorkoutPlan,
    exercise_index: usize,
    set_index: usize,
    resting: bool,
    finished: bool,
    /// One row per planned exercise, one record per planned set.
    log: Vec<Vec<SetRecord>>,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct SavedRun {
    plan: WorkoutPlan,
    exercise_index: usize,
    set_index: usize,
    resting: bool,
    finished: bool,
    log: Vec<Vec<SetRecord>>,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

impl TryFrom<SavedRun> for WorkoutRun {
    type Error = PlanError;

    fn try_from(saved: SavedRun) -> Result<Self, Self::Error> {
        saved.plan.validate()?;
        let exercises = &saved.plan.exercises;
        if saved.log.len() != exercises.len() {
            return Err(PlanError::InconsistentRun(format!(
                "log has {} exercises, plan has {}",
                saved.log.len(),
                exercises.len()
            )));
        }
        if let Some((exercise, records)) = exercises
            .iter()
            .zip(&saved.log)
            .find(|(e, records)| records.len() != e.sets as usize)
        {
            return Err(PlanError::InconsistentRun(format!(
                "'{}' logs {} sets, plan has {}",
                exercise.name,
                records.len(),
                exercise.sets
            )));
        }
        let sets = exercises
            .get(saved.exercise_index)
            .map(|e| e.sets as usize)
            .ok_or_else(|| {
                PlanError::InconsistentRun(format!(
                    "exercise index {} out of range",
                    saved.exercise_index
                ))
            })?;
        if saved.set_index >= sets {
            return Err(PlanError::InconsistentRun(format!(
                "set index {} out of range",
                saved.set_index
            )));
        }
        Ok(Self {
            plan: saved.plan,
            exercise_index: saved.exercise_index,
            set_index: saved.set_index,
            resting: saved.resting,
            finished: saved.finished,
            log: saved.log,
            started_at: saved.started_at,
            finished_at: saved.finished_at,
        })
    }
}

impl WorkoutRun {
    pub fn new(plan: WorkoutPlan, started_at: DateTime<Utc>) -> Result<Self, PlanError> {
        plan.validate()?;
        let log = plan
            .exercises
            .iter()
            .map(|e| {
                vec![
                    SetRecord {
                        completed: false,
                        actual_reps: e.target_reps,
                        time_taken_secs: None,
                    };
                    e.sets as usize
                ]
            })
            .collect();
        Ok(Self {
            plan,
            exercise_index: 0,
            set_index: 0,
            resting: false,
            finished: false,
            log,
            started_at,
            finished_at: None,
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn plan(&self) -> &WorkoutPlan {
        &self.plan
    }

    pub fn current_exercise(&self) -> &PlannedExercise {
        &self.plan.exercises[self.exercise_index]
    }

    /// 1-based set number within the current exercise.
    pub fn set_number(&self) -> u32 {
        self.set_index as u32 + 1
    }

    pub fn is_resting(&self) -> bool {
        self.resting
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn current_record(&self) -> &SetRecord {
        &self.log[self.exercise_index][self.set_index]
    }

    pub fn completed_sets(&self) -> u32 {
        self.log
            .iter()
            .flatten()
            .filter(|r| r.completed)
            .count() as u32
    }

    /// 0.0 .. 100.0 share of planned sets completed.
    pub fn progress_pct(&self) -> f64 {
        let total = self.plan.total_sets();
        if total == 0 {
            return 0.0;
        }
        self.completed_sets() as f64 / total as f64 * 100.0
    }

    /// Whole seconds since the run started, frozen once finished.
    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> u64 {
        let end = self.finished_at.unwrap_or(now);
        (end - self.started_at).num_seconds().max(0) as u64
    }

    fn label(&self) -> SetLabel {
        let exercise = self.current_exercise();
        SetLabel {
            exercise_name: exercise.name.clone(),
            set_number: self.set_number(),
            total_sets: exercise.sets,
        }
    }

    /// Session config for the interval the run is currently in.
    pub fn current_session(&self) -> SessionConfig {
        if self.finished {
            return SessionConfig::complete();
        }
        let exercise = self.current_exercise();
        let session = if self.resting {
            SessionConfig::rest(exercise.rest_secs)
        } else {
            SessionConfig {
                rest_duration_secs: exercise.rest_secs,
                ..SessionConfig::exercise(exercise.duration_secs)
            }
        };
        session.with_label(self.label())
    }

    pub fn current_mode(&self) -> TimerMode {
        self.current_session().mode
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// The exercise interval ended with `displayed_secs` on the timer; move
    /// to rest. Count-down sets log the configured length minus what was
    /// left, stopwatch sets log the elapsed value.
    pub fn finish_exercise(&mut self, displayed_secs: i64) -> Option<RunStep> {
        if self.finished || self.resting {
            return None;
        }
        let duration = self.current_exercise().duration_secs as i64;
        let taken = if duration == 0 {
            displayed_secs.max(0)
        } else {
            (duration - displayed_secs).clamp(0, duration)
        };
        self.log[self.exercise_index][self.set_index].time_taken_secs = u32::try_from(taken).ok();
        self.resting = true;
        Some(RunStep::Rest)
    }

    /// The rest interval ended; close the set and advance.
    pub fn finish_rest(&mut self, now: DateTime<Utc>) -> Option<RunStep> {
        if self.finished || !self.resting {
            return None;
        }
        self.log[self.exercise_index][self.set_index].completed = true;
        self.resting = false;

        let sets = self.current_exercise().sets as usize;
        let step = if self.set_index + 1 < sets {
            self.set_index += 1;
            RunStep::NextSet
        } else if self.exercise_index + 1 < self.plan.exercises.len() {
            self.exercise_index += 1;
            self.set_index = 0;
            RunStep::NextExercise
        } else {
            self.finished = true;
            self.finished_at = Some(now);
            RunStep::Finished
        };
        Some(step)
    }

    /// Adjust the reps logged for the current set, never below zero.
    pub fn adjust_reps(&mut self, delta: i32) -> u32 {
        let record = &mut self.log[self.exercise_index][self.set_index];
        record.actual_reps = record.actual_reps.saturating_add_signed(delta);
        record.actual_reps
    }

    pub fn set_reps(&mut self, reps: u32) {
        self.log[self.exercise_index][self.set_index].actual_reps = reps;
    }

    pub fn summary(&self, now: DateTime<Utc>) -> WorkoutSummary {
        let exercises: Vec<ExerciseSummary> = self
            .plan
            .exercises
            .iter()
            .zip(&self.log)
            .map(|(exercise, records)| {
                let done: Vec<&SetRecord> = records.iter().filter(|r| r.completed).collect();
                ExerciseSummary {
                    name: exercise.name.clone(),
                    completed_sets: done.len() as u32,
                    planned_sets: exercise.sets,
                    reps: done.iter().map(|r| r.actual_reps).collect(),
                }
            })
            .collect();
        WorkoutSummary {
            name: self.plan.name.clone(),
            duration_secs: self.elapsed_secs(now),
            total_sets: self.plan.total_sets(),
            completed_sets: self.completed_sets(),
            total_reps: exercises.iter().flat_map(|e| e.reps.iter()).sum(),
            exercises,
        }
    }
}
