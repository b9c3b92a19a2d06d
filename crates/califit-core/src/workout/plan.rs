use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{CoreError, PlanError};
use crate::timer::DEFAULT_REST_SECS;

/// One exercise slot of a workout: how many sets, target reps, and timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedExercise {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default = "default_sets")]
    pub sets: u32,
    #[serde(default = "default_target_reps")]
    pub target_reps: u32,
    /// Seconds per set; `0` means the set is timed with a stopwatch and ended
    /// by hand.
    #[serde(default)]
    pub duration_secs: u32,
    #[serde(default = "default_rest")]
    pub rest_secs: u32,
    #[serde(default)]
    pub notes: String,
}

fn default_sets() -> u32 {
    3
}
fn default_target_reps() -> u32 {
    12
}
fn default_rest() -> u32 {
    DEFAULT_REST_SECS
}

/// An ordered list of exercises, as fetched from the backend or read from a
/// local TOML file (`[[exercise]]` tables).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutPlan {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "exercise", default)]
    pub exercises: Vec<PlannedExercise>,
}

impl WorkoutPlan {
    pub fn from_toml_str(content: &str) -> Result<Self, PlanError> {
        let plan: WorkoutPlan = toml::from_str(content)?;
        plan.validate()?;
        Ok(plan)
    }

    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_toml_str(&content)?)
    }

    pub fn validate(&self) -> Result<(), PlanError> {
        if self.exercises.is_empty() {
            return Err(PlanError::Empty(self.name.clone()));
        }
        for exercise in &self.exercises {
            if exercise.name.trim().is_empty() {
                return Err(PlanError::InvalidExercise {
                    exercise: exercise.id.clone().unwrap_or_default(),
                    field: "name".into(),
                    message: "must not be empty".into(),
                });
            }
            if exercise.sets == 0 {
                return Err(PlanError::InvalidExercise {
                    exercise: exercise.name.clone(),
                    field: "sets".into(),
                    message: "must be at least 1".into(),
                });
            }
        }
        Ok(())
    }

    pub fn total_sets(&self) -> u32 {
        self.exercises.iter().map(|e| e.sets).sum()
    }

    /// Rough length in seconds, counting stopwatch sets as zero.
    pub fn planned_secs(&self) -> u64 {
        self.exercises
            .iter()
            .map(|e| e.sets as u64 * (e.duration_secs as u64 + e.rest_secs as u64))
            .sum()
    }
}
