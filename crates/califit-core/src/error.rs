//! Core error types for califit-core.
//!
//! Timing itself never fails: invalid control calls are no-ops and cue
//! failures are swallowed. The errors here cover the edges around the timer:
//! configuration files, workout plans and cue adapters.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for califit-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Workout plan errors
    #[error("Workout plan error: {0}")]
    Plan(#[from] PlanError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The timer actor is gone (handle outlived the runner task)
    #[error("Timer runner has shut down")]
    RunnerClosed,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Data directory could not be created
    #[error("Cannot prepare data directory {path}: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Workout plan errors.
#[derive(Error, Debug)]
pub enum PlanError {
    /// Plan file could not be parsed
    #[error("Failed to parse workout plan: {0}")]
    Parse(#[from] toml::de::Error),

    /// A plan must contain at least one exercise
    #[error("Workout plan '{0}' has no exercises")]
    Empty(String),

    /// Invalid value on a planned exercise
    #[error("Invalid value for '{field}' on exercise '{exercise}': {message}")]
    InvalidExercise {
        exercise: String,
        field: String,
        message: String,
    },

    /// Saved run state does not fit its plan
    #[error("Inconsistent workout run: {0}")]
    InconsistentRun(String),
}

/// Cue dispatch failures. Never surfaced past the timer core.
#[derive(Error, Debug)]
pub enum CueError {
    /// The audio backend refused to play
    #[error("Playback of '{cue}' rejected: {message}")]
    PlaybackRejected { cue: String, message: String },

    /// The haptic backend refused the pattern
    #[error("Vibration rejected: {0}")]
    VibrationRejected(String),

    /// Output device write failed
    #[error("Cue output failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
