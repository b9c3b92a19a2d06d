//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Default exercise and rest durations
//! - Timer display refresh and countdown length
//! - Cue preferences (sound, vibration, per-cue sound overrides)
//!
//! Configuration is stored at `~/.config/califit/config.toml`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::cue::Cue;
use crate::error::ConfigError;
use crate::timer::{SessionConfig, TimerSettings};

/// Timer defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Seconds; `0` runs exercise sets as a stopwatch.
    #[serde(default)]
    pub exercise_duration: u32,
    #[serde(default = "default_rest_duration")]
    pub rest_duration: u32,
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default = "default_countdown_from")]
    pub countdown_from: u8,
}

/// Cue configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CuesConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub vibration: bool,
    #[serde(default = "default_tick_vibration_ms")]
    pub tick_vibration_ms: u32,
    #[serde(default = "default_final_vibration_ms")]
    pub final_vibration_ms: u32,
    /// Ring the terminal bell for cues in the CLI.
    #[serde(default = "default_true")]
    pub terminal_bell: bool,
    /// Sound file overrides keyed by cue name (e.g. `tick`, `finalTick`).
    #[serde(default)]
    pub sounds: BTreeMap<String, String>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/califit/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub cues: CuesConfig,
}

// Default functions
fn default_rest_duration() -> u32 {
    60
}
fn default_tick_interval_ms() -> u64 {
    100
}
fn default_countdown_from() -> u8 {
    3
}
fn default_true() -> bool {
    true
}
fn default_tick_vibration_ms() -> u32 {
    100
}
fn default_final_vibration_ms() -> u32 {
    200
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            exercise_duration: 0,
            rest_duration: default_rest_duration(),
            tick_interval_ms: default_tick_interval_ms(),
            countdown_from: default_countdown_from(),
        }
    }
}

impl Default for CuesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            vibration: true,
            tick_vibration_ms: default_tick_vibration_ms(),
            final_vibration_ms: default_final_vibration_ms(),
            terminal_bell: true,
            sounds: BTreeMap::new(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                // Entries of the sound override table may be created freely.
                let existing = match obj.get(part) {
                    Some(existing) => existing.clone(),
                    None if key.starts_with("cues.sounds.") => {
                        serde_json::Value::String(String::new())
                    }
                    None => return Err(unknown()),
                };

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        let n = value
                            .parse::<u64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
                        serde_json::Value::Number(n.into())
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Location of the config file inside `dir`.
    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join("config.toml")
    }

    fn path() -> Result<PathBuf, ConfigError> {
        Ok(Self::path_in(&data_dir()?))
    }

    /// Load from the data directory, writing defaults on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit file, writing defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config =
                    toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                        path: path.to_path_buf(),
                        message: e.to_string(),
                    })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the data directory.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to an explicit file.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a value in memory by dot-separated key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit the
    /// field's type.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Set a value and persist.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.set_value(key, value)?;
        self.save()
    }

    /// Reject values the timer cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timer.tick_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "timer.tick_interval_ms".into(),
                message: "must be greater than zero".into(),
            });
        }
        if self.timer.countdown_from == 0 {
            return Err(ConfigError::InvalidValue {
                key: "timer.countdown_from".into(),
                message: "must be at least 1".into(),
            });
        }
        for name in self.cues.sounds.keys() {
            name.parse::<Cue>().map_err(|message| ConfigError::InvalidValue {
                key: format!("cues.sounds.{name}"),
                message,
            })?;
        }
        Ok(())
    }

    /// Timer settings derived from this config.
    pub fn timer_settings(&self) -> TimerSettings {
        TimerSettings {
            tick_interval_ms: self.timer.tick_interval_ms,
            countdown_from: self.timer.countdown_from,
            cues_enabled: self.cues.enabled,
            vibration: self.cues.vibration,
            tick_vibration_ms: self.cues.tick_vibration_ms,
            final_vibration_ms: self.cues.final_vibration_ms,
        }
    }

    /// Default session for a standalone exercise interval.
    pub fn exercise_session(&self) -> SessionConfig {
        SessionConfig {
            rest_duration_secs: self.timer.rest_duration,
            ..SessionConfig::exercise(self.timer.exercise_duration)
        }
    }

    /// Default session for a standalone rest interval.
    pub fn rest_session(&self) -> SessionConfig {
        SessionConfig::rest(self.timer.rest_duration)
    }

    /// Sound file for a cue: the override if present, the bundled asset
    /// otherwise.
    pub fn sound_for(&self, cue: Cue) -> String {
        self.cues
            .sounds
            .iter()
            .find(|(name, _)| name.parse::<Cue>().ok() == Some(cue))
            .map(|(_, path)| path.clone())
            .unwrap_or_else(|| cue.default_asset().to_string())
    }
}
