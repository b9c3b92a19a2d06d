mod config;

pub use config::{Config, CuesConfig, TimerConfig};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the Califit data directory, creating it if needed.
///
/// `CALIFIT_HOME` overrides the location outright. Otherwise it is
/// `~/.config/califit`, or `~/.config/califit-dev` when `CALIFIT_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("CALIFIT_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("CALIFIT_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("califit-dev")
            } else {
                base_dir.join("califit")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|source| ConfigError::DataDir {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}
