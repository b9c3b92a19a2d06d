//! Cue output for a terminal: the bell stands in for sound playback.
//! Haptics have no terminal equivalent and use the trait's no-op default.

use std::io::Write;

use califit_core::{Config, Cue, CueDispatcher, CueError};

pub struct TerminalCues {
    config: Config,
    bell: bool,
}

impl TerminalCues {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
            bell: config.cues.terminal_bell,
        }
    }

    /// Host-level cues (set and workout transitions) bypass the timer, so the
    /// caller decides whether they are muted.
    pub fn play_unless(&mut self, muted: bool, cue: Cue) {
        if muted {
            return;
        }
        if let Err(e) = self.play(cue) {
            tracing::warn!(%cue, error = %e, "Cue failed");
        }
    }
}

impl CueDispatcher for TerminalCues {
    fn play(&mut self, cue: Cue) -> Result<(), CueError> {
        tracing::debug!(%cue, sound = %self.config.sound_for(cue), "Playing cue");
        if self.bell {
            let mut err = std::io::stderr().lock();
            err.write_all(b"\x07")?;
            err.flush()?;
        }
        Ok(())
    }
}
