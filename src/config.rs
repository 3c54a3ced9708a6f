//! Engine configuration.
//!
//! Loaded from a JSON file; every field has a default so partial files are
//! accepted. Command-line flags override individual fields afterwards.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Whether a human is asked before attempting a move with insufficient
/// movement points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverdrawPrompt {
    /// Ask on every attempt.
    Always,
    /// Never ask; the attempt is always made.
    Never,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Autosave every N completed turns; `None` disables autosaving.
    pub autosave_every: Option<u32>,
    pub autosave_path: PathBuf,
    /// Turns a ship spends crossing the high seas in either direction.
    pub high_seas_turns: u8,
    pub start_year: i32,
    /// First year with two turns (spring and autumn).
    pub seasonal_start_year: i32,
    pub overdraw_prompt: OverdrawPrompt,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            autosave_every: Some(10),
            autosave_path: PathBuf::from("autosave.json"),
            high_seas_turns: 3,
            start_year: 1492,
            seasonal_start_year: 1600,
            overdraw_prompt: OverdrawPrompt::Always,
        }
    }
}

impl EngineConfig {
    /// Reads and validates a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: EngineConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.high_seas_turns == 0 {
            return Err(ConfigError::Invalid("high_seas_turns must be at least 1".into()));
        }
        if self.autosave_every == Some(0) {
            return Err(ConfigError::Invalid(
                "autosave_every must be positive; use null to disable".into(),
            ));
        }
        if self.seasonal_start_year < self.start_year {
            return Err(ConfigError::Invalid(format!(
                "seasonal_start_year {} precedes start_year {}",
                self.seasonal_start_year, self.start_year
            )));
        }
        Ok(())
    }
}
