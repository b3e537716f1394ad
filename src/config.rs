//! Tunable constants of the scheduling and compression engine.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use thiserror::Error;

/// Environment variable naming a JSON file with an [`EngineConfig`].
pub const CONFIG_ENV_VAR: &str = "TIMELINE_ENGINE_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error reading config: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

fn default_workdays_per_week() -> u32 {
    5
}

fn default_pass_multiplier() -> usize {
    3
}

fn default_critical_ratio() -> f64 {
    0.5
}

fn default_block_one_markers() -> Vec<String> {
    ["Phase 1", "Preparation", "Kick-off"]
        .into_iter()
        .map(String::from)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Working days that make up one duration week, counted from Monday.
    /// Also sets the scheduling calendar's working week (5 is Mon-Fri).
    #[serde(default = "default_workdays_per_week")]
    pub workdays_per_week: u32,
    /// The scheduler gives up after `pass_multiplier * task_count` passes.
    #[serde(default = "default_pass_multiplier")]
    pub pass_multiplier: usize,
    /// Tasks at or below this compression ratio are flagged as critically compressed.
    #[serde(default = "default_critical_ratio")]
    pub critical_ratio: f64,
    /// Phase substrings that place a task in compression block one.
    #[serde(default = "default_block_one_markers")]
    pub block_one_markers: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workdays_per_week: default_workdays_per_week(),
            pass_multiplier: default_pass_multiplier(),
            critical_ratio: default_critical_ratio(),
            block_one_markers: default_block_one_markers(),
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let config: Self = serde_json::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the file named by [`CONFIG_ENV_VAR`], or fall back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.trim().is_empty() => Self::load(path.trim()),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=7).contains(&self.workdays_per_week) {
            return Err(ConfigError::InvalidValue {
                field: "workdays_per_week",
                reason: format!("{} is not between 1 and 7", self.workdays_per_week),
            });
        }
        if self.pass_multiplier == 0 {
            return Err(ConfigError::InvalidValue {
                field: "pass_multiplier",
                reason: "must be at least 1".into(),
            });
        }
        if !self.critical_ratio.is_finite()
            || self.critical_ratio <= 0.0
            || self.critical_ratio > 1.0
        {
            return Err(ConfigError::InvalidValue {
                field: "critical_ratio",
                reason: format!("{} is not in (0, 1]", self.critical_ratio),
            });
        }
        Ok(())
    }
}
