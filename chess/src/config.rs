//! Game settings

use crate::clock::Seconds;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error loading [`GameConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid JSON or has fields of wrong types
    #[error("cannot parse config: {0}")]
    Parse(#[from] serde_json::Error),
    /// Tick interval must be positive
    #[error("tick interval must be positive")]
    ZeroTickInterval,
}

/// Settings of a single game
///
/// Missing fields take their default values, so `{}` is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Initial time of each player, in seconds
    pub initial_clock: Seconds,
    /// Interval between clock ticks, in milliseconds
    pub tick_interval_ms: u64,
}

impl GameConfig {
    pub const DEFAULT_CLOCK: Seconds = 300;
    pub const DEFAULT_TICK_MS: u64 = 1000;

    /// Parses the config from a JSON document
    pub fn from_json(s: &str) -> Result<GameConfig, ConfigError> {
        let res: GameConfig = serde_json::from_str(s)?;
        res.validate()?;
        Ok(res)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroTickInterval);
        }
        Ok(())
    }

    #[inline]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            initial_clock: Self::DEFAULT_CLOCK,
            tick_interval_ms: Self::DEFAULT_TICK_MS,
        }
    }
}
