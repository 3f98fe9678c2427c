use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::GameError;

/// Configuration for the game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Number of grid rows
    pub rows: usize,
    /// Number of grid columns
    pub cols: usize,
    /// Spacing between adjacent cells, added to every slide offset
    pub gap: u16,

    // Input
    /// Leading-edge throttle window for keyboard moves, in milliseconds
    pub input_throttle_ms: u64,
    /// Displacement a swipe must cover before it resolves to a direction
    pub swipe_threshold: f32,

    /// Duration of a single tile transition, in milliseconds
    pub animation_ms: u64,
    /// Seed for the spawn random source; entropy-seeded when absent
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rows: 4,
            cols: 4,
            gap: 8,
            input_throttle_ms: 200,
            swipe_threshold: 50.0,
            animation_ms: 100,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with a custom grid size
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            ..Default::default()
        }
    }

    /// Load a configuration from a TOML file; missing keys take their defaults
    pub fn from_toml_file(path: &Path) -> Result<Self, GameError> {
        let text = std::fs::read_to_string(path).map_err(|source| GameError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: GameConfig = toml::from_str(&text).map_err(|source| GameError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn input_throttle(&self) -> Duration {
        Duration::from_millis(self.input_throttle_ms)
    }

    pub fn animation_duration(&self) -> Duration {
        Duration::from_millis(self.animation_ms)
    }

    /// Check that every parameter is in range
    pub fn validate(&self) -> Result<(), GameError> {
        if self.rows == 0 {
            return Err(GameError::InvalidConfig(
                "rows must be at least 1".to_string(),
            ));
        }

        if self.cols == 0 {
            return Err(GameError::InvalidConfig(
                "cols must be at least 1".to_string(),
            ));
        }

        if self.input_throttle_ms == 0 {
            return Err(GameError::InvalidConfig(
                "input_throttle_ms must be at least 1".to_string(),
            ));
        }

        if !self.swipe_threshold.is_finite() || self.swipe_threshold <= 0.0 {
            return Err(GameError::InvalidConfig(format!(
                "swipe_threshold must be positive, got {}",
                self.swipe_threshold
            )));
        }

        Ok(())
    }
}
