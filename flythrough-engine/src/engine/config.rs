use bevy::prelude::*;
use constants::path_settings::{
    ANCHOR_CHECK_INTERVAL_MS, FILTER_MATRIX_CHECK_INTERVAL_MS, NEAREST_SWEEP_CHECK_INTERVAL_MS,
    PATH_REBUILD_COOLDOWN_MS,
};
use constants::playback_settings::{DEFAULT_PLAYBACK_SPEED, MIN_PLAYBACK_SPEED};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::engine::search::SearchConstraints;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Timing and search settings for the path pipeline.
///
/// Every field falls back to the workspace constants, so a config file only
/// needs the values it overrides.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathingConfig {
    /// Minimum time between two path recomputations (ms).
    pub rebuild_cooldown_ms: f32,
    /// Poll interval for the filter region matrix (ms).
    pub filter_check_interval_ms: f32,
    /// Poll interval for start/end anchor positions (ms).
    pub anchor_check_interval_ms: f32,
    /// Poll interval for nearest sweep scans (ms).
    pub nearest_sweep_interval_ms: f32,
    pub search: SearchConstraints,
    /// Fly-through speed in metres per second.
    pub playback_speed: f32,
}

impl Default for PathingConfig {
    fn default() -> Self {
        Self {
            rebuild_cooldown_ms: PATH_REBUILD_COOLDOWN_MS,
            filter_check_interval_ms: FILTER_MATRIX_CHECK_INTERVAL_MS,
            anchor_check_interval_ms: ANCHOR_CHECK_INTERVAL_MS,
            nearest_sweep_interval_ms: NEAREST_SWEEP_CHECK_INTERVAL_MS,
            search: SearchConstraints::default(),
            playback_speed: DEFAULT_PLAYBACK_SPEED,
        }
    }
}

impl PathingConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&contents)?;
        info!("Loaded pathing config from {}", path.display());
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let timings = [
            ("rebuild_cooldown_ms", self.rebuild_cooldown_ms),
            ("filter_check_interval_ms", self.filter_check_interval_ms),
            ("anchor_check_interval_ms", self.anchor_check_interval_ms),
            ("nearest_sweep_interval_ms", self.nearest_sweep_interval_ms),
        ];
        for (name, value) in timings {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!("{name} must be >= 0, got {value}")));
            }
        }
        if !(self.playback_speed >= MIN_PLAYBACK_SPEED) {
            return Err(ConfigError::Invalid(format!(
                "playback_speed must be >= {MIN_PLAYBACK_SPEED}, got {}",
                self.playback_speed
            )));
        }
        if self.search.min_height > self.search.max_height {
            return Err(ConfigError::Invalid(
                "search.min_height must not exceed search.max_height".to_string(),
            ));
        }
        Ok(())
    }
}
