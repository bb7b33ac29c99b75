//! Session configuration
//!
//! Every field has a default, so a configuration file only lists what it
//! changes:
//!
//! ```json
//! { "fixed_timestep": 0.01, "vocabulary": [{ "phrase": "go", "kind": "accelerate" }] }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use voxkart_core::{VoxError, VoxResult};
use voxkart_vehicle::{ControllerConfig, VehicleConfig};
use voxkart_voice::{CommandVocabulary, EnvelopeConfig, DEFAULT_INBOX_CAPACITY};

use crate::SessionResult;

/// Drive session configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub envelope: EnvelopeConfig,
    pub vocabulary: CommandVocabulary,
    pub controller: ControllerConfig,
    pub vehicle: VehicleConfig,
    /// Seconds per physics tick
    pub fixed_timestep: f32,
    /// Longest frame the clock accepts; longer frames are clamped
    pub max_frame_delta: f32,
    /// Seconds between `start()` and the race going live
    pub countdown_secs: f32,
    /// Phrases that may wait for the next frame
    pub inbox_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            envelope: EnvelopeConfig::default(),
            vocabulary: CommandVocabulary::default(),
            controller: ControllerConfig::default(),
            vehicle: VehicleConfig::default(),
            fixed_timestep: 0.02,
            max_frame_delta: 0.333,
            countdown_secs: 4.0,
            inbox_capacity: DEFAULT_INBOX_CAPACITY,
        }
    }
}

impl SessionConfig {
    /// Spanish phrase set
    pub fn spanish() -> Self {
        SessionConfig {
            vocabulary: CommandVocabulary::spanish(),
            ..SessionConfig::default()
        }
    }

    /// No countdown, for tests and tools that start driving immediately
    pub fn instant_start() -> Self {
        SessionConfig {
            countdown_secs: 0.0,
            ..SessionConfig::default()
        }
    }

    pub fn from_json_str(json: &str) -> SessionResult<Self> {
        let config: SessionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> SessionResult<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_pretty(&self) -> SessionResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> VoxResult<()> {
        self.envelope.validate()?;
        self.controller.validate()?;
        self.vehicle.validate()?;

        if self.vocabulary.is_empty() {
            return Err(VoxError::InvalidConfig("vocabulary is empty".to_string()));
        }
        if !self.fixed_timestep.is_finite() || self.fixed_timestep <= 0.0 {
            return Err(VoxError::InvalidTimestep(self.fixed_timestep));
        }
        if !self.max_frame_delta.is_finite() || self.max_frame_delta < self.fixed_timestep {
            return Err(VoxError::InvalidConfig(format!(
                "max_frame_delta ({}) must be at least fixed_timestep ({})",
                self.max_frame_delta, self.fixed_timestep
            )));
        }
        if !self.countdown_secs.is_finite() || self.countdown_secs < 0.0 {
            return Err(VoxError::InvalidConfig(format!(
                "countdown_secs must be finite and non-negative, got {}",
                self.countdown_secs
            )));
        }
        if self.inbox_capacity == 0 {
            return Err(VoxError::InvalidConfig(
                "inbox_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
