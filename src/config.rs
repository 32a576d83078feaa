//! Runtime configuration.
//!
//! Defaults describe the stock scene: a 20m ground plane with anchors
//! at the corners of a 10m-half-extent square and a tag moving 0.1m
//! per tick.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::autonomy::AutonomyConfig;
use crate::core::Point3;

/// Configuration loading error.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Could not read the configuration file
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The file was not valid TOML for this schema
    #[error("failed to parse config: {0}")]
    Parse(String),
}

/// Tag movement parameters.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct TagConfig {
    /// Distance the tag moves per tick of held directional input (meters)
    #[serde(default = "default_speed")]
    pub speed_m_per_tick: f32,

    /// Initial absolute position
    #[serde(default)]
    pub start: Point3,
}

impl Default for TagConfig {
    fn default() -> Self {
        Self {
            speed_m_per_tick: default_speed(),
            start: Point3::ZERO,
        }
    }
}

/// Anchor layout parameters.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct AnchorConfig {
    /// Half extent of the anchor square (meters)
    #[serde(default = "default_half_extent")]
    pub half_extent_m: f32,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            half_extent_m: default_half_extent(),
        }
    }
}

/// Top-level simulation configuration.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct SimConfig {
    /// Tag movement parameters
    #[serde(default)]
    pub tag: TagConfig,

    /// Anchor layout parameters
    #[serde(default)]
    pub anchors: AnchorConfig,

    /// Autonomous traversal parameters
    #[serde(default)]
    pub autonomy: AutonomyConfig,
}

impl SimConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

// Default value functions
fn default_speed() -> f32 {
    0.1
}
fn default_half_extent() -> f32 {
    10.0
}
