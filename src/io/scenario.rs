//! Scenario YAML parsing for headless runs.
//!
//! A scenario is a named sequence of drive commands standing in for the
//! live keyboard input of the interactive frontend: each command expands
//! into one or more per-tick inputs fed to the simulation in order.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::Point3;
use crate::sim::TickInput;

/// Error type for scenario loading.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// Could not read the scenario file
    #[error("failed to read scenario file: {0}")]
    Io(#[from] std::io::Error),

    /// The file was not valid YAML for this schema
    #[error("failed to parse scenario: {0}")]
    Parse(String),
}

/// A drive command, expanded into per-tick inputs.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DriveCommand {
    /// Move in the ground plane for a number of ticks
    Move {
        /// Per-tick X delta in meters
        dx: f32,
        /// Per-tick Y delta in meters
        dy: f32,
        /// Number of ticks to hold the movement
        #[serde(default = "default_ticks")]
        ticks: u32,
    },
    /// Change altitude for a number of ticks
    Elevate {
        /// Per-tick Z delta in meters
        dz: f32,
        /// Number of ticks to hold the movement
        #[serde(default = "default_ticks")]
        ticks: u32,
    },
    /// Hold still for a number of ticks
    Stay {
        /// Number of idle ticks
        ticks: u32,
    },
    /// Supply one heading sample to the IMU
    Heading {
        /// Heading in radians, CCW positive from +X
        radians: f32,
    },
    /// Re-pin the IMU origin at the current position
    ResetImu,
    /// Return the tag to its configured start position
    ResetTag,
    /// Engage or disengage path following
    Follow {
        /// Target mode
        enabled: bool,
    },
}

impl DriveCommand {
    /// Number of ticks this command occupies.
    pub fn tick_count(&self) -> u32 {
        match self {
            DriveCommand::Move { ticks, .. } | DriveCommand::Elevate { ticks, .. } => *ticks,
            DriveCommand::Stay { ticks } => *ticks,
            _ => 1,
        }
    }
}

/// A scripted input sequence loaded from YAML.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Scenario {
    /// Human-readable scenario name
    pub name: String,

    /// Optional description
    #[serde(default)]
    pub description: String,

    /// Commands in execution order
    pub commands: Vec<DriveCommand>,
}

impl Scenario {
    /// Load a scenario from a YAML file.
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Parse from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ScenarioError> {
        serde_yaml::from_str(yaml).map_err(|e| ScenarioError::Parse(e.to_string()))
    }

    /// Total number of ticks across all commands.
    pub fn total_ticks(&self) -> u32 {
        self.commands.iter().map(|c| c.tick_count()).sum()
    }

    /// Expand the command sequence into per-tick inputs.
    pub fn tick_inputs(&self) -> Vec<TickInput> {
        let mut inputs = Vec::with_capacity(self.total_ticks() as usize);

        for command in &self.commands {
            match command {
                DriveCommand::Move { dx, dy, ticks } => {
                    for _ in 0..*ticks {
                        inputs.push(TickInput {
                            movement: Some(Point3::new(*dx, *dy, 0.0)),
                            ..Default::default()
                        });
                    }
                }
                DriveCommand::Elevate { dz, ticks } => {
                    for _ in 0..*ticks {
                        inputs.push(TickInput {
                            movement: Some(Point3::new(0.0, 0.0, *dz)),
                            ..Default::default()
                        });
                    }
                }
                DriveCommand::Stay { ticks } => {
                    for _ in 0..*ticks {
                        inputs.push(TickInput::default());
                    }
                }
                DriveCommand::Heading { radians } => {
                    inputs.push(TickInput {
                        heading_radians: Some(*radians),
                        ..Default::default()
                    });
                }
                DriveCommand::ResetImu => {
                    inputs.push(TickInput {
                        reset_imu: true,
                        ..Default::default()
                    });
                }
                DriveCommand::ResetTag => {
                    inputs.push(TickInput {
                        reset_tag: true,
                        ..Default::default()
                    });
                }
                DriveCommand::Follow { enabled } => {
                    inputs.push(TickInput {
                        set_following: Some(*enabled),
                        ..Default::default()
                    });
                }
            }
        }

        inputs
    }
}

fn default_ticks() -> u32 {
    1
}
