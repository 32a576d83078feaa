//! Input plumbing for headless runs.

mod scenario;

pub use scenario::{DriveCommand, Scenario, ScenarioError};
