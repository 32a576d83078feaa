//! # LakshyaSim
//!
//! Tick-driven simulation core for a mobile tag tracked on a 2D ground
//! plane by two independent pipelines:
//!
//! - **Ranging**: ground-plane distance to four fixed anchors, the
//!   planar time-of-flight model behind the range circles.
//! - **Dead reckoning**: an IMU-style tracker holding position and
//!   heading relative to a resettable origin, plus per-tick
//!   finite-difference velocity and acceleration.
//!
//! A path subsystem ingests SVG circle/path primitives, samples them
//! into drivable polylines in scene coordinates, and feeds an autonomy
//! controller that can snap the tag onto the nearest path point and
//! walk it in point order.
//!
//! The core exposes pure state and geometry only; rendering, DOM wiring
//! and keyboard capture belong to the embedding frontend.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use lakshya_sim::{SimConfig, SimulationState, TickInput};
//!
//! let mut sim = SimulationState::new(SimConfig::default());
//! sim.ingest(svg_text, None);
//!
//! let out = sim.tick(&TickInput {
//!     set_following: Some(true),
//!     ..Default::default()
//! });
//! println!("tag at {:?}, ranges {:?}", out.absolute, out.ranges);
//! ```
//!
//! ## Coordinate system
//!
//! ROS REP-103 convention throughout:
//! - X: Forward (east across the plane)
//! - Y: Left (north across the plane)
//! - Z: Up (altitude, excluded from ground-plane ranging)
//! - Angles: radians, CCW positive from +X (the IMU reports heading in
//!   degrees as part of its contract)

#![warn(missing_docs)]

// Core types
pub mod core;

// Per-anchor range derivation
pub mod ranging;

// Vector-path ingestion and storage
pub mod path;

// Autonomous path following
pub mod autonomy;

// Tick orchestration
pub mod sim;

// Runtime configuration
pub mod config;

// Scenario input for headless runs
pub mod io;

// Re-export commonly used types
pub use autonomy::{AutonomyConfig, AutonomyController, DriveMode};
pub use config::{AnchorConfig, ConfigError, SimConfig, TagConfig};
pub use core::{
    Anchor, AnchorSet, DirectionIndicator, ImuState, ImuTracker, KinematicEstimator,
    KinematicSample, Point2, Point3,
};
pub use path::{
    parse_document, parse_path_data, IngestOutcome, NearestPoint, ParseFailure, PathIngestor,
    PathLibrary, PathShape, ShapeKind, ViewBox,
};
pub use ranging::{compute_ranges, range_circle, AnchorRange, RANGE_CIRCLE_SEGMENTS};
pub use sim::{SimulationState, Tag, TickInput, TickOutput};
