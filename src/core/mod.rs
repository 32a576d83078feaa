//! Core types for the simulation.
//!
//! Everything here follows the ROS REP-103 coordinate convention:
//! - **X-axis**: Forward (east across the plane)
//! - **Y-axis**: Left (north across the plane)
//! - **Z-axis**: Up (altitude)
//! - **Angles**: Radians, CCW positive from +X (the IMU surfaces its
//!   heading in degrees as part of its contract)
//!
//! ## Type categories
//!
//! - [`Point2`] / [`Point3`]: ground-plane and absolute coordinates
//! - [`Anchor`] / [`AnchorSet`]: the fixed ranging anchors
//! - [`ImuTracker`]: origin-relative dead reckoning
//! - [`KinematicEstimator`]: per-tick finite-difference motion state

mod anchor;
mod imu;
mod kinematics;
mod point;

pub use anchor::{Anchor, AnchorSet};
pub use imu::{ImuState, ImuTracker};
pub use kinematics::{DirectionIndicator, KinematicEstimator, KinematicSample};
pub use point::{Point2, Point3};
