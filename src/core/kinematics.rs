//! Finite-difference kinematics.
//!
//! Derives velocity and acceleration of the tag from successive
//! absolute-position samples. The model is unit-tick: derivatives are
//! expressed per tick, with no wall-clock normalization, so the
//! surrounding loop owns the conversion to physical rates if it runs at
//! a known frequency. No smoothing is applied.

use serde::{Deserialize, Serialize};

use super::Point3;

/// Minimum speed (per tick) before the direction indicator follows the
/// velocity vector. Below this the previous direction is retained.
const MIN_DIRECTION_SPEED: f32 = 1e-3;

/// One tick's worth of derived motion state.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct KinematicSample {
    /// Absolute position this sample was taken at
    pub position: Point3,
    /// First difference of position (per tick)
    pub velocity: Point3,
    /// First difference of velocity (per tick²)
    pub acceleration: Point3,
}

/// Per-tick velocity/acceleration estimator.
///
/// Holds only the previous tick's position and velocity; everything else
/// is re-derived each call.
#[derive(Clone, Debug)]
pub struct KinematicEstimator {
    previous_position: Point3,
    previous_velocity: Point3,
}

impl KinematicEstimator {
    /// Create an estimator seeded with the tag's initial position.
    ///
    /// Seeding with the real initial position makes the first sample's
    /// velocity and acceleration (near-)zero instead of a spike from the
    /// world origin.
    pub fn new(initial: Point3) -> Self {
        Self {
            previous_position: initial,
            previous_velocity: Point3::ZERO,
        }
    }

    /// Take a sample at the current position and shift the history.
    pub fn sample(&mut self, current: Point3) -> KinematicSample {
        let velocity = current - self.previous_position;
        let acceleration = velocity - self.previous_velocity;

        self.previous_position = current;
        self.previous_velocity = velocity;

        KinematicSample {
            position: current,
            velocity,
            acceleration,
        }
    }
}

/// Direction indicator derived from the velocity vector.
///
/// Follows the normalized velocity while the tag is moving and freezes
/// at the last direction when the tag (nearly) stops. Kept separate
/// from the IMU heading sample: the two are independent outputs.
#[derive(Clone, Copy, Debug)]
pub struct DirectionIndicator {
    direction: Point3,
}

impl DirectionIndicator {
    /// Create an indicator pointing along +X.
    pub fn new() -> Self {
        Self {
            direction: Point3::new(1.0, 0.0, 0.0),
        }
    }

    /// Update from the latest velocity sample.
    pub fn update(&mut self, velocity: Point3) {
        if velocity.length() > MIN_DIRECTION_SPEED {
            self.direction = velocity.normalize();
        }
    }

    /// Current unit direction.
    #[inline]
    pub fn direction(&self) -> Point3 {
        self.direction
    }
}

impl Default for DirectionIndicator {
    fn default() -> Self {
        Self::new()
    }
}
