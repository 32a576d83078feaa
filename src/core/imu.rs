//! Dead-reckoning IMU tracker.
//!
//! Tracks the tag's position and heading relative to a resettable
//! origin. The local position is re-derived from the absolute position
//! on every update rather than integrated, so it cannot drift; the
//! heading comes from externally supplied samples and is never inferred
//! from motion (the direction indicator in [`crate::core::kinematics`]
//! covers the velocity direction independently).
//!
//! # Reset semantics
//!
//! `reset` pins the origin to the tag's current absolute position and
//! zeroes local position and heading. It only fires on an explicit
//! request or when the tracker is (re-)enabled, never implicitly from
//! motion, and calling it twice in a row is indistinguishable from
//! calling it once.

use serde::{Deserialize, Serialize};

use super::Point3;

/// Snapshot of the tracker state.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImuState {
    /// Origin the local frame is anchored to
    pub origin: Point3,
    /// Position relative to the origin
    pub local: Point3,
    /// Heading in degrees, CCW positive from +X
    pub heading_degrees: f32,
}

/// Origin-relative position and heading tracker.
#[derive(Clone, Debug)]
pub struct ImuTracker {
    origin: Point3,
    local: Point3,
    heading_degrees: f32,
}

impl ImuTracker {
    /// Create a tracker with its origin at the given absolute position.
    pub fn new(origin: Point3) -> Self {
        Self {
            origin,
            local: Point3::ZERO,
            heading_degrees: 0.0,
        }
    }

    /// Pin the origin to the current absolute position and zero the
    /// local position and heading.
    pub fn reset(&mut self, absolute: Point3) {
        self.origin = absolute;
        self.local = Point3::ZERO;
        self.heading_degrees = 0.0;
    }

    /// Recompute the local position from the current absolute position.
    ///
    /// A heading sample, when present, is given in radians (CCW positive
    /// from +X) and stored in degrees. Without a sample the previous
    /// heading is retained unchanged; there is no decay or drift model.
    pub fn update(&mut self, absolute: Point3, heading_radians: Option<f32>) {
        self.local = absolute - self.origin;
        if let Some(heading) = heading_radians {
            self.heading_degrees = heading.to_degrees();
        }
    }

    /// Position relative to the origin.
    #[inline]
    pub fn local_position(&self) -> Point3 {
        self.local
    }

    /// Heading in degrees, CCW positive from +X.
    #[inline]
    pub fn heading_degrees(&self) -> f32 {
        self.heading_degrees
    }

    /// The origin the local frame is anchored to.
    #[inline]
    pub fn origin(&self) -> Point3 {
        self.origin
    }

    /// Snapshot of the full tracker state.
    pub fn state(&self) -> ImuState {
        ImuState {
            origin: self.origin,
            local: self.local,
            heading_degrees: self.heading_degrees,
        }
    }
}
