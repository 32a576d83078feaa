//! Point and vector types for the simulation.
//!
//! All coordinates follow the ROS REP-103 convention:
//! - **X-axis**: Forward (east across the plane)
//! - **Y-axis**: Left (north across the plane)
//! - **Z-axis**: Up (altitude, ignored by planar ranging)

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// A ground-plane point in meters.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    /// X coordinate in meters
    pub x: f32,
    /// Y coordinate in meters
    pub y: f32,
}

impl Point2 {
    /// Zero point (origin)
    pub const ZERO: Point2 = Point2 { x: 0.0, y: 0.0 };

    /// Create a new point
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    #[inline]
    pub fn distance(&self, other: &Point2) -> f32 {
        self.distance_squared(other).sqrt()
    }

    /// Squared distance (avoids sqrt)
    #[inline]
    pub fn distance_squared(&self, other: &Point2) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Length (magnitude) of this point as a vector from origin
    #[inline]
    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Normalize to unit length
    #[inline]
    pub fn normalize(&self) -> Point2 {
        let len = self.length();
        if len > 0.0 {
            Point2::new(self.x / len, self.y / len)
        } else {
            *self
        }
    }
}

impl Add for Point2 {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Point2::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Point2 {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Point2::new(self.x - other.x, self.y - other.y)
    }
}

impl Mul<f32> for Point2 {
    type Output = Self;

    #[inline]
    fn mul(self, scalar: f32) -> Self {
        Point2::new(self.x * scalar, self.y * scalar)
    }
}

/// An absolute coordinate in meters, including altitude.
///
/// The tag and the anchors live in this space. Ranging and path
/// following operate on the ground-plane projection ([`Point3::ground`]);
/// the Z component only matters for the dead-reckoning local offset.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    /// X coordinate in meters
    pub x: f32,
    /// Y coordinate in meters
    pub y: f32,
    /// Z coordinate in meters (altitude)
    pub z: f32,
}

impl Point3 {
    /// Zero point (origin)
    pub const ZERO: Point3 = Point3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Create a new point
    #[inline]
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Ground-plane projection (drops the altitude component)
    #[inline]
    pub fn ground(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }

    /// Euclidean distance to another point (all three axes)
    #[inline]
    pub fn distance(&self, other: &Point3) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Ground-plane distance to another point (altitude excluded)
    #[inline]
    pub fn ground_distance(&self, other: &Point3) -> f32 {
        self.ground().distance(&other.ground())
    }

    /// Length (magnitude) of this point as a vector from origin
    #[inline]
    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Normalize to unit length
    #[inline]
    pub fn normalize(&self) -> Point3 {
        let len = self.length();
        if len > 0.0 {
            Point3::new(self.x / len, self.y / len, self.z / len)
        } else {
            *self
        }
    }
}

impl Add for Point3 {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Point3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for Point3 {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Point3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl Mul<f32> for Point3 {
    type Output = Self;

    #[inline]
    fn mul(self, scalar: f32) -> Self {
        Point3::new(self.x * scalar, self.y * scalar, self.z * scalar)
    }
}
