//! Per-anchor range derivation.
//!
//! Ranges model a planar time-of-flight measurement: the scalar
//! distance between the tag and each anchor in the ground plane, with
//! the altitude axis excluded. Everything here is a pure function of
//! the current positions and is recomputed every tick; the rendering
//! layer owns any buffer reuse.

use serde::{Deserialize, Serialize};

use crate::core::{AnchorSet, Point2, Point3};

/// Default number of segments when expanding a range into a circle
/// polyline.
pub const RANGE_CIRCLE_SEGMENTS: usize = 64;

/// The derived range for one anchor.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnchorRange {
    /// Anchor this range was measured against
    pub anchor_id: u8,
    /// Ground-plane distance from the tag to the anchor, in meters
    pub range: f32,
}

/// Compute the ground-plane range to every anchor in the set.
pub fn compute_ranges(tag: Point3, anchors: &AnchorSet) -> Vec<AnchorRange> {
    anchors
        .iter()
        .map(|anchor| AnchorRange {
            anchor_id: anchor.id,
            range: tag.ground_distance(&anchor.position),
        })
        .collect()
}

/// Expand a range into a closed circle polyline around the anchor.
///
/// Returns `segments` evenly spaced points; the loop closes back to the
/// first point implicitly.
pub fn range_circle(center: Point2, radius: f32, segments: usize) -> Vec<Point2> {
    (0..segments)
        .map(|i| {
            let theta = (i as f32 / segments as f32) * std::f32::consts::TAU;
            Point2::new(
                center.x + radius * theta.cos(),
                center.y + radius * theta.sin(),
            )
        })
        .collect()
}
