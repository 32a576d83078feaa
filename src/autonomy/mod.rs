//! Autonomous path following.
//!
//! A two-state machine: **Manual**, where the external control layer
//! moves the tag, and **Following**, where the controller drives the tag
//! along the ingested path set and manual movement is suppressed before
//! it can touch the tag. Exactly one of the two may move the tag on any
//! given tick.
//!
//! Engaging Following snaps the tag once onto the sampled point closest
//! to the reference anchor (anchor #1 by construction, not the nearest
//! anchor overall). From there the controller walks the polyline in
//! point order at a bounded step per tick; closed shapes loop past the
//! seam, open shapes halt at their final point while staying in
//! Following.

use serde::{Deserialize, Serialize};

use crate::core::Point2;
use crate::path::PathLibrary;

/// Who is allowed to move the tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DriveMode {
    /// The external control layer owns the tag position.
    #[default]
    Manual,
    /// The controller drives the tag along the path set.
    Following,
}

/// Configuration for autonomous traversal.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct AutonomyConfig {
    /// Maximum distance the tag advances along the path per tick (meters)
    #[serde(default = "default_step_m")]
    pub step_m: f32,
}

impl Default for AutonomyConfig {
    fn default() -> Self {
        Self {
            step_m: default_step_m(),
        }
    }
}

fn default_step_m() -> f32 {
    0.1
}

/// Position along the sampled path set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct PathCursor {
    shape: usize,
    index: usize,
}

/// The Manual/Following state machine.
#[derive(Clone, Debug)]
pub struct AutonomyController {
    config: AutonomyConfig,
    mode: DriveMode,
    cursor: Option<PathCursor>,
}

impl AutonomyController {
    /// Create a controller in Manual mode.
    pub fn new(config: AutonomyConfig) -> Self {
        Self {
            config,
            mode: DriveMode::Manual,
            cursor: None,
        }
    }

    /// Current drive mode.
    #[inline]
    pub fn mode(&self) -> DriveMode {
        self.mode
    }

    /// Whether the controller currently owns the tag.
    #[inline]
    pub fn is_following(&self) -> bool {
        self.mode == DriveMode::Following
    }

    /// Enter Following and snap onto the path set.
    ///
    /// Scans every sampled point of every shape for the one closest to
    /// `reference` (the reference anchor's ground position) and returns
    /// it as the snap target. With an empty library the transition still
    /// happens and `None` is returned - a no-op snap, not an error.
    ///
    /// Also used to re-seat the cursor after the library is swapped
    /// while Following.
    pub fn engage(&mut self, library: &PathLibrary, reference: Point2) -> Option<Point2> {
        self.mode = DriveMode::Following;

        match library.nearest_point(reference) {
            Some(nearest) => {
                self.cursor = Some(PathCursor {
                    shape: nearest.shape,
                    index: nearest.index,
                });
                Some(nearest.position)
            }
            None => {
                self.cursor = None;
                None
            }
        }
    }

    /// Return to Manual immediately. No side effects.
    pub fn disengage(&mut self) {
        self.mode = DriveMode::Manual;
        self.cursor = None;
    }

    /// Advance the tag along the path by at most one step.
    ///
    /// Returns the new ground position. Without a valid cursor (empty
    /// library, or a stale cursor after a swap) the tag stays put.
    pub fn drive(&mut self, current: Point2, library: &PathLibrary) -> Point2 {
        if self.mode != DriveMode::Following {
            return current;
        }
        let Some(cursor) = self.cursor.as_mut() else {
            return current;
        };

        let Some(shape) = library.shapes().get(cursor.shape) else {
            return current;
        };
        let points = shape.points();
        if cursor.index >= points.len() {
            return current;
        }

        let closed = shape.is_closed();
        let mut position = current;
        let mut budget = self.config.step_m;

        // Bounded walk: consume the step budget point by point. The
        // iteration cap guards against degenerate shapes whose samples
        // all coincide.
        for _ in 0..=points.len() {
            if budget <= f32::EPSILON {
                break;
            }

            let next_index = if cursor.index + 1 < points.len() {
                cursor.index + 1
            } else if closed {
                0
            } else {
                // Open path: halt at the final point.
                break;
            };

            let target = points[next_index];
            let distance = position.distance(&target);

            if distance <= budget {
                position = target;
                cursor.index = next_index;
                budget -= distance;
            } else {
                position = position + (target - position).normalize() * budget;
                break;
            }
        }

        position
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PathShape;
    use approx::assert_relative_eq;

    fn library_of(points: &[(f32, f32)], closed: bool) -> PathLibrary {
        let points = points.iter().map(|&(x, y)| Point2::new(x, y)).collect();
        PathLibrary::from_shapes(vec![PathShape::polyline(points, closed)])
    }

    #[test]
    fn test_engage_snaps_to_reference_nearest() {
        let library = library_of(&[(1.0, 1.0), (5.0, 5.0), (9.0, 9.0)], false);
        let mut controller = AutonomyController::new(AutonomyConfig::default());

        // Reference anchor at (-10, -10): (1, 1) is the closest point.
        let snap = controller
            .engage(&library, Point2::new(-10.0, -10.0))
            .unwrap();
        assert_relative_eq!(snap.x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(snap.y, 1.0, epsilon = 1e-6);
        assert!(controller.is_following());
    }

    #[test]
    fn test_engage_with_empty_library() {
        let mut controller = AutonomyController::new(AutonomyConfig::default());
        let snap = controller.engage(&PathLibrary::empty(), Point2::ZERO);

        assert!(snap.is_none());
        assert!(controller.is_following());

        // Driving with nothing to follow leaves the tag in place.
        let position = controller.drive(Point2::new(2.0, 2.0), &PathLibrary::empty());
        assert_eq!(position, Point2::new(2.0, 2.0));
    }

    #[test]
    fn test_disengage_is_immediate() {
        let library = library_of(&[(0.0, 0.0), (1.0, 0.0)], false);
        let mut controller = AutonomyController::new(AutonomyConfig::default());

        controller.engage(&library, Point2::ZERO);
        controller.disengage();
        assert_eq!(controller.mode(), DriveMode::Manual);

        // Manual mode never drives.
        let position = controller.drive(Point2::new(3.0, 3.0), &library);
        assert_eq!(position, Point2::new(3.0, 3.0));
    }

    #[test]
    fn test_drive_steps_toward_next_point() {
        let library = library_of(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)], false);
        let mut controller = AutonomyController::new(AutonomyConfig { step_m: 0.25 });

        let snap = controller.engage(&library, Point2::ZERO).unwrap();
        let position = controller.drive(snap, &library);
        assert_relative_eq!(position.x, 0.25, epsilon = 1e-5);
        assert_relative_eq!(position.y, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_drive_crosses_waypoints_within_budget() {
        // Step larger than the first leg: the walk continues onto the
        // second leg with the leftover budget.
        let library = library_of(&[(0.0, 0.0), (0.1, 0.0), (0.1, 1.0)], false);
        let mut controller = AutonomyController::new(AutonomyConfig { step_m: 0.3 });

        let snap = controller.engage(&library, Point2::ZERO).unwrap();
        let position = controller.drive(snap, &library);
        assert_relative_eq!(position.x, 0.1, epsilon = 1e-5);
        assert_relative_eq!(position.y, 0.2, epsilon = 1e-5);
    }

    #[test]
    fn test_open_path_halts_at_end() {
        let library = library_of(&[(0.0, 0.0), (0.1, 0.0)], false);
        let mut controller = AutonomyController::new(AutonomyConfig { step_m: 1.0 });

        let snap = controller.engage(&library, Point2::ZERO).unwrap();
        let position = controller.drive(snap, &library);
        assert_relative_eq!(position.x, 0.1, epsilon = 1e-5);

        // Still Following, parked at the final point.
        let parked = controller.drive(position, &library);
        assert_eq!(parked, position);
        assert!(controller.is_following());
    }

    #[test]
    fn test_closed_path_loops() {
        let library = library_of(&[(0.0, 0.0), (0.1, 0.0), (0.1, 0.1), (0.0, 0.1)], true);
        let mut controller = AutonomyController::new(AutonomyConfig { step_m: 0.05 });

        let mut position = controller.engage(&library, Point2::ZERO).unwrap();

        // Walk far enough to wrap the 0.4m perimeter several times.
        for _ in 0..40 {
            position = controller.drive(position, &library);
        }

        // Still on the square's perimeter.
        assert!(position.x >= -1e-4 && position.x <= 0.1 + 1e-4);
        assert!(position.y >= -1e-4 && position.y <= 0.1 + 1e-4);
    }

    #[test]
    fn test_stale_cursor_after_swap_stays_put() {
        let library = library_of(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)], false);
        let mut controller = AutonomyController::new(AutonomyConfig::default());
        controller.engage(&library, Point2::new(5.0, 0.0));

        // The library shrinks underneath the cursor.
        let smaller = library_of(&[(0.0, 0.0)], false);
        let position = controller.drive(Point2::new(2.0, 0.0), &smaller);
        assert_eq!(position, Point2::new(2.0, 0.0));
    }
}
