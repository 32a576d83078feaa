//! Tick orchestration.
//!
//! [`SimulationState`] owns every piece of core state - tag, anchors,
//! trackers, path set, autonomy - and re-derives the outputs once per
//! tick. Ticks run to completion on a single thread and never overlap;
//! the only cross-thread traffic is the path ingestion channel, drained
//! at the start of each tick.
//!
//! Data flows one way per tick: the absolute tag position (from manual
//! input or the autonomy controller) feeds the kinematic estimator,
//! then the IMU tracker, then the range computation. Nothing is cached
//! across ticks beyond the previous tick's sample.

use std::time::Duration;

use log::{info, warn};

use crate::autonomy::{AutonomyController, DriveMode};
use crate::config::SimConfig;
use crate::core::{
    AnchorSet, DirectionIndicator, ImuTracker, KinematicEstimator, KinematicSample, Point2, Point3,
};
use crate::path::{IngestOutcome, PathIngestor, PathLibrary, ViewBox};
use crate::ranging::{compute_ranges, AnchorRange};

/// The mobile tag being tracked.
#[derive(Clone, Copy, Debug)]
pub struct Tag {
    /// Absolute position, written only by manual input or the autonomy
    /// controller
    pub position: Point3,
}

/// External inputs consumed by one tick.
///
/// Everything is optional; the default input is a tick where nothing
/// happens and all derived state is simply refreshed.
#[derive(Clone, Copy, Debug, Default)]
pub struct TickInput {
    /// Movement delta to apply to the tag (meters). Ignored while
    /// Following - manual input is suppressed at the source.
    pub movement: Option<Point3>,

    /// Return the tag to its configured start position. Also suppressed
    /// while Following.
    pub reset_tag: bool,

    /// Heading sample in radians, CCW positive from +X. Absent means
    /// the IMU retains its previous heading.
    pub heading_radians: Option<f32>,

    /// Re-pin the IMU origin to the tag's current absolute position.
    pub reset_imu: bool,

    /// Request a drive-mode transition.
    pub set_following: Option<bool>,
}

/// Derived state produced by one tick.
#[derive(Clone, Debug)]
pub struct TickOutput {
    /// Absolute tag position after this tick's movement
    pub absolute: Point3,
    /// IMU-relative position
    pub local: Point3,
    /// IMU heading in degrees
    pub heading_degrees: f32,
    /// Finite-difference motion state
    pub kinematics: KinematicSample,
    /// Unit direction of travel (velocity-derived)
    pub direction: Point3,
    /// Ground-plane range to every anchor
    pub ranges: Vec<AnchorRange>,
    /// Whether the controller is in Following mode
    pub following: bool,
}

/// The complete simulation core.
pub struct SimulationState {
    config: SimConfig,
    tag: Tag,
    anchors: AnchorSet,
    imu: ImuTracker,
    kinematics: KinematicEstimator,
    direction: DirectionIndicator,
    autonomy: AutonomyController,
    library: PathLibrary,
    ingestor: PathIngestor,
}

impl SimulationState {
    /// Build a simulation from configuration.
    pub fn new(config: SimConfig) -> Self {
        let start = config.tag.start;
        Self {
            tag: Tag { position: start },
            anchors: AnchorSet::square(config.anchors.half_extent_m),
            imu: ImuTracker::new(start),
            kinematics: KinematicEstimator::new(start),
            direction: DirectionIndicator::new(),
            autonomy: AutonomyController::new(config.autonomy),
            library: PathLibrary::empty(),
            ingestor: PathIngestor::new(),
            config,
        }
    }

    /// Run one simulation tick.
    pub fn tick(&mut self, input: &TickInput) -> TickOutput {
        // 1. Install any freshly parsed path set (atomic value swap).
        let mut snapped = false;
        if let Some((library, outcome)) = self.ingestor.poll() {
            snapped |= self.install_library(library, Some(&outcome));
        }

        // 2. Drive-mode transitions.
        if let Some(enable) = input.set_following {
            snapped |= self.set_following(enable);
        }

        // 3. Move the tag. Exactly one of manual input or the autonomy
        //    controller touches the position. A tick that snapped counts
        //    the snap as its movement.
        if self.autonomy.is_following() {
            if !snapped {
                let ground = self.autonomy.drive(self.tag.position.ground(), &self.library);
                self.tag.position.x = ground.x;
                self.tag.position.y = ground.y;
            }
        } else {
            if input.reset_tag {
                self.tag.position = self.config.tag.start;
            }
            if let Some(delta) = input.movement {
                self.tag.position = self.tag.position + delta;
            }
        }

        // 4. Derive motion state from the new position.
        let sample = self.kinematics.sample(self.tag.position);
        self.direction.update(sample.velocity);

        // 5. Update the IMU frame.
        if input.reset_imu {
            self.imu.reset(self.tag.position);
        }
        self.imu.update(self.tag.position, input.heading_radians);

        // 6. Ranges.
        let ranges = compute_ranges(self.tag.position, &self.anchors);

        TickOutput {
            absolute: self.tag.position,
            local: self.imu.local_position(),
            heading_degrees: self.imu.heading_degrees(),
            kinematics: sample,
            direction: self.direction.direction(),
            ranges,
            following: self.autonomy.is_following(),
        }
    }

    /// Start ingesting a document in the background. The resulting path
    /// set installs at the start of a later tick; re-requesting before
    /// then discards the in-flight parse.
    pub fn ingest(&mut self, text: String, view_box: Option<ViewBox>) {
        self.ingestor.request(text, view_box);
    }

    /// Block until the most recent ingest request lands, then install
    /// it. For headless runs and tests; the tick loop installs through
    /// [`SimulationState::tick`] instead.
    pub fn ingest_wait(&mut self, timeout: Duration) -> bool {
        match self.ingestor.wait(timeout) {
            Some((library, outcome)) => {
                self.install_library(library, Some(&outcome));
                true
            }
            None => false,
        }
    }

    /// Install a path set directly, replacing the previous one.
    ///
    /// The contract is identical regardless of how the shapes were
    /// produced (background parse, test fixture, caller-side parse).
    /// Returns whether the tag was snapped onto the new set.
    pub fn install_library(&mut self, library: PathLibrary, outcome: Option<&IngestOutcome>) -> bool {
        if let Some(outcome) = outcome {
            info!(
                "path set installed: {} shapes, {} points",
                outcome.installed,
                library.point_count()
            );
            for failure in &outcome.failures {
                warn!("primitive dropped during ingestion: {}", failure);
            }
        }

        self.library = library;

        // A swap under an engaged controller re-seats the cursor on the
        // new set.
        if self.autonomy.is_following() {
            self.snap_to_library()
        } else {
            false
        }
    }

    /// Engage or disengage Following. Returns whether a snap moved the
    /// tag.
    fn set_following(&mut self, enable: bool) -> bool {
        match (enable, self.autonomy.mode()) {
            (true, DriveMode::Manual) => self.snap_to_library(),
            (false, DriveMode::Following) => {
                self.autonomy.disengage();
                false
            }
            _ => false,
        }
    }

    /// One-time nearest-point snap relative to the reference anchor.
    fn snap_to_library(&mut self) -> bool {
        let reference = match self.anchors.reference() {
            Some(anchor) => anchor.position.ground(),
            None => Point2::ZERO,
        };

        match self.autonomy.engage(&self.library, reference) {
            Some(snap) => {
                // The snap is planar; altitude is untouched.
                self.tag.position.x = snap.x;
                self.tag.position.y = snap.y;
                true
            }
            None => false,
        }
    }

    /// Current absolute tag position.
    pub fn tag_position(&self) -> Point3 {
        self.tag.position
    }

    /// The fixed anchor set.
    pub fn anchors(&self) -> &AnchorSet {
        &self.anchors
    }

    /// The currently installed path set.
    pub fn library(&self) -> &PathLibrary {
        &self.library
    }

    /// Current drive mode.
    pub fn drive_mode(&self) -> DriveMode {
        self.autonomy.mode()
    }

    /// The configuration this simulation was built with.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PathShape;
    use approx::assert_relative_eq;

    fn sim() -> SimulationState {
        SimulationState::new(SimConfig::default())
    }

    fn move_input(dx: f32, dy: f32) -> TickInput {
        TickInput {
            movement: Some(Point3::new(dx, dy, 0.0)),
            ..Default::default()
        }
    }

    fn library_of(points: &[(f32, f32)]) -> PathLibrary {
        let points = points.iter().map(|&(x, y)| Point2::new(x, y)).collect();
        PathLibrary::from_shapes(vec![PathShape::polyline(points, false)])
    }

    #[test]
    fn test_idle_tick_reports_rest() {
        let mut sim = sim();
        let out = sim.tick(&TickInput::default());

        assert_eq!(out.absolute, Point3::ZERO);
        assert_eq!(out.kinematics.velocity, Point3::ZERO);
        assert_eq!(out.local, Point3::ZERO);
        assert_eq!(out.ranges.len(), 4);
        assert!(!out.following);
    }

    #[test]
    fn test_local_tracks_absolute_minus_origin() {
        let mut sim = sim();

        for i in 1..=5 {
            let out = sim.tick(&move_input(0.1, -0.2));
            assert_relative_eq!(out.local.x, 0.1 * i as f32, epsilon = 1e-5);
            assert_relative_eq!(out.local.y, -0.2 * i as f32, epsilon = 1e-5);
        }

        // Reset re-pins the origin at the current position.
        let out = sim.tick(&TickInput {
            reset_imu: true,
            ..Default::default()
        });
        assert_eq!(out.local, Point3::ZERO);

        let out = sim.tick(&move_input(0.3, 0.0));
        assert_relative_eq!(out.local.x, 0.3, epsilon = 1e-5);
        assert_relative_eq!(out.local.y, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_kinematic_sequence_through_ticks() {
        let mut sim = sim();

        sim.tick(&TickInput::default());
        let s1 = sim.tick(&move_input(1.0, 0.0));
        assert_relative_eq!(s1.kinematics.velocity.x, 1.0, epsilon = 1e-6);

        let s2 = sim.tick(&move_input(2.0, 0.0));
        assert_relative_eq!(s2.kinematics.velocity.x, 2.0, epsilon = 1e-6);
        assert_relative_eq!(s2.kinematics.acceleration.x, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_range_to_corner_anchor() {
        let mut sim = sim();
        let out = sim.tick(&TickInput::default());

        // Tag at origin, anchors 10m out on both ground axes.
        for range in &out.ranges {
            assert_relative_eq!(range.range, 14.142, epsilon = 1e-2);
        }
    }

    #[test]
    fn test_following_suppresses_manual_input() {
        let mut sim = sim();
        sim.install_library(library_of(&[(1.0, 1.0), (5.0, 5.0), (9.0, 9.0)]), None);

        let engaged = sim.tick(&TickInput {
            set_following: Some(true),
            ..Default::default()
        });
        assert!(engaged.following);

        let before = sim.tag_position();
        let out = sim.tick(&TickInput {
            movement: Some(Point3::new(50.0, 50.0, 0.0)),
            reset_tag: true,
            ..Default::default()
        });

        // Manual movement and reset are both suppressed; any change came
        // from the path walk, bounded by the autonomy step.
        assert!(out.absolute.distance(&before) <= sim.config().autonomy.step_m + 1e-5);
    }

    #[test]
    fn test_engage_snaps_to_anchor_one_nearest() {
        let mut sim = sim();
        sim.install_library(library_of(&[(1.0, 1.0), (5.0, 5.0), (9.0, 9.0)]), None);

        sim.tick(&TickInput {
            set_following: Some(true),
            ..Default::default()
        });

        // Anchor #1 sits at (-10, -10): the snap lands on (1, 1).
        let position = sim.tag_position();
        assert_relative_eq!(position.x, 1.0, epsilon = 1e-4);
        assert_relative_eq!(position.y, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_engage_with_empty_library_is_noop_snap() {
        let mut sim = sim();
        let before = sim.tag_position();

        let out = sim.tick(&TickInput {
            set_following: Some(true),
            ..Default::default()
        });

        assert!(out.following);
        assert_eq!(sim.tag_position(), before);
    }

    #[test]
    fn test_disengage_restores_manual_control() {
        let mut sim = sim();
        sim.install_library(library_of(&[(1.0, 1.0)]), None);

        sim.tick(&TickInput {
            set_following: Some(true),
            ..Default::default()
        });
        sim.tick(&TickInput {
            set_following: Some(false),
            ..Default::default()
        });

        let before = sim.tag_position();
        let out = sim.tick(&move_input(0.5, 0.0));
        assert_relative_eq!(out.absolute.x, before.x + 0.5, epsilon = 1e-5);
    }

    #[test]
    fn test_reingestion_replaces_whole_set() {
        let mut sim = sim();
        sim.install_library(library_of(&[(1.0, 1.0), (2.0, 2.0)]), None);
        assert_eq!(sim.library().shape_count(), 1);
        assert_eq!(sim.library().point_count(), 2);

        sim.install_library(library_of(&[(7.0, 7.0)]), None);
        assert_eq!(sim.library().point_count(), 1);

        let nearest = sim.library().nearest_point(Point2::ZERO).unwrap();
        assert_relative_eq!(nearest.position.x, 7.0, epsilon = 1e-6);
    }

    #[test]
    fn test_snap_preserves_altitude() {
        let mut sim = sim();
        sim.install_library(library_of(&[(1.0, 1.0)]), None);

        // Raise the tag, then engage.
        sim.tick(&TickInput {
            movement: Some(Point3::new(0.0, 0.0, 2.0)),
            ..Default::default()
        });
        sim.tick(&TickInput {
            set_following: Some(true),
            ..Default::default()
        });

        let position = sim.tag_position();
        assert_relative_eq!(position.z, 2.0, epsilon = 1e-5);
        assert_relative_eq!(position.x, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_async_ingest_installs_on_tick() {
        let mut sim = sim();
        sim.ingest("M0,0 L10,0 L10,10 Z".to_string(), None);

        assert!(sim.ingest_wait(Duration::from_secs(5)));
        assert_eq!(sim.library().shape_count(), 1);

        // Ticking afterwards keeps the installed set.
        sim.tick(&TickInput::default());
        assert_eq!(sim.library().shape_count(), 1);
    }
}
