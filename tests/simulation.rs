//! End-to-end tick loop properties.

use approx::assert_relative_eq;
use lakshya_sim::io::Scenario;
use lakshya_sim::{Point3, SimConfig, SimulationState, TickInput};

fn move_input(dx: f32, dy: f32) -> TickInput {
    TickInput {
        movement: Some(Point3::new(dx, dy, 0.0)),
        ..Default::default()
    }
}

#[test]
fn local_position_matches_absolute_minus_origin_for_any_reset_history() {
    let mut sim = SimulationState::new(SimConfig::default());
    let mut origin = Point3::ZERO;

    let steps: &[(f32, f32, bool)] = &[
        (0.1, 0.0, false),
        (0.1, 0.2, false),
        (-0.3, 0.1, true),
        (0.0, 0.0, false),
        (0.5, -0.5, false),
        (0.0, 0.1, true),
        (0.2, 0.2, false),
    ];

    for &(dx, dy, reset) in steps {
        let out = sim.tick(&TickInput {
            movement: Some(Point3::new(dx, dy, 0.0)),
            reset_imu: reset,
            ..Default::default()
        });

        if reset {
            origin = out.absolute;
        }

        let expected = out.absolute - origin;
        assert_relative_eq!(out.local.x, expected.x, epsilon = 1e-5);
        assert_relative_eq!(out.local.y, expected.y, epsilon = 1e-5);
        assert_relative_eq!(out.local.z, expected.z, epsilon = 1e-5);
    }
}

#[test]
fn double_reset_is_indistinguishable_from_single() {
    let mut once = SimulationState::new(SimConfig::default());
    let mut twice = SimulationState::new(SimConfig::default());

    for sim in [&mut once, &mut twice] {
        sim.tick(&move_input(0.4, -0.2));
    }

    once.tick(&TickInput {
        reset_imu: true,
        ..Default::default()
    });
    for _ in 0..2 {
        twice.tick(&TickInput {
            reset_imu: true,
            ..Default::default()
        });
    }

    let a = once.tick(&move_input(0.1, 0.1));
    let b = twice.tick(&move_input(0.1, 0.1));

    assert_relative_eq!(a.local.x, b.local.x, epsilon = 1e-6);
    assert_relative_eq!(a.local.y, b.local.y, epsilon = 1e-6);
    assert_eq!(a.heading_degrees, b.heading_degrees);
}

#[test]
fn finite_differences_follow_the_position_sequence() {
    let mut sim = SimulationState::new(SimConfig::default());

    // p0=(0,0,0), p1=(1,0,0), p2=(3,0,0)
    let s0 = sim.tick(&TickInput::default());
    assert_eq!(s0.kinematics.velocity, Point3::ZERO);

    let s1 = sim.tick(&move_input(1.0, 0.0));
    assert_relative_eq!(s1.kinematics.velocity.x, 1.0, epsilon = 1e-6);

    let s2 = sim.tick(&move_input(2.0, 0.0));
    assert_relative_eq!(s2.kinematics.velocity.x, 2.0, epsilon = 1e-6);
    assert_relative_eq!(s2.kinematics.acceleration.x, 1.0, epsilon = 1e-6);
}

#[test]
fn stationary_tag_has_zero_derivatives() {
    let mut sim = SimulationState::new(SimConfig::default());

    for _ in 0..4 {
        let out = sim.tick(&TickInput::default());
        assert_eq!(out.kinematics.velocity, Point3::ZERO);
        assert_eq!(out.kinematics.acceleration, Point3::ZERO);
    }
}

#[test]
fn corner_anchor_range_uses_ground_plane_only() {
    let mut sim = SimulationState::new(SimConfig::default());

    // Climbing does not change any range: the measurement is planar.
    let grounded = sim.tick(&TickInput::default());
    let climbed = sim.tick(&TickInput {
        movement: Some(Point3::new(0.0, 0.0, 3.0)),
        ..Default::default()
    });

    for (a, b) in grounded.ranges.iter().zip(climbed.ranges.iter()) {
        assert_relative_eq!(a.range, 14.142, epsilon = 1e-2);
        assert_relative_eq!(a.range, b.range, epsilon = 1e-5);
    }
}

#[test]
fn heading_sample_flows_to_degrees_and_persists() {
    let mut sim = SimulationState::new(SimConfig::default());

    let out = sim.tick(&TickInput {
        heading_radians: Some(std::f32::consts::FRAC_PI_2),
        ..Default::default()
    });
    assert_relative_eq!(out.heading_degrees, 90.0, epsilon = 1e-3);

    // No sample: the previous heading is retained, motion or not.
    let out = sim.tick(&move_input(1.0, 1.0));
    assert_relative_eq!(out.heading_degrees, 90.0, epsilon = 1e-3);
}

#[test]
fn direction_indicator_is_independent_of_heading() {
    let mut sim = SimulationState::new(SimConfig::default());

    // Heading says +90 deg while the tag moves along -Y.
    let out = sim.tick(&TickInput {
        movement: Some(Point3::new(0.0, -1.0, 0.0)),
        heading_radians: Some(std::f32::consts::FRAC_PI_2),
        ..Default::default()
    });

    assert_relative_eq!(out.direction.y, -1.0, epsilon = 1e-5);
    assert_relative_eq!(out.heading_degrees, 90.0, epsilon = 1e-3);
}

#[test]
fn scenario_drives_the_tick_loop() {
    let yaml = r#"
name: "Out and back"
commands:
  - type: move
    dx: 0.1
    dy: 0.0
    ticks: 10
  - type: heading
    radians: 0.0
  - type: reset_imu
  - type: move
    dx: 0.0
    dy: 0.2
    ticks: 5
"#;
    let scenario = Scenario::from_yaml(yaml).unwrap();
    let mut sim = SimulationState::new(SimConfig::default());

    let mut last = None;
    for input in scenario.tick_inputs() {
        last = Some(sim.tick(&input));
    }

    let out = last.unwrap();
    assert_relative_eq!(out.absolute.x, 1.0, epsilon = 1e-5);
    assert_relative_eq!(out.absolute.y, 1.0, epsilon = 1e-5);

    // The reset happened before the northward leg.
    assert_relative_eq!(out.local.x, 0.0, epsilon = 1e-5);
    assert_relative_eq!(out.local.y, 1.0, epsilon = 1e-5);
}

#[test]
fn tag_reset_returns_to_configured_start() {
    let mut config = SimConfig::default();
    config.tag.start = Point3::new(2.0, 2.0, 0.0);
    let mut sim = SimulationState::new(config);

    sim.tick(&move_input(1.0, 1.0));
    let out = sim.tick(&TickInput {
        reset_tag: true,
        ..Default::default()
    });

    assert_relative_eq!(out.absolute.x, 2.0, epsilon = 1e-6);
    assert_relative_eq!(out.absolute.y, 2.0, epsilon = 1e-6);
}
