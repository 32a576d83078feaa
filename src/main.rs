//! LakshyaSim - headless simulation runner.
//!
//! Drives the simulation core without a frontend: loads an optional
//! configuration and SVG document, expands a scenario (or a built-in
//! square walk) into per-tick inputs, and logs the derived state.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use log::{debug, info, warn};

use lakshya_sim::io::Scenario;
use lakshya_sim::{Point3, SimConfig, SimulationState, TickInput};

/// How long to wait for an initial SVG ingestion before ticking.
const INGEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Parser, Debug)]
#[command(name = "lakshya-sim", version, about = "Headless tag tracking simulation")]
struct Args {
    /// TOML configuration file (defaults apply when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// SVG document or bare path-command file to ingest at startup
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Scenario YAML driving the tag; a built-in square walk runs
    /// when omitted
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Number of ticks for the built-in walk
    #[arg(long, default_value_t = 200)]
    ticks: u32,

    /// Engage path following from the first tick
    #[arg(long)]
    follow: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            info!("loading configuration from {:?}", path);
            SimConfig::load(path)?
        }
        None => SimConfig::default(),
    };

    info!("LakshyaSim v{}", env!("CARGO_PKG_VERSION"));

    let mut sim = SimulationState::new(config);
    info!(
        "{} anchors, tag starting at {:?}",
        sim.anchors().len(),
        sim.tag_position()
    );

    if let Some(path) = &args.svg {
        info!("ingesting {:?}", path);
        let text = std::fs::read_to_string(path)?;
        sim.ingest(text, None);
        if sim.ingest_wait(INGEST_TIMEOUT) {
            info!(
                "path set ready: {} shapes, {} points",
                sim.library().shape_count(),
                sim.library().point_count()
            );
        } else {
            warn!("ingestion did not finish within {:?}", INGEST_TIMEOUT);
        }
    }

    let mut inputs = match &args.scenario {
        Some(path) => {
            let scenario = Scenario::load(path)?;
            info!(
                "scenario '{}': {} commands, {} ticks",
                scenario.name,
                scenario.commands.len(),
                scenario.total_ticks()
            );
            scenario.tick_inputs()
        }
        None => square_walk(args.ticks, sim.config().tag.speed_m_per_tick),
    };

    if args.follow {
        inputs.insert(
            0,
            TickInput {
                set_following: Some(true),
                ..Default::default()
            },
        );
    }

    run(&mut sim, &inputs);

    Ok(())
}

/// Built-in input sequence: walk a square, one leg per quarter.
fn square_walk(ticks: u32, speed: f32) -> Vec<TickInput> {
    let leg = (ticks / 4).max(1);
    let directions = [(1.0, 0.0), (0.0, 1.0), (-1.0, 0.0), (0.0, -1.0)];

    directions
        .iter()
        .flat_map(|&(dx, dy)| {
            std::iter::repeat(TickInput {
                movement: Some(Point3::new(dx * speed, dy * speed, 0.0)),
                ..Default::default()
            })
            .take(leg as usize)
        })
        .collect()
}

fn run(sim: &mut SimulationState, inputs: &[TickInput]) {
    for (i, input) in inputs.iter().enumerate() {
        let out = sim.tick(input);

        debug!(
            "tick {}: pos=({:.3}, {:.3}, {:.3}) v={:.1} mm/tick",
            i,
            out.absolute.x,
            out.absolute.y,
            out.absolute.z,
            out.kinematics.velocity.length() * 1000.0
        );

        if (i + 1) % 50 == 0 {
            let ranges: Vec<String> = out
                .ranges
                .iter()
                .map(|r| format!("r{}={:.2}m", r.anchor_id, r.range))
                .collect();
            info!(
                "tick {}: pos=({:.2}, {:.2}) local=({:.2}, {:.2}) heading={:.1} deg {} [{}]",
                i + 1,
                out.absolute.x,
                out.absolute.y,
                out.local.x,
                out.local.y,
                out.heading_degrees,
                if out.following { "following" } else { "manual" },
                ranges.join(" ")
            );
        }
    }

    let position = sim.tag_position();
    info!(
        "finished after {} ticks at ({:.3}, {:.3}, {:.3})",
        inputs.len(),
        position.x,
        position.y,
        position.z
    );
}
