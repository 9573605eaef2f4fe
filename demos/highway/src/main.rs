//! highway — one platoon overtaking a slow truck on a two-lane freeway.
//!
//! ```text
//! cargo run -p highway -- [params.json] [output-dir]
//! RUST_LOG=pt_platoon=debug cargo run -p highway
//! ```

mod freeway;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pt_core::{OvertakingParams, VehicleId};
use pt_output::{CsvWriter, PlatoonOutputObserver};
use pt_platoon::PlatoonBuilder;
use pt_traffic::VehicleSample;
use pt_vehicle::{MetricKey, MetricValue};

use freeway::Freeway;

// ── Constants ─────────────────────────────────────────────────────────────────

const MEMBERS:       usize = 4;
const DESIRED_SPEED: f64   = 30.55;
const TRUCK_SPEED:   f64   = 22.2;
/// Truck rear this far ahead of the leader's front bumper (m).
const TRUCK_GAP:     f64   = 120.0;
const MAX_STEPS:     u64   = 30_000;
const TRUCK:         VehicleId = VehicleId(1_000);

fn load_params(path: Option<&Path>) -> Result<OvertakingParams> {
    let Some(path) = path else {
        return Ok(OvertakingParams::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading params from {}", path.display()))?;
    let params: OvertakingParams = serde_json::from_str(&text)
        .with_context(|| format!("parsing params in {}", path.display()))?;
    params.validate()?;
    Ok(params)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("highway=info,pt_platoon=info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let params_path = args.next().map(PathBuf::from);
    let out_dir = args.next().map_or_else(|| PathBuf::from("output/highway"), PathBuf::from);

    let params = load_params(params_path.as_deref())?;
    info!(
        delay = params.mean_msg_delay_steps,
        max_timer = params.max_timer,
        min_backoff = params.min_backoff,
        max_backoff = params.max_backoff,
        "parameters loaded"
    );

    // 1. Platoon and start formation.
    let (mut platoon, formation) = PlatoonBuilder::new(params.clone())
        .members(MEMBERS)
        .desired_speed(DESIRED_SPEED)
        .route("freeway")
        .build()?;

    // 2. Road: formation in lane 0, the truck ahead of it.
    let mut road = Freeway::new(params.lane_width, params.step_length_secs);
    for slot in &formation.slots {
        road.insert(slot.id, VehicleSample::new(slot.x, slot.lane, slot.speed).with_length(slot.length));
    }
    let leader_x = formation.leader_position().unwrap_or_default();
    let truck_length = params.truck_max_length;
    road.insert(
        TRUCK,
        VehicleSample::new(leader_x + TRUCK_GAP + truck_length, 0, TRUCK_SPEED)
            .with_length(truck_length)
            .with_max_accel(1.0),
    );
    info!(
        members = MEMBERS,
        route = %formation.route,
        leader_x,
        "platoon inserted behind truck"
    );

    // 3. Output.
    let writer = CsvWriter::new(&out_dir)?;
    let mut obs = PlatoonOutputObserver::new(writer);

    // 4. Run until one overtaking cycle completes.
    let t0 = Instant::now();
    let mut steps = 0;
    while steps < MAX_STEPS && !platoon.did_overtake() {
        platoon.tick(&mut road.road, &mut obs);
        road.advance();
        steps += 1;
    }
    platoon.finish(&mut obs);
    let elapsed = t0.elapsed();

    if let Some(e) = obs.take_error() {
        warn!("output error: {e}");
    }
    if !platoon.did_overtake() {
        warn!(steps, "no overtaking cycle completed before the step cap");
    }

    // 5. Summary.
    println!("=== highway — cooperative platoon overtaking ===");
    println!(
        "{} steps ({}) in {:.3} s, overtaking complete: {}",
        steps,
        road.clock,
        elapsed.as_secs_f64(),
        platoon.did_overtake()
    );
    println!(
        "messages sent: {}  still queued: {}",
        platoon.c2x().delays().len(),
        platoon.c2x().len()
    );
    println!();

    println!("{:<14} {:<8} {:<10} {:<10} {:<12}", "Vehicle", "States", "Lanes", "Speed min", "Overtaking");
    println!("{}", "-".repeat(58));
    let lanes = platoon.metrics_for(MetricKey::LanesVisited);
    let times = platoon.metrics_for(MetricKey::OvertakingTimes);
    for ((id, record), ((_, lane_value), (_, time_value))) in
        platoon.records().into_iter().zip(lanes.into_iter().zip(times))
    {
        let lanes = match lane_value {
            MetricValue::Lanes(l) => l.iter().map(i32::to_string).collect::<Vec<_>>().join(">"),
            _ => String::new(),
        };
        let ot = match time_value {
            MetricValue::Durations(d) => d.iter().map(|s| format!("{s:.2}s")).collect::<Vec<_>>().join(","),
            _ => String::new(),
        };
        println!(
            "{:<14} {:<8} {:<10} {:<10.2} {:<12}",
            id.to_string(),
            record.states.len(),
            lanes,
            record.speed_min,
            ot
        );
    }
    println!();
    println!("output written to {}", out_dir.display());

    Ok(())
}
