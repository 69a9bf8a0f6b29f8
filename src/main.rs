use anyhow::Result;
use clap::Parser;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;
use log::{info, warn, error, debug, trace};

mod arena;
mod particle_state;
mod simulation;

use simulation::ArenaSimulation;
use vecpool_common::{pool, SimulationConfig, Snapshot};

/// Command-line arguments for the arena engine
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the config.toml file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,
}

fn main() -> Result<()> {
    // Initialize the logger
    env_logger::init();
    let args = Args::parse();

    info!("Starting Bounce Arena (pooled vectors)...");

    // --- Load Configuration ---
    let config = SimulationConfig::load(&args.config)?;

    // --- Warm the coordinate pool ---
    pool::prewarm(config.pool.prewarm);

    // --- Initialize Simulation ---
    let mut sim = ArenaSimulation::new(config)?;
    info!("Arena initialized with {} particles.", sim.current_particle_count());
    debug!("Simulation Parameters: {:#?}", sim.params());
    info!("Pool after setup: {:?}", pool::stats());

    // --- Simulation Loop ---
    let total_steps = sim.params().total_steps;
    let record_interval_steps = sim.params().record_interval_steps;
    info!(
        "Recording snapshot every {} steps ({:.3} time units).",
        record_interval_steps,
        record_interval_steps as f64 * sim.params().dt
    );

    sim.record_snapshot()?;

    info!("Starting simulation loop for {} steps...", total_steps);
    let start_time = Instant::now();
    for step in 0..total_steps {
        let step_start = Instant::now();
        sim.step()?;

        if (step + 1) % record_interval_steps == 0 || step + 1 == total_steps {
            sim.record_snapshot()?;
            if let Some(last) = sim.get_recorded_snapshots().last() {
                info!(
                    "Step [{}/{}] t={:.3}: mean speed {:.3}, {} bounces, pool {:?}",
                    step + 1,
                    total_steps,
                    last.time,
                    last.mean_speed,
                    last.bounces,
                    last.pool
                );
            }
        } else {
            trace!(
                "Step [{}/{}] completed in {:.3} ms",
                step + 1,
                total_steps,
                step_start.elapsed().as_secs_f64() * 1000.0
            );
        }
    }

    let total_duration = start_time.elapsed();
    info!("Simulation finished in {:.3} seconds.", total_duration.as_secs_f64());

    // --- Save Recorded Data ---
    let output = &sim.config().output;
    if output.save_stats {
        let output_format = output.format.as_deref().unwrap_or("json");
        save_snapshots(&output.base_filename, output_format, sim.get_recorded_snapshots());
    } else {
        info!("Skipping saving snapshots as per config (save_stats is false).");
    }

    if output.save_positions {
        let filename = format!("{}_final_positions.csv", output.base_filename);
        match csv::Writer::from_path(&filename) {
            Ok(mut writer) => {
                writer.write_record(["x", "y"])?;
                for (x, y) in sim.get_results() {
                    writer.write_record(&[format!("{:.6}", x), format!("{:.6}", y)])?;
                }
                writer.flush()?;
                info!("Final positions saved to {}", filename);
            }
            Err(e) => error!("Error saving CSV file '{}': {}", filename, e),
        }
    } else {
        info!("Skipping saving final positions as per config.");
    }

    info!("Final pool state: {:?}", pool::stats());
    info!("Simulation Complete.");
    Ok(())
}

/// Writes all snapshots in the requested format. Failures are logged, not fatal.
fn save_snapshots(base_filename: &str, format: &str, snapshots: &[Snapshot]) {
    let (extension, format) = match format {
        "json" => ("json", "json"),
        "bincode" => ("bin", "bincode"),
        "messagepack" => ("msgpack", "messagepack"),
        other => {
            warn!("Unknown output format: {}. Using JSON instead.", other);
            ("json", "json")
        }
    };
    let filename = format!("{}_snapshots.{}", base_filename, extension);

    let file = match File::create(&filename) {
        Ok(file) => file,
        Err(e) => {
            error!("Error creating snapshot file '{}': {}", filename, e);
            return;
        }
    };
    let mut writer = BufWriter::new(file);

    let written = match format {
        "bincode" => bincode::serialize_into(&mut writer, snapshots).map_err(|e| e.to_string()),
        "messagepack" => rmp_serde::encode::write(&mut writer, snapshots).map_err(|e| e.to_string()),
        _ => serde_json::to_writer(&mut writer, snapshots).map_err(|e| e.to_string()),
    }
    .and_then(|()| writer.flush().map_err(|e| e.to_string()));

    match written {
        Ok(()) => info!("All {} snapshots saved to {} ({} format)", snapshots.len(), filename, format),
        Err(e) => error!("Error writing snapshots to '{}': {}", filename, e),
    }
}
