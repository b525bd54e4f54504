//! Estimate state-conditioned place-field intensities for one session file.

use anyhow::Result;
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;

use clusterless_intensity_rs::io::{write_reports, SessionInput, StateReport};
use clusterless_intensity_rs::{estimate_all_states, EstimatorConfig};

#[derive(Parser)]
#[command(name = "conditional-intensity")]
#[command(about = "Occupancy-normalized clusterless place-field intensity per behavioral state")]
#[command(version)]
struct Args {
    /// Session JSON (trajectory, position bins, spike bins, states)
    #[arg(short, long)]
    input: PathBuf,

    /// Output file for results (pretty JSON). Defaults to stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Gaussian kernel standard deviation in position units (overrides the session file)
    #[arg(long)]
    bandwidth: Option<f64>,

    /// Time bin duration in seconds (overrides the session file)
    #[arg(long)]
    bin_duration: Option<f64>,

    /// Occupancy below which a position bin is reported as unstable
    #[arg(long, default_value_t = 1e-9)]
    min_occupancy: f64,

    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: tracing::Level,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt().with_max_level(args.log_level).with_target(false).init();

    let session = SessionInput::load(&args.input)?;
    let trajectory = session.trajectory()?;
    let position_bins = session.position_bins()?;
    let states = session.states();

    let mut config = session.config(&EstimatorConfig {
        min_occupancy: args.min_occupancy,
        ..EstimatorConfig::default()
    });
    if let Some(bandwidth) = args.bandwidth {
        config.bandwidth = bandwidth;
    }
    if let Some(bin_duration) = args.bin_duration {
        config.bin_duration = bin_duration;
    }
    config.validate()?;

    tracing::info!(
        "Processing {}: {} time bins × {} channels, {} spikes, {} states",
        args.input.display(),
        trajectory.nrows(),
        trajectory.ncols(),
        session.spike_bin_indices.len(),
        states.len()
    );

    let results = estimate_all_states(
        trajectory.view(),
        &session.spike_bin_indices,
        &states,
        position_bins.view(),
        &config,
    );

    let reports: Vec<StateReport> = session
        .states
        .iter()
        .zip(&results)
        .map(|(state, result)| {
            if let Err(e) = result {
                tracing::warn!("state '{}': {e}", state.name);
            }
            StateReport::new(&state.name, result)
        })
        .collect();

    match &args.output {
        Some(path) => {
            let mut writer = std::io::BufWriter::new(std::fs::File::create(path)?);
            write_reports(&mut writer, &reports)?;
            writer.flush()?;
            tracing::info!("Written → {}", path.display());
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            write_reports(&mut handle, &reports)?;
            writeln!(handle)?;
        }
    }

    tracing::info!("Finished processing");
    Ok(())
}
