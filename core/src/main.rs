use clap::Parser;
use log::info;
use std::path::PathBuf;

use kinetrace::analysis::{AnalysisConfig, run_analysis};
use kinetrace::records::{RawRecord, RecordUnits, VelocityChannel};

/// Offline analysis of a recorded telemetry session: merges vehicle and
/// ground-station logs, scores constant-velocity predictions in a local ENU
/// frame, and computes the spectrum of a velocity channel.
#[derive(Parser, Debug)]
#[command(name = "kinetrace", version, about)]
struct Cli {
    /// CSV log recorded by the vehicle
    #[arg(long)]
    vehicle: PathBuf,
    /// CSV log recorded by the ground station
    #[arg(long)]
    ground: PathBuf,
    /// Directory the result CSV files are written to
    #[arg(long, default_value = "analysis")]
    output: PathBuf,
    /// Velocity channel for the spectral analysis (east, north, or up)
    #[arg(long, default_value = "east")]
    channel: VelocityChannel,
    /// Relative tolerance on sampling-interval spread for the spectrum
    #[arg(long, default_value_t = kinetrace::spectrum::DEFAULT_UNIFORMITY_TOLERANCE)]
    tolerance: f64,
    /// Scale factor from the logs' raw time unit to seconds
    #[arg(long, default_value_t = 1e-3)]
    time_scale: f64,
    /// Scale factor from the logs' raw velocity unit to m/s
    #[arg(long, default_value_t = 1.0)]
    velocity_scale: f64,
    /// Also print the error summary in centimeters
    #[arg(long)]
    centimeters: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let vehicle = RawRecord::from_csv(&cli.vehicle)?;
    let ground = RawRecord::from_csv(&cli.ground)?;
    info!(
        "loaded {} vehicle rows and {} ground-station rows",
        vehicle.len(),
        ground.len()
    );

    let config = AnalysisConfig {
        units: RecordUnits {
            time_scale: cli.time_scale,
            velocity_scale: cli.velocity_scale,
            ..RecordUnits::default()
        },
        channel: cli.channel,
        spectral_tolerance: cli.tolerance,
        session_epoch: None,
    };
    let report = run_analysis(&vehicle, &ground, &config)?;

    println!(
        "merged {} records over {:.3} s ({} malformed rows dropped)",
        report.trace.len(),
        report.trace.duration(),
        report.merge_report.dropped_total()
    );
    println!(
        "prediction error over {} pairs: mean {:.3} m, rms {:.3} m, p95 {:.3} m, max {:.3} m",
        report.errors.len(),
        report.errors.mean(),
        report.errors.rms(),
        report.errors.percentile(95.0),
        report.errors.max()
    );
    if cli.centimeters {
        println!(
            "prediction error: mean {:.1} cm, rms {:.1} cm",
            report.errors.mean() * 100.0,
            report.errors.rms() * 100.0
        );
    }
    if let Some(peak) = report.spectrum.dominant_frequency(false) {
        println!(
            "dominant {} velocity frequency: {:.3} Hz (magnitude {:.3} m/s)",
            cli.channel, peak.frequency_hz, peak.magnitude
        );
    }

    std::fs::create_dir_all(&cli.output)?;
    let predictions_path = cli.output.join("predictions.csv");
    let spectrum_path = cli.output.join("spectrum.csv");
    report.predictions_to_csv(&predictions_path)?;
    report.spectrum_to_csv(&spectrum_path)?;
    println!(
        "wrote {} and {}",
        predictions_path.display(),
        spectrum_path.display()
    );
    Ok(())
}
