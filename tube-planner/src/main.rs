use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use tube_planner::calibrate::{CalibrationConfig, Calibrator};
use tube_planner::data::Dataset;
use tube_planner::domain::{format_mmss, humanize};
use tube_planner::model::{ModelConfig, TimeModel};
use tube_planner::planner::{ModelledTimes, RouteFinder, SearchConfig, SearchMode};

/// Plan a journey across the tube network.
#[derive(Debug, PartialEq, Parser)]
#[command(name = "tube-planner", version)]
struct Args {
    /// Directory holding stations.csv, edges.csv and the model data
    #[arg(long, env = "TUBE_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// Fit per-line speed multipliers to training.csv before planning
    #[arg(long)]
    calibrate: bool,

    /// Disable the congestion factor around the hub station
    #[arg(long)]
    no_hub: bool,

    /// Start station name
    from: String,

    /// Destination station name
    to: String,

    /// Metric to minimize: stops, distance, time or transfers
    #[arg(default_value = "time")]
    mode: SearchMode,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let Dataset {
        network,
        mut lines,
        dwell,
        training,
    } = Dataset::load(&args.data_dir)?;

    let config = if args.no_hub {
        ModelConfig::default().with_hub(None)
    } else {
        ModelConfig::default()
    };
    let model = TimeModel::new(&network, &dwell, config)?;
    let finder = RouteFinder::new(&network, SearchConfig::default());

    if args.calibrate {
        if training.is_empty() {
            warn!("No training samples, skipping calibration");
        } else {
            let calibrator =
                Calibrator::new(&finder, &model, &training, CalibrationConfig::default())?;
            let report = calibrator.calibrate(&mut lines)?;
            for adjustment in &report.adjustments {
                println!(
                    "{}: {:.3} -> {:.3}",
                    adjustment.line, adjustment.before, adjustment.after
                );
            }
            println!(
                "Total squared error: {:.1} -> {:.1} ({} samples, {} skipped)",
                report.initial_loss,
                report.final_loss,
                report.samples_used,
                report.samples_skipped
            );
        }
    }

    let times = ModelledTimes::new(&model, &lines);
    let result = finder.find_route_by_name(&args.from, &args.to, args.mode, &times)?;
    println!("{}", result.journey_summary(&network));

    if let Some(route) = &result.route {
        match args.mode {
            SearchMode::Time => println!(
                "Estimated time: {} ({})",
                humanize(result.weight),
                format_mmss(result.weight)
            ),
            SearchMode::Distance => println!("Distance: {:.0} m", result.weight),
            SearchMode::Stops => println!("Stops: {}", result.weight),
            SearchMode::Transfers => println!("Transfers: {}", result.weight),
        }
        info!(
            stations = route.stations().len(),
            transfers = route.transfer_count(),
            settled = result.settled,
            "Planned route"
        );
    }

    let missing = model.missing_dwell();
    if !missing.is_empty() {
        info!(count = missing.len(), "Dwell data was missing for some stops");
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Planning failed");
            ExitCode::FAILURE
        }
    }
}
