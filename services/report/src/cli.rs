use crate::commands::{run_build, run_inspect, BuildArgs, InspectArgs};
use clap::{Parser, Subcommand};
use marketplace_hourly::config::AppConfig;
use marketplace_hourly::error::AppError;
use marketplace_hourly::telemetry;

#[derive(Parser, Debug)]
#[command(
    name = "marketplace-hourly",
    about = "Aggregate marketplace chat demand and expert supply into an hourly health report",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build hourly_data.csv from the logs in the data directory (default command)
    Build(BuildArgs),
    /// Report the detected cutoff and partition sizes without writing output
    Inspect(InspectArgs),
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Build(BuildArgs::default()));

    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    match command {
        Command::Build(args) => run_build(config, args),
        Command::Inspect(args) => run_inspect(config, args),
    }
}
