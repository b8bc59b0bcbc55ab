use clap::Args;
use marketplace_hourly::config::AppConfig;
use marketplace_hourly::error::AppError;
use marketplace_hourly::output;
use marketplace_hourly::pipeline::{self, detect_cutoff, Partition, RunSummary};
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug, Default)]
pub(crate) struct BuildArgs {
    /// Directory holding the input logs; the report is written there too
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
    /// Print the run summary as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct InspectArgs {
    /// Directory holding the input logs
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
}

fn resolve(config: AppConfig, data_dir: Option<PathBuf>) -> Result<AppConfig, AppError> {
    match data_dir {
        Some(dir) => Ok(config.with_data_dir(dir)?),
        None => Ok(config),
    }
}

pub(crate) fn run_build(config: AppConfig, args: BuildArgs) -> Result<(), AppError> {
    let BuildArgs { data_dir, json } = args;
    let config = resolve(config, data_dir)?;
    info!(?config.environment, dir = %config.data.dir().display(), "building hourly report");

    let inputs = config.data.inputs().load()?;
    let report = pipeline::run(inputs)?;

    let output_path = config.data.output_path();
    output::write_hourly_file(&output_path, &report.rows)?;

    let summary = report.summary();
    if json {
        match serde_json::to_string_pretty(&summary) {
            Ok(rendered) => println!("{rendered}"),
            Err(err) => eprintln!("unable to render summary as JSON: {err}"),
        }
    } else {
        render_summary(&summary);
    }
    println!(
        "Data processing complete. Hourly data saved to '{}'.",
        output_path.display()
    );

    Ok(())
}

pub(crate) fn run_inspect(config: AppConfig, args: InspectArgs) -> Result<(), AppError> {
    let config = resolve(config, args.data_dir)?;
    let inputs = config.data.inputs().load()?;

    let cutoff = detect_cutoff(&inputs.marketing)?;
    let marketing = Partition::split(inputs.marketing, cutoff);
    let sessions = Partition::split(pipeline::dedup_sessions(inputs.chat_sessions), cutoff);
    let worktime = Partition::split(inputs.worktime, cutoff);

    println!("Cutoff week: {cutoff}");
    println!("Partition sizes (historical / predictive)");
    println!(
        "- marketing weeks: {} / {}",
        marketing.historical.len(),
        marketing.predictive.len()
    );
    println!(
        "- chat sessions: {} / {}",
        sessions.historical.len(),
        sessions.predictive.len()
    );
    println!(
        "- worktime rows: {} / {}",
        worktime.historical.len(),
        worktime.predictive.len()
    );
    if !sessions.predictive.is_empty() || !worktime.predictive.is_empty() {
        println!("Warning: event rows past the cutoff; a build would abort.");
    }

    Ok(())
}

fn render_summary(summary: &RunSummary) {
    let stats = &summary.stats;
    println!("Hourly report");
    println!("- cutoff week: {}", summary.cutoff);
    match (summary.first_hour, summary.last_hour) {
        (Some(first), Some(last)) => println!("- hours covered: {first} .. {last}"),
        _ => println!("- hours covered: none"),
    }
    println!(
        "- chat sessions: {} read, {} duplicates dropped, {} historical",
        stats.chat_sessions_read, stats.duplicate_sessions_dropped, stats.historical_sessions
    );
    println!("- worktime rows: {}", stats.worktime_rows);
    println!(
        "- marketing weeks: {} historical, {} predictive",
        stats.historical_marketing_weeks, stats.predictive_marketing_weeks
    );
    println!(
        "- hours: {} demand, {} supply, {} joined",
        stats.demand_hours, stats.supply_hours, stats.joined_hours
    );
}
