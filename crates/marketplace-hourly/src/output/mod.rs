use crate::pipeline::HourlyRow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const OUTPUT_FILE: &str = "hourly_data.csv";

pub const COLUMNS: [&str; 15] = [
    "hour",
    "active_users",
    "new_user_sessions",
    "returning_user_sessions",
    "chat_sessions",
    "total_session_minutes",
    "active_experts",
    "scheduled_minutes",
    "online_minutes",
    "busy_minutes",
    "force_busy_minutes",
    "user_to_expert_ratio",
    "expert_utilization",
    "supply_minutes",
    "coverage_rate",
];

const HOUR_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to encode hourly CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Writes the header and every row. Absent values become empty cells.
pub fn write_hourly_csv<W: Write>(rows: &[HourlyRow], writer: W) -> Result<(), OutputError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(COLUMNS)?;
    for row in rows {
        csv_writer.write_record(row_cells(row))?;
    }
    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Writes to a sibling temporary file and renames it into place, so a failed
/// run never leaves a truncated report behind.
pub fn write_hourly_file(path: &Path, rows: &[HourlyRow]) -> Result<(), OutputError> {
    let staging = staging_path(path);
    let io_error = |source| OutputError::Io {
        path: staging.clone(),
        source,
    };

    let result = File::create(&staging)
        .map_err(io_error)
        .and_then(|file| write_hourly_csv(rows, BufWriter::new(file)))
        .and_then(|()| {
            std::fs::rename(&staging, path).map_err(|source| OutputError::Io {
                path: path.to_path_buf(),
                source,
            })
        });

    if result.is_err() {
        discard_staging(&staging);
    } else {
        info!(path = %path.display(), rows = rows.len(), "hourly data saved");
    }
    result
}

fn discard_staging(staging: &Path) {
    match std::fs::remove_file(staging) {
        Ok(()) => {}
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => warn!(
            path = %staging.display(),
            error = %err,
            "unable to remove partial hourly report"
        ),
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| OUTPUT_FILE.into());
    name.push(".partial");
    path.with_file_name(name)
}

fn row_cells(row: &HourlyRow) -> Vec<String> {
    let demand = row.demand.as_ref();
    let supply = row.supply.as_ref();
    let derived = &row.derived;

    vec![
        row.hour.format(HOUR_FORMAT).to_string(),
        count(demand.map(|d| d.active_users)),
        count(demand.map(|d| d.new_user_sessions)),
        count(demand.map(|d| d.returning_user_sessions)),
        count(demand.map(|d| d.chat_sessions)),
        number(demand.map(|d| d.total_session_minutes)),
        count(supply.map(|s| s.active_experts)),
        number(supply.map(|s| s.scheduled_minutes)),
        number(supply.map(|s| s.online_minutes)),
        number(supply.map(|s| s.busy_minutes)),
        number(supply.map(|s| s.force_busy_minutes)),
        number(derived.user_to_expert_ratio),
        number(derived.expert_utilization),
        number(derived.supply_minutes),
        number(derived.coverage_rate),
    ]
}

fn count(value: Option<usize>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn number(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
