//! Hourly demand/supply pipeline: cutoff detection, partitioning, the two
//! hourly aggregations, the outer join and the derived ratios.

pub mod cutoff;
pub mod demand;
pub mod hour;
pub mod join;
pub mod metrics;
pub mod partition;
pub mod supply;

pub use cutoff::detect_cutoff;
pub use demand::{aggregate_demand, dedup_sessions, DemandMetrics, HourlyDemand, SessionKind};
pub use hour::floor_to_hour;
pub use join::{join_hourly, HourlyRow};
pub use metrics::{safe_div, DerivedMetrics};
pub use partition::{Partition, Timestamped};
pub use supply::{aggregate_supply, HourlySupply, SupplyMetrics};

use crate::domain::{ChatSession, Cutoff, Dataset, MarketingRecord, WorktimeRecord};
use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{debug, info};

/// The three logs, fully loaded.
#[derive(Debug, Clone, Default)]
pub struct PipelineInputs {
    pub marketing: Vec<MarketingRecord>,
    pub chat_sessions: Vec<ChatSession>,
    pub worktime: Vec<WorktimeRecord>,
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(
        "no marketing week is missing fact spend ({weeks} weeks checked); cannot place the historical cutoff"
    )]
    UndefinedCutoff { weeks: usize },
    #[error(
        "{rows} {dataset} rows at or after cutoff {cutoff} (earliest {earliest}); input data is future-dated"
    )]
    TemporalIntegrity {
        dataset: Dataset,
        cutoff: Cutoff,
        rows: usize,
        earliest: NaiveDateTime,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    pub chat_sessions_read: usize,
    pub duplicate_sessions_dropped: usize,
    pub historical_sessions: usize,
    pub worktime_rows: usize,
    pub historical_marketing_weeks: usize,
    pub predictive_marketing_weeks: usize,
    pub demand_hours: usize,
    pub supply_hours: usize,
    pub joined_hours: usize,
}

#[derive(Debug, Clone)]
pub struct HourlyReport {
    pub cutoff: Cutoff,
    /// Ascending by hour.
    pub rows: Vec<HourlyRow>,
    /// Actualized marketing weeks before the cutoff. Nothing in the hourly
    /// table consumes them yet; they are kept for joining weekly spend
    /// against the hourly metrics.
    pub historical_marketing: Vec<MarketingRecord>,
    pub stats: PipelineStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub cutoff: Cutoff,
    pub first_hour: Option<NaiveDateTime>,
    pub last_hour: Option<NaiveDateTime>,
    #[serde(flatten)]
    pub stats: PipelineStats,
}

impl HourlyReport {
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            cutoff: self.cutoff,
            first_hour: self.rows.first().map(|row| row.hour),
            last_hour: self.rows.last().map(|row| row.hour),
            stats: self.stats.clone(),
        }
    }
}

/// Runs every stage in order. Any violated invariant aborts the whole run.
pub fn run(inputs: PipelineInputs) -> Result<HourlyReport, PipelineError> {
    let PipelineInputs {
        marketing,
        chat_sessions,
        worktime,
    } = inputs;

    let chat_sessions_read = chat_sessions.len();
    let chat_sessions = dedup_sessions(chat_sessions);
    let duplicate_sessions_dropped = chat_sessions_read - chat_sessions.len();
    debug!(duplicate_sessions_dropped, "deduplicated chat sessions");

    let cutoff = detect_cutoff(&marketing)?;
    info!(%cutoff, "detected historical cutoff");

    let marketing = Partition::split(marketing, cutoff);
    let chat_sessions = Partition::split(chat_sessions, cutoff)
        .require_historical(Dataset::ChatSessions, cutoff)?;
    let worktime =
        Partition::split(worktime, cutoff).require_historical(Dataset::Worktime, cutoff)?;

    info!(sessions = chat_sessions.len(), "aggregating chat sessions data");
    let demand = aggregate_demand(&chat_sessions);

    info!(rows = worktime.len(), "aggregating worktime data");
    let supply = aggregate_supply(&worktime);

    info!(
        demand_hours = demand.len(),
        supply_hours = supply.len(),
        "merging demand and supply data"
    );
    let demand_hours = demand.len();
    let supply_hours = supply.len();
    let rows = join_hourly(demand, supply);

    info!(hours = rows.len(), "derived hourly metrics");
    let stats = PipelineStats {
        chat_sessions_read,
        duplicate_sessions_dropped,
        historical_sessions: chat_sessions.len(),
        worktime_rows: worktime.len(),
        historical_marketing_weeks: marketing.historical.len(),
        predictive_marketing_weeks: marketing.predictive.len(),
        demand_hours,
        supply_hours,
        joined_hours: rows.len(),
    };

    Ok(HourlyReport {
        cutoff,
        rows,
        historical_marketing: marketing.historical,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn inputs() -> PipelineInputs {
        let marketing = vec![
            MarketingRecord {
                week: day(1),
                expected_spend: Some(100.0),
                fact_spend: Some(110.0),
            },
            MarketingRecord {
                week: day(8),
                expected_spend: Some(100.0),
                fact_spend: None,
            },
        ];
        let event = day(3).and_hms_opt(10, 20, 0).unwrap();
        let session = ChatSession {
            session_id: "s1".to_string(),
            user_id: "u1".to_string(),
            expert_id: "e1".to_string(),
            event_time: event,
            user_first_chat: event - Duration::days(5),
            session_duration: 12.0,
        };
        let worktime = WorktimeRecord {
            specialist_id: "x1".to_string(),
            event_time: day(3).and_hms_opt(11, 0, 0).unwrap(),
            scheduled_duration: 60.0,
            online_worktime_duration: 45.0,
            busy_worktime_duration: 15.0,
            force_busy_duration: 0.0,
        };
        PipelineInputs {
            marketing,
            chat_sessions: vec![session.clone(), session],
            worktime: vec![worktime],
        }
    }

    #[test]
    fn run_reports_stats_and_keeps_marketing_seam() {
        let report = run(inputs()).expect("pipeline succeeds");

        assert_eq!(report.cutoff.date(), day(8));
        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.historical_marketing.len(), 1);
        assert_eq!(
            report.stats,
            PipelineStats {
                chat_sessions_read: 2,
                duplicate_sessions_dropped: 1,
                historical_sessions: 1,
                worktime_rows: 1,
                historical_marketing_weeks: 1,
                predictive_marketing_weeks: 1,
                demand_hours: 1,
                supply_hours: 1,
                joined_hours: 2,
            }
        );

        let summary = report.summary();
        assert_eq!(summary.first_hour, Some(day(3).and_hms_opt(10, 0, 0).unwrap()));
        assert_eq!(summary.last_hour, Some(day(3).and_hms_opt(11, 0, 0).unwrap()));
    }

    #[test]
    fn future_chat_session_aborts_run() {
        let mut inputs = inputs();
        inputs.chat_sessions[0].event_time = day(8).and_hms_opt(0, 0, 0).unwrap();

        let error = run(inputs).expect_err("future session rejected");
        assert!(matches!(
            error,
            PipelineError::TemporalIntegrity {
                dataset: Dataset::ChatSessions,
                rows: 1,
                ..
            }
        ));
    }

    #[test]
    fn future_worktime_aborts_run() {
        let mut inputs = inputs();
        inputs.worktime[0].event_time = day(20).and_hms_opt(3, 0, 0).unwrap();

        assert!(matches!(
            run(inputs),
            Err(PipelineError::TemporalIntegrity {
                dataset: Dataset::Worktime,
                ..
            })
        ));
    }

    #[test]
    fn missing_cutoff_aborts_run() {
        let mut inputs = inputs();
        inputs.marketing[1].fact_spend = Some(95.0);

        assert!(matches!(
            run(inputs),
            Err(PipelineError::UndefinedCutoff { weeks: 2 })
        ));
    }
}
