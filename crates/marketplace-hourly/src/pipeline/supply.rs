use super::hour::floor_to_hour;
use crate::domain::WorktimeRecord;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplyMetrics {
    pub active_experts: usize,
    pub scheduled_minutes: f64,
    pub online_minutes: f64,
    pub busy_minutes: f64,
    pub force_busy_minutes: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HourlySupply {
    pub hour: NaiveDateTime,
    pub metrics: SupplyMetrics,
}

#[derive(Default)]
struct SupplyAccumulator<'a> {
    experts: HashSet<&'a str>,
    scheduled_minutes: f64,
    online_minutes: f64,
    busy_minutes: f64,
    force_busy_minutes: f64,
}

impl<'a> SupplyAccumulator<'a> {
    fn add(&mut self, record: &'a WorktimeRecord) {
        self.experts.insert(&record.specialist_id);
        self.scheduled_minutes += record.scheduled_duration;
        self.online_minutes += record.online_worktime_duration;
        self.busy_minutes += record.busy_worktime_duration;
        self.force_busy_minutes += record.force_busy_duration;
    }

    fn finish(self) -> SupplyMetrics {
        SupplyMetrics {
            active_experts: self.experts.len(),
            scheduled_minutes: self.scheduled_minutes,
            online_minutes: self.online_minutes,
            busy_minutes: self.busy_minutes,
            force_busy_minutes: self.force_busy_minutes,
        }
    }
}

/// One entry per hour that has at least one worktime row, ascending by hour.
pub fn aggregate_supply(worktime: &[WorktimeRecord]) -> Vec<HourlySupply> {
    let mut buckets: BTreeMap<NaiveDateTime, SupplyAccumulator<'_>> = BTreeMap::new();
    for record in worktime {
        buckets
            .entry(floor_to_hour(record.event_time))
            .or_default()
            .add(record);
    }

    buckets
        .into_iter()
        .map(|(hour, bucket)| HourlySupply {
            hour,
            metrics: bucket.finish(),
        })
        .collect()
}
