use super::demand::{DemandMetrics, HourlyDemand};
use super::metrics::DerivedMetrics;
use super::supply::{HourlySupply, SupplyMetrics};
use chrono::NaiveDateTime;
use std::collections::BTreeMap;

/// One row of the final hourly table. A side that had no rows for this hour
/// is `None`, never zero-filled.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyRow {
    pub hour: NaiveDateTime,
    pub demand: Option<DemandMetrics>,
    pub supply: Option<SupplyMetrics>,
    pub derived: DerivedMetrics,
}

impl HourlyRow {
    pub fn new(
        hour: NaiveDateTime,
        demand: Option<DemandMetrics>,
        supply: Option<SupplyMetrics>,
    ) -> Self {
        let derived = DerivedMetrics::derive(demand.as_ref(), supply.as_ref());
        Self {
            hour,
            demand,
            supply,
            derived,
        }
    }
}

/// Full outer join on `hour`, followed by metric derivation. Rows come back
/// ascending by hour.
pub fn join_hourly(demand: Vec<HourlyDemand>, supply: Vec<HourlySupply>) -> Vec<HourlyRow> {
    let mut joined: BTreeMap<NaiveDateTime, (Option<DemandMetrics>, Option<SupplyMetrics>)> =
        BTreeMap::new();

    for row in demand {
        joined.entry(row.hour).or_default().0 = Some(row.metrics);
    }
    for row in supply {
        joined.entry(row.hour).or_default().1 = Some(row.metrics);
    }

    joined
        .into_iter()
        .map(|(hour, (demand, supply))| HourlyRow::new(hour, demand, supply))
        .collect()
}
