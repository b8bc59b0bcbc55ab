use super::demand::DemandMetrics;
use super::supply::SupplyMetrics;
use serde::Serialize;

/// Divides unless the denominator is zero, non-finite or absent. An absent
/// numerator also yields an absent result.
pub fn safe_div(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    match (numerator, denominator) {
        (Some(numerator), Some(denominator)) if denominator != 0.0 && denominator.is_finite() => {
            Some(numerator / denominator)
        }
        _ => None,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DerivedMetrics {
    pub user_to_expert_ratio: Option<f64>,
    pub expert_utilization: Option<f64>,
    pub supply_minutes: Option<f64>,
    pub coverage_rate: Option<f64>,
}

impl DerivedMetrics {
    pub fn derive(demand: Option<&DemandMetrics>, supply: Option<&SupplyMetrics>) -> Self {
        let active_users = demand.map(|demand| demand.active_users as f64);
        let total_session_minutes = demand.map(|demand| demand.total_session_minutes);
        let active_experts = supply.map(|supply| supply.active_experts as f64);
        let busy_minutes = supply.map(|supply| supply.busy_minutes);
        let worked_minutes = supply.map(|supply| supply.online_minutes + supply.busy_minutes);

        // Plain difference; may go negative when force-busy exceeds worked time.
        let supply_minutes = supply
            .map(|supply| supply.online_minutes + supply.busy_minutes - supply.force_busy_minutes);

        Self {
            user_to_expert_ratio: safe_div(active_users, active_experts),
            expert_utilization: safe_div(busy_minutes, worked_minutes),
            supply_minutes,
            coverage_rate: safe_div(supply_minutes, total_session_minutes),
        }
    }
}
