use super::row::MetricsRow;
use super::weights::WeightVector;
use super::SubScores;

const WAIT_TIME_TOLERANCE_HOURS: f64 = 20.0;
const FUEL_SAVINGS_REFERENCE: f64 = 70_000.0;
// Literal reference value; realistic abatement figures saturate at 100.
const CARBON_ABATEMENT_REFERENCE: f64 = 1.0;

const RISK_WAIT_THRESHOLD_HOURS: f64 = 10.0;
const RISK_BERTH_THRESHOLD_HOURS: f64 = 50.0;
const RISK_WAIT_PENALTY: f64 = 30.0;
const RISK_BERTH_PENALTY: f64 = 20.0;
const RISK_LATE_ARRIVAL_PENALTY: f64 = 30.0;

pub(crate) fn time_efficiency(row: &MetricsRow) -> f64 {
    let wait_component =
        (1.0 - row.wait_time_deviation.abs() / WAIT_TIME_TOLERANCE_HOURS).clamp(0.0, 1.0);
    let arrival_component = if row.arrival_accurate { 1.0 } else { 0.0 };
    (wait_component * 0.6 + arrival_component * 0.4) * 100.0
}

/// Negative savings stay negative.
pub(crate) fn cost_efficiency(row: &MetricsRow) -> f64 {
    (row.fuel_cost_saved / FUEL_SAVINGS_REFERENCE * 100.0).min(100.0)
}

pub(crate) fn environmental_score(row: &MetricsRow) -> f64 {
    (row.carbon_abated / CARBON_ABATEMENT_REFERENCE * 100.0).min(100.0)
}

pub(crate) fn risk_score(row: &MetricsRow) -> f64 {
    let mut score = 100.0;

    if row.wait_time_deviation.abs() > RISK_WAIT_THRESHOLD_HOURS {
        score -= RISK_WAIT_PENALTY;
    }
    if row.berth_duration > RISK_BERTH_THRESHOLD_HOURS {
        score -= RISK_BERTH_PENALTY;
    }
    if !row.arrival_accurate {
        score -= RISK_LATE_ARRIVAL_PENALTY;
    }

    f64::max(score, 0.0)
}

pub(crate) fn sub_scores(row: &MetricsRow) -> SubScores {
    SubScores {
        time_efficiency: time_efficiency(row),
        cost_efficiency: cost_efficiency(row),
        environmental: environmental_score(row),
        risk: risk_score(row),
    }
}

/// Weighted sum rounded to two decimals; weights are not renormalized.
pub(crate) fn composite(scores: &SubScores, weights: &WeightVector) -> f64 {
    let raw = scores.time_efficiency * weights.time
        + scores.cost_efficiency * weights.cost
        + scores.environmental * weights.environment
        + scores.risk * weights.risk;
    round_to(raw, 2)
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
