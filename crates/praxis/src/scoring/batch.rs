use super::row::{MetricsRow, RejectedRow};
use super::rules::round_to;
use super::weights::WeightVector;
use super::{score, ScoredRow};
use serde::Serialize;
use std::cmp::Ordering;
use tracing::warn;

const HIGH_WAIT_THRESHOLD_HOURS: f64 = 5.0;
const LOW_PERFORMER_THRESHOLD: f64 = 50.0;
const MAX_NAMED_ENVIRONMENTAL_LEADERS: usize = 3;

/// Result of scoring a batch: valid rows in input order plus the ones skipped.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScoredBatch {
    pub scored: Vec<ScoredRow>,
    pub rejected: Vec<RejectedRow>,
}

/// Aggregates for one operator group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupComparison {
    pub key: String,
    pub vessels: usize,
    pub avg_composite: Option<f64>,
    pub avg_wait_time: Option<f64>,
    pub total_fuel_cost_saved: f64,
    pub total_carbon_abated: f64,
    pub on_time_rate: Option<f64>,
}

/// Headline figures over a set of rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub total_vessels: usize,
    pub avg_composite: Option<f64>,
    pub avg_wait_time: Option<f64>,
    pub total_fuel_cost_saved: f64,
    pub on_time_rate: Option<f64>,
}

pub(crate) fn score_all(rows: &[MetricsRow], weights: &WeightVector) -> ScoredBatch {
    let mut batch = ScoredBatch::default();

    for (index, row) in rows.iter().enumerate() {
        match score(row, weights) {
            Ok(scored) => batch.scored.push(scored),
            Err(err) => {
                warn!(index, vessel = %row.vessel, error = %err, "skipping row that cannot be scored");
                batch.rejected.push(RejectedRow {
                    index,
                    reason: err.to_string(),
                });
            }
        }
    }

    batch
}

pub(crate) fn rank(rows: &[MetricsRow], weights: &WeightVector, n: usize) -> Vec<ScoredRow> {
    let mut scored = score_all(rows, weights).scored;
    // `sort_by` is stable, so equal composites keep their input order.
    scored.sort_by(|a, b| descending(a.composite, b.composite));
    scored.truncate(n);
    scored
}

pub(crate) fn compare_groups(
    rows: &[MetricsRow],
    weights: &WeightVector,
    group_keys: &[&str],
) -> Vec<GroupComparison> {
    let scored = score_all(rows, weights).scored;

    group_keys
        .iter()
        .map(|key| {
            let members: Vec<&ScoredRow> = scored
                .iter()
                .filter(|entry| entry.row.operator.eq_ignore_ascii_case(key))
                .collect();

            GroupComparison {
                key: key.to_string(),
                vessels: members.len(),
                avg_composite: mean(members.iter().map(|entry| entry.composite))
                    .map(|value| round_to(value, 2)),
                avg_wait_time: mean(members.iter().map(|entry| entry.row.wait_time_deviation))
                    .map(|value| round_to(value, 2)),
                total_fuel_cost_saved: round_to(
                    members.iter().map(|entry| entry.row.fuel_cost_saved).sum(),
                    2,
                ),
                total_carbon_abated: round_to(
                    members.iter().map(|entry| entry.row.carbon_abated).sum(),
                    2,
                ),
                on_time_rate: on_time_rate(members.iter().map(|entry| &entry.row)),
            }
        })
        .collect()
}

pub(crate) fn recommend(rows: &[MetricsRow], weights: &WeightVector, top_n: usize) -> Vec<String> {
    let scored = score_all(rows, weights).scored;
    let mut recommendations = Vec::new();

    if let Some(avg_wait) = mean(scored.iter().map(|entry| entry.row.wait_time_deviation)) {
        if avg_wait > HIGH_WAIT_THRESHOLD_HOURS {
            recommendations.push(format!(
                "High average wait time ({avg_wait:.1}h). Consider berth scheduling optimization."
            ));
        }
    }

    let low_performers = scored
        .iter()
        .filter(|entry| entry.composite < LOW_PERFORMER_THRESHOLD)
        .count();
    if low_performers > 0 {
        recommendations.push(format!(
            "{low_performers} vessels with DIS < {LOW_PERFORMER_THRESHOLD:.0}. Review operational efficiency."
        ));
    }

    let mut by_carbon: Vec<&ScoredRow> = scored.iter().collect();
    by_carbon.sort_by(|a, b| descending(a.row.carbon_abated, b.row.carbon_abated));

    let mut leaders: Vec<&str> = Vec::new();
    for entry in by_carbon.into_iter().take(top_n) {
        if !leaders.contains(&entry.row.operator.as_str()) {
            leaders.push(entry.row.operator.as_str());
        }
    }
    leaders.truncate(MAX_NAMED_ENVIRONMENTAL_LEADERS);

    let named = if leaders.is_empty() {
        "none".to_string()
    } else {
        leaders.join(", ")
    };
    recommendations.push(format!("Top environmental performers: {named}"));

    recommendations
}

pub(crate) fn summarize(rows: &[MetricsRow], weights: &WeightVector) -> DatasetSummary {
    let scored = score_all(rows, weights).scored;

    DatasetSummary {
        total_vessels: scored.len(),
        avg_composite: mean(scored.iter().map(|entry| entry.composite))
            .map(|value| round_to(value, 2)),
        avg_wait_time: mean(scored.iter().map(|entry| entry.row.wait_time_deviation))
            .map(|value| round_to(value, 2)),
        total_fuel_cost_saved: round_to(
            scored.iter().map(|entry| entry.row.fuel_cost_saved).sum(),
            2,
        ),
        on_time_rate: on_time_rate(scored.iter().map(|entry| &entry.row)),
    }
}

fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));

    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

fn on_time_rate<'a, I>(rows: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a MetricsRow>,
{
    mean(
        rows.into_iter()
            .map(|row| if row.arrival_accurate { 1.0 } else { 0.0 }),
    )
    .map(|fraction| round_to(fraction * 100.0, 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::Strategy;

    fn row(operator: &str, vessel: &str, wait: f64, arrival: bool, carbon: f64) -> MetricsRow {
        MetricsRow {
            operator: operator.to_string(),
            vessel: vessel.to_string(),
            service: None,
            business_unit: None,
            wait_time_deviation: wait,
            arrival_accurate: arrival,
            berth_duration: 20.0,
            fuel_cost_saved: 35_000.0,
            carbon_abated: carbon,
        }
    }

    fn fleet() -> Vec<MetricsRow> {
        vec![
            row("GRN", "Aurora", 1.0, true, 0.9),
            row("NVX", "Borealis", 12.0, false, 0.2),
            row("GRN", "Cygnus", 2.0, true, 0.4),
            row("EVO", "Dorado", 0.0, true, 0.8),
            row("NVX", "Eridanus", 14.0, false, 0.1),
        ]
    }

    #[test]
    fn rank_orders_by_composite_and_truncates() {
        let ranked = rank(&fleet(), &Strategy::Balanced.weights(), 3);

        assert_eq!(ranked.len(), 3);
        assert!(ranked
            .windows(2)
            .all(|pair| pair[0].composite >= pair[1].composite));
        assert!(ranked.iter().all(|entry| entry.row.operator != "NVX"));
    }

    #[test]
    fn rank_keeps_input_order_on_ties() {
        let rows = vec![
            row("GRN", "First", 0.0, true, 0.5),
            row("NVX", "Second", 0.0, true, 0.5),
            row("EVO", "Third", 0.0, true, 0.5),
        ];

        let ranked = rank(&rows, &Strategy::Balanced.weights(), 2);
        let vessels: Vec<&str> = ranked.iter().map(|entry| entry.row.vessel.as_str()).collect();
        assert_eq!(vessels, vec!["First", "Second"]);
    }

    #[test]
    fn rank_skips_rows_that_cannot_be_scored() {
        let mut rows = fleet();
        rows[0].carbon_abated = f64::NAN;

        let ranked = rank(&rows, &Strategy::Balanced.weights(), 10);
        assert_eq!(ranked.len(), 4);
        assert!(ranked.iter().all(|entry| entry.row.vessel != "Aurora"));
    }

    #[test]
    fn compare_groups_aggregates_per_operator() {
        let comparison = compare_groups(&fleet(), &Strategy::Balanced.weights(), &["GRN", "NVX", "OPR"]);

        assert_eq!(comparison.len(), 3);
        let grn = &comparison[0];
        assert_eq!(grn.key, "GRN");
        assert_eq!(grn.vessels, 2);
        assert_eq!(grn.avg_wait_time, Some(1.5));
        assert_eq!(grn.total_fuel_cost_saved, 70_000.0);
        assert_eq!(grn.total_carbon_abated, 1.3);
        assert_eq!(grn.on_time_rate, Some(100.0));

        let nvx = &comparison[1];
        assert_eq!(nvx.avg_wait_time, Some(13.0));
        assert_eq!(nvx.on_time_rate, Some(0.0));

        let missing = &comparison[2];
        assert_eq!(missing.vessels, 0);
        assert_eq!(missing.avg_composite, None);
        assert_eq!(missing.on_time_rate, None);
    }

    #[test]
    fn recommend_emits_rules_in_fixed_order() {
        let rows = vec![
            row("NVX", "Borealis", 12.0, false, 0.2),
            row("EVO", "Dorado", 8.0, false, 0.8),
            row("GRN", "Aurora", 1.0, true, 0.9),
        ];

        let recommendations = recommend(&rows, &Strategy::Balanced.weights(), 3);

        assert_eq!(recommendations.len(), 3);
        assert_eq!(
            recommendations[0],
            "High average wait time (7.0h). Consider berth scheduling optimization."
        );
        assert!(recommendations[1].starts_with("1 vessels with DIS < 50"));
        assert_eq!(
            recommendations[2],
            "Top environmental performers: GRN, EVO, NVX"
        );
    }

    #[test]
    fn recommend_omits_conditions_that_do_not_hold() {
        let rows = vec![
            row("GRN", "Aurora", 1.0, true, 0.9),
            row("GRN", "Cygnus", 2.0, true, 0.4),
            row("EVO", "Dorado", 0.0, true, 0.8),
        ];

        let recommendations = recommend(&rows, &Strategy::Balanced.weights(), 3);

        assert_eq!(
            recommendations,
            vec!["Top environmental performers: GRN, EVO".to_string()]
        );
    }

    #[test]
    fn recommend_uses_signed_mean_wait_time() {
        let rows = vec![
            row("GRN", "Aurora", -12.0, true, 0.9),
            row("GRN", "Cygnus", -10.0, true, 0.4),
        ];

        let recommendations = recommend(&rows, &Strategy::Balanced.weights(), 3);
        assert!(recommendations
            .iter()
            .all(|line| !line.starts_with("High average wait time")));
    }

    #[test]
    fn summarize_reports_headline_figures() {
        let summary = summarize(&fleet(), &Strategy::Balanced.weights());

        assert_eq!(summary.total_vessels, 5);
        assert_eq!(summary.avg_wait_time, Some(5.8));
        assert_eq!(summary.total_fuel_cost_saved, 175_000.0);
        assert_eq!(summary.on_time_rate, Some(60.0));
        assert!(summary.avg_composite.is_some());

        let empty = summarize(&[], &Strategy::Balanced.weights());
        assert_eq!(empty.total_vessels, 0);
        assert_eq!(empty.avg_composite, None);
    }
}
