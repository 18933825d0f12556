//! Multi-factor performance scoring for vessel-operation records.
//!
//! Every row is scored on four independent sub-scores (time efficiency, cost
//! efficiency, environmental impact, risk) which are combined into a composite
//! score using a [`WeightVector`] chosen from a named [`Strategy`].

mod batch;
mod row;
mod rules;
mod weights;

pub use batch::{DatasetSummary, GroupComparison, ScoredBatch};
pub use row::{
    parse_records, InvalidRow, MetricsRecord, MetricsRow, RawField, RejectedRow, RequiredField,
};
pub use weights::{Strategy, UnknownStrategy, WeightVector};

pub(crate) use rules::round_to;

use serde::Serialize;

/// The four independently computed sub-scores of a row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SubScores {
    pub time_efficiency: f64,
    pub cost_efficiency: f64,
    pub environmental: f64,
    pub risk: f64,
}

/// A row together with its derived scores.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredRow {
    #[serde(flatten)]
    pub row: MetricsRow,
    #[serde(flatten)]
    pub scores: SubScores,
    pub composite: f64,
}

/// Scores a single row.
pub fn score(row: &MetricsRow, weights: &WeightVector) -> Result<ScoredRow, InvalidRow> {
    row.validate()?;
    let scores = rules::sub_scores(row);
    let composite = rules::composite(&scores, weights);

    Ok(ScoredRow {
        row: row.clone(),
        scores,
        composite,
    })
}

/// Stateless engine bound to one weight vector for a scoring session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringEngine {
    weights: WeightVector,
}

impl ScoringEngine {
    pub fn new(weights: WeightVector) -> Self {
        Self { weights }
    }

    pub fn for_strategy(strategy: Strategy) -> Self {
        Self::new(strategy.weights())
    }

    pub fn weights(&self) -> &WeightVector {
        &self.weights
    }

    pub fn score(&self, row: &MetricsRow) -> Result<ScoredRow, InvalidRow> {
        score(row, &self.weights)
    }

    pub fn score_all(&self, rows: &[MetricsRow]) -> ScoredBatch {
        batch::score_all(rows, &self.weights)
    }

    pub fn rank(&self, rows: &[MetricsRow], n: usize) -> Vec<ScoredRow> {
        batch::rank(rows, &self.weights, n)
    }

    pub fn compare_groups(
        &self,
        rows: &[MetricsRow],
        group_keys: &[&str],
    ) -> Vec<GroupComparison> {
        batch::compare_groups(rows, &self.weights, group_keys)
    }

    pub fn recommend(&self, rows: &[MetricsRow], top_n: usize) -> Vec<String> {
        batch::recommend(rows, &self.weights, top_n)
    }

    pub fn summarize(&self, rows: &[MetricsRow]) -> DatasetSummary {
        batch::summarize(rows, &self.weights)
    }
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::for_strategy(Strategy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> MetricsRow {
        MetricsRow {
            operator: "GRN".to_string(),
            vessel: "Nordic Star".to_string(),
            service: Some("AEX".to_string()),
            business_unit: None,
            wait_time_deviation: 3.5,
            arrival_accurate: true,
            berth_duration: 35.0,
            fuel_cost_saved: 25_000.0,
            carbon_abated: 0.25,
        }
    }

    #[test]
    fn scoring_is_idempotent() {
        let weights = Strategy::Balanced.weights();
        let row = sample_row();

        let first = score(&row, &weights).expect("valid row");
        let second = score(&row, &weights).expect("valid row");

        assert_eq!(first.composite.to_bits(), second.composite.to_bits());
        assert_eq!(first, second);
    }

    #[test]
    fn neutral_row_composite_matches_weights() {
        let row = MetricsRow {
            wait_time_deviation: 0.0,
            arrival_accurate: true,
            berth_duration: 10.0,
            fuel_cost_saved: 0.0,
            carbon_abated: 0.0,
            ..sample_row()
        };

        for strategy in Strategy::ALL {
            let weights = strategy.weights();
            let scored = score(&row, &weights).expect("valid row");
            let expected = 100.0 * weights.time + 100.0 * weights.risk;
            assert!(
                (scored.composite - expected).abs() < 0.005,
                "{strategy}: {} vs {expected}",
                scored.composite
            );
        }
    }

    #[test]
    fn composite_is_not_renormalized() {
        let heavy = WeightVector {
            time: 1.0,
            cost: 1.0,
            environment: 1.0,
            risk: 1.0,
        };
        let row = MetricsRow {
            wait_time_deviation: 0.0,
            fuel_cost_saved: 70_000.0,
            carbon_abated: 1.0,
            ..sample_row()
        };

        let scored = score(&row, &heavy).expect("valid row");
        assert_eq!(scored.composite, 400.0);
    }

    #[test]
    fn changing_strategy_recomputes_composite() {
        let row = sample_row();
        let balanced = ScoringEngine::for_strategy(Strategy::Balanced)
            .score(&row)
            .expect("valid row");
        let carbon = ScoringEngine::for_strategy(Strategy::CarbonReduction)
            .score(&row)
            .expect("valid row");

        assert_eq!(balanced.scores, carbon.scores);
        assert_ne!(balanced.composite, carbon.composite);
    }

    #[test]
    fn non_finite_rows_fail_with_invalid_row() {
        let row = MetricsRow {
            fuel_cost_saved: f64::INFINITY,
            ..sample_row()
        };

        assert!(matches!(
            score(&row, &WeightVector::default()),
            Err(InvalidRow::NonNumeric {
                field: RequiredField::FuelCostSaved,
                ..
            })
        ));
    }
}
