//! Batch job planning: score a whole export, pick priorities and time each phase.

use crate::data::{DataSource, DataSourceError, RowFilter, DEFAULT_FETCH_LIMIT};
use crate::evaluation::{calculate_speedup, SessionTracker, MANUAL_BASELINE_SECS};
use crate::scoring::{round_to, DatasetSummary, RejectedRow, ScoredRow, ScoringEngine, Strategy};
use std::cmp::Ordering;
use std::time::{Duration, Instant};
use tracing::info;

pub const PRIORITY_COUNT: usize = 20;
const LEADER_POOL: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlanTimings {
    pub fetch: Duration,
    pub analysis: Duration,
    pub recommendations: Duration,
}

impl PlanTimings {
    pub fn total(&self) -> Duration {
        self.fetch + self.analysis + self.recommendations
    }

    /// `None` when the run was too fast to measure.
    pub fn speedup_vs_manual(&self) -> Option<f64> {
        calculate_speedup(self.total().as_secs_f64(), MANUAL_BASELINE_SECS)
    }

    pub fn seconds_saved(&self) -> f64 {
        round_to(MANUAL_BASELINE_SECS - self.total().as_secs_f64(), 1)
    }
}

#[derive(Debug, Clone)]
pub struct JobPlan {
    pub strategy: Strategy,
    /// Every scored row, highest composite first.
    pub scored: Vec<ScoredRow>,
    pub rejected: Vec<RejectedRow>,
    pub summary: DatasetSummary,
    pub priorities: Vec<ScoredRow>,
    pub recommendations: Vec<String>,
    pub timings: PlanTimings,
}

pub struct JobPlanner {
    engine: ScoringEngine,
    strategy: Strategy,
    tracker: SessionTracker,
}

impl JobPlanner {
    pub fn new(strategy: Strategy) -> Self {
        Self {
            engine: ScoringEngine::for_strategy(strategy),
            strategy,
            tracker: SessionTracker::new(),
        }
    }

    /// Phase timings recorded so far, one sample per phase.
    pub fn tracker(&self) -> &SessionTracker {
        &self.tracker
    }

    pub fn plan<D: DataSource>(&mut self, source: &D) -> Result<JobPlan, DataSourceError> {
        let started = Instant::now();
        let filter = RowFilter::default().with_limit(DEFAULT_FETCH_LIMIT);
        let (rows, mut rejected) = source.fetch_with_rejections(Some(&filter))?;
        let fetch = started.elapsed();
        self.tracker.record_response(fetch);
        info!(
            records = rows.len(),
            rejected = rejected.len(),
            secs = fetch.as_secs_f64(),
            "retrieved vessel records"
        );

        let started = Instant::now();
        let batch = self.engine.score_all(&rows);
        let summary = self.engine.summarize(&rows);
        rejected.extend(batch.rejected);
        let mut scored = batch.scored;
        scored.sort_by(|a, b| b.composite.partial_cmp(&a.composite).unwrap_or(Ordering::Equal));
        let priorities: Vec<ScoredRow> = scored.iter().take(PRIORITY_COUNT).cloned().collect();
        let analysis = started.elapsed();
        self.tracker.record_response(analysis);
        info!(
            scored = scored.len(),
            rejected = rejected.len(),
            priorities = priorities.len(),
            secs = analysis.as_secs_f64(),
            "analysis completed"
        );

        let started = Instant::now();
        let recommendations = self.engine.recommend(&rows, LEADER_POOL);
        let recommendation_time = started.elapsed();
        self.tracker.record_response(recommendation_time);

        Ok(JobPlan {
            strategy: self.strategy,
            scored,
            rejected,
            summary,
            priorities,
            recommendations,
            timings: PlanTimings {
                fetch,
                analysis,
                recommendations: recommendation_time,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::StaticDataSource;
    use crate::scoring::MetricsRow;

    fn row(index: usize) -> MetricsRow {
        MetricsRow {
            operator: if index % 2 == 0 { "GRN" } else { "NVX" }.to_string(),
            vessel: format!("Vessel-{index:02}"),
            service: None,
            business_unit: None,
            wait_time_deviation: index as f64 * 0.5,
            arrival_accurate: index % 3 != 0,
            berth_duration: 24.0,
            fuel_cost_saved: 1_000.0 * index as f64,
            carbon_abated: 0.02 * index as f64,
        }
    }

    #[test]
    fn plan_caps_priorities_and_sorts_everything() {
        let source = StaticDataSource::new((0..30).map(row).collect());
        let mut planner = JobPlanner::new(Strategy::Balanced);

        let plan = planner.plan(&source).expect("static source");

        assert_eq!(plan.scored.len(), 30);
        assert_eq!(plan.priorities.len(), PRIORITY_COUNT);
        assert!(plan
            .scored
            .windows(2)
            .all(|pair| pair[0].composite >= pair[1].composite));
        assert_eq!(plan.priorities[0], plan.scored[0]);
        assert_eq!(plan.summary.total_vessels, 30);
        assert!(!plan.recommendations.is_empty());
        assert_eq!(planner.tracker().query_count(), 3);
    }

    #[test]
    fn plan_reads_at_most_the_default_fetch_limit() {
        let source = StaticDataSource::new((0..DEFAULT_FETCH_LIMIT + 25).map(row).collect());
        let mut planner = JobPlanner::new(Strategy::Balanced);

        let plan = planner.plan(&source).expect("static source");

        assert_eq!(plan.scored.len(), DEFAULT_FETCH_LIMIT);
        assert_eq!(plan.summary.total_vessels, DEFAULT_FETCH_LIMIT);
        assert!(plan.rejected.is_empty());
    }

    #[test]
    fn timings_compare_against_manual_baseline() {
        let timings = PlanTimings {
            fetch: Duration::from_secs(1),
            analysis: Duration::from_secs(2),
            recommendations: Duration::from_secs(3),
        };
        assert_eq!(timings.total(), Duration::from_secs(6));
        assert_eq!(timings.speedup_vs_manual(), Some(50.0));
        assert_eq!(timings.seconds_saved(), 294.0);
    }
}
