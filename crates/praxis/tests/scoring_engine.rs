use praxis::data::CsvDataSource;
use praxis::scoring::{MetricsRow, ScoringEngine, Strategy};

fn fleet() -> Vec<MetricsRow> {
    let data = include_bytes!("../sample_operations.csv");
    let (rows, rejected) = CsvDataSource::parse(&data[..]).expect("fixture parses");
    assert_eq!(rejected.len(), 1, "blank wait time is rejected");
    assert_eq!(rejected[0].index, 5);
    rows
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn balanced_ranking_puts_punctual_high_savers_first() {
    let engine = ScoringEngine::for_strategy(Strategy::Balanced);
    let ranked = engine.rank(&fleet(), 3);

    let vessels: Vec<&str> = ranked.iter().map(|entry| entry.row.vessel.as_str()).collect();
    assert_eq!(vessels, vec!["Granite Bay", "Aurora Spirit", "Boreal Crest"]);
    assert_close(ranked[0].composite, 86.04);
    assert_close(ranked[1].composite, 78.62);
}

#[test]
fn late_congested_call_loses_every_risk_deduction() {
    let engine = ScoringEngine::default();
    let cobalt = fleet()
        .into_iter()
        .find(|row| row.vessel == "Cobalt Horizon")
        .expect("fixture row");

    let scored = engine.score(&cobalt).expect("valid row");
    assert_close(scored.scores.risk, 20.0);
    assert_close(scored.scores.cost_efficiency, -5.0);
    assert_close(scored.composite, 11.6);
}

#[test]
fn recommendations_cover_low_performers_and_carbon_leaders() {
    let engine = ScoringEngine::for_strategy(Strategy::Balanced);
    let recommendations = engine.recommend(&fleet(), 3);

    assert_eq!(
        recommendations,
        vec![
            "3 vessels with DIS < 50. Review operational efficiency.".to_string(),
            "Top environmental performers: CRY, GRN".to_string(),
        ]
    );
}

#[test]
fn operator_comparison_aggregates_each_requested_group() {
    let engine = ScoringEngine::for_strategy(Strategy::Balanced);
    let groups = engine.compare_groups(&fleet(), &["GRN", "nvx"]);

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].vessels, 2);
    assert_close(groups[0].avg_composite.expect("grn scored"), 76.03);
    assert_eq!(groups[0].on_time_rate, Some(100.0));
    assert_eq!(groups[1].key, "nvx");
    assert_eq!(groups[1].vessels, 2);
    assert_close(groups[1].avg_composite.expect("nvx scored"), 21.38);
    assert_eq!(groups[1].on_time_rate, Some(0.0));
}

#[test]
fn strategy_changes_weights_not_sub_scores() {
    let rows = fleet();
    let balanced = ScoringEngine::for_strategy(Strategy::Balanced).score_all(&rows);
    let carbon = ScoringEngine::for_strategy(Strategy::CarbonReduction).score_all(&rows);

    for (left, right) in balanced.scored.iter().zip(&carbon.scored) {
        assert_eq!(left.scores, right.scores);
    }
    assert_ne!(balanced.scored[0].composite, carbon.scored[0].composite);
}
