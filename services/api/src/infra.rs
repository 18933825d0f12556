use metrics_exporter_prometheus::PrometheusHandle;
use praxis::error::AppError;
use praxis::scoring::{parse_records, MetricsRecord, MetricsRow, RejectedRow, Strategy};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::warn;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) default_strategy: Strategy,
}

pub(crate) fn parse_strategy(raw: &str) -> Result<Strategy, String> {
    raw.parse::<Strategy>().map_err(|err| err.to_string())
}

/// Request strategy wins over the service default.
pub(crate) fn resolve_strategy(
    requested: Option<&str>,
    fallback: Strategy,
) -> Result<Strategy, AppError> {
    match requested.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => Ok(value.parse::<Strategy>()?),
        None => Ok(fallback),
    }
}

/// Converts posted records, logging every record that cannot become a row.
pub(crate) fn rows_from_records(
    records: Vec<MetricsRecord>,
) -> Result<(Vec<MetricsRow>, Vec<RejectedRow>), AppError> {
    if records.is_empty() {
        return Err(AppError::InvalidInput("rows must not be empty".to_string()));
    }

    let (rows, rejected) = parse_records(records);
    for rejection in &rejected {
        warn!(
            record = rejection.index,
            reason = %rejection.reason,
            "skipping invalid posted row"
        );
    }

    Ok((rows, rejected))
}

#[cfg(test)]
pub(crate) fn test_state(default_strategy: Strategy) -> AppState {
    let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
    AppState {
        readiness: Arc::new(AtomicBool::new(true)),
        metrics: Arc::new(recorder.handle()),
        default_strategy,
    }
}
