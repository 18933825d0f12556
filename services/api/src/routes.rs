use crate::infra::{resolve_strategy, rows_from_records, AppState};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use praxis::conversation::{classify_intent, detect_topic, Intent, Topic};
use praxis::error::AppError;
use praxis::scoring::{
    DatasetSummary, GroupComparison, MetricsRecord, RejectedRow, ScoredRow, ScoringEngine,
    Strategy, WeightVector,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

const DEFAULT_RANK_LIMIT: usize = 5;
const DEFAULT_LEADER_POOL: usize = 3;

#[derive(Debug, Deserialize)]
pub(crate) struct ScoreRequest {
    pub(crate) rows: Vec<MetricsRecord>,
    #[serde(default)]
    pub(crate) strategy: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ScoreResponse {
    pub(crate) strategy: Strategy,
    pub(crate) weights: WeightVector,
    pub(crate) scored: Vec<ScoredRow>,
    pub(crate) rejected: Vec<RejectedRow>,
    pub(crate) summary: DatasetSummary,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RankRequest {
    pub(crate) rows: Vec<MetricsRecord>,
    #[serde(default)]
    pub(crate) strategy: Option<String>,
    #[serde(default)]
    pub(crate) limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RankResponse {
    pub(crate) strategy: Strategy,
    pub(crate) ranked: Vec<ScoredRow>,
    pub(crate) rejected: Vec<RejectedRow>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompareRequest {
    pub(crate) rows: Vec<MetricsRecord>,
    pub(crate) operators: Vec<String>,
    #[serde(default)]
    pub(crate) strategy: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CompareResponse {
    pub(crate) strategy: Strategy,
    pub(crate) groups: Vec<GroupComparison>,
    pub(crate) rejected: Vec<RejectedRow>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RecommendRequest {
    pub(crate) rows: Vec<MetricsRecord>,
    #[serde(default)]
    pub(crate) strategy: Option<String>,
    #[serde(default)]
    pub(crate) top_n: Option<usize>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RecommendResponse {
    pub(crate) strategy: Strategy,
    pub(crate) recommendations: Vec<String>,
    pub(crate) rejected: Vec<RejectedRow>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IntentRequest {
    pub(crate) text: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct IntentResponse {
    pub(crate) intent: Intent,
    pub(crate) topic: Option<Topic>,
}

pub(crate) fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/scores", post(scores_endpoint))
        .route("/api/v1/rank", post(rank_endpoint))
        .route("/api/v1/compare", post(compare_endpoint))
        .route("/api/v1/recommend", post(recommend_endpoint))
        .route("/api/v1/intent", post(intent_endpoint))
        .layer(Extension(state))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn scores_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<ScoreRequest>,
) -> Result<Json<ScoreResponse>, AppError> {
    let strategy = resolve_strategy(payload.strategy.as_deref(), state.default_strategy)?;
    let (rows, mut rejected) = rows_from_records(payload.rows)?;
    let engine = ScoringEngine::for_strategy(strategy);

    let batch = engine.score_all(&rows);
    rejected.extend(batch.rejected);

    Ok(Json(ScoreResponse {
        strategy,
        weights: *engine.weights(),
        summary: engine.summarize(&rows),
        scored: batch.scored,
        rejected,
    }))
}

pub(crate) async fn rank_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<RankRequest>,
) -> Result<Json<RankResponse>, AppError> {
    let strategy = resolve_strategy(payload.strategy.as_deref(), state.default_strategy)?;
    let (rows, rejected) = rows_from_records(payload.rows)?;
    let limit = payload.limit.unwrap_or(DEFAULT_RANK_LIMIT);

    Ok(Json(RankResponse {
        strategy,
        ranked: ScoringEngine::for_strategy(strategy).rank(&rows, limit),
        rejected,
    }))
}

pub(crate) async fn compare_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<CompareRequest>,
) -> Result<Json<CompareResponse>, AppError> {
    let strategy = resolve_strategy(payload.strategy.as_deref(), state.default_strategy)?;
    if payload.operators.is_empty() {
        return Err(AppError::InvalidInput(
            "operators must name at least one group".to_string(),
        ));
    }

    let (rows, rejected) = rows_from_records(payload.rows)?;
    let keys: Vec<&str> = payload.operators.iter().map(String::as_str).collect();

    Ok(Json(CompareResponse {
        strategy,
        groups: ScoringEngine::for_strategy(strategy).compare_groups(&rows, &keys),
        rejected,
    }))
}

pub(crate) async fn recommend_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<RecommendRequest>,
) -> Result<Json<RecommendResponse>, AppError> {
    let strategy = resolve_strategy(payload.strategy.as_deref(), state.default_strategy)?;
    let (rows, rejected) = rows_from_records(payload.rows)?;
    let top_n = payload.top_n.unwrap_or(DEFAULT_LEADER_POOL);

    Ok(Json(RecommendResponse {
        strategy,
        recommendations: ScoringEngine::for_strategy(strategy).recommend(&rows, top_n),
        rejected,
    }))
}

pub(crate) async fn intent_endpoint(Json(payload): Json<IntentRequest>) -> Json<IntentResponse> {
    Json(IntentResponse {
        intent: classify_intent(&payload.text),
        topic: detect_topic(&payload.text),
    })
}
