//! One conversational turn end to end: intent, data, prompt, model, scoring
//! recommendations and quality tracking.

use crate::conversation::{
    ConversationError, ConversationState, Intent, IntentKind, Role, TurnMetadata,
};
use crate::data::{DataSource, DataSourceError, RowFilter};
use crate::evaluation::{
    calculate_speedup, evaluate_answer_quality, AnswerQuality, SessionTracker,
    MANUAL_BASELINE_SECS,
};
use crate::model::{LanguageModel, FALLBACK_RESPONSE};
use crate::scoring::{
    DatasetSummary, GroupComparison, MetricsRow, ScoredRow, ScoringEngine, Strategy,
};
use serde::Serialize;
use std::fmt::Write as _;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub const ANALYST_SYSTEM_MESSAGE: &str = "You are a maritime operations analyst for PSA International. Provide clear, data-driven insights.";

const TOP_PERFORMERS: usize = 5;
const SUMMARY_ROWS: usize = 50;
const RECOMMENDATIONS_SHOWN: usize = 3;
const ENVIRONMENTAL_LEADER_POOL: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error(transparent)]
    Data(#[from] DataSourceError),
    #[error(transparent)]
    Conversation(#[from] ConversationError),
    #[error("failed to encode data view: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Data handed to the model alongside the question.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", content = "data", rename_all = "snake_case")]
pub enum DataView {
    Comparison(Vec<GroupComparison>),
    TopPerformers(Vec<ScoredRow>),
    Summary(DatasetSummary),
}

impl DataView {
    fn heading(&self) -> &'static str {
        match self {
            DataView::Comparison(_) => "Operator Comparison",
            DataView::TopPerformers(_) => "Top Performers",
            DataView::Summary(_) => "Analysis Summary",
        }
    }

    pub fn render(&self) -> Result<String, serde_json::Error> {
        let body = match self {
            DataView::Comparison(groups) => serde_json::to_string_pretty(groups)?,
            DataView::TopPerformers(rows) => serde_json::to_string_pretty(rows)?,
            DataView::Summary(summary) => serde_json::to_string_pretty(summary)?,
        };
        Ok(format!("{}:\n{body}", self.heading()))
    }
}

/// Everything produced by one turn.
#[derive(Debug, Clone, Serialize)]
pub struct AssistantReply {
    pub intent: Intent,
    /// Model text, or the fallback text when the model call failed.
    pub answer: String,
    pub recommendations: Vec<String>,
    /// Answer followed by the numbered recommendations, as shown to the user.
    pub response: String,
    pub used_fallback: bool,
    pub quality: AnswerQuality,
    pub latency: Duration,
    pub tokens_used: Option<u32>,
    pub speedup_vs_manual: Option<f64>,
}

/// A single-user session over a data source and a language model.
pub struct Assistant<D, M> {
    source: D,
    model: M,
    engine: ScoringEngine,
    strategy: Strategy,
    conversation: ConversationState,
    tracker: SessionTracker,
    cache: Option<Vec<MetricsRow>>,
}

impl<D, M> Assistant<D, M>
where
    D: DataSource,
    M: LanguageModel,
{
    pub fn new(source: D, model: M, strategy: Strategy) -> Self {
        Self {
            source,
            model,
            engine: ScoringEngine::for_strategy(strategy),
            strategy,
            conversation: ConversationState::new(),
            tracker: SessionTracker::new(),
            cache: None,
        }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Applies to subsequent turns only.
    pub fn set_strategy(&mut self, strategy: Strategy) {
        info!(from = %self.strategy, to = %strategy, "switching scoring strategy");
        self.strategy = strategy;
        self.engine = ScoringEngine::for_strategy(strategy);
    }

    pub fn conversation(&self) -> &ConversationState {
        &self.conversation
    }

    pub fn tracker(&self) -> &SessionTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut SessionTracker {
        &mut self.tracker
    }

    /// Drops cached rows so the next turn fetches again.
    pub fn refresh_data(&mut self) {
        self.cache = None;
    }

    /// Forgets history and context. Cached rows and session metrics are kept;
    /// use [`Assistant::refresh_data`] to refetch.
    pub fn clear(&mut self) {
        self.conversation.clear();
    }

    pub fn respond(&mut self, query: &str) -> Result<AssistantReply, AssistantError> {
        if query.trim().is_empty() {
            return Err(ConversationError::EmptyContent.into());
        }

        let started = Instant::now();
        let intent = self.conversation.classify_intent(query);
        debug!(intent = %intent.kind, operators = ?intent.entities, "classified query");

        let rows = match self.rows() {
            Ok(rows) => rows,
            Err(err) => {
                // The question still belongs to the conversation.
                self.conversation.add_message(Role::User, query)?;
                return Err(err.into());
            }
        };

        let filtered = if intent.entities.is_empty() {
            rows.clone()
        } else {
            RowFilter::operators(intent.entities.iter().copied()).apply(&rows)
        };

        let view = self.select_view(&intent, &rows, &filtered);
        let prompt = self
            .conversation
            .build_prompt(query, Some(&view.render()?));

        let (answer, tokens_used, used_fallback) =
            match self.model.complete(&prompt, Some(ANALYST_SYSTEM_MESSAGE)) {
                Ok(completion) if !completion.text.trim().is_empty() => {
                    (completion.text, completion.tokens_used, false)
                }
                Ok(completion) => {
                    warn!(
                        tokens_used = completion.tokens_used,
                        "model returned an empty completion, using fallback answer"
                    );
                    (FALLBACK_RESPONSE.to_string(), completion.tokens_used, true)
                }
                Err(err) => {
                    warn!(error = %err, "model call failed, using fallback answer");
                    (FALLBACK_RESPONSE.to_string(), None, true)
                }
            };

        let recommendations = self
            .engine
            .recommend(&filtered, ENVIRONMENTAL_LEADER_POOL);
        let response = compose_response(&answer, &recommendations);

        let latency = started.elapsed();
        let latency_secs = self.tracker.record_response(latency);
        let lowered = answer.to_lowercase();
        let quality = evaluate_answer_quality(
            &answer,
            lowered.contains("avg") || lowered.contains("total"),
            !recommendations.is_empty(),
        );

        self.conversation.add_message(Role::User, query)?;
        self.conversation.add_message_with_metadata(
            Role::Assistant,
            &answer,
            TurnMetadata {
                latency_ms: Some(u64::try_from(latency.as_millis()).unwrap_or(u64::MAX)),
                quality_score: Some(quality.quality_score),
                tokens_used,
            },
        )?;

        info!(
            intent = %intent.kind,
            latency_secs,
            quality = quality.quality_score,
            fallback = used_fallback,
            "answered query"
        );

        Ok(AssistantReply {
            intent,
            answer,
            recommendations,
            response,
            used_fallback,
            quality,
            latency,
            tokens_used,
            speedup_vs_manual: calculate_speedup(latency_secs, MANUAL_BASELINE_SECS),
        })
    }

    fn rows(&mut self) -> Result<Vec<MetricsRow>, DataSourceError> {
        if let Some(rows) = &self.cache {
            return Ok(rows.clone());
        }

        let rows = self.source.fetch_rows(None)?;
        debug!(rows = rows.len(), "cached dataset for session");
        self.cache = Some(rows.clone());
        Ok(rows)
    }

    fn select_view(&self, intent: &Intent, all: &[MetricsRow], filtered: &[MetricsRow]) -> DataView {
        if intent.is_comparison() && intent.entities.len() >= 2 {
            // Groups are looked up in the full dataset, not the filtered slice.
            DataView::Comparison(self.engine.compare_groups(all, &intent.entities))
        } else if intent.kind == IntentKind::Ranking {
            DataView::TopPerformers(self.engine.rank(filtered, TOP_PERFORMERS))
        } else {
            let head = &filtered[..filtered.len().min(SUMMARY_ROWS)];
            DataView::Summary(self.engine.summarize(head))
        }
    }
}

fn compose_response(answer: &str, recommendations: &[String]) -> String {
    let mut response = format!("{answer}\n\n**Recommendations:**\n");
    for (position, recommendation) in recommendations
        .iter()
        .take(RECOMMENDATIONS_SHOWN)
        .enumerate()
    {
        let _ = writeln!(response, "{}. {recommendation}", position + 1);
    }
    response
}
