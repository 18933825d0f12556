//! Answer-quality heuristics and per-session response-time tracking.

use crate::scoring::round_to;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::time::Duration;

/// Estimated seconds an analyst spends answering the same question by hand.
pub const MANUAL_BASELINE_SECS: f64 = 300.0;

const TRACKED_SAMPLES: usize = 100;
const REAL_TIME_WINDOW: usize = 10;
const HEDGE_WORDS: [&str; 4] = ["however", "although", "consider", "recommend"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerQuality {
    pub quality_score: u8,
    pub has_metrics: bool,
    pub has_recommendations: bool,
    pub word_count: usize,
}

pub fn evaluate_answer_quality(
    answer: &str,
    has_metrics: bool,
    has_recommendations: bool,
) -> AnswerQuality {
    let mut score: u32 = 0;

    if answer.chars().count() > 50 {
        score += 25;
    }
    if has_metrics {
        score += 35;
    }
    if has_recommendations {
        score += 30;
    }

    let lowered = answer.to_lowercase();
    if HEDGE_WORDS.iter().any(|word| lowered.contains(word)) {
        score += 10;
    }

    AnswerQuality {
        quality_score: score.min(100) as u8,
        has_metrics,
        has_recommendations,
        word_count: answer.split_whitespace().count(),
    }
}

/// Composite interaction quality: speed, accuracy and actionability.
pub fn calculate_ciq(response_secs: f64, accuracy: f64, actionability: f64) -> f64 {
    let speed_score = (100.0 - response_secs * 10.0).max(0.0);
    round_to(speed_score * 0.3 + accuracy * 0.4 + actionability * 0.3, 2)
}

pub fn calculate_speedup(ai_secs: f64, manual_secs: f64) -> Option<f64> {
    if ai_secs <= 0.0 {
        return None;
    }
    Some(round_to(manual_secs / ai_secs, 2))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feedback {
    pub rating: u8,
    pub comment: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceSummary {
    pub total_queries: u64,
    pub avg_response_secs: f64,
    pub min_response_secs: f64,
    pub max_response_secs: f64,
    pub speedup_vs_manual: Option<f64>,
    pub avg_user_rating: f64,
    pub session_duration_secs: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RealTimeMetrics {
    pub last_10_avg_response_secs: f64,
    pub queries_this_session: u64,
    pub estimated_minutes_saved: f64,
}

/// Rolling response-time and feedback record for one session.
#[derive(Debug, Clone)]
pub struct SessionTracker {
    response_times: VecDeque<f64>,
    feedback: VecDeque<Feedback>,
    query_count: u64,
    started_at: DateTime<Utc>,
}

impl Default for SessionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionTracker {
    pub fn new() -> Self {
        Self {
            response_times: VecDeque::with_capacity(TRACKED_SAMPLES),
            feedback: VecDeque::with_capacity(TRACKED_SAMPLES),
            query_count: 0,
            started_at: Utc::now(),
        }
    }

    pub fn record_response(&mut self, elapsed: Duration) -> f64 {
        let secs = elapsed.as_secs_f64();
        push_bounded(&mut self.response_times, secs);
        self.query_count += 1;
        secs
    }

    pub fn add_feedback(&mut self, rating: u8, comment: impl Into<String>) {
        push_bounded(
            &mut self.feedback,
            Feedback {
                rating,
                comment: comment.into(),
                timestamp: Utc::now(),
            },
        );
    }

    pub fn query_count(&self) -> u64 {
        self.query_count
    }

    /// `None` until at least one response has been recorded.
    pub fn performance_summary(&self) -> Option<PerformanceSummary> {
        if self.response_times.is_empty() {
            return None;
        }

        let count = self.response_times.len() as f64;
        let avg = self.response_times.iter().sum::<f64>() / count;
        let min = self.response_times.iter().copied().fold(f64::INFINITY, f64::min);
        let max = self
            .response_times
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);

        let avg_rating = if self.feedback.is_empty() {
            0.0
        } else {
            self.feedback
                .iter()
                .map(|entry| f64::from(entry.rating))
                .sum::<f64>()
                / self.feedback.len() as f64
        };

        Some(PerformanceSummary {
            total_queries: self.query_count,
            avg_response_secs: round_to(avg, 2),
            min_response_secs: round_to(min, 2),
            max_response_secs: round_to(max, 2),
            speedup_vs_manual: calculate_speedup(avg, MANUAL_BASELINE_SECS),
            avg_user_rating: round_to(avg_rating, 2),
            session_duration_secs: (Utc::now() - self.started_at).num_seconds(),
        })
    }

    pub fn real_time_metrics(&self) -> RealTimeMetrics {
        let recent: Vec<f64> = self
            .response_times
            .iter()
            .skip(self.response_times.len().saturating_sub(REAL_TIME_WINDOW))
            .copied()
            .collect();

        let recent_avg = if recent.is_empty() {
            0.0
        } else {
            recent.iter().sum::<f64>() / recent.len() as f64
        };

        let minutes_saved = if self.query_count > 0 && recent_avg > 0.0 {
            round_to(
                (MANUAL_BASELINE_SECS - recent_avg) * self.query_count as f64 / 60.0,
                1,
            )
        } else {
            0.0
        };

        RealTimeMetrics {
            last_10_avg_response_secs: round_to(recent_avg, 2),
            queries_this_session: self.query_count,
            estimated_minutes_saved: minutes_saved.max(0.0),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

fn push_bounded<T>(buffer: &mut VecDeque<T>, value: T) {
    if buffer.len() >= TRACKED_SAMPLES {
        buffer.pop_front();
    }
    buffer.push_back(value);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_score_adds_components_and_caps() {
        let answer = "However, GRN's average DIS is 71.2 and we recommend berth window reviews.";
        let quality = evaluate_answer_quality(answer, true, true);
        assert_eq!(quality.quality_score, 100);
        assert_eq!(quality.word_count, 12);

        let terse = evaluate_answer_quality("ok", false, true);
        assert_eq!(terse.quality_score, 30);
    }

    #[test]
    fn ciq_penalises_slow_responses() {
        assert_eq!(calculate_ciq(2.0, 80.0, 70.0), 77.0);
        assert_eq!(calculate_ciq(20.0, 50.0, 50.0), 35.0);
    }

    #[test]
    fn speedup_guards_against_zero_time() {
        assert_eq!(calculate_speedup(3.0, MANUAL_BASELINE_SECS), Some(100.0));
        assert_eq!(calculate_speedup(0.0, MANUAL_BASELINE_SECS), None);
    }

    #[test]
    fn tracker_summarises_recorded_responses() {
        let mut tracker = SessionTracker::new();
        assert!(tracker.performance_summary().is_none());

        tracker.record_response(Duration::from_millis(1500));
        tracker.record_response(Duration::from_millis(2500));
        tracker.add_feedback(4, "useful");
        tracker.add_feedback(5, "");

        let summary = tracker.performance_summary().expect("responses recorded");
        assert_eq!(summary.total_queries, 2);
        assert_eq!(summary.avg_response_secs, 2.0);
        assert_eq!(summary.min_response_secs, 1.5);
        assert_eq!(summary.max_response_secs, 2.5);
        assert_eq!(summary.speedup_vs_manual, Some(150.0));
        assert_eq!(summary.avg_user_rating, 4.5);

        let realtime = tracker.real_time_metrics();
        assert_eq!(realtime.queries_this_session, 2);
        assert_eq!(realtime.last_10_avg_response_secs, 2.0);
        assert_eq!(realtime.estimated_minutes_saved, 9.9);
    }

    #[test]
    fn tracker_keeps_bounded_samples_and_resets() {
        let mut tracker = SessionTracker::new();
        for _ in 0..150 {
            tracker.record_response(Duration::from_secs(1));
        }
        assert_eq!(tracker.query_count(), 150);
        assert_eq!(tracker.response_times.len(), TRACKED_SAMPLES);

        tracker.reset();
        assert_eq!(tracker.query_count(), 0);
        assert_eq!(tracker.real_time_metrics().estimated_minutes_saved, 0.0);
    }
}
