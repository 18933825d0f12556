use serde::Serialize;
use std::fmt;

/// Operator codes recognised in free text.
pub const OPERATOR_CODES: [&str; 10] = [
    "GRN", "NVX", "DPT", "EVO", "SVQ", "AZQ", "UVX", "BLX", "OPR", "CRY",
];

/// Classified purpose of a user query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    Comparison,
    Ranking,
    Prediction,
    Recommendation,
    Explanation,
    General,
}

impl IntentKind {
    pub fn label(self) -> &'static str {
        match self {
            IntentKind::Comparison => "comparison",
            IntentKind::Ranking => "ranking",
            IntentKind::Prediction => "prediction",
            IntentKind::Recommendation => "recommendation",
            IntentKind::Explanation => "explanation",
            IntentKind::General => "general",
        }
    }

    pub fn requires_data(self) -> bool {
        !matches!(self, IntentKind::Explanation)
    }
}

impl fmt::Display for IntentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// Evaluated top to bottom; the first rule with a keyword hit wins.
const INTENT_RULES: [(IntentKind, &[&str]); 5] = [
    (
        IntentKind::Comparison,
        &["compare", "versus", "vs", "between", "difference"],
    ),
    (IntentKind::Ranking, &["top", "best", "worst", "rank"]),
    (
        IntentKind::Prediction,
        &["predict", "forecast", "expect", "will"],
    ),
    (
        IntentKind::Recommendation,
        &["recommend", "suggest", "should", "advice"],
    ),
    (
        IntentKind::Explanation,
        &["explain", "what is", "how does", "why"],
    ),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Intent {
    pub kind: IntentKind,
    pub entities: Vec<&'static str>,
    pub requires_data: bool,
}

impl Intent {
    pub fn is_comparison(&self) -> bool {
        self.kind == IntentKind::Comparison
    }
}

/// Subject the conversation is currently about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    Performance,
    Comparison,
    Carbon,
    Cost,
    Delay,
}

impl Topic {
    pub fn label(self) -> &'static str {
        match self {
            Topic::Performance => "performance",
            Topic::Comparison => "comparison",
            Topic::Carbon => "carbon",
            Topic::Cost => "cost",
            Topic::Delay => "delay",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

const TOPIC_RULES: [(Topic, &[&str]); 5] = [
    (Topic::Performance, &["performance", "efficiency", "score"]),
    (Topic::Comparison, &["compare", "versus", "vs", "between"]),
    (Topic::Carbon, &["carbon", "emission", "environmental"]),
    (Topic::Cost, &["cost", "bunker", "savings"]),
    (Topic::Delay, &["delay", "wait", "late"]),
];

/// Pure classification; operator entities are extracted regardless of kind.
pub fn classify_intent(text: &str) -> Intent {
    let lowered = text.to_lowercase();
    let kind = INTENT_RULES
        .iter()
        .find(|(_, keywords)| contains_any(&lowered, keywords))
        .map(|(kind, _)| *kind)
        .unwrap_or(IntentKind::General);

    Intent {
        kind,
        entities: extract_operators(text),
        requires_data: kind.requires_data(),
    }
}

/// Known operator codes appearing anywhere in the text, in vocabulary order.
pub fn extract_operators(text: &str) -> Vec<&'static str> {
    let upper = text.to_uppercase();
    OPERATOR_CODES
        .iter()
        .copied()
        .filter(|code| upper.contains(code))
        .collect()
}

pub fn detect_topic(text: &str) -> Option<Topic> {
    let lowered = text.to_lowercase();
    TOPIC_RULES
        .iter()
        .find(|(_, keywords)| contains_any(&lowered, keywords))
        .map(|(topic, _)| *topic)
}

fn contains_any(haystack: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| haystack.contains(keyword))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparison_with_operator_entities() {
        let intent = classify_intent("compare GRN and NVX");
        assert_eq!(intent.kind, IntentKind::Comparison);
        assert_eq!(intent.entities, vec!["GRN", "NVX"]);
        assert!(intent.requires_data);
    }

    #[test]
    fn ranking_keyword_without_comparison() {
        let intent = classify_intent("what is the best strategy");
        assert_eq!(intent.kind, IntentKind::Ranking);
        assert!(intent.requires_data);
    }

    #[test]
    fn comparison_outranks_ranking() {
        let intent = classify_intent("which is best between evo and cry");
        assert_eq!(intent.kind, IntentKind::Comparison);
        assert_eq!(intent.entities, vec!["EVO", "CRY"]);
    }

    #[test]
    fn explanation_does_not_require_data() {
        let intent = classify_intent("Explain how DIS is calculated");
        assert_eq!(intent.kind, IntentKind::Explanation);
        assert!(!intent.requires_data);
    }

    #[test]
    fn prediction_and_recommendation_rules() {
        assert_eq!(
            classify_intent("forecast next month").kind,
            IntentKind::Prediction
        );
        assert_eq!(
            classify_intent("any advice on berth planning?").kind,
            IntentKind::Recommendation
        );
    }

    #[test]
    fn unmatched_text_is_general() {
        let intent = classify_intent("hello there");
        assert_eq!(intent.kind, IntentKind::General);
        assert!(intent.entities.is_empty());
        assert!(intent.requires_data);
    }

    #[test]
    fn keyword_matching_is_substring_based() {
        // "vs" inside the code "NVSX" still counts, as does "top" inside "stop".
        assert_eq!(classify_intent("how is NVSX doing").kind, IntentKind::Comparison);
        assert_eq!(classify_intent("stop").kind, IntentKind::Ranking);
    }

    #[test]
    fn topic_detection_uses_table_order() {
        assert_eq!(detect_topic("carbon cost"), Some(Topic::Carbon));
        assert_eq!(detect_topic("efficiency of waiting"), Some(Topic::Performance));
        assert_eq!(detect_topic("hello"), None);
    }
}
