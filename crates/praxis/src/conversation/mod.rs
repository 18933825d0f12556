//! Per-session conversation state: rolling turn history, derived context,
//! intent classification, and prompt assembly.

mod history;
mod intent;
mod prompt;

pub use history::{ConversationTurn, Role, TurnHistory, TurnMetadata, HISTORY_CAPACITY};
pub use intent::{
    classify_intent, detect_topic, extract_operators, Intent, IntentKind, Topic, OPERATOR_CODES,
};
pub use prompt::PromptTemplate;

use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt::Write as _;

const CONTEXT_WINDOW: usize = 3;
const PREVIEW_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversationError {
    #[error("message role must not be empty")]
    EmptyRole,
    #[error("unknown message role '{0}'")]
    UnknownRole(String),
    #[error("message content must not be empty")]
    EmptyContent,
}

/// Context accumulated from user turns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversationContext {
    /// Never shrinks until the conversation is cleared.
    pub operators_mentioned: BTreeSet<&'static str>,
    pub current_topic: Option<Topic>,
}

/// Conversation owned by a single session.
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    history: TurnHistory,
    context: ConversationContext,
    template: PromptTemplate,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(template: PromptTemplate) -> Self {
        Self {
            template,
            ..Self::default()
        }
    }

    pub fn history(&self) -> &TurnHistory {
        &self.history
    }

    pub fn context(&self) -> &ConversationContext {
        &self.context
    }

    pub fn add_message(&mut self, role: Role, content: &str) -> Result<(), ConversationError> {
        self.add_message_with_metadata(role, content, TurnMetadata::default())
    }

    /// Appends a turn; user turns also update the derived context.
    pub fn add_message_with_metadata(
        &mut self,
        role: Role,
        content: &str,
        metadata: TurnMetadata,
    ) -> Result<(), ConversationError> {
        if content.trim().is_empty() {
            return Err(ConversationError::EmptyContent);
        }

        self.history.push(ConversationTurn {
            role,
            content: content.to_string(),
            timestamp: Utc::now(),
            metadata,
        });

        if role == Role::User {
            self.update_context(content);
        }

        Ok(())
    }

    pub fn update_context(&mut self, text: &str) {
        self.context
            .operators_mentioned
            .extend(extract_operators(text));

        if let Some(topic) = detect_topic(text) {
            self.context.current_topic = Some(topic);
        }
    }

    pub fn classify_intent(&self, text: &str) -> Intent {
        classify_intent(text)
    }

    /// Recent turns plus accumulated context; empty when there is no history.
    pub fn context_summary(&self) -> String {
        if self.history.is_empty() {
            return String::new();
        }

        let mut summary = String::from("Recent conversation:\n");
        for turn in self.history.recent(CONTEXT_WINDOW) {
            let _ = writeln!(summary, "{}: {}...", turn.role, turn.preview(PREVIEW_CHARS));
        }

        if !self.context.operators_mentioned.is_empty() {
            let operators: Vec<&str> = self.context.operators_mentioned.iter().copied().collect();
            let _ = writeln!(summary, "\nOperators discussed: {}", operators.join(", "));
        }

        if let Some(topic) = self.context.current_topic {
            let _ = writeln!(summary, "Current topic: {topic}");
        }

        summary
    }

    pub fn build_prompt(&self, query: &str, data_summary: Option<&str>) -> String {
        let intent = classify_intent(query);
        self.template
            .render(&self.context_summary(), query, intent.kind, data_summary)
    }

    pub fn clear(&mut self) {
        self.history.clear();
        self.context = ConversationContext::default();
    }

    /// Turn history as pretty-printed JSON, oldest first.
    pub fn export_history(&self) -> Result<String, serde_json::Error> {
        let turns: Vec<&ConversationTurn> = self.history.iter().collect();
        serde_json::to_string_pretty(&turns)
    }
}
