use super::intent::IntentKind;
use serde::{Deserialize, Serialize};

const DEFAULT_PREAMBLE: &str =
    "You are an intelligent assistant for PSA's Global Insights Dashboard.";

const DEFAULT_CLOSING: &str = "Provide a clear, actionable response that:
1. Directly answers the question
2. Includes specific metrics when relevant
3. Offers 2-3 actionable recommendations
4. Maintains professional tone

Keep response concise and focused.";

/// Fixed wording wrapped around each query sent to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTemplate {
    pub preamble: String,
    pub closing: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            preamble: DEFAULT_PREAMBLE.to_string(),
            closing: DEFAULT_CLOSING.to_string(),
        }
    }
}

impl PromptTemplate {
    pub(crate) fn render(
        &self,
        context: &str,
        query: &str,
        intent: IntentKind,
        data_summary: Option<&str>,
    ) -> String {
        let mut prompt = String::new();
        prompt.push_str(&self.preamble);
        prompt.push_str("\n\n");

        if !context.is_empty() {
            prompt.push_str(context);
            prompt.push('\n');
        }

        prompt.push_str(&format!("User Query: {query}\nIntent: {intent}\n\n"));

        if let Some(summary) = data_summary.filter(|summary| !summary.trim().is_empty()) {
            prompt.push_str(&format!("Data Analysis:\n{summary}\n\n"));
        }

        prompt.push_str(&self.closing);
        prompt
    }
}
