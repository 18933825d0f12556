//! Language model collaborators.

mod chat;
mod insights;

pub use chat::ChatCompletionsClient;
pub use insights::{
    suggest_recommendations, summarize_data, RECOMMENDATIONS_FALLBACK, SUMMARY_FALLBACK,
};

/// Text substituted for the model answer whenever the call fails.
pub const FALLBACK_RESPONSE: &str = "Unable to generate response. Please try again.";

/// Generated text returned by a model call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub tokens_used: Option<u32>,
    pub succeeded: bool,
}

impl Completion {
    pub fn success(text: impl Into<String>, tokens_used: Option<u32>) -> Self {
        Self {
            text: text.into(),
            tokens_used,
            succeeded: true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model endpoint is not configured")]
    NotConfigured,
    #[error("model request failed: {0}")]
    Transport(String),
    #[error("model endpoint returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected model response: {0}")]
    InvalidResponse(String),
}

/// Blocking prompt-in, text-out interface to a hosted model.
pub trait LanguageModel {
    fn complete(&self, prompt: &str, system_message: Option<&str>)
        -> Result<Completion, ModelError>;
}

impl<T: LanguageModel + ?Sized> LanguageModel for &T {
    fn complete(
        &self,
        prompt: &str,
        system_message: Option<&str>,
    ) -> Result<Completion, ModelError> {
        (**self).complete(prompt, system_message)
    }
}

impl<T: LanguageModel + ?Sized> LanguageModel for Box<T> {
    fn complete(
        &self,
        prompt: &str,
        system_message: Option<&str>,
    ) -> Result<Completion, ModelError> {
        (**self).complete(prompt, system_message)
    }
}
