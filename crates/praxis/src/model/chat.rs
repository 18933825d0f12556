use super::{Completion, LanguageModel, ModelError};
use crate::config::ModelConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Client for an Azure-style chat-completions deployment.
pub struct ChatCompletionsClient {
    http: reqwest::blocking::Client,
    config: ModelConfig,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
    frequency_penalty: f32,
    presence_penalty: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    total_tokens: u32,
}

impl ChatCompletionsClient {
    pub fn new(config: ModelConfig) -> Result<Self, ModelError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|err| ModelError::Transport(err.to_string()))?;

        Ok(Self { http, config })
    }

    fn completions_url(&self) -> Option<String> {
        let endpoint = self.config.endpoint.as_deref()?.trim_end_matches('/');
        Some(format!(
            "{endpoint}/openai/deployments/{}/chat/completions",
            self.config.deployment
        ))
    }

    fn request_body<'a>(&self, prompt: &'a str, system_message: Option<&'a str>) -> ChatRequest<'a> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system_message {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: prompt,
        });

        ChatRequest {
            messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            top_p: 0.95,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
        }
    }
}

impl LanguageModel for ChatCompletionsClient {
    fn complete(
        &self,
        prompt: &str,
        system_message: Option<&str>,
    ) -> Result<Completion, ModelError> {
        let url = self.completions_url().ok_or(ModelError::NotConfigured)?;

        let mut request = self
            .http
            .post(&url)
            .query(&[("api-version", self.config.api_version.as_str())])
            .json(&self.request_body(prompt, system_message));
        if let Some(key) = &self.config.api_key {
            request = request.header("api-key", key);
        }

        let response = request
            .send()
            .map_err(|err| ModelError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            warn!(status = status.as_u16(), "model endpoint rejected request");
            return Err(ModelError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|err| ModelError::InvalidResponse(err.to_string()))?;
        let tokens_used = parsed.usage.map(|usage| usage.total_tokens);
        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ModelError::InvalidResponse("response has no choices".to_string()))?;

        debug!(tokens_used, "model completion received");
        Ok(Completion::success(text, tokens_used))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn config(endpoint: Option<String>) -> ModelConfig {
        ModelConfig {
            endpoint,
            deployment: "analyst".to_string(),
            api_key: Some("test-key".to_string()),
            ..ModelConfig::default()
        }
    }

    #[test]
    fn request_body_places_system_message_first() {
        let client = ChatCompletionsClient::new(config(None)).expect("client builds");
        let body = serde_json::to_value(client.request_body("prompt", Some("system")))
            .expect("serializes");

        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "prompt");
        assert_eq!(body["max_tokens"], 1500);
    }

    #[test]
    fn unconfigured_endpoint_fails_without_network() {
        let client = ChatCompletionsClient::new(config(None)).expect("client builds");
        assert!(matches!(
            client.complete("hello", None),
            Err(ModelError::NotConfigured)
        ));
    }

    #[test]
    fn parses_successful_completion() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/openai/deployments/analyst/chat/completions")
            .match_query(Matcher::UrlEncoded(
                "api-version".into(),
                "2025-01-01-preview".into(),
            ))
            .match_header("api-key", "test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"choices":[{"message":{"role":"assistant","content":"GRN leads."}}],"usage":{"total_tokens":42}}"#,
            )
            .create();

        let client = ChatCompletionsClient::new(config(Some(format!("{}/", server.url()))))
            .expect("client builds");
        let completion = client.complete("prompt", None).expect("completion");

        mock.assert();
        assert_eq!(completion, Completion::success("GRN leads.", Some(42)));
    }

    #[test]
    fn maps_error_statuses() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("POST", "/openai/deployments/analyst/chat/completions")
            .match_query(Matcher::Any)
            .with_status(429)
            .with_body("rate limited")
            .create();

        let client =
            ChatCompletionsClient::new(config(Some(server.url()))).expect("client builds");

        match client.complete("prompt", None) {
            Err(ModelError::Status { status, body }) => {
                assert_eq!(status, 429);
                assert_eq!(body, "rate limited");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }
}
