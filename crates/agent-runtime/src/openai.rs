//! OpenAI LLM Provider
//!
//! Implementation of `LlmProvider` for the OpenAI chat completions API.

use std::time::Duration;

use agent_core::{
    error::{AgentError, Result},
    message::{Message, Role},
    provider::{Completion, FinishReason, GenerationOptions, LlmProvider, TokenUsage},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::OpenAiConfig;

/// OpenAI LLM provider
pub struct OpenAiProvider {
    http: reqwest::Client,
    config: OpenAiConfig,
    api_key: String,
}

impl OpenAiProvider {
    /// Create from configuration; fails when no API key is configured
    pub fn from_config(config: OpenAiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| AgentError::Config("OPENAI_API_KEY is not set".into()))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgentError::Config(format!("http client error: {e}")))?;

        Ok(Self {
            http,
            config,
            api_key,
        })
    }

    /// Convert agent messages to OpenAI format
    fn convert_messages(messages: &[Message]) -> Vec<ChatMessage> {
        messages
            .iter()
            .map(|m| {
                let role = match m.role {
                    Role::System => "system",
                    Role::User | Role::Tool => "user", // Tools appear as user context
                    Role::Assistant => "assistant",
                };
                ChatMessage {
                    role: role.into(),
                    content: m.content.clone(),
                }
            })
            .collect()
    }

    fn build_request(messages: &[Message], opts: &GenerationOptions) -> ChatRequest {
        ChatRequest {
            model: opts.model.clone(),
            messages: Self::convert_messages(messages),
            temperature: opts.temperature,
            max_tokens: opts.max_tokens,
            stop: (!opts.stop_sequences.is_empty()).then(|| opts.stop_sequences.clone()),
        }
    }

    /// Convert OpenAI response to agent completion
    fn convert_completion(response: ChatResponse, model: &str) -> Result<Completion> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::Provider("OpenAI returned no choices".into()))?;

        Ok(Completion {
            content: choice.message.content.unwrap_or_default(),
            model: response.model.unwrap_or_else(|| model.to_string()),
            usage: response.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            finish_reason: choice
                .finish_reason
                .as_deref()
                .map(FinishReason::from_provider),
        })
    }
}

/// Map a non-success HTTP status onto the agent error taxonomy
pub(crate) fn status_error(provider: &str, status: reqwest::StatusCode, body: &str) -> AgentError {
    match status.as_u16() {
        401 | 403 => AgentError::Auth(format!("{provider}: {body}")),
        429 => AgentError::RateLimited(format!("{provider}: {body}")),
        500..=599 => AgentError::ProviderUnavailable(format!("{provider} returned {status}: {body}")),
        _ => AgentError::Provider(format!("{provider} request failed with {status}: {body}")),
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "OpenAI"
    }

    async fn complete(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<Completion> {
        let request = Self::build_request(messages, options);

        let mut builder = self
            .http
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.api_key);
        if let Some(org) = &self.config.organization {
            builder = builder.header("OpenAI-Organization", org);
        }

        let response = builder
            .json(&request)
            .send()
            .await
            .map_err(|e| AgentError::Provider(format!("OpenAI request error: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error("OpenAI", status, &body));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| AgentError::Provider(format!("OpenAI response parse error: {e}")))?;

        Self::convert_completion(body, &options.model)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_api_key() {
        let err = OpenAiProvider::from_config(OpenAiConfig::default())
            .err()
            .unwrap();
        assert!(matches!(err, AgentError::Config(msg) if msg.contains("OPENAI_API_KEY")));
    }

    #[test]
    fn test_request_body() {
        let messages = vec![
            Message::system("You are helpful."),
            Message::user("Hello"),
            Message::tool("[Tool 'wikipedia' returned]\n...", "wikipedia", None),
        ];
        let request =
            OpenAiProvider::build_request(&messages, &GenerationOptions::deterministic("gpt-4o"));
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["temperature"], 0.0);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][2]["role"], "user");
        assert!(body.get("stop").is_none());
    }

    #[test]
    fn test_response_conversion() {
        let raw = json!({
            "model": "gpt-4o-2024-08-06",
            "choices": [{"message": {"role": "assistant", "content": "Hi"}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 3, "completion_tokens": 1, "total_tokens": 4}
        });
        let response: ChatResponse = serde_json::from_value(raw).unwrap();
        let completion = OpenAiProvider::convert_completion(response, "gpt-4o").unwrap();

        assert_eq!(completion.content, "Hi");
        assert_eq!(completion.model, "gpt-4o-2024-08-06");
        assert_eq!(completion.finish_reason, Some(FinishReason::Stop));
        assert_eq!(completion.usage.unwrap().total_tokens, 4);
    }

    #[test]
    fn test_empty_choices_is_error() {
        let response: ChatResponse = serde_json::from_value(json!({"choices": []})).unwrap();
        assert!(OpenAiProvider::convert_completion(response, "gpt-4o").is_err());
    }

    #[test]
    fn test_status_mapping() {
        use reqwest::StatusCode;
        assert!(matches!(status_error("OpenAI", StatusCode::UNAUTHORIZED, ""), AgentError::Auth(_)));
        assert!(matches!(
            status_error("OpenAI", StatusCode::TOO_MANY_REQUESTS, ""),
            AgentError::RateLimited(_)
        ));
        assert!(matches!(
            status_error("OpenAI", StatusCode::BAD_GATEWAY, ""),
            AgentError::ProviderUnavailable(_)
        ));
        assert!(matches!(
            status_error("OpenAI", StatusCode::BAD_REQUEST, ""),
            AgentError::Provider(_)
        ));
    }
}
