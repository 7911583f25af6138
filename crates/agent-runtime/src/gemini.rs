//! Gemini LLM Provider
//!
//! Implementation of `LlmProvider` for the Google Generative Language API.
//! System turns are folded into `systemInstruction`; assistant turns use the `model` role.

use std::time::Duration;

use agent_core::{
    error::{AgentError, Result},
    message::{Message, Role},
    provider::{Completion, FinishReason, GenerationOptions, LlmProvider, TokenUsage},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::GeminiConfig;
use crate::openai::status_error;

/// Gemini LLM provider
pub struct GeminiProvider {
    http: reqwest::Client,
    config: GeminiConfig,
    api_key: String,
}

impl GeminiProvider {
    /// Create from configuration; fails when no API key is configured
    pub fn from_config(config: GeminiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| AgentError::Config("GOOGLE_API_KEY is not set".into()))?;

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

    fn build_request(messages: &[Message], opts: &GenerationOptions) -> GenerateRequest {
        let system: Vec<&str> = messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect();

        let contents = messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|m| Content {
                role: Some(
                    match m.role {
                        Role::Assistant => "model",
                        _ => "user",
                    }
                    .into(),
                ),
                parts: vec![Part {
                    text: m.content.clone(),
                }],
            })
            .collect();

        GenerateRequest {
            system_instruction: (!system.is_empty()).then(|| Content {
                role: None,
                parts: vec![Part {
                    text: system.join("\n\n"),
                }],
            }),
            contents,
            generation_config: GenerationConfig {
                temperature: opts.temperature,
                max_output_tokens: opts.max_tokens,
                stop_sequences: opts.stop_sequences.clone(),
            },
        }
    }

    fn convert_completion(response: GenerateResponse, model: &str) -> Result<Completion> {
        let Some(candidate) = response.candidates.into_iter().next() else {
            let reason = response
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .unwrap_or_else(|| "no candidates".into());
            return Err(AgentError::Provider(format!("Gemini returned no output: {reason}")));
        };

        let content = candidate
            .content
            .map(|c| {
                c.parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        Ok(Completion {
            content,
            model: model.to_string(),
            usage: response.usage_metadata.map(|u| TokenUsage {
                prompt_tokens: u.prompt_token_count,
                completion_tokens: u.candidates_token_count,
                total_tokens: u.total_token_count,
            }),
            finish_reason: candidate
                .finish_reason
                .as_deref()
                .map(FinishReason::from_provider),
        })
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "Gemini"
    }

    async fn complete(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<Completion> {
        let request = Self::build_request(messages, options);

        let response = self
            .http
            .post(format!(
                "{}/models/{}:generateContent",
                self.config.base_url, options.model
            ))
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AgentError::Provider(format!("Gemini request error: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error("Gemini", status, &body));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AgentError::Provider(format!("Gemini response parse error: {e}")))?;

        Self::convert_completion(body, &options.model)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop_sequences: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_api_key() {
        assert!(matches!(
            GeminiProvider::from_config(GeminiConfig::default()),
            Err(AgentError::Config(_))
        ));
    }

    #[test]
    fn test_system_turns_become_instruction() {
        let messages = vec![
            Message::system("You are EcoBot."),
            Message::user("hi"),
            Message::assistant("hello"),
            Message::user("what is a wetland?"),
        ];
        let request = GeminiProvider::build_request(
            &messages,
            &GenerationOptions::deterministic("gemini-1.5-pro"),
        );
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "You are EcoBot.");
        assert_eq!(body["contents"].as_array().unwrap().len(), 3);
        assert_eq!(body["contents"][1]["role"], "model");
        assert_eq!(body["generationConfig"]["temperature"], 0.0);
        assert!(body["generationConfig"].get("stopSequences").is_none());
    }

    #[test]
    fn test_response_conversion() {
        let raw = json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Wetlands "}, {"text": "filter water."}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 4, "totalTokenCount": 14}
        });
        let response: GenerateResponse = serde_json::from_value(raw).unwrap();
        let completion = GeminiProvider::convert_completion(response, "gemini-1.5-pro").unwrap();

        assert_eq!(completion.content, "Wetlands filter water.");
        assert_eq!(completion.finish_reason, Some(FinishReason::Stop));
        assert_eq!(completion.usage.unwrap().total_tokens, 14);
    }

    #[test]
    fn test_blocked_prompt_is_error() {
        let raw = json!({"promptFeedback": {"blockReason": "SAFETY"}});
        let response: GenerateResponse = serde_json::from_value(raw).unwrap();
        let err = GeminiProvider::convert_completion(response, "gemini-pro").unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }
}
