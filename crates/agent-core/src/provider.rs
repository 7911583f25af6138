//! LLM Provider Strategy Pattern
//!
//! Defines a common interface for all LLM providers (OpenAI, Gemini, ...)
//! allowing the agent to work with any backend without code changes.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_core::provider::{GenerationOptions, LlmProvider};
//!
//! let provider = OpenAiProvider::new(config, "gpt-4o")?;
//! let completion = provider.complete(&messages, &GenerationOptions::deterministic("gpt-4o")).await?;
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::message::Message;

/// Configuration for LLM generation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Model identifier (e.g., "gpt-4o", "gemini-1.5-pro")
    pub model: String,

    /// Temperature for sampling (0.0 = deterministic, 1.0 = creative)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Stop sequences
    #[serde(default)]
    pub stop_sequences: Vec<String>,
}

const fn default_temperature() -> f32 {
    0.7
}

const fn default_max_tokens() -> u32 {
    2048
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            model: "gpt-4o".into(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            stop_sequences: Vec::new(),
        }
    }
}

impl GenerationOptions {
    /// Options with temperature pinned to zero for reproducible output
    pub fn deterministic(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: 0.0,
            ..Default::default()
        }
    }
}

/// Response from an LLM completion
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Completion {
    /// The generated text
    pub content: String,

    /// Model that generated this response
    pub model: String,

    /// Token usage statistics (if available)
    pub usage: Option<TokenUsage>,

    /// Finish reason
    pub finish_reason: Option<FinishReason>,
}

impl Completion {
    /// A plain text completion without usage data
    pub fn text(content: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            model: model.into(),
            usage: None,
            finish_reason: Some(FinishReason::Stop),
        }
    }
}

/// Token usage statistics
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Reason for completion finishing
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ContentFilter,
    Error,
}

impl FinishReason {
    /// Map a provider-specific finish string onto the shared enum
    pub fn from_provider(reason: &str) -> Self {
        match reason.to_ascii_lowercase().as_str() {
            "stop" | "end_turn" => Self::Stop,
            "length" | "max_tokens" => Self::Length,
            "content_filter" | "safety" | "recitation" => Self::ContentFilter,
            _ => Self::Error,
        }
    }
}

/// Strategy trait for LLM providers
///
/// Implement this trait to add support for new LLM backends.
/// The agent works exclusively through this interface.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "OpenAI")
    fn name(&self) -> &str;

    /// Generate a completion from messages
    async fn complete(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<Completion>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_options_defaults() {
        let opts = GenerationOptions::default();
        assert!((opts.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(opts.max_tokens, 2048);
        assert_eq!(opts.model, "gpt-4o");
    }

    #[test]
    fn test_deterministic_options() {
        let opts = GenerationOptions::deterministic("gemini-1.5-pro");
        assert!(opts.temperature.abs() < f32::EPSILON);
        assert_eq!(opts.model, "gemini-1.5-pro");
    }

    #[test]
    fn test_finish_reason_mapping() {
        assert_eq!(FinishReason::from_provider("stop"), FinishReason::Stop);
        assert_eq!(FinishReason::from_provider("MAX_TOKENS"), FinishReason::Length);
        assert_eq!(FinishReason::from_provider("SAFETY"), FinishReason::ContentFilter);
        assert_eq!(FinishReason::from_provider("weird"), FinishReason::Error);
    }
}
