//! Agent Assembler
//!
//! Picks a model backend from the model identifier and binds it, the system
//! prompt and the tool set into an [`Agent`] with deterministic decoding.

use std::sync::Arc;

use agent_core::{
    LlmProvider, ToolRegistry,
    error::Result,
    provider::GenerationOptions,
    reasoning::{Agent, AgentBuilder},
};

use crate::config::ProviderSettings;
use crate::gemini::GeminiProvider;
use crate::openai::OpenAiProvider;

/// Model used when the identifier matches no known family
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Iteration cap for the reasoning loop
const MAX_ITERATIONS: usize = 15;

/// Model backend family
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    /// OpenAI chat completions
    OpenAi,
    /// Google Gemini
    Gemini,
}

/// Backend plus the model name to request from it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelSelection {
    pub backend: Backend,
    pub model: String,
}

/// Prefix dispatch: `gpt*` → OpenAI, `gemini*` → Gemini, anything else → OpenAI's default model
pub fn select_backend(model_id: &str) -> ModelSelection {
    if model_id.starts_with("gpt") {
        ModelSelection {
            backend: Backend::OpenAi,
            model: model_id.to_string(),
        }
    } else if model_id.starts_with("gemini") {
        ModelSelection {
            backend: Backend::Gemini,
            model: model_id.to_string(),
        }
    } else {
        ModelSelection {
            backend: Backend::OpenAi,
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

/// Constructs provider clients for a model selection
pub trait BackendFactory: Send + Sync {
    fn create(&self, selection: &ModelSelection) -> Result<Arc<dyn LlmProvider>>;
}

/// Production factory backed by [`ProviderSettings`]
#[derive(Clone, Debug)]
pub struct ProviderFactory {
    settings: Arc<ProviderSettings>,
}

impl ProviderFactory {
    pub fn new(settings: ProviderSettings) -> Self {
        Self {
            settings: Arc::new(settings),
        }
    }
}

impl BackendFactory for ProviderFactory {
    fn create(&self, selection: &ModelSelection) -> Result<Arc<dyn LlmProvider>> {
        let provider: Arc<dyn LlmProvider> = match selection.backend {
            Backend::OpenAi => Arc::new(OpenAiProvider::from_config(self.settings.openai.clone())?),
            Backend::Gemini => Arc::new(GeminiProvider::from_config(self.settings.gemini.clone())?),
        };
        tracing::debug!(provider = provider.name(), model = %selection.model, "Backend constructed");
        Ok(provider)
    }
}

/// Build an agent bound to the selected model, the system prompt and the tools.
///
/// Backend construction failures (e.g. missing credentials) are returned as-is.
pub fn build_agent(
    model_id: &str,
    system_prompt: &str,
    tools: ToolRegistry,
    backends: &dyn BackendFactory,
) -> Result<Agent> {
    let selection = select_backend(model_id);
    if selection.model != model_id {
        tracing::debug!(requested = model_id, model = %selection.model, "Unknown model family, using default");
    }

    let provider = backends.create(&selection)?;

    AgentBuilder::new()
        .provider(provider)
        .tools(tools)
        .system_prompt(system_prompt)
        .generation(GenerationOptions::deterministic(selection.model))
        .max_iterations(MAX_ITERATIONS)
        .handle_parsing_errors(true)
        .return_intermediate_steps(true)
        .build()
}
