//! # agent-runtime
//!
//! Runtime providers for the agent service and the assembler that binds a
//! model, a system prompt and a tool set into an [`Agent`].
//!
//! ## Providers
//!
//! - **OpenAI** (provider A): chat completions API, used for `gpt*` models and as the fallback
//! - **Gemini** (provider B): Google Generative Language API, used for `gemini*` models
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_runtime::{ProviderFactory, ProviderSettings, build_agent};
//!
//! let backends = ProviderFactory::new(ProviderSettings::from_env());
//! let agent = build_agent("gpt-4o", SYSTEM_PROMPT, tools, &backends)?;
//! let output = agent.invoke(input).await?;
//! ```

pub mod assembler;
pub mod config;
pub mod gemini;
pub mod openai;

pub use assembler::{
    Backend, BackendFactory, DEFAULT_MODEL, ModelSelection, ProviderFactory, build_agent,
    select_backend,
};
pub use config::{GeminiConfig, OpenAiConfig, ProviderSettings};
pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;

// Re-export core types for convenience
pub use agent_core::{
    Agent, AgentError, AgentInput, AgentOutput, LlmProvider, Message, Result, Role, Tool,
    ToolRegistry,
};
