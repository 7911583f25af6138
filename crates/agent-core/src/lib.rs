//! # agent-core
//!
//! Core agent logic with provider-agnostic LLM abstraction and a small tool system.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Agent                                │
//! │  ┌──────────────┐  ┌─────────────┐  ┌─────────────────────┐  │
//! │  │ PromptTemplate│──│    Tools    │──│   LlmProvider       │  │
//! │  │ + scratchpad │  │   Registry  │  │   (Strategy)        │  │
//! │  └──────────────┘  └─────────────┘  └─────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! An [`Agent`] is bound to one provider, one prompt and one tool set and is
//! invoked once per request with the current input and prior chat history.

pub mod conversation;
pub mod error;
pub mod message;
pub mod mock;
pub mod prompt;
pub mod provider;
pub mod reasoning;
pub mod tool;

pub use conversation::{AdaptedConversation, FileReference};
pub use error::{AgentError, Result};
pub use message::{Message, Role};
pub use provider::LlmProvider;
pub use reasoning::{Agent, AgentInput, AgentOutput, AgentStep};
pub use tool::{Reference, Tool, ToolCall, ToolRegistry, ToolResult, ToolSchema};
