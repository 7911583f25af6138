//! Error Types

use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Agent error types
#[derive(Error, Debug)]
pub enum AgentError {
    /// LLM provider error
    #[error("Provider error: {0}")]
    Provider(String),

    /// Provider unavailable or not responding
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Tool not found in registry
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Tool validation failed
    #[error("Tool validation error: {0}")]
    ToolValidation(String),

    /// Tool execution failed
    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    /// Maximum iterations reached in reasoning loop
    #[error("Maximum iterations ({0}) reached")]
    MaxIterations(usize),

    /// Parse error (e.g., tool call parsing)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration error (missing credentials, bad settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The request carried no message with the user role
    #[error("No user message provided")]
    MissingUserMessage,

    /// Rate limited
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    Auth(String),
}

impl AgentError {
    /// Whether the error stems from the caller's input rather than the agent pipeline
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::MissingUserMessage)
    }
}
