//! Error Types for Tools

use agent_core::AgentError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ToolError>;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{service} returned HTTP {status}")]
    Status { service: &'static str, status: u16 },

    #[error("Unexpected response from {service}: {message}")]
    Response {
        service: &'static str,
        message: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<ToolError> for AgentError {
    fn from(err: ToolError) -> Self {
        Self::ToolExecution(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converts_to_tool_execution() {
        let err: AgentError = ToolError::Status {
            service: "wikipedia",
            status: 503,
        }
        .into();
        assert!(matches!(err, AgentError::ToolExecution(msg) if msg == "wikipedia returned HTTP 503"));
    }
}
