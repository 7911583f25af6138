//! HTTP error mapping

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use agent_core::AgentError;

/// Failure of a request, rendered as `{"detail": ...}`
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidBody(rejection.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Agent(e) if e.is_validation() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn detail(&self) -> String {
        match self {
            Self::Agent(e) if e.is_validation() => e.to_string(),
            other => format!("Agent execution error: {other}"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = self.detail();

        if status.is_server_error() {
            tracing::error!(%detail, "Request failed");
        } else {
            tracing::warn!(%detail, "Request rejected");
        }

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
