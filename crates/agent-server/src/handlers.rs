//! HTTP/WebSocket Handlers

use axum::{
    Json,
    extract::{
        State, WebSocketUpgrade,
        rejection::JsonRejection,
        ws::{Message as WsMessage, WebSocket},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use agent_core::{AgentError, AgentInput, FileReference, Message, Reference, Role, conversation};
use agent_runtime::{DEFAULT_MODEL, build_agent};
use agent_tools::Mode;

use crate::error::ApiError;
use crate::state::AppState;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Roles a client may send
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    #[default]
    User,
    Assistant,
    System,
}

impl From<ChatRole> for Role {
    fn from(role: ChatRole) -> Self {
        match role {
            ChatRole::User => Self::User,
            ChatRole::Assistant => Self::Assistant,
            ChatRole::System => Self::System,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct ChatMessage {
    pub content: String,
    #[serde(default)]
    pub role: ChatRole,
}

impl From<&ChatMessage> for Message {
    fn from(msg: &ChatMessage) -> Self {
        Self::new(msg.role.into(), msg.content.clone())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub files: Option<Vec<FileReference>>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub mode: Mode,
    pub session_id: String,
}

fn default_model() -> String {
    DEFAULT_MODEL.into()
}

#[derive(Debug, Serialize)]
pub struct AgentResponse {
    pub content: String,
    pub references: Vec<Reference>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}

/// Run one agent invocation over the submitted conversation
pub async fn generate(
    State(state): State<AppState>,
    payload: Result<Json<AgentRequest>, JsonRejection>,
) -> Result<Json<AgentResponse>, ApiError> {
    let Json(request) = payload?;

    tracing::info!(
        session_id = %request.session_id,
        model = %request.model,
        mode = %request.mode,
        messages = request.messages.len(),
        "Generating response"
    );

    let messages: Vec<Message> = request.messages.iter().map(Message::from).collect();
    let files = request.files.as_deref().unwrap_or_default();
    let adapted = conversation::adapt(&messages, files)?;

    let tools = state
        .toolbox
        .tools_for(request.mode)
        .map_err(AgentError::from)?;
    let agent = build_agent(
        &request.model,
        &state.system_prompt,
        tools,
        state.backends.as_ref(),
    )?;

    let output = agent
        .invoke(AgentInput {
            input: adapted.current_input,
            chat_history: adapted.history,
        })
        .await?;

    tracing::info!(
        session_id = %request.session_id,
        steps = output.intermediate_steps.len(),
        references = output.references.len(),
        "Response generated"
    );

    Ok(Json(AgentResponse {
        content: output.output,
        references: output.references,
    }))
}

/// WebSocket placeholder for streamed responses
pub async fn stream_handler(ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(handle_stream)
}

async fn handle_stream(socket: WebSocket) {
    let (mut sender, mut receiver) = socket.split();

    while let Some(msg) = receiver.next().await {
        let text = match msg {
            Ok(WsMessage::Text(text)) => text,
            Ok(WsMessage::Close(_)) => break,
            Err(e) => {
                tracing::debug!(error = %e, "WebSocket receive failed");
                break;
            }
            _ => continue,
        };

        match stub_frames(text.as_str()) {
            Ok(frames) => {
                for frame in frames {
                    if sender.send(WsMessage::Text(frame.to_string().into())).await.is_err() {
                        return;
                    }
                }
            }
            Err(error) => {
                let _ = sender.send(WsMessage::Text(error.to_string().into())).await;
                break;
            }
        }
    }

    let _ = sender.close().await;
}

/// Frames sent back for one inbound text frame, or the error frame if it is not JSON
pub fn stub_frames(text: &str) -> Result<[Value; 2], Value> {
    match serde_json::from_str::<Value>(text) {
        Ok(_) => Ok([
            json!({"content": "Streaming response...", "done": false}),
            json!({"content": "Final response", "done": true}),
        ]),
        Err(e) => Err(json!({"error": e.to_string()})),
    }
}
