//! Conversation Adapter
//!
//! Splits an incoming message list into the current input (the last user
//! turn, with attachment markers appended) and the history that precedes and
//! surrounds it.

use serde::{Deserialize, Serialize};

use crate::error::{AgentError, Result};
use crate::message::{Message, Role};

/// File attached to a single request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReference {
    pub url: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
}

impl FileReference {
    pub fn new(url: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            mime_type: mime_type.into(),
        }
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    /// Plain-text marker line appended to the current input
    pub fn marker(&self) -> String {
        if self.is_image() {
            format!("[Image URL: {}]", self.url)
        } else {
            format!("[File URL: {}]", self.url)
        }
    }
}

/// Result of adapting a request's messages for the agent
#[derive(Clone, Debug)]
pub struct AdaptedConversation {
    /// Text of the last user turn plus attachment markers
    pub current_input: String,
    /// Every other turn, in original order
    pub history: Vec<Message>,
}

/// Build the agent input from role-tagged messages and optional attachments.
///
/// Fails with [`AgentError::MissingUserMessage`] when no user turn exists or
/// the last one is empty.
pub fn adapt(messages: &[Message], files: &[FileReference]) -> Result<AdaptedConversation> {
    let current_idx = messages
        .iter()
        .rposition(|m| m.role == Role::User)
        .ok_or(AgentError::MissingUserMessage)?;

    if messages[current_idx].content.is_empty() {
        return Err(AgentError::MissingUserMessage);
    }

    let history = messages
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != current_idx)
        .map(|(_, m)| m.clone())
        .collect();

    let mut current_input = messages[current_idx].content.clone();
    if !files.is_empty() {
        let markers: Vec<String> = files.iter().map(FileReference::marker).collect();
        current_input.push('\n');
        current_input.push_str(&markers.join("\n"));
    }

    Ok(AdaptedConversation {
        current_input,
        history,
    })
}
