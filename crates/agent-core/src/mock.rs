//! Scripted provider for tests and local demos.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::{AgentError, Result};
use crate::message::Message;
use crate::provider::{Completion, GenerationOptions, LlmProvider};

/// A provider that replays pre-configured replies in order and records every prompt it sees
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<(Vec<Message>, GenerationOptions)>>,
}

impl ScriptedProvider {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far, with the options they were sent with
    pub async fn prompts(&self) -> Vec<(Vec<Message>, GenerationOptions)> {
        self.prompts.lock().await.clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "Scripted"
    }

    async fn complete(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<Completion> {
        self.prompts
            .lock()
            .await
            .push((messages.to_vec(), options.clone()));

        let reply = self
            .responses
            .lock()
            .await
            .pop_front()
            .ok_or_else(|| AgentError::Provider("scripted provider ran out of replies".into()))?;

        Ok(Completion::text(reply, options.model.clone()))
    }
}
