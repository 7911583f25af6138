//! Prompt Template
//!
//! Fixed-order chat prompt: system instruction, chat history, the human
//! input, then the agent scratchpad (prior tool calls and observations).

use crate::message::Message;

/// Placeholder for the human turn inside a template string
pub const INPUT_VARIABLE: &str = "{input}";

/// One slot of a chat prompt
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PromptSlot {
    /// Literal system instruction
    System(String),
    /// Expands to the prior conversation turns
    ChatHistory,
    /// Human turn; `{input}` is replaced with the current input
    Human(String),
    /// Expands to the executor's intermediate messages
    AgentScratchpad,
}

/// Ordered list of prompt slots
#[derive(Clone, Debug)]
pub struct PromptTemplate {
    slots: Vec<PromptSlot>,
}

impl PromptTemplate {
    /// The agent layout: system, `chat_history`, human `{input}`, `agent_scratchpad`
    pub fn agent(system_prompt: impl Into<String>) -> Self {
        Self {
            slots: vec![
                PromptSlot::System(system_prompt.into()),
                PromptSlot::ChatHistory,
                PromptSlot::Human(INPUT_VARIABLE.into()),
                PromptSlot::AgentScratchpad,
            ],
        }
    }

    pub fn slots(&self) -> &[PromptSlot] {
        &self.slots
    }

    /// Expand the template into provider messages
    pub fn render(&self, input: &str, history: &[Message], scratchpad: &[Message]) -> Vec<Message> {
        let mut messages = Vec::with_capacity(history.len() + scratchpad.len() + 2);

        for slot in &self.slots {
            match slot {
                PromptSlot::System(text) => {
                    if !text.is_empty() {
                        messages.push(Message::system(text.clone()));
                    }
                }
                PromptSlot::ChatHistory => messages.extend(history.iter().cloned()),
                PromptSlot::Human(template) => {
                    messages.push(Message::user(template.replace(INPUT_VARIABLE, input)));
                }
                PromptSlot::AgentScratchpad => messages.extend(scratchpad.iter().cloned()),
            }
        }

        messages
    }
}
