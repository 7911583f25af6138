//! Application State

use std::sync::Arc;

use agent_runtime::BackendFactory;
use agent_tools::Toolbox;

use crate::prompt::ECOBOT_PROMPT;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Builds a provider for each request's model
    pub backends: Arc<dyn BackendFactory>,

    /// Builds each request's tool set
    pub toolbox: Toolbox,

    /// System instruction for every agent
    pub system_prompt: Arc<str>,
}

impl AppState {
    pub fn new(backends: Arc<dyn BackendFactory>, toolbox: Toolbox) -> Self {
        Self {
            backends,
            toolbox,
            system_prompt: Arc::from(ECOBOT_PROMPT),
        }
    }
}
