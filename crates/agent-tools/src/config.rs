//! Tool HTTP settings

use std::time::Duration;

/// Settings shared by the tool HTTP clients
#[derive(Clone, Debug)]
pub struct ToolsConfig {
    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Maximum web search hits returned to the model
    pub max_search_results: usize,

    /// Number of Wikipedia pages summarised per lookup
    pub wikipedia_top_k: usize,

    /// Cap on the characters of Wikipedia text returned per lookup
    pub wikipedia_max_chars: usize,

    /// User agent sent to upstream services
    pub user_agent: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            max_search_results: 5,
            wikipedia_top_k: 3,
            wikipedia_max_chars: 4000,
            user_agent: concat!("EcoBotAgent/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

impl ToolsConfig {
    /// Defaults overridden by `TOOLS_HTTP_TIMEOUT_SECS` and `WEB_SEARCH_MAX_RESULTS`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            timeout_secs: get("TOOLS_HTTP_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.timeout_secs),
            max_search_results: get("WEB_SEARCH_MAX_RESULTS")
                .and_then(|v| v.parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(defaults.max_search_results),
            ..defaults
        }
    }

    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
