//! Request modes and the tool set each one exposes

use std::fmt;
use std::sync::Arc;

use agent_core::ToolRegistry;
use serde::{Deserialize, Deserializer, Serialize};

use crate::config::ToolsConfig;
use crate::error::Result;
use crate::sources::{DuckDuckGoClient, EncyclopediaClient, SearchClient, WikipediaClient};
use crate::svckit::{WebSearchTool, WikipediaTool};

/// Request mode selecting a tool set
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Normal,
    Advanced,
}

impl Mode {
    /// Parse a mode name; anything unrecognised is `Normal`
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "advanced" => Self::Advanced,
            _ => Self::Normal,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Mode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::from_name(&name))
    }
}

/// A capability that can be placed in a tool set
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToolKind {
    WebSearch,
    Wikipedia,
}

/// Which tools each mode gets. Advanced currently matches normal.
pub const MODE_TOOLSETS: &[(Mode, &[ToolKind])] = &[
    (Mode::Normal, &[ToolKind::WebSearch, ToolKind::Wikipedia]),
    (Mode::Advanced, &[ToolKind::WebSearch, ToolKind::Wikipedia]),
];

/// Tool kinds for a mode, falling back to the normal set
pub fn toolset(mode: Mode) -> &'static [ToolKind] {
    MODE_TOOLSETS
        .iter()
        .find(|(m, _)| *m == mode)
        .or_else(|| MODE_TOOLSETS.iter().find(|(m, _)| *m == Mode::Normal))
        .map(|&(_, kinds)| kinds)
        .unwrap_or_default()
}

/// Fresh tools for `mode` with settings from the environment
pub fn get_tools(mode: Mode) -> Result<ToolRegistry> {
    get_tools_with(mode, &ToolsConfig::from_env())
}

/// Fresh tools for `mode` backed by new DuckDuckGo and Wikipedia clients
pub fn get_tools_with(mode: Mode, config: &ToolsConfig) -> Result<ToolRegistry> {
    Toolbox::live(config.clone()).tools_for(mode)
}

type Sources = (Arc<dyn SearchClient>, Arc<dyn EncyclopediaClient>);

/// Recipe for the per-request tool sets
#[derive(Clone)]
pub struct Toolbox {
    config: ToolsConfig,
    fixed: Option<Sources>,
}

impl Toolbox {
    /// Connect to DuckDuckGo and Wikipedia with new clients on every request
    pub fn live(config: ToolsConfig) -> Self {
        Self {
            config,
            fixed: None,
        }
    }

    /// Always use the given sources
    pub fn with_sources(
        config: ToolsConfig,
        search: Arc<dyn SearchClient>,
        encyclopedia: Arc<dyn EncyclopediaClient>,
    ) -> Self {
        Self {
            config,
            fixed: Some((search, encyclopedia)),
        }
    }

    /// A fresh registry holding the tools of `mode`
    pub fn tools_for(&self, mode: Mode) -> Result<ToolRegistry> {
        if let Some((search, encyclopedia)) = &self.fixed {
            return Ok(assemble(mode, &self.config, search, encyclopedia));
        }

        let search: Arc<dyn SearchClient> = Arc::new(DuckDuckGoClient::new(&self.config)?);
        let encyclopedia: Arc<dyn EncyclopediaClient> =
            Arc::new(WikipediaClient::new(&self.config)?);
        Ok(assemble(mode, &self.config, &search, &encyclopedia))
    }

    pub const fn config(&self) -> &ToolsConfig {
        &self.config
    }
}

/// Build the registry for `mode` over arbitrary sources
pub fn assemble(
    mode: Mode,
    config: &ToolsConfig,
    search: &Arc<dyn SearchClient>,
    encyclopedia: &Arc<dyn EncyclopediaClient>,
) -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    for kind in toolset(mode) {
        match kind {
            ToolKind::WebSearch => registry.register(WebSearchTool::new(
                Arc::clone(search),
                config.max_search_results,
            )),
            ToolKind::Wikipedia => registry.register(WikipediaTool::new(
                Arc::clone(encyclopedia),
                config.wikipedia_top_k,
                config.wikipedia_max_chars,
            )),
        }
    }

    tracing::debug!(%mode, tools = ?registry.names(), "Assembled tool set");
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::StaticSources;

    #[test]
    fn test_mode_parsing() {
        assert_eq!(Mode::from_name("advanced"), Mode::Advanced);
        assert_eq!(Mode::from_name("ADVANCED"), Mode::Advanced);
        assert_eq!(Mode::from_name("normal"), Mode::Normal);
        assert_eq!(Mode::from_name("expert"), Mode::Normal);
        assert_eq!(Mode::from_name(""), Mode::Normal);
    }

    #[test]
    fn test_mode_deserialize_falls_back() {
        let mode: Mode = serde_json::from_str("\"turbo\"").unwrap();
        assert_eq!(mode, Mode::Normal);
        let mode: Mode = serde_json::from_str("\"advanced\"").unwrap();
        assert_eq!(mode, Mode::Advanced);
        assert!(serde_json::from_str::<Mode>("42").is_err());
    }

    #[test]
    fn test_every_mode_has_a_toolset() {
        for mode in [Mode::Normal, Mode::Advanced] {
            assert_eq!(toolset(mode), &[ToolKind::WebSearch, ToolKind::Wikipedia]);
        }
    }

    #[test]
    fn test_assemble_registers_named_tools() {
        let sources = Arc::new(StaticSources::new());
        let search: Arc<dyn SearchClient> = sources.clone();
        let encyclopedia: Arc<dyn EncyclopediaClient> = sources;

        let registry = assemble(Mode::Normal, &ToolsConfig::default(), &search, &encyclopedia);

        assert_eq!(registry.names(), vec!["web_search", "wikipedia"]);
    }

    #[tokio::test]
    async fn test_toolbox_cuts_independent_registries() {
        let sources = Arc::new(StaticSources::new().with_page("Lichen", "A symbiosis."));
        let toolbox = Toolbox::with_sources(ToolsConfig::default(), sources.clone(), sources);

        let first = toolbox.tools_for(Mode::Normal).unwrap();
        let second = toolbox.tools_for(Mode::Advanced).unwrap();
        assert_eq!(first.names(), second.names());

        let call = agent_core::ToolCall::new("wikipedia")
            .with_argument("query", serde_json::json!("lichen"));
        let result = second.execute(&call).await.unwrap();
        assert!(result.output.contains("Page: Lichen"));
    }

    #[test]
    fn test_get_tools_with_live_clients() {
        assert_eq!(get_tools(Mode::Normal).unwrap().len(), 2);

        let registry = get_tools_with(Mode::Advanced, &ToolsConfig::default()).unwrap();
        assert_eq!(registry.len(), 2);
        assert!(registry.get("web_search").is_some());
        assert!(registry.get("wikipedia").is_some());
    }
}
