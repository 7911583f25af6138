//! Web Search Tool
//!
//! Searches the web and hands the model titles, snippets and links.

use std::sync::Arc;

use async_trait::async_trait;

use agent_core::{
    Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema, tool::ParameterSchema,
};

use crate::model::SearchHit;
use crate::sources::SearchClient;

pub const NAME: &str = "web_search";
pub const NO_SEARCH_RESULT: &str = "No good DuckDuckGo Search Result was found";

/// Tool for general web search
pub struct WebSearchTool {
    client: Arc<dyn SearchClient>,
    max_results: usize,
}

impl WebSearchTool {
    pub fn new(client: Arc<dyn SearchClient>, max_results: usize) -> Self {
        Self {
            client,
            max_results,
        }
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: NAME.into(),
            description: "Search the web for information about a topic. Use this to find current or factual information.".into(),
            parameters: vec![ParameterSchema::required_string(
                "query",
                "What to search the web for",
            )],
            category: Some("search".into()),
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let query = call.str_arg("query").unwrap_or_default().trim();

        let hits = self.client.search(query, self.max_results).await?;
        tracing::info!(query, source = self.client.name(), hits = hits.len(), "web_search");

        if hits.is_empty() {
            return Ok(ToolResult::success(NAME, NO_SEARCH_RESULT));
        }

        let references = hits.iter().map(SearchHit::reference).collect();
        Ok(ToolResult::success(NAME, format_hits(&hits)).with_references(references))
    }
}

fn format_hits(hits: &[SearchHit]) -> String {
    hits.iter()
        .map(|hit| {
            if hit.snippet.is_empty() {
                format!("{}\n{}", hit.title, hit.url)
            } else {
                format!("{}\n{}\n{}", hit.title, hit.snippet, hit.url)
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
