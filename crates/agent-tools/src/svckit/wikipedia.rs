//! Wikipedia Tool

use std::sync::Arc;

use async_trait::async_trait;

use agent_core::{
    Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema, tool::ParameterSchema,
};

use crate::model::WikiPage;
use crate::sources::EncyclopediaClient;

pub const NAME: &str = "wikipedia";
pub const NO_WIKIPEDIA_RESULT: &str = "No good Wikipedia Search Result was found";

/// Tool for encyclopedia lookups
pub struct WikipediaTool {
    client: Arc<dyn EncyclopediaClient>,
    top_k: usize,
    max_chars: usize,
}

impl WikipediaTool {
    pub fn new(client: Arc<dyn EncyclopediaClient>, top_k: usize, max_chars: usize) -> Self {
        Self {
            client,
            top_k,
            max_chars,
        }
    }
}

#[async_trait]
impl Tool for WikipediaTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: NAME.into(),
            description: "A wrapper around Wikipedia. Useful for when you need to answer general questions about people, places, companies, facts, historical events, or other subjects. Input should be a search query.".into(),
            parameters: vec![ParameterSchema::required_string(
                "query",
                "query to look up on wikipedia",
            )],
            category: Some("search".into()),
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let query = call.str_arg("query").unwrap_or_default().trim();

        let pages = self.client.lookup(query, self.top_k).await?;
        tracing::info!(query, source = self.client.name(), pages = pages.len(), "wikipedia");

        if pages.is_empty() {
            return Ok(ToolResult::success(NAME, NO_WIKIPEDIA_RESULT));
        }

        let references = pages.iter().map(WikiPage::reference).collect();
        Ok(ToolResult::success(NAME, format_pages(&pages, self.max_chars))
            .with_references(references))
    }
}

/// `Page: <title>\nSummary: <summary>` blocks separated by a blank line,
/// cut to at most `max_chars` characters
pub fn format_pages(pages: &[WikiPage], max_chars: usize) -> String {
    let text = pages
        .iter()
        .map(|page| format!("Page: {}\nSummary: {}", page.title, page.summary))
        .collect::<Vec<_>>()
        .join("\n\n");

    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => text[..cut].to_string(),
        None => text,
    }
}
