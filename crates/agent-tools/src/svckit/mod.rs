//! Service Kit - Agent Tools
//!
//! Tools that implement `agent_core::Tool` on top of the upstream sources.

mod web_search;
mod wikipedia;

pub use web_search::{NO_SEARCH_RESULT, WebSearchTool};
pub use wikipedia::{NO_WIKIPEDIA_RESULT, WikipediaTool, format_pages};
