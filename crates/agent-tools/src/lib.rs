//! # agent-tools
//!
//! Capabilities the model may call while answering, and the table that
//! decides which of them each request mode exposes.
//!
//! ```text
//! mode ──► MODE_TOOLSETS ──► [ToolKind] ──► ToolRegistry
//!                                 │
//!            ┌────────────────────┴──────────────────┐
//!            ▼                                       ▼
//!     web_search (DuckDuckGo)              wikipedia (MediaWiki)
//! ```
//!
//! Tools are stateless wrappers built fresh for every request. Nothing here
//! retries, caches or rate-limits the upstream services.

pub mod config;
pub mod error;
pub mod mode;
pub mod model;
pub mod sources;
pub mod svckit;

pub use config::ToolsConfig;
pub use error::{Result, ToolError};
pub use mode::{Mode, ToolKind, Toolbox, assemble, get_tools, get_tools_with};
pub use model::{SearchHit, WikiPage};

/// Re-export tools for easy registration
pub mod tools {
    pub use crate::svckit::{WebSearchTool, WikipediaTool};
}
