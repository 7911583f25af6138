//! Upstream Sources
//!
//! Abstractions over the services the tools query, with HTTP implementations.

mod duckduckgo;
mod mock;
mod wikipedia;

pub use duckduckgo::{DuckDuckGoClient, parse_results};
pub use mock::StaticSources;
pub use wikipedia::WikipediaClient;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{SearchHit, WikiPage};

/// Web search backend (Strategy pattern)
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Up to `limit` hits for the query, best first
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>>;

    fn name(&self) -> &str;
}

/// Encyclopedia backend (Strategy pattern)
#[async_trait]
pub trait EncyclopediaClient: Send + Sync {
    /// Summaries of up to `limit` articles matching the query
    async fn lookup(&self, query: &str, limit: usize) -> Result<Vec<WikiPage>>;

    fn name(&self) -> &str;
}
