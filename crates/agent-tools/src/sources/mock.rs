//! Canned sources for tests and offline runs

use async_trait::async_trait;

use super::{EncyclopediaClient, SearchClient};
use crate::error::{Result, ToolError};
use crate::model::{SearchHit, WikiPage};

/// Serves fixed hits and pages regardless of the query
#[derive(Clone, Debug, Default)]
pub struct StaticSources {
    hits: Vec<SearchHit>,
    pages: Vec<WikiPage>,
    offline: bool,
}

impl StaticSources {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_hit(mut self, title: &str, url: &str, snippet: &str) -> Self {
        self.hits.push(SearchHit {
            title: title.into(),
            url: url.into(),
            snippet: snippet.into(),
        });
        self
    }

    #[must_use]
    pub fn with_page(mut self, title: &str, summary: &str) -> Self {
        self.pages.push(WikiPage {
            title: title.into(),
            summary: summary.into(),
            url: format!("https://en.wikipedia.org/wiki/{}", title.replace(' ', "_")),
        });
        self
    }

    /// Every call fails as if the upstream were unreachable
    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    fn check(&self, service: &'static str) -> Result<()> {
        if self.offline {
            return Err(ToolError::Status {
                service,
                status: 503,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl SearchClient for StaticSources {
    async fn search(&self, _query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        self.check("duckduckgo")?;
        Ok(self.hits.iter().take(limit).cloned().collect())
    }

    fn name(&self) -> &str {
        "Static"
    }
}

#[async_trait]
impl EncyclopediaClient for StaticSources {
    async fn lookup(&self, _query: &str, limit: usize) -> Result<Vec<WikiPage>> {
        self.check("wikipedia")?;
        Ok(self.pages.iter().take(limit).cloned().collect())
    }

    fn name(&self) -> &str {
        "Static"
    }
}
