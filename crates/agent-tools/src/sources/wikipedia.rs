//! Wikipedia Client
//!
//! Full-text search through the MediaWiki action API, then one REST summary
//! request per matching title.

use async_trait::async_trait;
use serde::Deserialize;

use super::EncyclopediaClient;
use crate::config::ToolsConfig;
use crate::error::{Result, ToolError};
use crate::model::WikiPage;

const SERVICE: &str = "wikipedia";
const DEFAULT_BASE_URL: &str = "https://en.wikipedia.org";

pub struct WikipediaClient {
    http: reqwest::Client,
    base_url: String,
}

impl WikipediaClient {
    pub fn new(config: &ToolsConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            http,
            base_url: DEFAULT_BASE_URL.into(),
        })
    }

    /// Point at another MediaWiki host (e.g. a different language edition)
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn search_titles(&self, query: &str, limit: usize) -> Result<Vec<String>> {
        let url = format!(
            "{}/w/api.php?action=query&list=search&format=json&srprop=&srlimit={}&srsearch={}",
            self.base_url,
            limit,
            urlencoding::encode(query)
        );

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ToolError::Status {
                service: SERVICE,
                status: status.as_u16(),
            });
        }

        let body: SearchResponse = response.json().await?;
        Ok(body
            .query
            .map(|q| q.search.into_iter().map(|s| s.title).collect())
            .unwrap_or_default())
    }

    async fn summary(&self, title: &str) -> Result<WikiPage> {
        let slug = title.replace(' ', "_");
        let url = format!(
            "{}/api/rest_v1/page/summary/{}",
            self.base_url,
            urlencoding::encode(&slug)
        );

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ToolError::Status {
                service: SERVICE,
                status: status.as_u16(),
            });
        }

        let body: SummaryResponse = response.json().await?;
        let extract = body.extract.unwrap_or_default();
        if extract.trim().is_empty() {
            return Err(ToolError::Response {
                service: SERVICE,
                message: format!("empty summary for '{title}'"),
            });
        }

        let page_url = body
            .content_urls
            .and_then(|u| u.desktop)
            .map(|d| d.page)
            .unwrap_or_else(|| format!("{}/wiki/{}", self.base_url, urlencoding::encode(&slug)));

        Ok(WikiPage {
            title: body.title.unwrap_or_else(|| title.to_string()),
            summary: extract,
            url: page_url,
        })
    }
}

#[async_trait]
impl EncyclopediaClient for WikipediaClient {
    async fn lookup(&self, query: &str, limit: usize) -> Result<Vec<WikiPage>> {
        let titles = self.search_titles(query, limit).await?;

        let mut pages = Vec::with_capacity(titles.len());
        for title in titles.iter().take(limit) {
            match self.summary(title).await {
                Ok(page) => pages.push(page),
                Err(e) => tracing::debug!(%title, error = %e, "Skipping Wikipedia page"),
            }
        }

        tracing::debug!(query, pages = pages.len(), "Wikipedia lookup");
        Ok(pages)
    }

    fn name(&self) -> &str {
        "Wikipedia"
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    query: Option<SearchQuery>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchEntry>,
}

#[derive(Debug, Deserialize)]
struct SearchEntry {
    title: String,
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    extract: Option<String>,
    #[serde(default)]
    content_urls: Option<ContentUrls>,
}

#[derive(Debug, Deserialize)]
struct ContentUrls {
    #[serde(default)]
    desktop: Option<PageUrl>,
}

#[derive(Debug, Deserialize)]
struct PageUrl {
    page: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_search_response_shape() {
        let body: SearchResponse = serde_json::from_value(json!({
            "batchcomplete": "",
            "query": {"searchinfo": {"totalhits": 2}, "search": [
                {"ns": 0, "title": "Keystone species", "pageid": 1},
                {"ns": 0, "title": "Ecosystem engineer", "pageid": 2}
            ]}
        }))
        .unwrap();
        let titles: Vec<String> = body.query.unwrap().search.into_iter().map(|s| s.title).collect();
        assert_eq!(titles, vec!["Keystone species", "Ecosystem engineer"]);
    }

    #[test]
    fn test_summary_response_shape() {
        let body: SummaryResponse = serde_json::from_value(json!({
            "title": "Keystone species",
            "extract": "A keystone species is ...",
            "content_urls": {"desktop": {"page": "https://en.wikipedia.org/wiki/Keystone_species"}}
        }))
        .unwrap();
        assert_eq!(body.title.as_deref(), Some("Keystone species"));
        assert_eq!(
            body.content_urls.unwrap().desktop.unwrap().page,
            "https://en.wikipedia.org/wiki/Keystone_species"
        );
    }

    #[test]
    fn test_base_url_override() {
        let client = WikipediaClient::new(&ToolsConfig::default())
            .unwrap()
            .with_base_url("https://de.wikipedia.org/");
        assert_eq!(client.base_url, "https://de.wikipedia.org");
    }
}
