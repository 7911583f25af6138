//! DuckDuckGo Search Client
//!
//! Queries the no-JavaScript HTML endpoint and scrapes result links and snippets.

use async_trait::async_trait;

use super::SearchClient;
use crate::config::ToolsConfig;
use crate::error::{Result, ToolError};
use crate::model::SearchHit;

const SERVICE: &str = "duckduckgo";
const ENDPOINT: &str = "https://html.duckduckgo.com/html/";

pub struct DuckDuckGoClient {
    http: reqwest::Client,
}

impl DuckDuckGoClient {
    pub fn new(config: &ToolsConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl SearchClient for DuckDuckGoClient {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let url = format!("{ENDPOINT}?q={}", urlencoding::encode(query));

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ToolError::Status {
                service: SERVICE,
                status: status.as_u16(),
            });
        }

        let html = response.text().await?;
        let hits = parse_results(&html, limit);
        tracing::debug!(query, hits = hits.len(), "DuckDuckGo search");
        Ok(hits)
    }

    fn name(&self) -> &str {
        "DuckDuckGo"
    }
}

/// Extract up to `limit` organic results from a DuckDuckGo HTML page
pub fn parse_results(html: &str, limit: usize) -> Vec<SearchHit> {
    let mut hits = Vec::new();

    for chunk in html.split("class=\"result__a\"").skip(1) {
        if hits.len() >= limit {
            break;
        }

        let Some(url) = attribute(chunk, "href").and_then(|href| resolve_link(&href)) else {
            continue;
        };

        let title = link_text(chunk).map(|t| clean_text(&t)).unwrap_or_default();
        if title.is_empty() {
            continue;
        }

        let snippet = chunk
            .split_once("class=\"result__snippet\"")
            .and_then(|(_, rest)| link_text(rest))
            .map(|s| clean_text(&s))
            .unwrap_or_default();

        hits.push(SearchHit {
            title,
            url,
            snippet,
        });
    }

    hits
}

/// Value of `name="..."` in the first tag of `chunk`
fn attribute(chunk: &str, name: &str) -> Option<String> {
    let tag_end = chunk.find('>')?;
    let tag = &chunk[..tag_end];
    let (_, rest) = tag.split_once(&format!("{name}=\""))?;
    rest.split('"').next().map(str::to_string)
}

/// Inner HTML of the element whose opening tag starts `chunk`
fn link_text(chunk: &str) -> Option<String> {
    let (_, rest) = chunk.split_once('>')?;
    let end = rest.find("</a>")?;
    Some(rest[..end].to_string())
}

/// Turn a result href into a direct absolute URL, unwrapping DuckDuckGo redirects
fn resolve_link(href: &str) -> Option<String> {
    let href = decode_entities(href);

    let url = if let Some((_, target)) = href.split_once("uddg=") {
        let encoded = target.split('&').next().unwrap_or_default();
        urlencoding::decode(encoded).ok()?.into_owned()
    } else if let Some(rest) = href.strip_prefix("//") {
        format!("https://{rest}")
    } else {
        href
    };

    let is_http = url.starts_with("http://") || url.starts_with("https://");
    let is_internal = url.contains("duckduckgo.com/");
    (is_http && !is_internal).then_some(url)
}

fn clean_text(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    decode_entities(text.split_whitespace().collect::<Vec<_>>().join(" ").as_str())
}

fn decode_entities(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
<div class="result results_links results_links_deep web-result">
  <h2 class="result__title">
    <a rel="nofollow" class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fen.wikipedia.org%2Fwiki%2FKeystone_species&amp;rut=abc">Keystone species - <b>Wikipedia</b></a>
  </h2>
  <a class="result__snippet" href="//duckduckgo.com/l/?uddg=x">A <b>keystone species</b> is a species that has a disproportionately large effect &amp; more.</a>
</div>
<div class="result results_links results_links_deep result--ad">
  <a rel="nofollow" class="result__a" href="https://duckduckgo.com/y.js?ad_domain=shop.example">Buy stuff</a>
</div>
<div class="result">
  <a rel="nofollow" class="result__a" href="https://www.nationalgeographic.org/keystone">Keystone Species | National Geographic</a>
</div>
<div class="result">
  <a rel="nofollow" class="result__a" href="https://third.example/page">Third</a>
</div>
"#;

    #[test]
    fn test_parse_results() {
        let hits = parse_results(PAGE, 5);
        assert_eq!(hits.len(), 3);

        assert_eq!(hits[0].title, "Keystone species - Wikipedia");
        assert_eq!(hits[0].url, "https://en.wikipedia.org/wiki/Keystone_species");
        assert_eq!(
            hits[0].snippet,
            "A keystone species is a species that has a disproportionately large effect & more."
        );

        assert_eq!(hits[1].url, "https://www.nationalgeographic.org/keystone");
        assert!(hits[1].snippet.is_empty());
    }

    #[test]
    fn test_parse_results_respects_limit() {
        assert_eq!(parse_results(PAGE, 1).len(), 1);
        assert!(parse_results(PAGE, 0).is_empty());
        assert!(parse_results("<html>no results</html>", 5).is_empty());
    }

    #[test]
    fn test_resolve_link() {
        assert_eq!(
            resolve_link("//example.org/a").as_deref(),
            Some("https://example.org/a")
        );
        assert_eq!(resolve_link("/relative"), None);
        assert_eq!(resolve_link("https://duckduckgo.com/y.js?ad=1"), None);
    }
}
