//! Data returned by the upstream sources

use agent_core::Reference;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// One web search result
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

impl SearchHit {
    pub fn reference(&self) -> Reference {
        to_reference(json!({
            "source": "web_search",
            "title": self.title,
            "url": self.url,
        }))
    }
}

/// Summary of one Wikipedia article
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WikiPage {
    pub title: String,
    pub summary: String,
    pub url: String,
}

impl WikiPage {
    pub fn reference(&self) -> Reference {
        to_reference(json!({
            "source": "wikipedia",
            "title": self.title,
            "url": self.url,
        }))
    }
}

fn to_reference(value: serde_json::Value) -> Reference {
    match value {
        serde_json::Value::Object(map) => map,
        _ => Reference::new(),
    }
}
