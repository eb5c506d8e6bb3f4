
use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use crate::{ChatError, Result};

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// One listing record from the remote dataset. Only the fields used for
/// embedding are deserialized; everything else in the payload is ignored.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Item {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct ItemsResponse {
    items: Vec<Item>,
}

/// Client for the public Social Map listings endpoint.
#[derive(Debug, Clone)]
pub struct DatasetClient {
    url: Url,
    agent: ureq::Agent,
}

impl DatasetClient {
    #[inline]
    pub fn new(url: Url) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT_SECONDS)))
            .build()
            .into();
        Self { url, agent }
    }

    /// Fetch the full item collection. One GET, no retry: a failure surfaces
    /// to the caller immediately. Caching happens downstream in the cache
    /// store, never here.
    #[inline]
    pub fn fetch_items(&self) -> Result<Vec<Item>> {
        debug!("Fetching dataset from {}", self.url);

        let body = self
            .agent
            .get(self.url.as_str())
            .call()
            .and_then(|mut resp| resp.body_mut().read_to_string())
            .map_err(|e| ChatError::Fetch(format!("Request to {} failed: {}", self.url, e)))?;

        let response: ItemsResponse = serde_json::from_str(&body)
            .map_err(|e| ChatError::Fetch(format!("Failed to parse dataset response: {}", e)))?;

        info!("Fetched {} items from dataset", response.items.len());
        Ok(response.items)
    }
}

/// Map items to order-aligned corpus texts: `title + "\n" + German
/// description`, with empty-string defaults absorbing missing fields.
/// Output length always equals input length.
#[inline]
pub fn corpus_texts(items: &[Item]) -> Vec<String> {
    items
        .iter()
        .map(|item| {
            let description = item
                .description
                .get("de")
                .map(String::as_str)
                .unwrap_or_default();
            format!("{}\n{}", item.title, description)
        })
        .collect()
}
