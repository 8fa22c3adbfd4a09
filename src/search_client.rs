use anyhow::{Context, Result};
use reqwest::blocking::Client;
use std::time::Duration;

use crate::models::{SearchResponse, Story};

const SEARCH_ENDPOINT: &str = "https://hn.algolia.com/api/v1/search";

#[derive(Clone)]
pub struct SearchClient {
    client: Client,
}

impl SearchClient {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("hacker_stories/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Fetch stories matching `query` from the search endpoint. Transport
    /// errors, non-2xx statuses, and malformed bodies all come back as one
    /// uniform failure.
    pub fn search(&self, query: &str) -> Result<Vec<Story>> {
        let url = format!("{}?query={}", SEARCH_ENDPOINT, urlencoding::encode(query));
        log::debug!("GET {url}");

        let response = self
            .client
            .get(&url)
            .send()
            .with_context(|| format!("Request to {url} failed"))?
            .error_for_status()
            .context("Search endpoint returned an error status")?;

        let parsed: SearchResponse = response
            .json()
            .context("Failed to parse search response")?;

        log::debug!("received {} hits for {query:?}", parsed.hits.len());
        Ok(parsed.hits)
    }
}
