use anyhow::{Context, Result};
use reqwest::blocking::Client;
use std::time::Duration;
use tracing::{debug, warn};

use crate::models::{FetchRequest, SearchResponse};

pub const DEFAULT_API_BASE: &str = "https://hn.algolia.com/api/v1";

/// Anything that can answer a single page request. The window talks to the real
/// API; tests plug in canned responses.
pub trait StorySearch: Send + Sync + 'static {
    fn search(&self, request: &FetchRequest) -> Result<SearchResponse>;
}

#[derive(Clone)]
pub struct HackerNewsClient {
    client: Client,
    api_base: String,
}

impl HackerNewsClient {
    pub fn new(api_base: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("hn_search/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to configure HTTP client, using defaults: {}", e);
                Client::new()
            });

        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    pub fn search_url(&self, request: &FetchRequest) -> String {
        format!(
            "{}/search?query={}&page={}&hitsPerPage={}",
            self.api_base,
            urlencoding::encode(&request.query),
            request.page,
            request.hits_per_page
        )
    }
}

impl StorySearch for HackerNewsClient {
    fn search(&self, request: &FetchRequest) -> Result<SearchResponse> {
        let url = self.search_url(request);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .with_context(|| format!("request to {} failed", url))?
            .error_for_status()
            .context("search API returned an error status")?;

        let body: SearchResponse = response
            .json()
            .context("could not decode search response")?;

        debug!(
            "'{}' page {} returned {} hits ({} matches over {} pages)",
            request.query,
            body.page,
            body.hits.len(),
            body.nb_hits,
            body.nb_pages
        );
        Ok(body)
    }
}
