//! Firecrawl API client for web search with scraped content

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use research_core::{ResearchResult, SearchHit, SearchOptions, SearchProvider};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::error::SearchError;
use crate::types::{FirecrawlScrapeOptions, FirecrawlSearchRequest, FirecrawlSearchResponse};

const FIRECRAWL_API_BASE: &str = "https://api.firecrawl.dev/v1";

/// How the client treats its configured base URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointMode {
    /// Real HTTP calls against the endpoint
    Live,
    /// Base URL is not an http(s) URL; every search returns no hits
    Offline,
    /// Base URL points at localhost; every search returns one synthetic hit
    Dummy,
}

impl EndpointMode {
    /// Classify a base URL
    pub fn detect(base_url: &str) -> Self {
        let Ok(url) = Url::parse(base_url.trim()) else {
            return EndpointMode::Offline;
        };
        if !matches!(url.scheme(), "http" | "https") {
            return EndpointMode::Offline;
        }
        match url.host_str() {
            Some(host) if host.eq_ignore_ascii_case("localhost") => EndpointMode::Dummy,
            _ => EndpointMode::Live,
        }
    }
}

/// Firecrawl API client
#[derive(Debug, Clone)]
pub struct FirecrawlClient {
    client: Client,
    api_key: String,
    base_url: String,
    mode: EndpointMode,
}

impl FirecrawlClient {
    /// Create a new Firecrawl client against the public API
    pub fn new(api_key: impl Into<String>) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| {
                SearchError::InvalidConfig(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: FIRECRAWL_API_BASE.to_string(),
            mode: EndpointMode::Live,
        })
    }

    /// Point the client at a different endpoint (self-hosted, local, ...)
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        let base_url = base_url.trim();
        if base_url.is_empty() {
            return self;
        }
        self.mode = EndpointMode::detect(base_url);
        match self.mode {
            EndpointMode::Offline => {
                warn!("Firecrawl base URL '{}' is invalid, searches will return no results", base_url)
            }
            EndpointMode::Dummy => {
                warn!("Firecrawl base URL '{}' is local, searches will return dummy results", base_url)
            }
            EndpointMode::Live => {}
        }
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Build a client from `FIRECRAWL_API_KEY` (or `FIRECRAWL_KEY`) and `FIRECRAWL_BASE_URL`.
    ///
    /// A missing key still yields a client; `is_configured` reports it.
    pub fn from_env() -> Result<Self, SearchError> {
        let api_key = std::env::var("FIRECRAWL_API_KEY")
            .or_else(|_| std::env::var("FIRECRAWL_KEY"))
            .unwrap_or_default();
        let client = Self::new(api_key)?;

        Ok(match std::env::var("FIRECRAWL_BASE_URL") {
            Ok(base_url) => client.with_base_url(&base_url),
            Err(_) => client,
        })
    }

    pub fn mode(&self) -> EndpointMode {
        self.mode
    }

    fn search_url(&self) -> String {
        if self.base_url.ends_with("/search") {
            self.base_url.clone()
        } else {
            format!("{}/search", self.base_url)
        }
    }

    /// Search the web and return one hit per result URL
    #[instrument(skip(self, options))]
    pub async fn search_web(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<SearchHit>, SearchError> {
        match self.mode {
            EndpointMode::Offline => return Ok(Vec::new()),
            EndpointMode::Dummy => return Ok(vec![dummy_hit(query)]),
            EndpointMode::Live => {}
        }

        let request = FirecrawlSearchRequest {
            query: query.to_string(),
            timeout: options.timeout_ms,
            limit: options.limit,
            scrape_options: FirecrawlScrapeOptions {
                formats: options.formats.clone(),
            },
        };

        debug!("Searching Firecrawl: {}", query);

        let response = self
            .client
            .post(self.search_url())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| SearchError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let search_response: FirecrawlSearchResponse = response
            .json()
            .await
            .map_err(|e| SearchError::ParseError(e.to_string()))?;

        let hits = into_hits(search_response)?;
        debug!("Firecrawl returned {} hits for '{}'", hits.len(), query);
        Ok(hits)
    }
}

#[async_trait]
impl SearchProvider for FirecrawlClient {
    async fn search(&self, query: &str, options: &SearchOptions) -> ResearchResult<Vec<SearchHit>> {
        Ok(self.search_web(query, options).await?)
    }

    /// Live endpoints need an API key; offline and dummy endpoints never call out
    fn is_configured(&self) -> bool {
        self.mode != EndpointMode::Live || !self.api_key.is_empty()
    }
}

fn into_hits(response: FirecrawlSearchResponse) -> Result<Vec<SearchHit>, SearchError> {
    if !response.success {
        return Err(SearchError::ApiError {
            status: 200,
            message: response
                .error
                .unwrap_or_else(|| "Unknown search error".to_string()),
        });
    }

    Ok(response
        .data
        .into_iter()
        .filter_map(|item| {
            let url = item.url.filter(|u| !u.is_empty())?;
            Some(SearchHit::new(url, item.markdown))
        })
        .collect())
}

fn dummy_hit(query: &str) -> SearchHit {
    SearchHit::new(
        format!("http://dummy.com/{}", query.replace(' ', "_")),
        Some(format!("Dummy content for query: {}", query)),
    )
}
