//! Firecrawl search wire types

use serde::{Deserialize, Serialize};

/// Firecrawl search request
#[derive(Debug, Serialize)]
pub struct FirecrawlSearchRequest {
    /// Search query
    pub query: String,
    /// Server-side timeout in milliseconds
    pub timeout: u64,
    /// Maximum number of results
    pub limit: u32,
    /// What to scrape from each result
    #[serde(rename = "scrapeOptions")]
    pub scrape_options: FirecrawlScrapeOptions,
}

/// Scrape options attached to a search
#[derive(Debug, Serialize)]
pub struct FirecrawlScrapeOptions {
    /// Output formats to return
    pub formats: Vec<String>,
}

/// Firecrawl search response
#[derive(Debug, Deserialize)]
pub struct FirecrawlSearchResponse {
    /// Whether the search was successful
    #[serde(default = "default_success")]
    pub success: bool,
    /// One entry per search result
    #[serde(default)]
    pub data: Vec<FirecrawlSearchItem>,
    /// Error message if failed
    pub error: Option<String>,
}

fn default_success() -> bool {
    true
}

/// A single search result, scraped
#[derive(Debug, Deserialize)]
pub struct FirecrawlSearchItem {
    /// Result URL
    pub url: Option<String>,
    /// Markdown content (absent when scraping failed)
    pub markdown: Option<String>,
}
