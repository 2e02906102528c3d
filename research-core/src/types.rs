//! Data model shared by the search client, the generation client and the engine

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// A search-engine style query plus the research outcome it is meant to serve
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchQuery {
    /// Query text sent to the search provider
    #[serde(rename = "query")]
    pub text: String,
    /// Brief description of what this query should uncover
    #[serde(default)]
    pub research_goal: String,
}

impl ResearchQuery {
    pub fn new(text: impl Into<String>, research_goal: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            research_goal: research_goal.into(),
        }
    }
}

/// One result returned by the search provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub url: String,
    /// Page content (markdown). Hits without content are dropped by the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl SearchHit {
    pub fn new(url: impl Into<String>, content: Option<String>) -> Self {
        Self {
            url: url.into(),
            content,
        }
    }

    /// Content if present and non-blank
    pub fn usable_content(&self) -> Option<&str> {
        self.content.as_deref().filter(|c| !c.trim().is_empty())
    }
}

/// Options passed through to the search provider for each query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOptions {
    /// Request timeout the provider should honor
    pub timeout_ms: u64,
    /// Maximum number of hits per query
    pub limit: u32,
    /// Content formats to scrape (e.g. "markdown")
    pub formats: Vec<String>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 15_000,
            limit: 5,
            formats: vec!["markdown".to_string()],
        }
    }
}

/// A request for a JSON object shaped (ideally) like `schema`
#[derive(Debug, Clone, Serialize)]
pub struct GenerationRequest {
    pub model: String,
    pub system: String,
    pub prompt: String,
    pub schema: serde_json::Value,
}

impl GenerationRequest {
    /// Whether the schema declares a top-level property named `key`
    pub fn schema_has_property(&self, key: &str) -> bool {
        self.schema
            .get("properties")
            .and_then(|p| p.as_object())
            .is_some_and(|p| p.contains_key(key))
    }
}

/// Learnings and visited URLs produced by one research branch or a whole run.
///
/// Both sets are duplicate-free by value and keep first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchFrontierResult {
    pub learnings: IndexSet<String>,
    pub visited_urls: IndexSet<String>,
}

impl ResearchFrontierResult {
    pub fn new(learnings: IndexSet<String>, visited_urls: IndexSet<String>) -> Self {
        Self {
            learnings,
            visited_urls,
        }
    }

    /// Union `other` into `self`, keeping the first occurrence of each value
    pub fn absorb(&mut self, other: ResearchFrontierResult) {
        self.learnings.extend(other.learnings);
        self.visited_urls.extend(other.visited_urls);
    }

    pub fn is_empty(&self) -> bool {
        self.learnings.is_empty() && self.visited_urls.is_empty()
    }

    pub fn learnings_vec(&self) -> Vec<String> {
        self.learnings.iter().cloned().collect()
    }

    pub fn visited_urls_vec(&self) -> Vec<String> {
        self.visited_urls.iter().cloned().collect()
    }
}
