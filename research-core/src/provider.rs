//! Collaborator seams the engine is driven through

use async_trait::async_trait;

use crate::error::ResearchResult;
use crate::types::{GenerationRequest, SearchHit, SearchOptions};

/// A web search backend returning scraped page content per hit
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run one query. Offline or degraded providers return an empty list.
    async fn search(&self, query: &str, options: &SearchOptions) -> ResearchResult<Vec<SearchHit>>;

    /// Check if the provider has the credentials it needs to run queries
    fn is_configured(&self) -> bool {
        true
    }
}

/// A text generation backend that returns a best-effort JSON object.
///
/// The returned value is not guaranteed to validate against `request.schema`.
#[async_trait]
pub trait StructuredGenerator: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> ResearchResult<serde_json::Value>;
}
