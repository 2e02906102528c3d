//! Progress events published while a research run is in flight

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResearchEvent {
    /// A level expanded its query into `queries`
    QueriesPlanned {
        depth: usize,
        breadth: usize,
        queries: Vec<String>,
    },
    /// A branch finished, with the sizes of what it returned (deeper levels included)
    BranchCompleted {
        depth: usize,
        query: String,
        learnings: usize,
        visited_urls: usize,
    },
    /// A branch failed and contributed nothing
    BranchFailed {
        depth: usize,
        query: String,
        error: String,
    },
}
