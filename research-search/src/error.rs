//! Error types for the search module

use research_core::ResearchError;
use thiserror::Error;

/// Errors that can occur while running a search
#[derive(Debug, Error)]
pub enum SearchError {
    /// HTTP request failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// API returned an error response
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from API
        message: String,
    },

    /// Failed to parse API response
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<SearchError> for ResearchError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::RequestFailed(msg) => ResearchError::network(msg),
            SearchError::ApiError { .. } => ResearchError::api(err.to_string()),
            SearchError::ParseError(msg) => ResearchError::parse(msg),
            SearchError::InvalidConfig(msg) => ResearchError::config(msg),
        }
    }
}
