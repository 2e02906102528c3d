//! Error types for the research workspace

use thiserror::Error;

/// Workspace-wide error type
#[derive(Error, Debug)]
pub enum ResearchError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResearchError {
    pub fn api(msg: impl Into<String>) -> Self {
        ResearchError::Api(msg.into())
    }

    pub fn network(msg: impl Into<String>) -> Self {
        ResearchError::Network(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        ResearchError::Parse(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        ResearchError::Config(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        ResearchError::InvalidInput(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ResearchError::Internal(msg.into())
    }
}

/// Result type alias for research operations
pub type ResearchResult<T> = Result<T, ResearchError>;
