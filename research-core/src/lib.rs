//! Core types for the deep research engine
//!
//! This crate defines the shared data structures used across the workspace,
//! the error type, and the two collaborator seams the engine is driven through:
//! a web search provider and a structured text generator.

pub mod error;
pub mod provider;
pub mod types;

pub use error::{ResearchError, ResearchResult};
pub use provider::{SearchProvider, StructuredGenerator};
pub use types::{
    GenerationRequest, ResearchFrontierResult, ResearchQuery, SearchHit, SearchOptions,
};
