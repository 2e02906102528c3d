//! Web search clients for the deep research engine
//!
//! This crate provides the Firecrawl search client, which runs a query and
//! returns the scraped markdown of each hit.

pub mod error;
pub mod firecrawl;
pub mod types;

pub use error::SearchError;
pub use firecrawl::{EndpointMode, FirecrawlClient};
