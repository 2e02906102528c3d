//! Deep research engine
//!
//! Expands a research question into a tree of search queries, extracts
//! learnings from what each query finds, recursively deepens every branch until
//! the depth budget runs out, and merges everything into a deduplicated set of
//! learnings and visited URLs. A final report is then written from that set.
//!
//! The generation service's replies are reconciled into canonical data by the
//! [`normalize`] module, which never fails.

pub mod assembler;
pub mod config;
pub mod events;
pub mod expander;
pub mod extractor;
pub mod feedback;
pub mod normalize;
pub mod prompts;
pub mod scheduler;

pub use assembler::ReportAssembler;
pub use config::{worst_case_searches, SchedulerConfig, DEFAULT_CONCURRENCY_LIMIT, DEFAULT_MODEL};
pub use events::ResearchEvent;
pub use expander::QueryExpander;
pub use extractor::{ContentExtractor, Extraction};
pub use feedback::{combine_query, generate_feedback};
pub use normalize::{normalize_learnings, normalize_report};
pub use scheduler::ResearchScheduler;
