//! Scheduler configuration

use research_core::SearchOptions;
use tokio::sync::Semaphore;

/// Model used when none is configured
pub const DEFAULT_MODEL: &str = "o3-mini-2025-01-31";

/// Sibling branches allowed in flight per recursion level
pub const DEFAULT_CONCURRENCY_LIMIT: usize = 4;

/// Hard ceiling on requested depth
pub const MAX_RESEARCH_DEPTH: usize = 6;

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Generation model for every structured call
    pub model: String,
    /// Capacity of the per-level concurrency budget
    pub concurrency_limit: usize,
    /// Requested depths above this are clamped
    pub max_depth: usize,
    /// Upper bound on learnings kept per search query
    pub learnings_per_query: usize,
    /// Characters of each scraped page passed to extraction
    pub content_char_limit: usize,
    /// Characters of the learnings block in the report prompt
    pub report_learnings_char_limit: usize,
    /// Passed through to the search provider
    pub search: SearchOptions,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            concurrency_limit: DEFAULT_CONCURRENCY_LIMIT,
            max_depth: MAX_RESEARCH_DEPTH,
            learnings_per_query: 3,
            content_char_limit: 25_000,
            report_learnings_char_limit: 150_000,
            search: SearchOptions::default(),
        }
    }
}

impl SchedulerConfig {
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_concurrency_limit(mut self, limit: usize) -> Self {
        self.concurrency_limit = limit.clamp(1, Semaphore::MAX_PERMITS);
        self
    }

    /// Slots in each level's budget, whatever `concurrency_limit` was set to
    pub fn budget_permits(&self) -> usize {
        self.concurrency_limit.clamp(1, Semaphore::MAX_PERMITS)
    }
}

/// Worst-case number of search calls for a `(breadth, depth)` run.
///
/// Level 1 issues `breadth` searches; every branch at level `k` recurses with
/// `ceil(b/2)` queries, so the total is `b + b*c1 + b*c1*c2 + ...` over `depth`
/// levels, where `c1 = ceil(b/2)`, `c2 = ceil(c1/2)` and so on. Each search is
/// followed by one extraction call, and every branch that recurses adds one
/// expansion call.
pub fn worst_case_searches(breadth: usize, depth: usize) -> u64 {
    let mut total: u64 = 0;
    let mut branches: u64 = 0;
    let mut level_breadth = breadth as u64;

    for level in 0..depth {
        branches = if level == 0 {
            level_breadth
        } else {
            branches.saturating_mul(level_breadth)
        };
        total = total.saturating_add(branches);
        level_breadth = level_breadth.div_ceil(2);
    }

    total
}
