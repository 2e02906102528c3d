//! Recursive bounded-fanout research scheduler
//!
//! One level expands its query into up to `breadth` search queries and runs a
//! branch per query: search, extract learnings, then either recurse one level
//! deeper with `ceil(breadth / 2)` or stop when depth runs out. Branch results
//! are immutable values unioned once every branch of the level has finished.
//!
//! ## Concurrency budget
//!
//! Each level creates its own budget of `concurrency_limit` slots. A branch
//! holds its slot for its whole lifetime, including the deeper level it starts,
//! and that deeper level gets a fresh budget of its own. Tree-wide in-flight
//! work therefore compounds with depth; only siblings within one level are
//! bounded.
//!
//! ## Cost
//!
//! See [`worst_case_searches`](crate::config::worst_case_searches) for the
//! number of external calls a `(breadth, depth)` pair can cost.

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use research_core::{
    ResearchError, ResearchFrontierResult, ResearchQuery, ResearchResult, SearchProvider,
    StructuredGenerator,
};
use tokio::sync::{broadcast, Semaphore};
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::config::SchedulerConfig;
use crate::events::ResearchEvent;
use crate::expander::QueryExpander;
use crate::extractor::ContentExtractor;

/// Scheduler for one or more research runs.
///
/// Cheap to clone; clones share the collaborators and the event channel.
#[derive(Clone)]
pub struct ResearchScheduler {
    search: Arc<dyn SearchProvider>,
    expander: QueryExpander,
    extractor: ContentExtractor,
    config: Arc<SchedulerConfig>,
    update_tx: broadcast::Sender<ResearchEvent>,
}

impl ResearchScheduler {
    pub fn new(
        generator: Arc<dyn StructuredGenerator>,
        search: Arc<dyn SearchProvider>,
        config: SchedulerConfig,
    ) -> Self {
        let expander = QueryExpander::new(generator.clone(), &config.model);
        let extractor = ContentExtractor::new(
            generator,
            &config.model,
            config.learnings_per_query,
            config.content_char_limit,
        );
        let (update_tx, _) = broadcast::channel(100);

        Self {
            search,
            expander,
            extractor,
            config: Arc::new(config),
            update_tx,
        }
    }

    /// Subscribe to progress events
    pub fn subscribe(&self) -> broadcast::Receiver<ResearchEvent> {
        self.update_tx.subscribe()
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    fn emit(&self, event: ResearchEvent) {
        // No subscribers is fine
        let _ = self.update_tx.send(event);
    }

    /// Research `query` from scratch.
    ///
    /// Fails only for `breadth == 0` or `depth == 0`; every collaborator
    /// failure degrades to fewer learnings and URLs instead.
    pub async fn research(
        &self,
        query: &str,
        breadth: usize,
        depth: usize,
    ) -> ResearchResult<ResearchFrontierResult> {
        self.research_from(query, breadth, depth, ResearchFrontierResult::default())
            .await
    }

    /// Research `query`, carrying forward learnings and URLs already gathered.
    ///
    /// The returned sets always include `inherited`, except for branches that
    /// failed outright.
    pub async fn research_from(
        &self,
        query: &str,
        breadth: usize,
        depth: usize,
        inherited: ResearchFrontierResult,
    ) -> ResearchResult<ResearchFrontierResult> {
        if breadth == 0 {
            return Err(ResearchError::invalid_input("breadth must be at least 1"));
        }
        if depth == 0 {
            return Err(ResearchError::invalid_input("depth must be at least 1"));
        }

        let depth = if depth > self.config.max_depth {
            warn!(
                "Requested depth {} exceeds ceiling {}, clamping",
                depth, self.config.max_depth
            );
            self.config.max_depth
        } else {
            depth
        };

        let inherited = Arc::new(inherited);
        match self
            .research_level(query.to_string(), breadth, depth, inherited.clone())
            .await
        {
            Ok(result) => Ok(result),
            Err(e) => {
                error!("Research could not start: {}", e);
                Ok(Arc::unwrap_or_clone(inherited))
            }
        }
    }

    /// One recursion level. Boxed so branches can recurse into it.
    fn research_level(
        &self,
        query: String,
        breadth: usize,
        depth: usize,
        inherited: Arc<ResearchFrontierResult>,
    ) -> BoxFuture<'static, ResearchResult<ResearchFrontierResult>> {
        let this = self.clone();
        let span = info_span!("research_level", depth, breadth);

        async move {
            if !this.search.is_configured() {
                error!("Search provider is not configured, returning inherited results");
                return Ok(Arc::unwrap_or_clone(inherited));
            }

            let learnings = inherited.learnings_vec();
            let queries = this.expander.expand(&query, breadth, &learnings).await?;
            if queries.is_empty() {
                warn!("Expansion produced no usable queries, keeping inherited results");
                return Ok(Arc::unwrap_or_clone(inherited));
            }
            info!("Planned {} queries", queries.len());
            this.emit(ResearchEvent::QueriesPlanned {
                depth,
                breadth,
                queries: queries.iter().map(|q| q.text.clone()).collect(),
            });

            let budget = Arc::new(Semaphore::new(this.config.budget_permits()));

            let handles: Vec<_> = queries
                .into_iter()
                .map(|serp_query| {
                    let text = serp_query.text.clone();
                    let branch = this.clone();
                    let budget = budget.clone();
                    let inherited = inherited.clone();
                    let handle = tokio::spawn(
                        async move {
                            branch
                                .run_branch(serp_query, breadth, depth, inherited, budget)
                                .await
                        }
                        .in_current_span(),
                    );
                    (text, handle)
                })
                .collect();

            let mut combined = ResearchFrontierResult::default();
            for (text, handle) in handles {
                let failure = match handle.await {
                    Ok(Ok(result)) => {
                        this.emit(ResearchEvent::BranchCompleted {
                            depth,
                            query: text,
                            learnings: result.learnings.len(),
                            visited_urls: result.visited_urls.len(),
                        });
                        combined.absorb(result);
                        continue;
                    }
                    Ok(Err(e)) => e.to_string(),
                    Err(join_error) => format!("branch task aborted: {}", join_error),
                };

                warn!("Failed to run query '{}': {}", text, failure);
                this.emit(ResearchEvent::BranchFailed {
                    depth,
                    query: text,
                    error: failure,
                });
            }

            Ok(combined)
        }
        .instrument(span)
        .boxed()
    }

    /// One branch: search, extract, then recurse or stop.
    ///
    /// The budget slot is held until this returns, on every path.
    async fn run_branch(
        &self,
        serp_query: ResearchQuery,
        breadth: usize,
        depth: usize,
        inherited: Arc<ResearchFrontierResult>,
        budget: Arc<Semaphore>,
    ) -> ResearchResult<ResearchFrontierResult> {
        let _permit = budget
            .acquire_owned()
            .await
            .map_err(|e| ResearchError::internal(format!("concurrency budget closed: {}", e)))?;

        debug!("Searching for: {}", serp_query.text);
        let hits = self
            .search
            .search(&serp_query.text, &self.config.search)
            .await?;
        let hits: Vec<_> = hits
            .into_iter()
            .filter(|hit| hit.usable_content().is_some())
            .collect();

        info!("Ran '{}', found {} contents", serp_query.text, hits.len());
        if hits.is_empty() {
            return Ok(Arc::unwrap_or_clone(inherited));
        }

        let child_breadth = breadth.div_ceil(2);
        let child_depth = depth - 1;

        let extraction = {
            let contents: Vec<&str> = hits.iter().filter_map(|hit| hit.usable_content()).collect();
            self.extractor
                .extract(&serp_query.text, &contents, child_breadth)
                .await?
        };

        let mut merged = Arc::unwrap_or_clone(inherited);
        merged.learnings.extend(
            extraction
                .learnings
                .iter()
                .map(|learning| learning.trim())
                .filter(|learning| !learning.is_empty())
                .map(str::to_string),
        );
        merged
            .visited_urls
            .extend(hits.into_iter().map(|hit| hit.url));

        if child_depth == 0 {
            return Ok(merged);
        }

        debug!(
            "Researching deeper, breadth: {}, depth: {}",
            child_breadth, child_depth
        );
        let next_query = follow_up_query(&serp_query.research_goal, &extraction.follow_up_questions);
        self.research_level(next_query, child_breadth, child_depth, Arc::new(merged))
            .await
    }
}

/// Query for the next level: the branch's goal followed by its follow-up questions
pub fn follow_up_query(research_goal: &str, follow_up_questions: &[String]) -> String {
    let mut next = format!(
        "Previous research goal: {}\nFollow-up research directions:",
        research_goal
    );
    for question in follow_up_questions {
        next.push('\n');
        next.push_str(question);
    }
    next
}
