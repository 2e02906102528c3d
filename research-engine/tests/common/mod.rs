//! In-process collaborators for engine tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use research_core::{
    GenerationRequest, ResearchError, ResearchResult, SearchHit, SearchOptions, SearchProvider,
    StructuredGenerator,
};
use research_engine::{ResearchScheduler, SchedulerConfig};
use serde_json::{json, Value};

/// Replies by schema: numbered queries, one learning per query, a canned report
#[derive(Default)]
pub struct MockGenerator {
    pub shared_learning: Option<String>,
    pub object_learnings: bool,
    pub fail_expansion: bool,
    /// Expansions after the first reply with an unrecognized shape
    pub drift_nested_expansion: bool,
    pub fail_extraction_on: Option<&'static str>,
    pub fail_reports: bool,
    pub expansion_calls: AtomicUsize,
    pub extraction_calls: AtomicUsize,
    pub prompts: Mutex<Vec<String>>,
}

impl MockGenerator {
    pub fn total_calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn expansion_prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.contains("'queries'"))
            .cloned()
            .collect()
    }
}

fn between<'a>(text: &'a str, open: &str, close: &str) -> &'a str {
    let start = text.find(open).map(|i| i + open.len()).unwrap_or(0);
    let end = text[start..].find(close).map(|i| start + i).unwrap_or(text.len());
    &text[start..end]
}

#[async_trait]
impl StructuredGenerator for MockGenerator {
    async fn generate(&self, request: GenerationRequest) -> ResearchResult<Value> {
        self.prompts.lock().unwrap().push(request.prompt.clone());

        if request.schema_has_property("queries") {
            let call = self.expansion_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_expansion {
                return Err(ResearchError::api("expansion unavailable"));
            }
            if self.drift_nested_expansion && call > 0 {
                return Ok(json!({"searchTerms": ["x"]}));
            }
            let queries: Vec<Value> = (0..8)
                .map(|i| {
                    json!({
                        "query": format!("q{call}-{i}"),
                        "researchGoal": format!("goal {call}-{i}")
                    })
                })
                .collect();
            return Ok(json!({ "queries": queries }));
        }

        if request.schema_has_property("learnings") {
            self.extraction_calls.fetch_add(1, Ordering::SeqCst);
            let query = between(&request.prompt, "<query>", "</query>").to_string();
            if self.fail_extraction_on == Some(query.as_str()) {
                return Err(ResearchError::parse("reply was not JSON"));
            }
            let mut learnings = vec![if self.object_learnings {
                json!({"title": query, "details": "detail"})
            } else {
                json!(format!("fact about {query}"))
            }];
            if let Some(shared) = &self.shared_learning {
                learnings.push(json!(shared));
            }
            return Ok(json!({
                "learnings": learnings,
                "followUpQuestions": [format!("what next after {query}?")]
            }));
        }

        if request.schema_has_property("reportMarkdown") {
            if self.fail_reports {
                return Err(ResearchError::network("report model unreachable"));
            }
            return Ok(json!({"reportMarkdown": "# Mock Report\n\nBody [1](#ref1)"}));
        }

        Ok(json!({"questions": ["Q1", "Q2", "Q3", "Q4"]}))
    }
}

/// One content-bearing hit per query, with in-flight accounting
pub struct MockSearch {
    pub configured: bool,
    pub delay: Duration,
    pub fail_on: Option<&'static str>,
    pub panic_on: Option<&'static str>,
    pub empty_on: Option<&'static str>,
    pub shared_url: Option<&'static str>,
    pub calls: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl MockSearch {
    pub fn new() -> Self {
        Self {
            configured: true,
            delay: Duration::from_millis(5),
            fail_on: None,
            panic_on: None,
            empty_on: None,
            shared_url: None,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

pub fn url_for(query: &str) -> String {
    format!("https://example.com/{}", query)
}

#[async_trait]
impl SearchProvider for MockSearch {
    async fn search(&self, query: &str, _options: &SearchOptions) -> ResearchResult<Vec<SearchHit>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.panic_on == Some(query) {
            panic!("search provider crashed on {query}");
        }
        if self.fail_on == Some(query) {
            return Err(ResearchError::network("connection reset"));
        }
        if self.empty_on == Some(query) {
            return Ok(vec![
                SearchHit::new(url_for(query), None),
                SearchHit::new(format!("{}/blank", url_for(query)), Some("   ".to_string())),
            ]);
        }

        let mut hits = vec![SearchHit::new(url_for(query), Some(format!("content for {query}")))];
        if let Some(shared) = self.shared_url {
            hits.push(SearchHit::new(shared, Some("shared content".to_string())));
        }
        Ok(hits)
    }

    fn is_configured(&self) -> bool {
        self.configured
    }
}

pub fn scheduler(
    generator: &Arc<MockGenerator>,
    search: &Arc<MockSearch>,
    concurrency_limit: usize,
) -> ResearchScheduler {
    ResearchScheduler::new(
        generator.clone(),
        search.clone(),
        SchedulerConfig::default().with_concurrency_limit(concurrency_limit),
    )
}
