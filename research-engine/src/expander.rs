//! Query expansion: one research question into several search queries

use std::sync::Arc;

use research_core::{GenerationRequest, ResearchQuery, ResearchResult, StructuredGenerator};
use serde_json::json;
use tracing::{debug, instrument};

use crate::normalize::normalize_queries;
use crate::prompts::research_system_prompt;

#[derive(Clone)]
pub struct QueryExpander {
    generator: Arc<dyn StructuredGenerator>,
    model: String,
}

impl QueryExpander {
    pub fn new(generator: Arc<dyn StructuredGenerator>, model: &str) -> Self {
        Self {
            generator,
            model: model.to_string(),
        }
    }

    /// Ask for up to `num_queries` search queries for `query`.
    ///
    /// The reply order is kept. Fewer queries may come back, never more.
    #[instrument(skip(self, query, learnings), fields(learnings = learnings.len()))]
    pub async fn expand(
        &self,
        query: &str,
        num_queries: usize,
        learnings: &[String],
    ) -> ResearchResult<Vec<ResearchQuery>> {
        let mut prompt = format!(
            "Given the following prompt from the user, generate a JSON object with a field 'queries': \
             an array of up to {num_queries} unique search engine queries to research the topic. \
             Each element is an object with two string keys: 'query' (the search query) and \
             'researchGoal' (the goal of the query and how to advance the research once results \
             are found). Make each query unique and not similar to each other. \
             Reply with strict JSON only.\n\n<prompt>{query}</prompt>"
        );
        if !learnings.is_empty() {
            prompt.push_str(&format!(
                "\n\nHere are some learnings from previous research, use them to generate more specific queries:\n{}",
                learnings.join("\n")
            ));
        }

        let request = GenerationRequest {
            model: self.model.clone(),
            system: research_system_prompt(),
            prompt,
            schema: json!({
                "type": "object",
                "properties": {
                    "queries": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "query": {"type": "string"},
                                "researchGoal": {"type": "string"}
                            },
                            "required": ["query", "researchGoal"]
                        }
                    }
                },
                "required": ["queries"]
            }),
        };

        let raw = self.generator.generate(request).await?;
        let mut queries = normalize_queries(&raw);
        queries.truncate(num_queries);

        debug!("Created {} queries: {:?}", queries.len(), queries);
        Ok(queries)
    }
}
