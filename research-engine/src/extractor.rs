//! Content extraction: search results for one query into learnings

use std::sync::Arc;

use research_core::{GenerationRequest, ResearchResult, StructuredGenerator};
use serde_json::json;
use tracing::{debug, instrument};

use crate::normalize::{learning_items, normalize_learnings, question_items};
use crate::prompts::{research_system_prompt, tagged_blocks, trim_prompt};

/// Learnings and follow-up questions drawn from one query's results
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub learnings: Vec<String>,
    pub follow_up_questions: Vec<String>,
}

#[derive(Clone)]
pub struct ContentExtractor {
    generator: Arc<dyn StructuredGenerator>,
    model: String,
    max_learnings: usize,
    content_char_limit: usize,
}

impl ContentExtractor {
    pub fn new(
        generator: Arc<dyn StructuredGenerator>,
        model: &str,
        max_learnings: usize,
        content_char_limit: usize,
    ) -> Self {
        Self {
            generator,
            model: model.to_string(),
            max_learnings,
            content_char_limit,
        }
    }

    /// Extract learnings from `contents` (scraped pages) found for `query`.
    ///
    /// No contents means nothing was found, which is not an error.
    #[instrument(skip(self, contents), fields(contents = contents.len()))]
    pub async fn extract(
        &self,
        query: &str,
        contents: &[&str],
        max_follow_ups: usize,
    ) -> ResearchResult<Extraction> {
        if contents.is_empty() {
            debug!("No contents for '{}', nothing to extract", query);
            return Ok(Extraction::default());
        }

        let trimmed: Vec<&str> = contents
            .iter()
            .map(|c| trim_prompt(c, self.content_char_limit))
            .collect();

        let prompt = format!(
            "Given the following contents from a search for the query <query>{query}</query>, \
             generate a list of learnings from the contents. Return a maximum of {max_learnings} \
             learnings, but feel free to return less if the contents are clear. Make sure each \
             learning is unique and not similar to each other. The learnings should be concise and \
             to the point, as detailed and information dense as possible. Include any entities like \
             people, places, companies, products, things, as well as any exact metrics, numbers, or \
             dates. Also return up to {max_follow_ups} follow-up questions to research the topic \
             further.\n\n<contents>{}</contents>",
            tagged_blocks(&trimmed, "content"),
            max_learnings = self.max_learnings,
        );

        let request = GenerationRequest {
            model: self.model.clone(),
            system: research_system_prompt(),
            prompt,
            schema: json!({
                "type": "object",
                "properties": {
                    "learnings": {"type": "array", "items": {"type": "string"}},
                    "followUpQuestions": {"type": "array", "items": {"type": "string"}}
                },
                "required": ["learnings", "followUpQuestions"]
            }),
        };

        let raw = self.generator.generate(request).await?;

        let mut learnings = normalize_learnings(learning_items(&raw));
        learnings.truncate(self.max_learnings);
        let mut follow_up_questions = question_items(&raw);
        follow_up_questions.truncate(max_follow_ups);

        debug!(
            "Created {} learnings and {} follow-up questions for '{}'",
            learnings.len(),
            follow_up_questions.len(),
            query
        );

        Ok(Extraction {
            learnings,
            follow_up_questions,
        })
    }
}
