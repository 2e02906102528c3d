//! Final report assembly

use std::sync::Arc;

use research_core::{GenerationRequest, StructuredGenerator};
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use crate::normalize::normalize_report;
use crate::prompts::{report_system_prompt, tagged_blocks, trim_prompt};

#[derive(Clone)]
pub struct ReportAssembler {
    generator: Arc<dyn StructuredGenerator>,
    model: String,
    learnings_char_limit: usize,
}

impl ReportAssembler {
    pub fn new(generator: Arc<dyn StructuredGenerator>, model: &str, learnings_char_limit: usize) -> Self {
        Self {
            generator,
            model: model.to_string(),
            learnings_char_limit,
        }
    }

    /// Write the final markdown report for `prompt`.
    ///
    /// Never fails: a failed or unusable generation yields a "Key Findings"
    /// document built from `learnings`.
    #[instrument(skip_all, fields(learnings = learnings.len(), sources = visited_urls.len()))]
    pub async fn write_final_report(
        &self,
        prompt: &str,
        learnings: &[String],
        visited_urls: &[String],
    ) -> String {
        let learnings_block = tagged_blocks(learnings, "learning");
        let learnings_block = trim_prompt(&learnings_block, self.learnings_char_limit);
        let sources_block = visited_urls
            .iter()
            .enumerate()
            .map(|(i, url)| format!("{}. <a id=\"ref{}\"></a>[{}]({})", i + 1, i + 1, url, url))
            .collect::<Vec<_>>()
            .join("\n");

        let user_prompt = format!(
            "Given the following prompt from the user, write a final report on the topic using the \
             learnings from research. Make it as detailed as possible, aim for 3 or more pages, and \
             include ALL the learnings from research. Cite sources inline as [[n]](#refn) using the \
             numbers below, and finish with a numbered Sources section listing every URL.\n\n\
             <prompt>{prompt}</prompt>\n\n\
             Here are all the learnings from previous research:\n\n<learnings>\n{learnings_block}\n</learnings>\n\n\
             Here are the source URLs to cite (numbered):\n\n<sources>\n{sources_block}\n</sources>"
        );

        let request = GenerationRequest {
            model: self.model.clone(),
            system: report_system_prompt(),
            prompt: user_prompt,
            schema: json!({
                "type": "object",
                "properties": {
                    "reportMarkdown": {
                        "type": "string",
                        "description": "The complete markdown report including all sections and sources"
                    }
                },
                "required": ["reportMarkdown"]
            }),
        };

        let raw = match self.generator.generate(request).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Report generation failed, writing key findings only: {}", e);
                Value::Null
            }
        };

        let report = normalize_report(&raw, learnings, visited_urls);
        info!("Final report is {} chars", report.len());
        report
    }
}
