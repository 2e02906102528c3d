//! Clarifying questions asked before a research run starts

use research_core::{GenerationRequest, ResearchResult, StructuredGenerator};
use serde_json::json;

use crate::normalize::question_items;
use crate::prompts::research_system_prompt;

/// Ask for up to `num_questions` questions that clarify the research direction
pub async fn generate_feedback(
    generator: &dyn StructuredGenerator,
    model: &str,
    query: &str,
    num_questions: usize,
) -> ResearchResult<Vec<String>> {
    let request = GenerationRequest {
        model: model.to_string(),
        system: research_system_prompt(),
        prompt: format!(
            "Given the following query from the user, ask some follow up questions to clarify the \
             research direction. Return a maximum of {num_questions} questions, but feel free to \
             return less if the original query is clear: <query>{query}</query>"
        ),
        schema: json!({
            "type": "object",
            "properties": {
                "questions": {"type": "array", "items": {"type": "string"}}
            },
            "required": ["questions"]
        }),
    };

    let raw = generator.generate(request).await?;
    let mut questions = question_items(&raw);
    questions.truncate(num_questions);
    Ok(questions)
}

/// Fold the user's answers into the query the research run starts from
pub fn combine_query(initial_query: &str, answered: &[(String, String)]) -> String {
    let mut combined = format!(
        "Initial Query: {}\nFollow-up Questions and Answers:\n",
        initial_query
    );
    for (question, answer) in answered {
        combined.push_str(&format!("Q: {}\nA: {}\n", question, answer));
    }
    combined
}
