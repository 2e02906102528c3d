use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use research_core::{GenerationRequest, ResearchError, ResearchResult, StructuredGenerator};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::coerce::coerce_object;

/// Key value shipped in sample env files; never a usable credential
const PLACEHOLDER_API_KEY: &str = "sk-dummy-key";

#[derive(Debug, Clone)]
pub struct OpenAIClient {
    client: Client<OpenAIConfig>,
}

impl OpenAIClient {
    /// Create a client for `api_key`, optionally against a compatible endpoint
    pub fn new(api_key: &str, api_base: Option<&str>) -> Result<Self, ResearchError> {
        let api_key = api_key.trim();
        if api_key.is_empty() || api_key == PLACEHOLDER_API_KEY {
            return Err(ResearchError::config(
                "A valid OpenAI API key must be set; the provided key is missing or a placeholder",
            ));
        }

        let mut config = OpenAIConfig::new().with_api_key(api_key);
        if let Some(base) = api_base.map(str::trim).filter(|b| !b.is_empty()) {
            config = config.with_api_base(base);
        }

        Ok(Self {
            client: Client::with_config(config),
        })
    }

    /// Build a client from `OPENAI_API_KEY` (or `OPENAI_KEY`) and `OPENAI_BASE_URL`
    pub fn from_env() -> Result<Self, ResearchError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .or_else(|_| std::env::var("OPENAI_KEY"))
            .map_err(|_| ResearchError::config("OPENAI_API_KEY environment variable not set"))?;
        let api_base = std::env::var("OPENAI_BASE_URL").ok();

        Self::new(&api_key, api_base.as_deref())
    }

    /// Send one system + user exchange and return the raw reply text
    #[instrument(skip(self, system, prompt), fields(prompt_len = prompt.len()))]
    pub async fn complete(
        &self,
        model: &str,
        system: &str,
        prompt: &str,
    ) -> Result<String, ResearchError> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages([
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system)
                    .build()
                    .map_err(|e| ResearchError::internal(e.to_string()))?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(prompt)
                    .build()
                    .map_err(|e| ResearchError::internal(e.to_string()))?
                    .into(),
            ])
            .build()
            .map_err(|e| ResearchError::internal(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| ResearchError::api(format!("OpenAI API error: {}", e)))?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| ResearchError::parse("No response from OpenAI"))?;

        Ok(content.clone())
    }
}

#[async_trait]
impl StructuredGenerator for OpenAIClient {
    async fn generate(&self, request: GenerationRequest) -> ResearchResult<Value> {
        let content = self
            .complete(&request.model, &request.system, &request.prompt)
            .await?;

        let expects_report = request.schema_has_property("reportMarkdown");
        match coerce_object(&content, expects_report) {
            Some((strategy, value)) => {
                debug!("Coerced model reply using '{}' strategy", strategy);
                Ok(value)
            }
            None => {
                let preview: String = content.chars().take(200).collect();
                warn!("Model reply could not be coerced to JSON: {}", preview);
                Err(ResearchError::parse(format!(
                    "Failed to parse response as JSON or extract numbered list items: {}",
                    preview
                )))
            }
        }
    }
}
