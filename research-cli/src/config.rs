//! Runtime configuration read from the environment

use research_engine::{SchedulerConfig, DEFAULT_CONCURRENCY_LIMIT, DEFAULT_MODEL};
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `RESEARCH_MODEL`
    pub model: String,
    /// `RESEARCH_CONCURRENCY`
    pub concurrency_limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            concurrency_limit: DEFAULT_CONCURRENCY_LIMIT,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let model = lookup("RESEARCH_MODEL")
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or(defaults.model);

        let concurrency_limit = match lookup("RESEARCH_CONCURRENCY") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(limit) if limit > 0 => limit,
                _ => {
                    warn!(
                        "Ignoring invalid RESEARCH_CONCURRENCY '{}', using {}",
                        raw, defaults.concurrency_limit
                    );
                    defaults.concurrency_limit
                }
            },
            None => defaults.concurrency_limit,
        };

        Self {
            model,
            concurrency_limit,
        }
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig::default()
            .with_model(&self.model)
            .with_concurrency_limit(self.concurrency_limit)
    }
}
