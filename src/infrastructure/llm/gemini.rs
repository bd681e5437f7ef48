use std::time::Duration;

use async_trait::async_trait;
use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers::gemini;

use crate::domain::{ports::LlmService, DomainError};
use crate::infrastructure::config::LlmConfig;

pub struct GeminiLlm {
    client: gemini::Client,
    model: String,
    temperature: f64,
    max_tokens: Option<u64>,
    timeout: Duration,
}

impl GeminiLlm {
    pub fn new(client: gemini::Client, config: &LlmConfig) -> Self {
        Self {
            client,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }

    async fn run(&self, system: &str, prompt: &str) -> Result<String, DomainError> {
        let mut builder = self
            .client
            .agent(&self.model)
            .preamble(system)
            .temperature(self.temperature);
        if let Some(max_tokens) = self.max_tokens {
            builder = builder.max_tokens(max_tokens);
        }
        let agent = builder.build();

        tokio::time::timeout(self.timeout, agent.prompt(prompt))
            .await
            .map_err(|_| DomainError::timeout(format!("{} did not answer in time", self.model)))?
            .map_err(|e| DomainError::external(format!("Completion failed: {e}")))
    }
}

#[async_trait]
impl LlmService for GeminiLlm {
    async fn complete_with_system(
        &self,
        system: &str,
        prompt: &str,
    ) -> Result<String, DomainError> {
        self.run(system, prompt).await
    }
}
