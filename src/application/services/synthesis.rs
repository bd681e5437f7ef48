use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use crate::domain::{
    ports::{LlmService, Synthesizer},
    AggregatedContext, DomainError, ModelResponse, ResponseKind, SynthesizedResponse,
};

/// Turns a question plus retrieved context into a model answer.
pub struct SynthesisService {
    llm: Arc<dyn LlmService>,
    system_prompt: String,
}

impl SynthesisService {
    pub fn new(llm: Arc<dyn LlmService>, system_prompt: impl Into<String>) -> Self {
        Self {
            llm,
            system_prompt: system_prompt.into(),
        }
    }

    /// Asks the model and builds the response shape chosen by the caller.
    #[instrument(skip(self, question, context), fields(context_entries = context.len()))]
    pub async fn complete(
        &self,
        kind: ResponseKind,
        question: &str,
        context: &AggregatedContext,
    ) -> Result<ModelResponse, DomainError> {
        let system = format!("{}\n\n{}", self.system_prompt, kind.format_instructions());
        let prompt = build_prompt(question, context);

        let raw = self.llm.complete_with_system(&system, &prompt).await?;
        Ok(kind.build(&raw))
    }
}

#[async_trait]
impl Synthesizer for SynthesisService {
    async fn generate_response(
        &self,
        question: &str,
        context: &AggregatedContext,
    ) -> Result<SynthesizedResponse, DomainError> {
        match self
            .complete(ResponseKind::Synthesized, question, context)
            .await?
        {
            ModelResponse::Synthesized(response) => Ok(response),
            ModelResponse::Generic(_) => Err(DomainError::internal(
                "synthesized request produced a generic response",
            )),
        }
    }
}

fn build_prompt(question: &str, context: &AggregatedContext) -> String {
    format!(
        "# User question:\n{question}\n\n# Retrieved information:\n{}",
        context.to_prompt_json()
    )
}
