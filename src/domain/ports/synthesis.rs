use async_trait::async_trait;

use crate::domain::{errors::DomainError, AggregatedContext, SynthesizedResponse};

#[async_trait]
pub trait Synthesizer: Send + Sync {
    async fn generate_response(
        &self,
        question: &str,
        context: &AggregatedContext,
    ) -> Result<SynthesizedResponse, DomainError>;
}
