use async_trait::async_trait;

use crate::domain::{errors::DomainError, Embedding};

/// Turns text into vectors. Callers truncate inputs to the byte budget first.
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError>;
}
