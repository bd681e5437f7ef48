use async_trait::async_trait;

use crate::domain::{errors::DomainError, ContractRecord, Embedding, SearchResult};

#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn upsert(&self, record: &ContractRecord, embedding: &Embedding)
        -> Result<(), DomainError>;
    /// Top `top_k` records by similarity, best first.
    async fn search(&self, query: &Embedding, top_k: usize)
        -> Result<Vec<SearchResult>, DomainError>;
    /// Removes every stored record.
    async fn clear(&self) -> Result<(), DomainError>;
}
