use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use crate::domain::{
    ports::{EmbeddingService, SearchCapability, VectorStore},
    truncate_to_bytes, ContractRecord, DomainError, SearchResult, DEFAULT_MAX_BYTES,
};

/// Embeds queries and looks them up in the vector store.
///
/// Queries are cut to the embedding byte budget before they leave the process.
pub struct VectorSearch {
    embedding: Arc<dyn EmbeddingService>,
    vector_store: Arc<dyn VectorStore>,
    max_bytes: usize,
}

impl VectorSearch {
    pub fn new(embedding: Arc<dyn EmbeddingService>, vector_store: Arc<dyn VectorStore>) -> Self {
        Self {
            embedding,
            vector_store,
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }

    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    #[instrument(skip(self, record), fields(record_id = %record.id))]
    pub async fn index(&self, record: &ContractRecord) -> Result<(), DomainError> {
        let content = truncate_to_bytes(&record.content, self.max_bytes);
        let embedding = self.embedding.embed(content).await?;
        self.vector_store.upsert(record, &embedding).await
    }

    #[instrument(skip(self))]
    pub async fn reset(&self) -> Result<(), DomainError> {
        self.vector_store.clear().await
    }
}

#[async_trait]
impl SearchCapability for VectorSearch {
    #[instrument(skip(self, query), fields(query_len = query.len(), limit))]
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, DomainError> {
        let query = truncate_to_bytes(query, self.max_bytes);
        let embedding = self.embedding.embed(query).await?;
        self.vector_store.search(&embedding, limit).await
    }
}
