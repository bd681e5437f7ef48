use async_trait::async_trait;

use crate::domain::{errors::DomainError, SearchResult};

/// Similarity search over the configured corpus.
///
/// Results come back ordered by descending similarity, at most `limit` of them.
#[async_trait]
pub trait SearchCapability: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, DomainError>;
}
