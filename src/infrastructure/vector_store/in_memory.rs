use async_trait::async_trait;
use std::sync::RwLock;

use crate::domain::{ports::VectorStore, ContractRecord, DomainError, Embedding, SearchResult};

/// Process-local store with brute-force cosine search.
pub struct InMemoryVectorStore {
    records: RwLock<Vec<(ContractRecord, Embedding)>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn upsert(
        &self,
        record: &ContractRecord,
        embedding: &Embedding,
    ) -> Result<(), DomainError> {
        let mut store = self
            .records
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        store.retain(|(r, _)| r.id != record.id);
        store.push((record.clone(), embedding.clone()));
        Ok(())
    }

    async fn search(
        &self,
        query: &Embedding,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, DomainError> {
        let store = self
            .records
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        let mut scored: Vec<(&ContractRecord, f32)> = store
            .iter()
            .map(|(record, embedding)| (record, query.cosine_similarity(embedding)))
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        Ok(scored
            .into_iter()
            .take(top_k)
            .map(|(record, score)| {
                SearchResult::new(record.content.clone(), score).with_metadata(&record.metadata)
            })
            .collect())
    }

    async fn clear(&self) -> Result<(), DomainError> {
        self.records
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?
            .clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ContractMetadata;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_upsert_and_search() {
        let store = InMemoryVectorStore::new();
        let dates = ContractMetadata {
            effective_date: NaiveDate::from_ymd_opt(2022, 7, 1),
            ..ContractMetadata::default()
        };

        store
            .upsert(&ContractRecord::new("near", dates.clone()), &Embedding::new(vec![1.0, 0.0]))
            .await
            .unwrap();
        store
            .upsert(
                &ContractRecord::new("far", ContractMetadata::default()),
                &Embedding::new(vec![0.0, 1.0]),
            )
            .await
            .unwrap();

        let results = store.search(&Embedding::new(vec![1.0, 0.1]), 1).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].content, "near");
        assert_eq!(results[0].effective_date, dates.effective_date);
    }

    #[tokio::test]
    async fn test_upsert_replaces_same_id() {
        let store = InMemoryVectorStore::new();
        let mut record = ContractRecord::new("v1", ContractMetadata::default());
        store.upsert(&record, &Embedding::new(vec![1.0])).await.unwrap();

        record.content = "v2".to_string();
        store.upsert(&record, &Embedding::new(vec![1.0])).await.unwrap();

        assert_eq!(store.len(), 1);
        let results = store.search(&Embedding::new(vec![1.0]), 5).await.unwrap();
        assert_eq!(results[0].content, "v2");
    }

    #[tokio::test]
    async fn test_clear() {
        let store = InMemoryVectorStore::new();
        store
            .upsert(
                &ContractRecord::new("x", ContractMetadata::default()),
                &Embedding::new(vec![1.0]),
            )
            .await
            .unwrap();

        store.clear().await.unwrap();

        assert!(store.is_empty());
    }
}
