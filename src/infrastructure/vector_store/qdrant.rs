use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, DeleteCollectionBuilder, Distance, PointStruct, SearchPointsBuilder,
    UpsertPointsBuilder, Value, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};

use crate::domain::{
    ports::VectorStore, ContractMetadata, ContractRecord, DomainError, Embedding, SearchResult,
};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Qdrant-backed store. One point per contract record, cosine distance.
pub struct QdrantVectorStore {
    client: Qdrant,
    collection: String,
    dimension: usize,
}

impl QdrantVectorStore {
    pub async fn new(url: &str, collection: &str, dimension: usize) -> Result<Self, DomainError> {
        let client = Qdrant::from_url(url)
            .build()
            .map_err(|e| DomainError::external(e.to_string()))?;

        let store = Self {
            client,
            collection: collection.to_string(),
            dimension,
        };

        store.ensure_collection().await?;

        Ok(store)
    }

    async fn ensure_collection(&self) -> Result<(), DomainError> {
        let collections = self
            .client
            .list_collections()
            .await
            .map_err(|e| DomainError::external(e.to_string()))?;

        let exists = collections
            .collections
            .iter()
            .any(|c| c.name == self.collection);

        if !exists {
            self.client
                .create_collection(
                    CreateCollectionBuilder::new(&self.collection).vectors_config(
                        VectorParamsBuilder::new(self.dimension as u64, Distance::Cosine),
                    ),
                )
                .await
                .map_err(|e| DomainError::external(e.to_string()))?;
            tracing::info!(collection = %self.collection, "collection created");
        }

        Ok(())
    }

    fn payload(record: &ContractRecord) -> Result<Payload, DomainError> {
        let date = |d: Option<NaiveDate>| d.map(|d| d.format(DATE_FORMAT).to_string());

        serde_json::json!({
            "record_id": record.id.to_string(),
            "content": record.content,
            "agreement_date": date(record.metadata.agreement_date),
            "effective_date": date(record.metadata.effective_date),
            "expiration_date": date(record.metadata.expiration_date),
        })
        .try_into()
        .map_err(|_| DomainError::internal("Failed to create payload"))
    }

    fn parse_hit(payload: &HashMap<String, Value>, score: f32) -> Option<SearchResult> {
        let content = payload.get("content")?.as_str()?.to_string();
        let date = |key: &str| {
            payload
                .get(key)
                .and_then(|v| v.as_str())
                .and_then(|s| NaiveDate::parse_from_str(s, DATE_FORMAT).ok())
        };

        let metadata = ContractMetadata {
            agreement_date: date("agreement_date"),
            effective_date: date("effective_date"),
            expiration_date: date("expiration_date"),
        };
        Some(SearchResult::new(content, score).with_metadata(&metadata))
    }
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    async fn upsert(
        &self,
        record: &ContractRecord,
        embedding: &Embedding,
    ) -> Result<(), DomainError> {
        embedding.ensure_dimension(self.dimension)?;

        let point = PointStruct::new(
            record.id.to_string(),
            embedding.as_slice().to_vec(),
            Self::payload(record)?,
        );

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, vec![point]).wait(true))
            .await
            .map_err(|e| DomainError::external(e.to_string()))?;

        Ok(())
    }

    async fn search(
        &self,
        query: &Embedding,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, DomainError> {
        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(&self.collection, query.as_slice().to_vec(), top_k as u64)
                    .with_payload(true),
            )
            .await
            .map_err(|e| DomainError::external(e.to_string()))?;

        let results: Vec<SearchResult> = response
            .result
            .into_iter()
            .filter_map(|point| {
                let hit = Self::parse_hit(&point.payload, point.score);
                if hit.is_none() {
                    tracing::warn!(collection = %self.collection, "dropping point without content");
                }
                hit
            })
            .collect();

        Ok(results)
    }

    async fn clear(&self) -> Result<(), DomainError> {
        self.client
            .delete_collection(DeleteCollectionBuilder::new(&self.collection))
            .await
            .map_err(|e| DomainError::external(e.to_string()))?;

        self.ensure_collection().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hit_reads_content_and_dates() {
        let mut payload = HashMap::new();
        payload.insert("content".to_string(), Value::from("Supply agreement"));
        payload.insert("agreement_date".to_string(), Value::from("2020-01-31"));
        payload.insert("effective_date".to_string(), Value::from("not a date"));

        let hit = QdrantVectorStore::parse_hit(&payload, 0.42).unwrap();

        assert_eq!(hit.content, "Supply agreement");
        assert_eq!(hit.score, 0.42);
        assert_eq!(hit.agreement_date, NaiveDate::from_ymd_opt(2020, 1, 31));
        assert_eq!(hit.effective_date, None);
        assert_eq!(hit.expiration_date, None);
    }

    #[test]
    fn test_parse_hit_requires_content() {
        let payload = HashMap::new();
        assert!(QdrantVectorStore::parse_hit(&payload, 1.0).is_none());
    }
}
