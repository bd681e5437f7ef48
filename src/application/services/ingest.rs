use std::sync::Arc;

use tracing::instrument;

use crate::application::services::VectorSearch;
use crate::domain::{
    chunk_text, truncate_to_bytes, ContractRecord, Document, DomainError, DEFAULT_MAX_BYTES,
};

const PROGRESS_EVERY: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub inserted: usize,
    pub skipped: usize,
}

/// Loads contracts into the vector store.
///
/// By default each document becomes one record. With [`with_chunking`]
/// every window of the document is stored as its own record, which suits
/// whole contracts extracted from files.
///
/// [`with_chunking`]: IngestService::with_chunking
pub struct IngestService {
    search: Arc<VectorSearch>,
    max_bytes: usize,
    chunk_size: Option<usize>,
}

impl IngestService {
    pub fn new(search: Arc<VectorSearch>) -> Self {
        Self {
            search,
            max_bytes: DEFAULT_MAX_BYTES,
            chunk_size: None,
        }
    }

    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    pub fn with_chunking(mut self, chunk_size: usize) -> Self {
        self.chunk_size = Some(chunk_size);
        self
    }

    /// Truncates each document to the byte budget and stores it with its dates.
    ///
    /// With `reset` set, every previously stored record is removed first.
    #[instrument(skip(self, documents), fields(count = documents.len()))]
    pub async fn ingest(
        &self,
        documents: &[Document],
        reset: bool,
    ) -> Result<IngestReport, DomainError> {
        if reset {
            self.search.reset().await?;
            tracing::info!("deleted all existing embeddings");
        }

        let mut report = IngestReport::default();
        for doc in documents {
            if doc.is_empty() {
                tracing::warn!(name = %doc.name, "skipping empty document");
                report.skipped += 1;
                continue;
            }

            let pieces: Vec<&str> = match self.chunk_size {
                Some(window) => chunk_text(&doc.text, window).collect(),
                None => vec![doc.text.as_str()],
            };
            for piece in pieces {
                let content = truncate_to_bytes(piece, self.max_bytes);
                let record = ContractRecord::new(content, doc.metadata.dates.clone());
                self.search.index(&record).await?;

                report.inserted += 1;
                if report.inserted % PROGRESS_EVERY == 0 {
                    tracing::info!(processed = report.inserted, "ingesting contracts");
                }
            }
        }

        tracing::info!(
            inserted = report.inserted,
            skipped = report.skipped,
            "ingestion finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ports::SearchCapability, Embedding};
    use crate::domain::ports::EmbeddingService;
    use crate::infrastructure::InMemoryVectorStore;
    use async_trait::async_trait;

    struct ConstantEmbedding;

    #[async_trait]
    impl EmbeddingService for ConstantEmbedding {
        async fn embed(&self, _text: &str) -> Result<Embedding, DomainError> {
            Ok(Embedding::new(vec![1.0, 1.0]))
        }
    }

    fn service() -> (IngestService, Arc<VectorSearch>) {
        let search = Arc::new(VectorSearch::new(
            Arc::new(ConstantEmbedding),
            Arc::new(InMemoryVectorStore::new()),
        ));
        (IngestService::new(search.clone()), search)
    }

    #[tokio::test]
    async fn test_ingest_truncates_and_skips_empty() {
        let (ingest, search) = service();
        let ingest = ingest.with_max_bytes(8);
        let docs = vec![
            Document::new("row-1", "Parties: Acme and Globex"),
            Document::new("row-2", "   "),
        ];

        let report = ingest.ingest(&docs, false).await.unwrap();

        assert_eq!(report, IngestReport { inserted: 1, skipped: 1 });
        let stored = search.search("anything", 10).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].content, "Parties:");
    }

    #[tokio::test]
    async fn test_ingest_with_chunking_stores_each_window() {
        let (ingest, search) = service();
        let ingest = ingest.with_chunking(5);

        let report = ingest
            .ingest(&[Document::new("lease.txt", "abcdefghijkl")], false)
            .await
            .unwrap();

        assert_eq!(report.inserted, 3);
        let mut stored: Vec<String> = search
            .search("x", 10)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.content)
            .collect();
        stored.sort();
        assert_eq!(stored, vec!["abcde", "fghij", "kl"]);
    }

    #[tokio::test]
    async fn test_ingest_reset_replaces_previous_records() {
        let (ingest, search) = service();
        ingest
            .ingest(&[Document::new("old", "old contract")], false)
            .await
            .unwrap();

        ingest
            .ingest(&[Document::new("new", "new contract")], true)
            .await
            .unwrap();

        let stored = search.search("contract", 10).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].content, "new contract");
    }
}
