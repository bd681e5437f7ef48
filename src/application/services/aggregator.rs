use std::collections::HashSet;
use std::sync::Arc;

use serde::Deserialize;
use tracing::instrument;

use crate::domain::{
    chunk_text, ports::SearchCapability, AggregatedContext, ContextEntry, DomainError,
    SearchResult, DEFAULT_CHUNK_SIZE,
};

/// Order applied to deduplicated hits before the result cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ranking {
    /// Earliest chunk first, search order within a chunk.
    #[default]
    ChunkOrder,
    /// Highest score first; ties keep chunk order.
    Score,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregationOptions {
    pub chunk_size: usize,
    pub per_chunk_limit: usize,
    pub max_results: usize,
    pub ranking: Ranking,
}

impl Default for AggregationOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            per_chunk_limit: 3,
            max_results: 3,
            ranking: Ranking::ChunkOrder,
        }
    }
}

/// Builds an [`AggregatedContext`] for a whole document by searching each
/// of its chunks in turn.
pub struct SearchAggregator {
    search: Arc<dyn SearchCapability>,
    options: AggregationOptions,
}

impl SearchAggregator {
    pub fn new(search: Arc<dyn SearchCapability>, options: AggregationOptions) -> Self {
        Self { search, options }
    }

    pub fn options(&self) -> &AggregationOptions {
        &self.options
    }

    /// Searches every chunk sequentially, then deduplicates by content and
    /// caps the result. The first failing search aborts the whole run.
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    pub async fn aggregate(&self, text: &str) -> Result<AggregatedContext, DomainError> {
        let mut collected: Vec<SearchResult> = Vec::new();
        let mut chunk_count = 0usize;

        for chunk in chunk_text(text, self.options.chunk_size) {
            let results = self
                .search
                .search(chunk, self.options.per_chunk_limit)
                .await?;
            tracing::debug!(chunk = chunk_count, hits = results.len(), "chunk searched");
            collected.extend(results);
            chunk_count += 1;
        }

        let total_hits = collected.len();
        let context = self.merge(collected);

        tracing::info!(
            chunks = chunk_count,
            hits = total_hits,
            kept = context.len(),
            "context aggregated"
        );
        Ok(context)
    }

    fn merge(&self, results: Vec<SearchResult>) -> AggregatedContext {
        let mut seen = HashSet::new();
        let mut unique: Vec<SearchResult> = results
            .into_iter()
            .filter(|r| seen.insert(r.content.clone()))
            .collect();

        if self.options.ranking == Ranking::Score {
            unique.sort_by(|a, b| b.score.total_cmp(&a.score));
        }

        unique.truncate(self.options.max_results);
        AggregatedContext::from_entries(unique.into_iter().map(ContextEntry::from).collect())
    }
}
