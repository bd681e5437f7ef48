use async_trait::async_trait;
use rig::client::EmbeddingsClient;
use rig::embeddings::EmbeddingsBuilder;
use rig::providers::gemini;

use crate::domain::{ports::EmbeddingService, DomainError, Embedding};
use crate::infrastructure::config::EmbeddingConfig;

/// Gemini text embeddings. The client is built once and shared.
pub struct TextEmbedding {
    client: gemini::Client,
    model: String,
    dimension: usize,
}

impl TextEmbedding {
    pub fn new(client: gemini::Client, config: &EmbeddingConfig) -> Self {
        Self {
            client,
            model: config.model.clone(),
            dimension: config.dimension,
        }
    }

    fn to_embedding(&self, values: Vec<f64>) -> Result<Embedding, DomainError> {
        let embedding = Embedding::new(values.into_iter().map(|x| x as f32).collect());
        embedding.ensure_dimension(self.dimension)?;
        Ok(embedding)
    }
}

#[async_trait]
impl EmbeddingService for TextEmbedding {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
        let model = self.client.embedding_model(&self.model);

        let embeddings = EmbeddingsBuilder::new(model)
            .document(text.to_string())
            .map_err(|e| DomainError::external(e.to_string()))?
            .build()
            .await
            .map_err(|e| DomainError::external(e.to_string()))?;

        let (_, emb) = embeddings
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::external("No embedding returned"))?;
        self.to_embedding(emb.first().vec)
    }
}
