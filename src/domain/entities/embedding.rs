use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, Result};

/// Fixed-length vector produced by the embedding model for one text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding(pub Vec<f32>);

impl Embedding {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn dimension(&self) -> usize {
        self.0.len()
    }

    /// Rejects vectors whose length differs from the collection's.
    pub fn ensure_dimension(&self, expected: usize) -> Result<()> {
        if self.dimension() == expected {
            Ok(())
        } else {
            Err(DomainError::validation(format!(
                "embedding has {} dimensions, expected {expected}",
                self.dimension()
            )))
        }
    }

    pub fn cosine_similarity(&self, other: &Embedding) -> f32 {
        if self.0.len() != other.0.len() || self.0.is_empty() {
            return 0.0;
        }

        let dot: f32 = self.0.iter().zip(&other.0).map(|(a, b)| a * b).sum();
        let norm_a = self.0.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b = other.0.iter().map(|x| x * x).sum::<f32>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            0.0
        } else {
            dot / (norm_a * norm_b)
        }
    }
}

impl From<Vec<f32>> for Embedding {
    fn from(values: Vec<f32>) -> Self {
        Self(values)
    }
}
