//! Deterministic mock embedding provider.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use async_trait::async_trait;

use super::EmbeddingProvider;
use crate::types::IngestError;

/// Default mock dimension, matching common sentence-embedding models.
pub const DEFAULT_DIMENSIONS: usize = 384;

/// Hash-derived embeddings: stable for a given text, cheap, and offline.
///
/// The vectors carry no semantic signal; they exist so the pipeline and its
/// tests can run without a real model.
#[derive(Debug, Clone)]
pub struct MockEmbeddingProvider {
    dimensions: usize,
}

impl MockEmbeddingProvider {
    pub fn new() -> Self {
        Self {
            dimensions: DEFAULT_DIMENSIONS,
        }
    }

    pub fn with_dimensions(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn hash_to_vec(&self, text: &str) -> Vec<f32> {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        let seed = hasher.finish();
        (0..self.dimensions)
            .map(|i| {
                let bits = seed.rotate_left(((i * 7) % 64) as u32) ^ ((i as u64) << 24);
                ((bits as f64 / u64::MAX as f64) * 2.0 - 1.0) as f32
            })
            .collect()
    }
}

impl Default for MockEmbeddingProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, IngestError> {
        Ok(texts.iter().map(|text| self.hash_to_vec(text)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
