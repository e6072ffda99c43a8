//! Adapter exposing a rig-core embedding model as an [`EmbeddingProvider`].

use async_trait::async_trait;
use rig::embeddings::EmbeddingModel;

use super::EmbeddingProvider;
use crate::types::IngestError;

/// Wraps a pretrained rig model behind the provider seam.
///
/// Combined cross-file batches can exceed a model's per-call document
/// limit, so inputs are replayed to the model in `MAX_DOCUMENTS`-sized
/// windows; output order follows input order throughout.
#[derive(Clone)]
pub struct RigEmbeddingProvider<M> {
    model: M,
}

impl<M> RigEmbeddingProvider<M>
where
    M: EmbeddingModel,
{
    pub fn new(model: M) -> Self {
        Self { model }
    }
}

#[async_trait]
impl<M> EmbeddingProvider for RigEmbeddingProvider<M>
where
    M: EmbeddingModel + Clone + Send + Sync + 'static,
{
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, IngestError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut vectors = Vec::with_capacity(texts.len());
        for window in texts.chunks(M::MAX_DOCUMENTS.max(1)) {
            let embedded = self
                .model
                .embed_texts(window.iter().cloned())
                .await
                .map_err(|err| IngestError::EmbeddingUnavailable(err.to_string()))?;
            if embedded.len() != window.len() {
                return Err(IngestError::Embedding(format!(
                    "model returned {} embeddings for {} inputs",
                    embedded.len(),
                    window.len()
                )));
            }
            vectors.extend(embedded.into_iter().map(|embedding| {
                embedding
                    .vec
                    .into_iter()
                    .map(|component| component as f32)
                    .collect::<Vec<f32>>()
            }));
        }
        Ok(vectors)
    }

    fn dimensions(&self) -> usize {
        self.model.ndims()
    }

    fn name(&self) -> &'static str {
        "rig"
    }
}
