//! Embedding providers.
//!
//! [`EmbeddingProvider`] is the seam between the pipeline and whatever
//! model produces vectors: a deterministic mock for tests and offline runs,
//! and an adapter over rig-core models for real pretrained embeddings.
//! Providers are shared, process-wide resources; construct one at startup
//! and hand it around behind an `Arc`.

mod mock;
mod rig;

pub use self::mock::MockEmbeddingProvider;
pub use self::rig::RigEmbeddingProvider;

use async_trait::async_trait;

use crate::types::IngestError;

/// Maps ordered batches of text to index-aligned embedding vectors.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embeds a batch of texts, returning exactly one vector per input, in
    /// input order. An empty batch yields an empty result without touching
    /// the model. Deterministic for a fixed model and fixed input.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, IngestError>;

    /// Fixed dimension of every vector this provider returns.
    fn dimensions(&self) -> usize;

    /// Short provider name for logs.
    fn name(&self) -> &'static str;
}
