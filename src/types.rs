//! Shared error types for the ingestion pipeline.

use thiserror::Error;

/// Errors surfaced by the ingestion pipeline and its collaborators.
///
/// Per-file read failures are not represented here; those are contained at
/// collection time and reported in the ingestion summary instead of
/// propagating.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The caller supplied input the pipeline cannot work with, e.g. a
    /// folder that does not exist. Surfaced before any side effects.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The embedding model could not be reached or refused the request.
    #[error("embedding model unavailable: {0}")]
    EmbeddingUnavailable(String),

    /// The embedding model misbehaved: wrong vector count or dimension.
    #[error("embedding failed: {0}")]
    Embedding(String),

    /// The vector store rejected an operation.
    #[error("storage failure: {0}")]
    Storage(String),

    /// Filesystem access failed outside the per-file containment path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Startup configuration could not be parsed.
    #[error("configuration error: {0}")]
    Config(String),
}
