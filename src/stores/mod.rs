//! Vector index storage.
//!
//! [`ChunkStore`] is the write-side interface of the vector index; the
//! pipeline and its tests only see this trait. The SQLite + sqlite-vec
//! implementation lives in [`sqlite`].
//!
//! ```text
//!                  ┌──────────────────┐
//!                  │  ChunkStore      │
//!                  │  (async upsert)  │
//!                  └────────┬─────────┘
//!                           │
//!                           ▼
//!                  ┌──────────────────┐
//!                  │     SQLite       │
//!                  │   sqlite-vec     │
//!                  └──────────────────┘
//! ```

pub mod sqlite;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::chunker::Chunk;
use crate::types::IngestError;

pub use sqlite::{ChunkCollection, SqliteVectorStore};

/// A chunk paired with its embedding, ready to persist.
///
/// Carrying text, vector, id, and metadata in one record keeps the parallel
/// sequences the underlying write needs aligned by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub id: String,
    pub source_file: String,
    pub chunk_index: usize,
    pub file_path: String,
    pub content: String,
    pub embedding: Vec<f32>,
}

impl ChunkRecord {
    /// Pairs a chunk with its embedding, deriving the store id.
    pub fn from_chunk(chunk: Chunk, embedding: Vec<f32>) -> Self {
        Self {
            id: chunk.id(),
            source_file: chunk.source_file,
            chunk_index: chunk.chunk_index,
            file_path: chunk.file_path,
            content: chunk.text,
            embedding,
        }
    }
}

/// A persisted entry as read back from the index (embedding not
/// rehydrated; reads exist for verification, not retrieval).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredChunk {
    pub id: String,
    pub source_file: String,
    pub chunk_index: usize,
    pub file_path: String,
    pub content: String,
}

/// Write-side interface of the vector index.
#[async_trait]
pub trait ChunkStore: Send + Sync {
    /// Persists every record in one transaction. An entry whose id already
    /// exists is replaced — embedding, content, and metadata — so the store
    /// never holds two live entries with the same id.
    async fn upsert_chunks(&self, records: Vec<ChunkRecord>) -> Result<(), IngestError>;

    /// Fetches one entry by id.
    async fn get_chunk(&self, id: &str) -> Result<Option<StoredChunk>, IngestError>;

    /// Total number of live entries in the collection.
    async fn count(&self) -> Result<usize, IngestError>;

    /// Number of live entries originating from one source file.
    async fn count_for_source(&self, source_file: &str) -> Result<usize, IngestError>;
}
