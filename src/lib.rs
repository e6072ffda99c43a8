//! ```text
//! Folder ──► collector::FileCollector ──► per-file text (failures contained)
//!
//! Text ──► chunker::chunk_text ──► overlapping positional Chunks
//!
//! Chunks ──► embeddings::EmbeddingProvider ──► index-aligned vectors
//!
//! Chunks + vectors ──► stores::ChunkCollection ──► sqlite-vec upsert
//!
//! ingestion::IngestionPipeline sequences the steps; server:: exposes them
//! over HTTP. similarity:: offers offline embedding comparison.
//! ```

pub mod chunker;
pub mod collector;
pub mod config;
pub mod embeddings;
pub mod ingestion;
pub mod server;
pub mod similarity;
pub mod stores;
pub mod types;

pub use chunker::{Chunk, ChunkingOptions, chunk_text};
pub use embeddings::{EmbeddingProvider, MockEmbeddingProvider, RigEmbeddingProvider};
pub use ingestion::{IngestionPipeline, IngestionSummary};
pub use similarity::{compare_texts, cosine_similarity};
pub use stores::{ChunkCollection, ChunkRecord, ChunkStore, SqliteVectorStore};
pub use types::IngestError;
