//! The ingestion pipeline.
//!
//! Sequences one folder through collection, chunking, embedding, and
//! persistence. Failures are contained at file granularity during
//! collection only; anything later aborts the run and surfaces as a single
//! error. Entries persisted by earlier runs are never rolled back.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::chunker::{self, Chunk, ChunkingOptions};
use crate::collector::{FileCollector, SkippedFile};
use crate::embeddings::EmbeddingProvider;
use crate::stores::{ChunkRecord, ChunkStore};
use crate::types::IngestError;

/// Per-file slice of an ingestion run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileIngestReport {
    pub filename: String,
    pub chunks: usize,
}

/// Caller-facing result of one ingestion run.
///
/// Empty input (no files, no chunks) is a success with zero counts, not an
/// error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionSummary {
    pub status: String,
    pub message: String,
    pub files_processed: usize,
    pub total_chunks: usize,
    pub files: Vec<FileIngestReport>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_files: Vec<SkippedFile>,
}

/// Composes the ingest path over explicitly injected collaborators.
///
/// The provider and store are shared, long-lived services; the pipeline
/// holds an internal gate so at most one ingestion runs at a time —
/// concurrent requests queue rather than interleave.
pub struct IngestionPipeline {
    collector: FileCollector,
    provider: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn ChunkStore>,
    options: ChunkingOptions,
    gate: Mutex<()>,
}

impl IngestionPipeline {
    pub fn new(
        collector: FileCollector,
        provider: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn ChunkStore>,
        options: ChunkingOptions,
    ) -> Self {
        Self {
            collector,
            provider,
            store,
            options,
            gate: Mutex::new(()),
        }
    }

    /// Runs the full pipeline for `folder`.
    ///
    /// The folder must exist and be a directory; that is checked before any
    /// other work, so an invalid request performs no side effects.
    pub async fn ingest(&self, folder: &Path) -> Result<IngestionSummary, IngestError> {
        let _running = self.gate.lock().await;

        match tokio::fs::metadata(folder).await {
            Ok(meta) if meta.is_dir() => {}
            _ => {
                return Err(IngestError::InvalidInput(format!(
                    "folder '{}' does not exist or is not a directory",
                    folder.display()
                )));
            }
        }

        let outcome = self.collector.collect(folder).await?;
        for skipped in &outcome.skipped {
            warn!(
                file = %skipped.filename,
                reason = %skipped.reason,
                "file excluded from ingestion"
            );
        }

        let mut chunks: Vec<Chunk> = Vec::new();
        let mut files = Vec::with_capacity(outcome.files.len());
        for file in &outcome.files {
            let file_chunks = chunker::chunk_text(
                &file.filename,
                &file.contents,
                Some(&file.path.to_string_lossy()),
                self.options,
            );
            files.push(FileIngestReport {
                filename: file.filename.clone(),
                chunks: file_chunks.len(),
            });
            chunks.extend(file_chunks);
        }

        if chunks.is_empty() {
            info!(folder = %folder.display(), "nothing to ingest");
            return Ok(IngestionSummary {
                status: "success".to_string(),
                message: format!("no eligible content found in '{}'", folder.display()),
                files_processed: files.len(),
                total_chunks: 0,
                files,
                skipped_files: outcome.skipped,
            });
        }

        // One embedding call for the whole cross-file batch.
        let texts: Vec<String> = chunks.iter().map(|chunk| chunk.text.clone()).collect();
        let embeddings = self.provider.embed_batch(&texts).await?;
        if embeddings.len() != chunks.len() {
            return Err(IngestError::Embedding(format!(
                "provider returned {} embeddings for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        let records: Vec<ChunkRecord> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| ChunkRecord::from_chunk(chunk, embedding))
            .collect();
        let total_chunks = records.len();

        self.store.upsert_chunks(records).await?;

        info!(
            folder = %folder.display(),
            files = files.len(),
            chunks = total_chunks,
            embedder = self.provider.name(),
            "ingestion complete"
        );

        Ok(IngestionSummary {
            status: "success".to_string(),
            message: format!(
                "ingested {} chunks from {} files",
                total_chunks,
                files.len()
            ),
            files_processed: files.len(),
            total_chunks,
            files,
            skipped_files: outcome.skipped,
        })
    }
}
