//! Orchestration of the ingest path: collect → chunk → embed → persist.

mod pipeline;

pub use pipeline::{FileIngestReport, IngestionPipeline, IngestionSummary};
