//! Startup configuration from the environment.
//!
//! Every setting has a default and a `VECSMITH_*` override; a `.env` file
//! is honored when the binary loads it via dotenvy. Persistence location,
//! collection name, chunking parameters, bind address, and provider choice
//! are all explicit configuration rather than hardcoded paths.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::chunker::ChunkingOptions;
use crate::types::IngestError;

/// Which embedding backend the binary wires up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// Deterministic offline vectors; the default.
    Mock,
    /// OpenAI embeddings through rig-core (`OPENAI_API_KEY` required).
    OpenAi,
}

/// Runtime settings for the service binary.
#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub db_path: PathBuf,
    pub collection: String,
    pub chunking: ChunkingOptions,
    pub provider: ProviderKind,
    pub mock_dimensions: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, IngestError> {
        let addr = env_or("VECSMITH_ADDR", "127.0.0.1:8000")
            .parse()
            .map_err(|err| IngestError::Config(format!("invalid VECSMITH_ADDR: {err}")))?;
        let db_path = PathBuf::from(env_or("VECSMITH_DB", "./data/vecsmith.sqlite"));
        let collection = env_or("VECSMITH_COLLECTION", "rag_collection");

        let chunk_size = parse_usize("VECSMITH_CHUNK_SIZE", 500)?;
        let overlap = parse_usize("VECSMITH_OVERLAP", 50)?;
        let chunking = ChunkingOptions::new(chunk_size, overlap)?;

        let provider = match env_or("VECSMITH_EMBEDDINGS", "mock").as_str() {
            "mock" => ProviderKind::Mock,
            "openai" => ProviderKind::OpenAi,
            other => {
                return Err(IngestError::Config(format!(
                    "unknown embeddings provider '{other}' (expected 'mock' or 'openai')"
                )));
            }
        };
        let mock_dimensions = parse_usize("VECSMITH_MOCK_DIMENSIONS", 384)?;

        Ok(Self {
            addr,
            db_path,
            collection,
            chunking,
            provider,
            mock_dimensions,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_usize(key: &str, default: usize) -> Result<usize, IngestError> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|err| IngestError::Config(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}
