//! Service binary: wires configuration, the vector store, an embedding
//! provider, and the HTTP router, then serves until shut down.

use std::sync::Arc;

use rig::client::{EmbeddingsClient, ProviderClient};
use rig::providers::openai;
use tokio::net::TcpListener;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt};

use vecsmith::collector::FileCollector;
use vecsmith::config::{Config, ProviderKind};
use vecsmith::embeddings::{EmbeddingProvider, MockEmbeddingProvider, RigEmbeddingProvider};
use vecsmith::ingestion::IngestionPipeline;
use vecsmith::server::{self, AppState};
use vecsmith::stores::SqliteVectorStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    let config = Config::from_env()?;

    let provider: Arc<dyn EmbeddingProvider> = match config.provider {
        ProviderKind::Mock => Arc::new(MockEmbeddingProvider::with_dimensions(
            config.mock_dimensions,
        )),
        ProviderKind::OpenAi => {
            let client = openai::Client::from_env();
            Arc::new(RigEmbeddingProvider::new(
                client.embedding_model(openai::TEXT_EMBEDDING_3_SMALL),
            ))
        }
    };

    if let Some(parent) = config.db_path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    let store = SqliteVectorStore::open(&config.db_path).await?;
    let collection = store
        .collection(&config.collection, provider.dimensions())
        .await?;

    let pipeline = IngestionPipeline::new(
        FileCollector::new(),
        provider.clone(),
        Arc::new(collection),
        config.chunking,
    );

    let state = Arc::new(AppState { pipeline, provider });
    let router = server::router(state);

    let listener = TcpListener::bind(config.addr).await?;
    info!(
        addr = %config.addr,
        db = %config.db_path.display(),
        collection = %config.collection,
        "vecsmith service listening"
    );
    axum::serve(listener, router.into_make_service()).await?;

    Ok(())
}
