//! HTTP surface for the ingestion service.
//!
//! Three routes: a root connectivity probe, the `/embed` diagnostic, and
//! `/ingest`. Handlers stay thin; everything of substance happens in the
//! pipeline.

use std::path::PathBuf;
use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use rand::RngExt;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use crate::embeddings::EmbeddingProvider;
use crate::ingestion::{IngestionPipeline, IngestionSummary};
use crate::types::IngestError;

/// Shared state handed to every handler.
pub struct AppState {
    pub pipeline: IngestionPipeline,
    pub provider: Arc<dyn EmbeddingProvider>,
}

#[derive(Debug, Deserialize)]
pub struct FolderRequest {
    pub folder_path: String,
}

#[derive(Debug, Serialize)]
pub struct EmbedResponse {
    pub embedding: Vec<f32>,
    pub folder_path: String,
    pub dimensions: usize,
}

/// Builds the service router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/embed", post(embed))
        .route("/ingest", post(ingest))
        .with_state(state)
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({ "message": "vecsmith ingestion service is running" }))
}

/// Connectivity probe: a random vector of the deployed dimension, unrelated
/// to the folder's content. Validates transport and shape, nothing more.
async fn embed(
    State(state): State<Arc<AppState>>,
    Json(request): Json<FolderRequest>,
) -> Json<EmbedResponse> {
    let dimensions = state.provider.dimensions();
    let mut rng = rand::rng();
    let embedding: Vec<f32> = (0..dimensions)
        .map(|_| rng.random_range(-1.0f32..1.0))
        .collect();
    Json(EmbedResponse {
        embedding,
        folder_path: request.folder_path,
        dimensions,
    })
}

async fn ingest(
    State(state): State<Arc<AppState>>,
    Json(request): Json<FolderRequest>,
) -> Result<Json<IngestionSummary>, ApiError> {
    let folder = PathBuf::from(&request.folder_path);
    let summary = state.pipeline.ingest(&folder).await?;
    Ok(Json(summary))
}

/// Translates pipeline failures into HTTP responses: invalid input is the
/// caller's fault, everything else is ours.
pub struct ApiError(IngestError);

impl From<IngestError> for ApiError {
    fn from(err: IngestError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            IngestError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!(error = %self.0, "ingestion request failed");
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}
