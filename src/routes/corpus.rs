use axum::{extract::State, routing::get, Json, Router};
use tracing::info;

use crate::models::{AppState, CorpusResponse};
use crate::types::AppResult;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/corpus", get(corpus_info))
        .with_state(state)
}

async fn corpus_info(State(state): State<AppState>) -> AppResult<Json<CorpusResponse>> {
    let resource_name = state.corpus.resolve().await?;
    info!(corpus = %resource_name, "Corpus info requested");

    let vertex = &state.config.vertex;
    let upload = state.corpus.upload_config();
    Ok(Json(CorpusResponse {
        display_name: state.corpus.corpus_name().to_string(),
        resource_name,
        project: vertex.project_id.clone(),
        location: vertex.location.clone(),
        embedding_model: vertex.embedding_model.clone(),
        chunk_size: upload.chunk_size,
        chunk_overlap: upload.chunk_overlap,
        max_file_size_mb: upload.max_file_size_mb,
        supported_file_types: upload.supported_file_types.clone(),
    }))
}
