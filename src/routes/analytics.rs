use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use super::charts::{render_chart, ChartKind};
use crate::corpus::{file_type_distribution, get_corpus_stats, size_series, size_summary, upload_timeline};
use crate::models::{AnalyticsResponse, AppState};
use crate::types::AppResult;
use crate::utils::format::format_file_size;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/analytics", get(analytics))
        .route("/api/analytics/charts/{chart}", get(chart))
        .with_state(state)
}

async fn analytics(State(state): State<AppState>) -> AppResult<Json<AnalyticsResponse>> {
    let corpus = state.corpus.resolve().await?;
    let documents = state.corpus.list_documents(&corpus).await?;

    let stats = get_corpus_stats(&documents);
    let sizes = size_series(&documents);
    Ok(Json(AnalyticsResponse {
        total_size: format_file_size(stats.total_size),
        file_types: file_type_distribution(&documents),
        size_summary: size_summary(&sizes),
        timeline: upload_timeline(&documents),
        sizes,
        stats,
    }))
}

async fn chart(
    State(state): State<AppState>,
    Path(chart): Path<String>,
) -> AppResult<impl IntoResponse> {
    let kind = ChartKind::parse(&chart)?;
    let corpus = state.corpus.resolve().await?;
    let documents = state.corpus.list_documents(&corpus).await?;

    let svg = render_chart(kind, &documents)?;
    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg))
}
