use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::config::Config;
use crate::corpus::CorpusService;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub corpus: Arc<CorpusService>,
}

// Shapes exchanged with the managed retrieval platform

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Corpus {
    /// Opaque resource path, `projects/.../ragCorpora/...`
    pub name: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Opaque resource id, unique within a corpus
    pub name: String,
    /// Original file name; not guaranteed unique
    pub display_name: String,
    pub size_bytes: u64,
    pub create_time: Option<DateTime<Utc>>,
    pub update_time: Option<DateTime<Utc>>,
}

/// Fixed-size token windows handed to the platform's ingestion pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    pub chunk_size: u32,
    pub chunk_overlap: u32,
}

#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub display_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
    pub chunking: ChunkingConfig,
}

#[derive(Debug, Clone, Copy)]
pub struct ImportOptions {
    pub chunking: ChunkingConfig,
    pub max_embedding_requests_per_min: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub imported: u64,
    pub failed: u64,
    pub skipped: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct QueryParams {
    #[validate(range(min = 1, max = 100))]
    pub top_k: u32,
    #[validate(range(min = 0.0, max = 2.0))]
    pub distance_threshold: f64,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            top_k: 5,
            distance_threshold: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedContext {
    pub rank: usize,
    pub source_uri: String,
    pub source_name: String,
    pub text: String,
    pub score: f64,
}

/// Identifies one document to delete; the display name is only used for reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteTarget {
    pub name: String,
    pub display_name: String,
}

impl From<&Document> for DeleteTarget {
    fn from(doc: &Document) -> Self {
        Self {
            name: doc.name.clone(),
            display_name: doc.display_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteFailure {
    pub name: String,
    pub display_name: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkDeleteReport {
    pub total: usize,
    pub deleted: usize,
    pub failed: usize,
    pub failures: Vec<DeleteFailure>,
}

impl BulkDeleteReport {
    pub fn all_deleted(&self) -> bool {
        self.failed == 0
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorpusStats {
    pub total_documents: usize,
    pub total_size: u64,
    pub average_size: f64,
    pub file_types: BTreeMap<String, usize>,
    pub latest_upload: Option<DateTime<Utc>>,
}

// Analytics series rendered by the admin UI

#[derive(Debug, Clone, Serialize)]
pub struct FileTypeShare {
    pub file_type: String,
    pub count: usize,
    pub percentage: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SizePoint {
    pub document: String,
    pub size_mb: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SizeSummary {
    pub total_mb: f64,
    pub average_mb: f64,
    pub largest_mb: f64,
    pub smallest_mb: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelinePoint {
    pub date: chrono::NaiveDate,
    pub documents: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Timeline {
    pub points: Vec<TimelinePoint>,
    pub first_upload: Option<chrono::NaiveDate>,
    pub last_upload: Option<chrono::NaiveDate>,
    pub days_span: i64,
}

// API Request/Response types

#[derive(Debug, Default, Deserialize)]
pub struct DocumentFilter {
    pub search: Option<String>,
    pub file_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DocumentView {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub file_type: String,
    pub size: String,
    pub size_bytes: u64,
    pub created: String,
    pub updated: String,
}

#[derive(Debug, Serialize)]
pub struct DocumentListResponse {
    pub corpus: String,
    pub total: usize,
    pub filtered: usize,
    pub file_types: Vec<String>,
    pub documents: Vec<DocumentView>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct BulkDeleteRequest {
    #[validate(length(min = 1, message = "select at least one document"))]
    pub names: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteAllRequest {
    pub confirmation: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub status: String,
    pub document: Document,
}

#[derive(Debug, Serialize)]
pub struct CorpusResponse {
    pub display_name: String,
    pub resource_name: String,
    pub project: String,
    pub location: String,
    pub embedding_model: String,
    pub chunk_size: u32,
    pub chunk_overlap: u32,
    pub max_file_size_mb: u64,
    pub supported_file_types: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    pub stats: CorpusStats,
    pub total_size: String,
    pub file_types: Vec<FileTypeShare>,
    pub sizes: Vec<SizePoint>,
    pub size_summary: SizeSummary,
    pub timeline: Timeline,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub version: String,
}
