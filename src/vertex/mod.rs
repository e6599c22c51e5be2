//! Managed Retrieval Platform Adapter
//!
//! All indexing, embedding, chunking and similarity search happen inside
//! Vertex AI RAG Engine. This module only shapes requests for it:
//!
//! - **`RagBackend`**: the seam the corpus wrapper talks to
//! - **`VertexRagClient`**: REST implementation against `aiplatform.googleapis.com`
//! - **`GcsUploader`**: stages local files in Cloud Storage before an import
//! - **`TokenSource`**: bearer tokens (configured or obtained from `gcloud`)

pub mod auth;
pub mod client;
pub mod storage;

pub use auth::TokenSource;
pub use client::VertexRagClient;
pub use storage::GcsUploader;

use async_trait::async_trait;

use crate::models::{
    Corpus, Document, ImportOptions, ImportSummary, QueryParams, RetrievedContext, UploadRequest,
};
use crate::types::AppResult;

#[async_trait]
pub trait RagBackend: Send + Sync {
    async fn list_corpora(&self) -> AppResult<Vec<Corpus>>;

    /// Creates a corpus embedded with `embedding_model` (a publisher model resource).
    async fn create_corpus(&self, display_name: &str, embedding_model: &str) -> AppResult<Corpus>;

    async fn delete_corpus(&self, corpus: &str) -> AppResult<()>;

    async fn list_files(&self, corpus: &str) -> AppResult<Vec<Document>>;

    async fn upload_file(&self, corpus: &str, request: UploadRequest) -> AppResult<Document>;

    async fn import_files(
        &self,
        corpus: &str,
        uris: &[String],
        options: ImportOptions,
    ) -> AppResult<ImportSummary>;

    async fn delete_file(&self, name: &str) -> AppResult<()>;

    async fn retrieve_contexts(
        &self,
        corpus: &str,
        text: &str,
        params: QueryParams,
    ) -> AppResult<Vec<RetrievedContext>>;
}
