//! Corpus Client Wrapper
//!
//! Thin layer over the managed retrieval platform that resolves the corpus by
//! display name and applies local validation before anything reaches the
//! platform. Document order, upload limits and bulk-delete accounting live
//! here; chunking, embedding and ranking do not.

pub mod analytics;

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};
use validator::Validate;

use crate::config::{UploadConfig, VertexConfig};
use crate::models::{
    BulkDeleteReport, ChunkingConfig, Corpus, CorpusStats, DeleteFailure, DeleteTarget, Document,
    ImportOptions, ImportSummary, QueryParams, RetrievedContext, UploadRequest,
};
use crate::types::{AppError, AppResult};
use crate::utils::format::file_extension;
use crate::vertex::RagBackend;

pub use analytics::{file_type_distribution, size_series, size_summary, upload_timeline};

const RESOURCE_PREFIX: &str = "projects/";

pub struct CorpusService {
    backend: Arc<dyn RagBackend>,
    corpus_name: String,
    embedding_model: String,
    upload: UploadConfig,
}

/// Outcome of `ensure_corpus`.
#[derive(Debug, Clone)]
pub struct EnsuredCorpus {
    pub corpus: Corpus,
    pub created: bool,
}

impl CorpusService {
    pub fn new(backend: Arc<dyn RagBackend>, vertex: &VertexConfig, upload: UploadConfig) -> Self {
        Self {
            backend,
            corpus_name: vertex.corpus_name.clone(),
            embedding_model: vertex.embedding_model_resource(),
            upload,
        }
    }

    /// The configured corpus, as a display name or resource path.
    pub fn corpus_name(&self) -> &str {
        &self.corpus_name
    }

    pub fn upload_config(&self) -> &UploadConfig {
        &self.upload
    }

    pub fn chunking(&self) -> ChunkingConfig {
        ChunkingConfig {
            chunk_size: self.upload.chunk_size,
            chunk_overlap: self.upload.chunk_overlap,
        }
    }

    /// Resolves the configured corpus. Re-queried on every call.
    pub async fn resolve(&self) -> AppResult<String> {
        self.find_corpus(&self.corpus_name).await
    }

    /// Returns the resource name of `name`.
    ///
    /// Resource paths are returned unchanged. Otherwise the first corpus whose
    /// display name matches exactly wins.
    pub async fn find_corpus(&self, name: &str) -> AppResult<String> {
        if name.starts_with(RESOURCE_PREFIX) {
            return Ok(name.to_string());
        }

        let corpora = self.backend.list_corpora().await?;
        let matches: Vec<&Corpus> = corpora.iter().filter(|c| c.display_name == name).collect();
        if matches.len() > 1 {
            warn!(
                display_name = name,
                count = matches.len(),
                "Several corpora share this display name, using the first"
            );
        }

        match matches.first() {
            Some(corpus) => {
                debug!(display_name = name, resource = %corpus.name, "Resolved corpus");
                Ok(corpus.name.clone())
            }
            None => Err(AppError::NotFound(format!("corpus '{}'", name))),
        }
    }

    pub async fn list_corpora(&self) -> AppResult<Vec<Corpus>> {
        self.backend.list_corpora().await
    }

    pub async fn create_corpus(&self, display_name: &str) -> AppResult<Corpus> {
        let corpus = self
            .backend
            .create_corpus(display_name, &self.embedding_model)
            .await?;
        info!(display_name, resource = %corpus.name, "Corpus created");
        Ok(corpus)
    }

    /// Finds the corpus named `display_name`, creating it when absent.
    pub async fn ensure_corpus(&self, display_name: &str) -> AppResult<EnsuredCorpus> {
        match self.find_corpus(display_name).await {
            Ok(name) => Ok(EnsuredCorpus {
                corpus: Corpus {
                    name,
                    display_name: display_name.to_string(),
                },
                created: false,
            }),
            Err(AppError::NotFound(_)) => {
                info!(display_name, "Corpus not found, creating it");
                let corpus = self.create_corpus(display_name).await?;
                Ok(EnsuredCorpus {
                    corpus,
                    created: true,
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Lists the documents of `corpus`, newest first.
    ///
    /// The sort is stable and documents without a creation time come last.
    pub async fn list_documents(&self, corpus: &str) -> AppResult<Vec<Document>> {
        let mut documents = self.backend.list_files(corpus).await?;
        sort_newest_first(&mut documents);
        debug!(corpus, count = documents.len(), "Listed documents");
        Ok(documents)
    }

    /// Checks extension, emptiness and size. Returns the content type to upload with.
    pub fn validate_upload(&self, file_name: &str, size_bytes: u64) -> AppResult<String> {
        let extension = file_extension(file_name);
        if !self.upload.is_supported(&extension) {
            return Err(AppError::InvalidRequest(format!(
                "Unsupported file type '{}' for {}. Supported types: {}",
                extension,
                file_name,
                self.upload.supported_file_types.join(", ")
            )));
        }

        if size_bytes == 0 {
            return Err(AppError::InvalidRequest(format!("{} is empty", file_name)));
        }

        let limit = self.upload.max_file_size_bytes();
        if size_bytes > limit {
            return Err(AppError::InvalidRequest(format!(
                "{} is {} bytes, larger than the {} MB limit",
                file_name, size_bytes, self.upload.max_file_size_mb
            )));
        }

        Ok(mime_guess::from_path(file_name)
            .first_or_octet_stream()
            .to_string())
    }

    /// Uploads one file in a single platform call.
    pub async fn upload_document(
        &self,
        corpus: &str,
        file_name: &str,
        data: Vec<u8>,
    ) -> AppResult<Document> {
        let content_type = self.validate_upload(file_name, data.len() as u64)?;

        let request = UploadRequest {
            display_name: file_name.to_string(),
            content_type,
            data,
            chunking: self.chunking(),
        };
        let document = self.backend.upload_file(corpus, request).await?;
        info!(corpus, file = file_name, resource = %document.name, "Document uploaded");
        Ok(document)
    }

    pub async fn upload_path(&self, corpus: &str, path: &Path) -> AppResult<Document> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| AppError::InvalidRequest(format!("invalid file path {}", path.display())))?
            .to_string();

        // Reject before reading large or unsupported files into memory
        let metadata = tokio::fs::metadata(path).await?;
        self.validate_upload(&file_name, metadata.len())?;

        let data = tokio::fs::read(path).await?;
        self.upload_document(corpus, &file_name, data).await
    }

    /// Imports `gs://` URIs with the configured chunking. Other paths are skipped.
    pub async fn import_documents(&self, corpus: &str, uris: &[String]) -> AppResult<ImportSummary> {
        let (valid, invalid): (Vec<String>, Vec<String>) =
            uris.iter().cloned().partition(|u| u.starts_with("gs://"));
        for uri in &invalid {
            warn!(path = %uri, "Skipping invalid Cloud Storage path");
        }
        if valid.is_empty() {
            return Err(AppError::InvalidRequest(
                "no valid gs:// paths to import".to_string(),
            ));
        }

        let options = ImportOptions {
            chunking: self.chunking(),
            max_embedding_requests_per_min: self.upload.max_embedding_requests_per_min,
        };
        let mut summary = self.backend.import_files(corpus, &valid, options).await?;
        summary.skipped += invalid.len() as u64;
        info!(
            corpus,
            imported = summary.imported,
            failed = summary.failed,
            skipped = summary.skipped,
            "Import finished"
        );
        Ok(summary)
    }

    pub async fn delete_document(&self, name: &str) -> AppResult<()> {
        self.backend.delete_file(name).await?;
        info!(document = name, "Document deleted");
        Ok(())
    }

    /// Deletes each target in order, once, continuing past failures.
    pub async fn bulk_delete_documents(&self, targets: &[DeleteTarget]) -> BulkDeleteReport {
        let mut report = BulkDeleteReport {
            total: targets.len(),
            ..Default::default()
        };

        for target in targets {
            match self.backend.delete_file(&target.name).await {
                Ok(()) => report.deleted += 1,
                Err(e) => {
                    warn!(document = %target.display_name, error = %e, "Failed to delete document");
                    report.failed += 1;
                    report.failures.push(DeleteFailure {
                        name: target.name.clone(),
                        display_name: target.display_name.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            total = report.total,
            deleted = report.deleted,
            failed = report.failed,
            "Bulk delete finished"
        );
        report
    }

    pub async fn query(
        &self,
        corpus: &str,
        text: &str,
        params: QueryParams,
    ) -> AppResult<Vec<RetrievedContext>> {
        if text.trim().is_empty() {
            return Err(AppError::InvalidRequest("query text must not be empty".to_string()));
        }
        params.validate()?;

        let contexts = self.backend.retrieve_contexts(corpus, text, params).await?;
        debug!(corpus, results = contexts.len(), "Query answered");
        Ok(contexts)
    }
}

fn sort_newest_first(documents: &mut [Document]) {
    // Option orders None before Some, so reversing the comparison puts it last
    documents.sort_by(|a, b| b.create_time.cmp(&a.create_time));
}

pub fn get_corpus_stats(documents: &[Document]) -> CorpusStats {
    if documents.is_empty() {
        return CorpusStats::default();
    }

    let total_size: u64 = documents.iter().map(|d| d.size_bytes).sum();
    let mut stats = CorpusStats {
        total_documents: documents.len(),
        total_size,
        average_size: total_size as f64 / documents.len() as f64,
        latest_upload: documents.iter().filter_map(|d| d.create_time).max(),
        ..Default::default()
    };
    for doc in documents {
        *stats.file_types.entry(file_extension(&doc.display_name)).or_insert(0) += 1;
    }
    stats
}

/// Case-insensitive search on display name plus an optional extension filter.
pub fn filter_documents<'a>(
    documents: &'a [Document],
    search: Option<&str>,
    file_type: Option<&str>,
) -> Vec<&'a Document> {
    let search = search.map(str::trim).filter(|s| !s.is_empty()).map(str::to_lowercase);
    let file_type = file_type
        .map(|t| t.trim().trim_start_matches('.').to_lowercase())
        .filter(|t| !t.is_empty() && t != "all");

    documents
        .iter()
        .filter(|doc| {
            let display = doc.display_name.to_lowercase();
            let search_ok = search.as_ref().map_or(true, |s| display.contains(s.as_str()));
            let type_ok = file_type
                .as_ref()
                .map_or(true, |t| display.ends_with(&format!(".{}", t)));
            search_ok && type_ok
        })
        .collect()
}

/// Distinct extensions present, sorted.
pub fn available_file_types(documents: &[Document]) -> Vec<String> {
    let mut types: Vec<String> = documents
        .iter()
        .filter(|d| d.display_name.contains('.'))
        .map(|d| file_extension(&d.display_name))
        .collect();
    types.sort();
    types.dedup();
    types
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeBackend;
    use chrono::{TimeZone, Utc};

    const CORPUS_NAME: &str = "student-report-cards";

    fn vertex_config() -> VertexConfig {
        VertexConfig {
            project_id: "test".to_string(),
            location: "us-central1".to_string(),
            corpus_name: CORPUS_NAME.to_string(),
            bucket_name: None,
            embedding_model: "text-embedding-005".to_string(),
            access_token: Some("t".to_string()),
            api_endpoint: "http://localhost".to_string(),
            storage_endpoint: "http://localhost".to_string(),
            retry_attempts: 1,
            operation_poll_secs: 0,
            operation_timeout_secs: 1,
        }
    }

    fn service(backend: Arc<FakeBackend>) -> CorpusService {
        CorpusService::new(backend, &vertex_config(), UploadConfig::default())
    }

    fn doc(display: &str, size: u64, day: Option<u32>) -> Document {
        Document {
            name: format!("files/{}", display),
            display_name: display.to_string(),
            size_bytes: size,
            create_time: day.map(|d| Utc.with_ymd_and_hms(2024, 9, d, 8, 0, 0).unwrap()),
            update_time: None,
        }
    }

    #[tokio::test]
    async fn test_find_corpus_by_display_name() {
        let backend = Arc::new(FakeBackend::new());
        backend.add_corpus("other");
        let expected = backend.add_corpus(CORPUS_NAME);
        let svc = service(backend);
        assert_eq!(svc.resolve().await.unwrap(), expected);
    }

    #[tokio::test]
    async fn test_find_corpus_first_match_wins() {
        let backend = Arc::new(FakeBackend::new());
        let first = backend.add_corpus(CORPUS_NAME);
        backend.add_corpus(CORPUS_NAME);
        let svc = service(backend);
        assert_eq!(svc.find_corpus(CORPUS_NAME).await.unwrap(), first);
    }

    #[tokio::test]
    async fn test_resource_path_used_without_lookup() {
        let backend = Arc::new(FakeBackend::new());
        let svc = service(backend.clone());
        let path = "projects/x/locations/y/ragCorpora/9";
        assert_eq!(svc.find_corpus(path).await.unwrap(), path);
        assert_eq!(backend.remote_calls(), 0);
    }

    #[tokio::test]
    async fn test_resolve_after_corpus_deleted_is_not_found() {
        let backend = Arc::new(FakeBackend::new());
        let corpus = backend.add_corpus(CORPUS_NAME);
        let svc = service(backend.clone());
        assert!(svc.resolve().await.is_ok());

        backend.remove_corpus(&corpus);
        let err = svc.resolve().await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_ensure_corpus_creates_once() {
        let backend = Arc::new(FakeBackend::new());
        let svc = service(backend);
        let first = svc.ensure_corpus(CORPUS_NAME).await.unwrap();
        assert!(first.created);
        let second = svc.ensure_corpus(CORPUS_NAME).await.unwrap();
        assert!(!second.created);
        assert_eq!(first.corpus.name, second.corpus.name);
    }

    #[tokio::test]
    async fn test_empty_corpus_lists_ok() {
        let backend = Arc::new(FakeBackend::new());
        let corpus = backend.add_corpus(CORPUS_NAME);
        let svc = service(backend);
        assert!(svc.list_documents(&corpus).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_documents_newest_first_missing_last() {
        let backend = Arc::new(FakeBackend::new());
        let corpus = backend.add_corpus(CORPUS_NAME);
        let t1 = Utc.with_ymd_and_hms(2024, 9, 1, 8, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2024, 9, 2, 8, 0, 0).unwrap();
        backend.add_document(&corpus, "a.pdf", 10, Some(t1));
        backend.add_document(&corpus, "b.txt", 10, Some(t2));
        backend.add_document(&corpus, "c.docx", 10, None);

        let svc = service(backend);
        let names: Vec<String> = svc
            .list_documents(&corpus)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.display_name)
            .collect();
        assert_eq!(names, vec!["b.txt", "a.pdf", "c.docx"]);
    }

    #[test]
    fn test_sort_is_stable_for_equal_times() {
        let mut docs = vec![
            doc("first.pdf", 1, Some(3)),
            doc("none-1.pdf", 1, None),
            doc("second.pdf", 1, Some(3)),
            doc("none-2.pdf", 1, None),
            doc("newest.pdf", 1, Some(5)),
        ];
        sort_newest_first(&mut docs);
        let names: Vec<&str> = docs.iter().map(|d| d.display_name.as_str()).collect();
        assert_eq!(
            names,
            vec!["newest.pdf", "first.pdf", "second.pdf", "none-1.pdf", "none-2.pdf"]
        );
    }

    #[tokio::test]
    async fn test_unsupported_type_rejected_before_remote_call() {
        let backend = Arc::new(FakeBackend::new());
        let svc = service(backend.clone());
        let err = svc
            .upload_document("projects/p/locations/l/ragCorpora/1", "grades.xlsx", vec![1; 10])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
        assert_eq!(backend.remote_calls(), 0);
    }

    #[tokio::test]
    async fn test_oversized_file_rejected_before_remote_call() {
        let backend = Arc::new(FakeBackend::new());
        let upload = UploadConfig {
            max_file_size_mb: 1,
            ..UploadConfig::default()
        };
        let svc = CorpusService::new(backend.clone(), &vertex_config(), upload);
        let err = svc
            .upload_document("projects/p/locations/l/ragCorpora/1", "big.pdf", vec![0; 1024 * 1024 + 1])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("1 MB"));
        assert_eq!(backend.remote_calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_file_rejected() {
        let backend = Arc::new(FakeBackend::new());
        let svc = service(backend.clone());
        let err = svc
            .upload_document("projects/p/locations/l/ragCorpora/1", "blank.txt", Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
        assert_eq!(backend.remote_calls(), 0);
    }

    #[tokio::test]
    async fn test_upload_passes_chunking_and_content_type() {
        let backend = Arc::new(FakeBackend::new());
        let corpus = backend.add_corpus(CORPUS_NAME);
        let svc = service(backend.clone());
        let doc = svc
            .upload_document(&corpus, "q1.pdf", b"%PDF-1.4".to_vec())
            .await
            .unwrap();
        assert_eq!(doc.display_name, "q1.pdf");

        let uploads = backend.uploads();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].content_type, "application/pdf");
        assert_eq!(uploads[0].chunking, ChunkingConfig { chunk_size: 512, chunk_overlap: 100 });
    }

    #[tokio::test]
    async fn test_upload_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "Reading: approaching standard").unwrap();

        let backend = Arc::new(FakeBackend::new());
        let corpus = backend.add_corpus(CORPUS_NAME);
        let svc = service(backend.clone());
        let doc = svc.upload_path(&corpus, &path).await.unwrap();
        assert_eq!(doc.display_name, "notes.txt");
        assert_eq!(doc.size_bytes, 29);
    }

    #[tokio::test]
    async fn test_delete_missing_document_returns_error() {
        let backend = Arc::new(FakeBackend::new());
        backend.add_corpus(CORPUS_NAME);
        let svc = service(backend);
        let err = svc.delete_document("projects/p/ragFiles/missing").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_bulk_delete_counts_add_up() {
        let backend = Arc::new(FakeBackend::new());
        let corpus = backend.add_corpus(CORPUS_NAME);
        let a = backend.add_document(&corpus, "a.pdf", 1, None);
        let b = backend.add_document(&corpus, "b.pdf", 1, None);
        let c = backend.add_document(&corpus, "c.pdf", 1, None);
        backend.fail_delete(&b);

        let targets = vec![
            DeleteTarget { name: a, display_name: "a.pdf".to_string() },
            DeleteTarget { name: b, display_name: "b.pdf".to_string() },
            DeleteTarget { name: c, display_name: "c.pdf".to_string() },
            DeleteTarget { name: "gone".to_string(), display_name: "gone.pdf".to_string() },
        ];

        let svc = service(backend.clone());
        let report = svc.bulk_delete_documents(&targets).await;
        assert_eq!(report.total, 4);
        assert_eq!(report.deleted, 2);
        assert_eq!(report.failed, 2);
        assert_eq!(report.deleted + report.failed, report.total);
        assert!(!report.all_deleted());
        assert_eq!(report.failures[0].display_name, "b.pdf");
        // each target attempted exactly once
        assert_eq!(backend.remote_calls(), 4);
        assert_eq!(backend.document_names(&corpus), vec!["b.pdf"]);
    }

    #[tokio::test]
    async fn test_bulk_delete_empty_list() {
        let svc = service(Arc::new(FakeBackend::new()));
        let report = svc.bulk_delete_documents(&[]).await;
        assert_eq!(report.total, 0);
        assert!(report.all_deleted());
    }

    #[tokio::test]
    async fn test_query_rejects_invalid_params() {
        let backend = Arc::new(FakeBackend::new());
        let svc = service(backend.clone());
        let bad = QueryParams { top_k: 0, distance_threshold: 0.5 };
        assert!(svc.query("projects/c", "math", bad).await.is_err());
        let bad = QueryParams { top_k: 5, distance_threshold: 3.0 };
        assert!(svc.query("projects/c", "math", bad).await.is_err());
        assert!(svc.query("projects/c", "   ", QueryParams::default()).await.is_err());
        assert_eq!(backend.remote_calls(), 0);
    }

    #[tokio::test]
    async fn test_query_returns_platform_ranking() {
        let backend = Arc::new(FakeBackend::new());
        backend.set_contexts(
            (1..=3)
                .map(|rank| RetrievedContext {
                    rank,
                    source_uri: format!("gs://b/{}.pdf", rank),
                    source_name: format!("{}.pdf", rank),
                    text: "Mathematics: 2 - approaching standard".to_string(),
                    score: 0.1 * rank as f64,
                })
                .collect(),
        );
        let svc = service(backend);
        let params = QueryParams { top_k: 2, distance_threshold: 0.5 };
        let results = svc.query("projects/c", "math", params).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].rank, 1);
        assert_eq!(results[1].source_name, "2.pdf");
    }

    #[tokio::test]
    async fn test_import_skips_non_gcs_paths() {
        let backend = Arc::new(FakeBackend::new());
        let corpus = backend.add_corpus(CORPUS_NAME);
        let svc = service(backend.clone());
        let summary = svc
            .import_documents(
                &corpus,
                &["gs://bucket/processing/a.pdf".to_string(), "/tmp/b.pdf".to_string()],
            )
            .await
            .unwrap();
        assert_eq!(summary.imported, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(backend.imports()[0].1, vec!["gs://bucket/processing/a.pdf"]);

        let err = svc.import_documents(&corpus, &["b.pdf".to_string()]).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
    }

    #[test]
    fn test_corpus_stats() {
        let docs = vec![
            doc("q1.pdf", 1000, Some(1)),
            doc("q2.PDF", 3000, Some(9)),
            doc("notes", 2000, None),
        ];
        let stats = get_corpus_stats(&docs);
        assert_eq!(stats.total_documents, 3);
        assert_eq!(stats.total_size, 6000);
        assert!((stats.average_size - 2000.0).abs() < f64::EPSILON);
        assert_eq!(stats.file_types.get("pdf"), Some(&2));
        assert_eq!(stats.file_types.get("unknown"), Some(&1));
        assert_eq!(stats.latest_upload, docs[1].create_time);

        let empty = get_corpus_stats(&[]);
        assert_eq!(empty.total_documents, 0);
        assert!(empty.latest_upload.is_none());
    }

    #[test]
    fn test_filter_documents() {
        let docs = vec![
            doc("Emma_Q1.pdf", 1, None),
            doc("emma_q1.pdf", 1, None),
            doc("Liam_Q1.docx", 1, None),
        ];
        assert_eq!(filter_documents(&docs, Some("EMMA"), None).len(), 2);
        assert_eq!(filter_documents(&docs, None, Some("docx")).len(), 1);
        assert_eq!(filter_documents(&docs, Some(""), Some("All")).len(), 3);
        assert_eq!(filter_documents(&docs, Some("liam"), Some("pdf")).len(), 0);
        assert_eq!(available_file_types(&docs), vec!["docx", "pdf"]);
    }
}
