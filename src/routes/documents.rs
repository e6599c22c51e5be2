use axum::{
    extract::{Multipart, Path, Query, State},
    routing::{delete, get, post},
    Json, Router,
};
use tracing::{info, warn};
use validator::Validate;

use crate::corpus::{available_file_types, filter_documents};
use crate::models::{
    AppState, BulkDeleteReport, BulkDeleteRequest, DeleteAllRequest, DeleteTarget, Document,
    DocumentFilter, DocumentListResponse, DocumentView, UploadResponse,
};
use crate::types::{AppError, AppResult};
use crate::utils::format::{file_extension, format_date, format_file_size, format_resource_id};

pub const DELETE_ALL_CONFIRMATION: &str = "DELETE ALL";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/documents", get(list_documents).post(upload_document))
        .route("/api/documents/{id}", delete(delete_document))
        .route("/api/documents/bulk-delete", post(bulk_delete))
        .route("/api/documents/delete-all", post(delete_all))
        .with_state(state)
}

impl From<&Document> for DocumentView {
    fn from(doc: &Document) -> Self {
        Self {
            id: format_resource_id(&doc.name).to_string(),
            name: doc.name.clone(),
            display_name: doc.display_name.clone(),
            file_type: file_extension(&doc.display_name).to_uppercase(),
            size: format_file_size(doc.size_bytes),
            size_bytes: doc.size_bytes,
            created: format_date(doc.create_time.as_ref()),
            updated: format_date(doc.update_time.as_ref()),
        }
    }
}

fn file_resource(corpus: &str, id: &str) -> String {
    format!("{}/ragFiles/{}", corpus, id)
}

// Bulk requests carry either bare file ids or full resource names
fn document_resource(corpus: &str, id: &str) -> String {
    if id.starts_with("projects/") {
        id.to_string()
    } else {
        file_resource(corpus, id)
    }
}

async fn list_documents(
    State(state): State<AppState>,
    Query(filter): Query<DocumentFilter>,
) -> AppResult<Json<DocumentListResponse>> {
    let corpus = state.corpus.resolve().await?;
    let documents = state.corpus.list_documents(&corpus).await?;

    let filtered = filter_documents(
        &documents,
        filter.search.as_deref(),
        filter.file_type.as_deref(),
    );

    Ok(Json(DocumentListResponse {
        corpus,
        total: documents.len(),
        filtered: filtered.len(),
        file_types: available_file_types(&documents),
        documents: filtered.into_iter().map(DocumentView::from).collect(),
    }))
}

async fn upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidRequest(format!("malformed upload: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::InvalidRequest("uploaded file has no name".to_string()))?;
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidRequest(format!("failed to read upload: {}", e)))?;
        upload = Some((file_name, data.to_vec()));
        break;
    }

    let (file_name, data) =
        upload.ok_or_else(|| AppError::InvalidRequest("missing 'file' field".to_string()))?;
    info!(file = %file_name, size = data.len(), "Upload request received");

    // Cheap checks first so a rejected file costs no platform call
    state.corpus.validate_upload(&file_name, data.len() as u64)?;

    let corpus = state.corpus.resolve().await?;
    let document = state.corpus.upload_document(&corpus, &file_name, data).await?;
    Ok(Json(UploadResponse {
        status: "success".to_string(),
        document,
    }))
}

async fn delete_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let corpus = state.corpus.resolve().await?;
    let name = file_resource(&corpus, &id);
    state.corpus.delete_document(&name).await?;
    Ok(Json(serde_json::json!({ "status": "deleted", "name": name })))
}

async fn bulk_delete(
    State(state): State<AppState>,
    Json(request): Json<BulkDeleteRequest>,
) -> AppResult<Json<BulkDeleteReport>> {
    request.validate()?;

    let corpus = state.corpus.resolve().await?;
    let documents = state.corpus.list_documents(&corpus).await?;

    let targets: Vec<DeleteTarget> = request
        .names
        .iter()
        .map(|id| {
            let name = document_resource(&corpus, id);
            let display_name = documents
                .iter()
                .find(|d| d.name == name)
                .map(|d| d.display_name.clone())
                .unwrap_or_else(|| id.clone());
            DeleteTarget { name, display_name }
        })
        .collect();

    Ok(Json(state.corpus.bulk_delete_documents(&targets).await))
}

async fn delete_all(
    State(state): State<AppState>,
    Json(request): Json<DeleteAllRequest>,
) -> AppResult<Json<BulkDeleteReport>> {
    if request.confirmation != DELETE_ALL_CONFIRMATION {
        return Err(AppError::InvalidRequest(format!(
            "type '{}' to confirm",
            DELETE_ALL_CONFIRMATION
        )));
    }

    let corpus = state.corpus.resolve().await?;
    let documents = state.corpus.list_documents(&corpus).await?;
    warn!(corpus = %corpus, count = documents.len(), "Deleting every document in corpus");

    let targets: Vec<DeleteTarget> = documents.iter().map(DeleteTarget::from).collect();
    Ok(Json(state.corpus.bulk_delete_documents(&targets).await))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use chrono::{TimeZone, Utc};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::{document_resource, file_resource};
    use crate::routes::create_router;
    use crate::testing::{app_state, FakeBackend, TEST_CORPUS};

    async fn send(backend: Arc<FakeBackend>, request: Request<Body>) -> (StatusCode, Value) {
        let app = create_router(app_state(backend));
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    fn json_post(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn seeded() -> (Arc<FakeBackend>, String) {
        let backend = Arc::new(FakeBackend::new());
        let corpus = backend.add_corpus(TEST_CORPUS);
        let day = |d| Some(Utc.with_ymd_and_hms(2024, 10, d, 9, 0, 0).unwrap());
        backend.add_document(&corpus, "emma_q1.pdf", 2048, day(1));
        backend.add_document(&corpus, "emma_q2.pdf", 4096, day(2));
        backend.add_document(&corpus, "liam_notes.txt", 100, day(3));
        (backend, corpus)
    }

    #[tokio::test]
    async fn test_list_documents_newest_first() {
        let (backend, _) = seeded();
        let request = Request::get("/api/documents").body(Body::empty()).unwrap();
        let (status, body) = send(backend, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 3);
        assert_eq!(body["documents"][0]["display_name"], "liam_notes.txt");
        assert_eq!(body["documents"][0]["file_type"], "TXT");
        assert_eq!(body["documents"][2]["size"], "2.0 KB");
        assert_eq!(body["file_types"], serde_json::json!(["pdf", "txt"]));
    }

    #[tokio::test]
    async fn test_list_documents_filtered() {
        let (backend, _) = seeded();
        let request = Request::get("/api/documents?search=EMMA&file_type=pdf")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(backend, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 3);
        assert_eq!(body["filtered"], 2);
    }

    #[tokio::test]
    async fn test_list_without_corpus_is_not_found() {
        let backend = Arc::new(FakeBackend::new());
        let request = Request::get("/api/documents").body(Body::empty()).unwrap();
        let (status, body) = send(backend, request).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains(TEST_CORPUS));
    }

    #[tokio::test]
    async fn test_multipart_upload() {
        let (backend, corpus) = seeded();
        let body = "--XBOUNDARY\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"ava_q3.txt\"\r\n\
             Content-Type: text/plain\r\n\r\n\
             Reading: 3\r\n\
             --XBOUNDARY--\r\n";
        let request = Request::post("/api/documents")
            .header(header::CONTENT_TYPE, "multipart/form-data; boundary=XBOUNDARY")
            .body(Body::from(body))
            .unwrap();
        let (status, json) = send(backend.clone(), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["document"]["display_name"], "ava_q3.txt");
        assert!(backend.document_names(&corpus).contains(&"ava_q3.txt".to_string()));
        assert_eq!(backend.uploads()[0].data, b"Reading: 3".to_vec());
    }

    #[tokio::test]
    async fn test_upload_unsupported_type_is_rejected() {
        let (backend, _) = seeded();
        let body = "--XBOUNDARY\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"photo.png\"\r\n\
             Content-Type: image/png\r\n\r\n\
             png\r\n\
             --XBOUNDARY--\r\n";
        let request = Request::post("/api/documents")
            .header(header::CONTENT_TYPE, "multipart/form-data; boundary=XBOUNDARY")
            .body(Body::from(body))
            .unwrap();
        let calls_before = backend.remote_calls();
        let (status, _) = send(backend.clone(), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(backend.remote_calls(), calls_before);
    }

    #[tokio::test]
    async fn test_delete_by_id() {
        let (backend, corpus) = seeded();
        let id = crate::utils::format::format_resource_id(&backend.add_document(
            &corpus,
            "old.doc",
            10,
            None,
        ))
        .to_string();

        let request = Request::delete(format!("/api/documents/{}", id))
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(backend.clone(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert!(!backend.document_names(&corpus).contains(&"old.doc".to_string()));

        let request = Request::delete(format!("/api/documents/{}", id))
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(backend, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_bulk_delete_reports_partial_failure() {
        let (backend, corpus) = seeded();
        let keep = backend.add_document(&corpus, "locked.pdf", 1, None);
        backend.fail_delete(&keep);
        let gone = backend.add_document(&corpus, "gone.pdf", 1, None);

        let request = json_post(
            "/api/documents/bulk-delete",
            serde_json::json!({ "names": [gone, keep, "999"] }),
        );
        let (status, body) = send(backend, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 3);
        assert_eq!(body["deleted"], 1);
        assert_eq!(body["failed"], 2);
        assert_eq!(body["failures"][0]["display_name"], "locked.pdf");
    }

    #[tokio::test]
    async fn test_bulk_delete_accepts_ids_and_resource_names() {
        let (backend, corpus) = seeded();
        let by_name = backend.add_document(&corpus, "full.pdf", 1, None);
        let by_id = crate::utils::format::format_resource_id(&backend.add_document(
            &corpus, "short.pdf", 1, None,
        ))
        .to_string();
        assert!(by_name.starts_with("projects/"));

        let request = json_post(
            "/api/documents/bulk-delete",
            serde_json::json!({ "names": [by_name, by_id] }),
        );
        let (status, body) = send(backend.clone(), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["deleted"], 2);
        let remaining = backend.document_names(&corpus);
        assert!(!remaining.contains(&"full.pdf".to_string()));
        assert!(!remaining.contains(&"short.pdf".to_string()));
    }

    #[test]
    fn test_single_delete_path_is_a_file_id() {
        let corpus = "projects/p/locations/l/ragCorpora/1";
        assert_eq!(file_resource(corpus, "42"), "projects/p/locations/l/ragCorpora/1/ragFiles/42");
        assert_eq!(document_resource(corpus, "42"), file_resource(corpus, "42"));
        assert_eq!(
            document_resource(corpus, "projects/p/locations/l/ragCorpora/1/ragFiles/7"),
            "projects/p/locations/l/ragCorpora/1/ragFiles/7"
        );
    }

    #[tokio::test]
    async fn test_bulk_delete_requires_selection() {
        let (backend, _) = seeded();
        let request = json_post("/api/documents/bulk-delete", serde_json::json!({ "names": [] }));
        let (status, _) = send(backend, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_all_requires_confirmation() {
        let (backend, corpus) = seeded();
        let request = json_post(
            "/api/documents/delete-all",
            serde_json::json!({ "confirmation": "delete all" }),
        );
        let (status, _) = send(backend.clone(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(backend.document_names(&corpus).len(), 3);

        let request = json_post(
            "/api/documents/delete-all",
            serde_json::json!({ "confirmation": "DELETE ALL" }),
        );
        let (status, body) = send(backend.clone(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["deleted"], 3);
        assert!(backend.document_names(&corpus).is_empty());
    }
}
