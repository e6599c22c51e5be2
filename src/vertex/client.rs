// Vertex AI RAG Engine REST adapter (API v1)
// Reference: https://cloud.google.com/vertex-ai/generative-ai/docs/model-reference/rag-api

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::auth::TokenSource;
use super::RagBackend;
use crate::config::VertexConfig;
use crate::models::{
    ChunkingConfig, Corpus, Document, ImportOptions, ImportSummary, QueryParams, RetrievedContext,
    UploadRequest,
};
use crate::types::{AppError, AppResult};
use crate::utils::retry::{with_retry, RetryPolicy};

const PAGE_SIZE: &str = "100";

pub struct VertexRagClient {
    client: Client,
    tokens: TokenSource,
    api_root: String,
    parent: String,
    retry: RetryPolicy,
    poll_interval: Duration,
    operation_timeout: Duration,
}

// Wire types for the Vertex AI REST API

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RagCorpusWire {
    name: String,
    #[serde(default)]
    display_name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListCorporaResponse {
    #[serde(default)]
    rag_corpora: Vec<RagCorpusWire>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RagFileWire {
    name: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default, deserialize_with = "de_u64")]
    size_bytes: u64,
    create_time: Option<DateTime<Utc>>,
    update_time: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListFilesResponse {
    #[serde(default)]
    rag_files: Vec<RagFileWire>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
struct Operation {
    #[serde(default)]
    name: String,
    #[serde(default)]
    done: bool,
    error: Option<Status>,
    response: Option<Value>,
}

#[derive(Deserialize)]
struct Status {
    #[serde(default)]
    code: i32,
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: Status,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadRagFileResponse {
    rag_file: Option<RagFileWire>,
    error: Option<Status>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportRagFilesResponse {
    #[serde(default, deserialize_with = "de_u64")]
    imported_rag_files_count: u64,
    #[serde(default, deserialize_with = "de_u64")]
    failed_rag_files_count: u64,
    #[serde(default, deserialize_with = "de_u64")]
    skipped_rag_files_count: u64,
}

#[derive(Deserialize)]
struct RetrieveContextsResponse {
    contexts: Option<ContextList>,
}

#[derive(Deserialize)]
struct ContextList {
    #[serde(default)]
    contexts: Vec<ContextWire>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContextWire {
    #[serde(default)]
    source_uri: String,
    #[serde(default)]
    source_display_name: String,
    #[serde(default)]
    text: String,
    score: Option<f64>,
    distance: Option<f64>,
}

// int64 fields arrive as JSON strings
fn de_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(u64),
        Str(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(0),
        Some(Raw::Num(n)) => Ok(n),
        Some(Raw::Str(s)) => s.parse().map_err(serde::de::Error::custom),
    }
}

impl From<RagCorpusWire> for Corpus {
    fn from(wire: RagCorpusWire) -> Self {
        Corpus {
            name: wire.name,
            display_name: wire.display_name,
        }
    }
}

impl From<RagFileWire> for Document {
    fn from(wire: RagFileWire) -> Self {
        Document {
            name: wire.name,
            display_name: wire
                .display_name
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| "Unknown".to_string()),
            size_bytes: wire.size_bytes,
            create_time: wire.create_time,
            update_time: wire.update_time,
        }
    }
}

fn chunking_json(chunking: ChunkingConfig) -> Value {
    json!({
        "ragFileChunkingConfig": {
            "fixedLengthChunking": {
                "chunkSize": chunking.chunk_size,
                "chunkOverlap": chunking.chunk_overlap,
            }
        }
    })
}

impl VertexRagClient {
    pub fn new(config: &VertexConfig) -> Self {
        Self::with_token_source(config, TokenSource::from_config(config.access_token.as_deref()))
    }

    pub fn with_token_source(config: &VertexConfig, tokens: TokenSource) -> Self {
        Self {
            client: Client::new(),
            tokens,
            api_root: config.api_endpoint.clone(),
            parent: config.parent(),
            retry: RetryPolicy::new(config.retry_attempts),
            poll_interval: Duration::from_secs(config.operation_poll_secs),
            operation_timeout: Duration::from_secs(config.operation_timeout_secs),
        }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.api_root, path)
    }

    fn upload_url(&self, path: &str) -> String {
        format!("{}/upload/v1/{}", self.api_root, path)
    }

    async fn send(&self, request: RequestBuilder) -> AppResult<Response> {
        let token = self.tokens.token().await?;
        let response = request.bearer_auth(token).send().await?;
        check_status(response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> AppResult<T> {
        let response = self.send(self.client.get(url).query(query)).await?;
        parse_json(response).await
    }

    async fn wait_for_operation(&self, operation: Operation) -> AppResult<Value> {
        let started = Instant::now();
        let mut operation = operation;

        loop {
            if operation.done {
                if let Some(status) = operation.error {
                    return Err(AppError::platform(
                        status.code.max(0) as u16,
                        format!("operation {} failed: {}", operation.name, status.message),
                    ));
                }
                return Ok(operation.response.unwrap_or(Value::Null));
            }

            if started.elapsed() >= self.operation_timeout {
                return Err(AppError::Internal(format!(
                    "operation {} did not finish within {}s",
                    operation.name,
                    self.operation_timeout.as_secs()
                )));
            }

            debug!(operation = %operation.name, "Waiting for long-running operation");
            sleep(self.poll_interval).await;

            let url = self.api_url(&operation.name);
            let url = url.as_str();
            operation = with_retry(self.retry, "get_operation", || self.get_json(url, &[])).await?;
        }
    }
}

async fn check_status(response: Response) -> AppResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .ok()
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| if body.is_empty() { url.clone() } else { body.clone() });

    if status == StatusCode::NOT_FOUND {
        return Err(AppError::NotFound(message));
    }
    Err(AppError::platform(status.as_u16(), message))
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> AppResult<T> {
    let body = response.text().await?;
    if body.trim().is_empty() {
        return serde_json::from_str("{}").map_err(Into::into);
    }
    serde_json::from_str(&body).map_err(Into::into)
}

#[async_trait]
impl RagBackend for VertexRagClient {
    async fn list_corpora(&self) -> AppResult<Vec<Corpus>> {
        let url = self.api_url(&format!("{}/ragCorpora", self.parent));
        let mut corpora = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page: ListCorporaResponse = with_retry(self.retry, "list_corpora", || {
                let mut query = vec![("pageSize", PAGE_SIZE)];
                if let Some(token) = page_token.as_deref() {
                    query.push(("pageToken", token));
                }
                let url = url.clone();
                async move { self.get_json(&url, &query).await }
            })
            .await?;

            corpora.extend(page.rag_corpora.into_iter().map(Corpus::from));
            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(count = corpora.len(), "Listed corpora");
        Ok(corpora)
    }

    async fn create_corpus(&self, display_name: &str, embedding_model: &str) -> AppResult<Corpus> {
        info!(display_name, embedding_model, "Creating corpus");
        let url = self.api_url(&format!("{}/ragCorpora", self.parent));
        let body = json!({
            "displayName": display_name,
            "vectorDbConfig": {
                "ragEmbeddingModelConfig": {
                    "vertexPredictionEndpoint": { "endpoint": embedding_model }
                }
            }
        });

        let response = self.send(self.client.post(&url).json(&body)).await?;
        let operation: Operation = parse_json(response).await?;
        let result = self.wait_for_operation(operation).await?;
        let corpus: RagCorpusWire = serde_json::from_value(result)?;
        Ok(corpus.into())
    }

    async fn delete_corpus(&self, corpus: &str) -> AppResult<()> {
        warn!(corpus, "Deleting corpus");
        let url = self.api_url(corpus);
        let response = self.send(self.client.delete(&url)).await?;
        let operation: Operation = parse_json(response).await?;
        self.wait_for_operation(operation).await?;
        Ok(())
    }

    async fn list_files(&self, corpus: &str) -> AppResult<Vec<Document>> {
        let url = self.api_url(&format!("{}/ragFiles", corpus));
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page: ListFilesResponse = with_retry(self.retry, "list_files", || {
                let mut query = vec![("pageSize", PAGE_SIZE)];
                if let Some(token) = page_token.as_deref() {
                    query.push(("pageToken", token));
                }
                let url = url.clone();
                async move { self.get_json(&url, &query).await }
            })
            .await?;

            documents.extend(page.rag_files.into_iter().map(Document::from));
            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(corpus, count = documents.len(), "Listed corpus files");
        Ok(documents)
    }

    async fn upload_file(&self, corpus: &str, request: UploadRequest) -> AppResult<Document> {
        info!(
            corpus,
            file = %request.display_name,
            bytes = request.data.len(),
            "Uploading file to corpus"
        );
        let url = self.upload_url(&format!("{}/ragFiles:upload", corpus));
        let metadata = json!({
            "rag_file": { "display_name": request.display_name },
            "upload_rag_file_config": {
                "rag_file_transformation_config": {
                    "rag_file_chunking_config": {
                        "fixed_length_chunking": {
                            "chunk_size": request.chunking.chunk_size,
                            "chunk_overlap": request.chunking.chunk_overlap,
                        }
                    }
                }
            }
        });

        let metadata_part = Part::text(metadata.to_string())
            .mime_str("application/json")
            .map_err(|e| AppError::Internal(e.to_string()))?;
        let file_part = Part::bytes(request.data)
            .file_name(request.display_name.clone())
            .mime_str(&request.content_type)
            .map_err(|e| AppError::InvalidRequest(format!("invalid content type: {}", e)))?;
        let form = Form::new()
            .part("metadata", metadata_part)
            .part("file", file_part);

        let response = self
            .send(
                self.client
                    .post(&url)
                    .header("X-Goog-Upload-Protocol", "multipart")
                    .multipart(form),
            )
            .await?;
        let body: UploadRagFileResponse = parse_json(response).await?;

        if let Some(status) = body.error {
            return Err(AppError::platform(status.code.max(0) as u16, status.message));
        }
        body.rag_file
            .map(Document::from)
            .ok_or_else(|| AppError::platform(500, "upload response did not include the new file"))
    }

    async fn import_files(
        &self,
        corpus: &str,
        uris: &[String],
        options: ImportOptions,
    ) -> AppResult<ImportSummary> {
        info!(corpus, count = uris.len(), "Importing files into corpus");
        let url = self.api_url(&format!("{}/ragFiles:import", corpus));
        let body = json!({
            "importRagFilesConfig": {
                "gcsSource": { "uris": uris },
                "ragFileTransformationConfig": chunking_json(options.chunking),
                "maxEmbeddingRequestsPerMin": options.max_embedding_requests_per_min,
            }
        });

        let response = self.send(self.client.post(&url).json(&body)).await?;
        let operation: Operation = parse_json(response).await?;
        let result = self.wait_for_operation(operation).await?;
        let counts: ImportRagFilesResponse = if result.is_null() {
            serde_json::from_str("{}")?
        } else {
            serde_json::from_value(result)?
        };

        Ok(ImportSummary {
            imported: counts.imported_rag_files_count,
            failed: counts.failed_rag_files_count,
            skipped: counts.skipped_rag_files_count,
        })
    }

    async fn delete_file(&self, name: &str) -> AppResult<()> {
        info!(file = name, "Deleting corpus file");
        let url = self.api_url(name);
        let response = self.send(self.client.delete(&url)).await?;
        let operation: Operation = parse_json(response).await?;
        if operation.name.is_empty() {
            return Ok(());
        }
        self.wait_for_operation(operation).await?;
        Ok(())
    }

    async fn retrieve_contexts(
        &self,
        corpus: &str,
        text: &str,
        params: QueryParams,
    ) -> AppResult<Vec<RetrievedContext>> {
        let url = self.api_url(&format!("{}:retrieveContexts", self.parent));
        let body = json!({
            "vertexRagStore": {
                "ragResources": [{ "ragCorpus": corpus }]
            },
            "query": {
                "text": text,
                "ragRetrievalConfig": {
                    "topK": params.top_k,
                    "filter": { "vectorDistanceThreshold": params.distance_threshold }
                }
            }
        });

        let (url, body) = (&url, &body);
        let response: RetrieveContextsResponse =
            with_retry(self.retry, "retrieve_contexts", || async move {
                let response = self.send(self.client.post(url).json(body)).await?;
                parse_json(response).await
            })
            .await?;

        let contexts = response.contexts.map(|c| c.contexts).unwrap_or_default();
        Ok(contexts
            .into_iter()
            .enumerate()
            .map(|(i, ctx)| RetrievedContext {
                rank: i + 1,
                source_uri: ctx.source_uri,
                source_name: ctx.source_display_name,
                text: ctx.text,
                score: ctx.score.or(ctx.distance).unwrap_or(0.0),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const PARENT: &str = "projects/demo/locations/us-central1";
    const CORPUS: &str = "projects/demo/locations/us-central1/ragCorpora/123";

    fn config(url: &str) -> VertexConfig {
        VertexConfig {
            project_id: "demo".to_string(),
            location: "us-central1".to_string(),
            corpus_name: "student-report-cards".to_string(),
            bucket_name: None,
            embedding_model: "text-embedding-005".to_string(),
            access_token: Some("test-token".to_string()),
            api_endpoint: url.to_string(),
            storage_endpoint: url.to_string(),
            retry_attempts: 1,
            operation_poll_secs: 0,
            operation_timeout_secs: 5,
        }
    }

    #[tokio::test]
    async fn test_list_corpora_follows_pages() {
        let mut server = mockito::Server::new_async().await;
        let first = server
            .mock("GET", format!("/v1/{}/ragCorpora", PARENT).as_str())
            .match_header("authorization", "Bearer test-token")
            .match_query(Matcher::Regex("^pageSize=100$".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"ragCorpora":[{"name":"projects/demo/locations/us-central1/ragCorpora/1","displayName":"alpha"}],"nextPageToken":"page-2"}"#,
            )
            .create_async()
            .await;
        let second = server
            .mock("GET", format!("/v1/{}/ragCorpora", PARENT).as_str())
            .match_query(Matcher::UrlEncoded("pageToken".to_string(), "page-2".to_string()))
            .with_status(200)
            .with_body(
                r#"{"ragCorpora":[{"name":"projects/demo/locations/us-central1/ragCorpora/2","displayName":"beta"}]}"#,
            )
            .create_async()
            .await;

        let client = VertexRagClient::new(&config(&server.url()));
        let corpora = client.list_corpora().await.unwrap();

        first.assert_async().await;
        second.assert_async().await;
        let names: Vec<_> = corpora.iter().map(|c| c.display_name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "beta"]);
    }

    #[tokio::test]
    async fn test_list_files_parses_string_sizes_and_times() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", format!("/v1/{}/ragFiles", CORPUS).as_str())
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                r#"{"ragFiles":[
                    {"name":"projects/demo/locations/us-central1/ragCorpora/123/ragFiles/9","displayName":"q2.pdf","sizeBytes":"2048","createTime":"2024-11-02T10:15:00.123Z","updateTime":"2024-11-02T10:16:00Z"},
                    {"name":"projects/demo/locations/us-central1/ragCorpora/123/ragFiles/10"}
                ]}"#,
            )
            .create_async()
            .await;

        let client = VertexRagClient::new(&config(&server.url()));
        let files = client.list_files(CORPUS).await.unwrap();

        assert_eq!(files.len(), 2);
        assert_eq!(files[0].display_name, "q2.pdf");
        assert_eq!(files[0].size_bytes, 2048);
        assert!(files[0].create_time.is_some());
        assert_eq!(files[1].display_name, "Unknown");
        assert_eq!(files[1].size_bytes, 0);
        assert!(files[1].create_time.is_none());
    }

    #[tokio::test]
    async fn test_empty_listing_is_success() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", format!("/v1/{}/ragFiles", CORPUS).as_str())
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let client = VertexRagClient::new(&config(&server.url()));
        assert!(client.list_files(CORPUS).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_file_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        let name = format!("{}/ragFiles/404", CORPUS);
        let _mock = server
            .mock("DELETE", format!("/v1/{}", name).as_str())
            .with_status(404)
            .with_body(r#"{"error":{"code":404,"message":"RagFile not found","status":"NOT_FOUND"}}"#)
            .create_async()
            .await;

        let client = VertexRagClient::new(&config(&server.url()));
        let err = client.delete_file(&name).await.unwrap_err();
        match err {
            AppError::NotFound(msg) => assert_eq!(msg, "RagFile not found"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_delete_waits_for_operation() {
        let mut server = mockito::Server::new_async().await;
        let name = format!("{}/ragFiles/7", CORPUS);
        let _mock = server
            .mock("DELETE", format!("/v1/{}", name).as_str())
            .with_status(200)
            .with_body(r#"{"name":"projects/demo/locations/us-central1/operations/55","done":true,"response":{}}"#)
            .create_async()
            .await;

        let client = VertexRagClient::new(&config(&server.url()));
        client.delete_file(&name).await.unwrap();
    }

    #[tokio::test]
    async fn test_permission_error_maps_to_platform() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", format!("/v1/{}/ragCorpora", PARENT).as_str())
            .match_query(Matcher::Any)
            .with_status(403)
            .with_body(r#"{"error":{"code":403,"message":"Permission denied on resource project demo."}}"#)
            .create_async()
            .await;

        let client = VertexRagClient::new(&config(&server.url()));
        match client.list_corpora().await.unwrap_err() {
            AppError::Platform { status, message } => {
                assert_eq!(status, 403);
                assert!(message.contains("Permission denied"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_corpus_polls_operation() {
        let mut server = mockito::Server::new_async().await;
        let create = server
            .mock("POST", format!("/v1/{}/ragCorpora", PARENT).as_str())
            .match_body(Matcher::PartialJson(json!({
                "displayName": "student-report-cards",
                "vectorDbConfig": {
                    "ragEmbeddingModelConfig": {
                        "vertexPredictionEndpoint": {
                            "endpoint": "projects/demo/locations/us-central1/publishers/google/models/text-embedding-005"
                        }
                    }
                }
            })))
            .with_status(200)
            .with_body(r#"{"name":"projects/demo/locations/us-central1/operations/1","done":false}"#)
            .create_async()
            .await;
        let poll = server
            .mock("GET", "/v1/projects/demo/locations/us-central1/operations/1")
            .with_status(200)
            .with_body(
                r#"{"name":"projects/demo/locations/us-central1/operations/1","done":true,
                    "response":{"@type":"type.googleapis.com/google.cloud.aiplatform.v1.RagCorpus",
                    "name":"projects/demo/locations/us-central1/ragCorpora/123","displayName":"student-report-cards"}}"#,
            )
            .create_async()
            .await;

        let cfg = config(&server.url());
        let client = VertexRagClient::new(&cfg);
        let corpus = client
            .create_corpus("student-report-cards", &cfg.embedding_model_resource())
            .await
            .unwrap();

        create.assert_async().await;
        poll.assert_async().await;
        assert_eq!(corpus.name, CORPUS);
        assert_eq!(corpus.display_name, "student-report-cards");
    }

    #[tokio::test]
    async fn test_failed_operation_surfaces_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", format!("/v1/{}/ragFiles:import", CORPUS).as_str())
            .with_status(200)
            .with_body(
                r#"{"name":"projects/demo/locations/us-central1/operations/2","done":true,
                    "error":{"code":3,"message":"Invalid GCS uri"}}"#,
            )
            .create_async()
            .await;

        let client = VertexRagClient::new(&config(&server.url()));
        let options = ImportOptions {
            chunking: ChunkingConfig { chunk_size: 512, chunk_overlap: 100 },
            max_embedding_requests_per_min: 1000,
        };
        let err = client
            .import_files(CORPUS, &["gs://bucket/a.pdf".to_string()], options)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Invalid GCS uri"));
    }

    #[tokio::test]
    async fn test_import_reports_counts_and_chunking() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", format!("/v1/{}/ragFiles:import", CORPUS).as_str())
            .match_body(Matcher::PartialJson(json!({
                "importRagFilesConfig": {
                    "gcsSource": { "uris": ["gs://bucket/processing/a.pdf"] },
                    "ragFileTransformationConfig": {
                        "ragFileChunkingConfig": {
                            "fixedLengthChunking": { "chunkSize": 512, "chunkOverlap": 100 }
                        }
                    },
                    "maxEmbeddingRequestsPerMin": 1000
                }
            })))
            .with_status(200)
            .with_body(
                r#"{"name":"projects/demo/locations/us-central1/operations/3","done":true,
                    "response":{"importedRagFilesCount":"1","skippedRagFilesCount":"0"}}"#,
            )
            .create_async()
            .await;

        let client = VertexRagClient::new(&config(&server.url()));
        let options = ImportOptions {
            chunking: ChunkingConfig { chunk_size: 512, chunk_overlap: 100 },
            max_embedding_requests_per_min: 1000,
        };
        let summary = client
            .import_files(CORPUS, &["gs://bucket/processing/a.pdf".to_string()], options)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(summary, ImportSummary { imported: 1, failed: 0, skipped: 0 });
    }

    #[tokio::test]
    async fn test_upload_uses_multipart_endpoint() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", format!("/upload/v1/{}/ragFiles:upload", CORPUS).as_str())
            .match_header("x-goog-upload-protocol", "multipart")
            .match_body(Matcher::Regex("fixed_length_chunking".to_string()))
            .with_status(200)
            .with_body(
                r#"{"ragFile":{"name":"projects/demo/locations/us-central1/ragCorpora/123/ragFiles/77","displayName":"notes.txt","sizeBytes":"5"}}"#,
            )
            .create_async()
            .await;

        let client = VertexRagClient::new(&config(&server.url()));
        let document = client
            .upload_file(
                CORPUS,
                UploadRequest {
                    display_name: "notes.txt".to_string(),
                    content_type: "text/plain".to_string(),
                    data: b"hello".to_vec(),
                    chunking: ChunkingConfig { chunk_size: 512, chunk_overlap: 100 },
                },
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(document.display_name, "notes.txt");
        assert_eq!(document.size_bytes, 5);
    }

    #[tokio::test]
    async fn test_retrieve_contexts_ranks_in_platform_order() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", format!("/v1/{}:retrieveContexts", PARENT).as_str())
            .match_body(Matcher::PartialJson(json!({
                "query": {
                    "text": "reading comprehension",
                    "ragRetrievalConfig": { "topK": 3 }
                }
            })))
            .with_status(200)
            .with_body(
                r#"{"contexts":{"contexts":[
                    {"sourceUri":"gs://b/q1.pdf","sourceDisplayName":"q1.pdf","text":"Reading: 2","score":0.82},
                    {"sourceUri":"gs://b/q2.pdf","sourceDisplayName":"q2.pdf","text":"Reading: 3","distance":0.41}
                ]}}"#,
            )
            .create_async()
            .await;

        let client = VertexRagClient::new(&config(&server.url()));
        let params = QueryParams { top_k: 3, distance_threshold: 0.5 };
        let results = client
            .retrieve_contexts(CORPUS, "reading comprehension", params)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].rank, 1);
        assert_eq!(results[0].source_name, "q1.pdf");
        assert!((results[0].score - 0.82).abs() < f64::EPSILON);
        assert!((results[1].score - 0.41).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_retrieve_without_contexts_is_empty() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", format!("/v1/{}:retrieveContexts", PARENT).as_str())
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let client = VertexRagClient::new(&config(&server.url()));
        let results = client
            .retrieve_contexts(CORPUS, "anything", QueryParams::default())
            .await
            .unwrap();
        assert!(results.is_empty());
    }
}
