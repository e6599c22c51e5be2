// In-memory RagBackend used by unit and router tests

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::config::Config;
use crate::corpus::CorpusService;
use crate::models::{
    AppState, Corpus, Document, ImportOptions, ImportSummary, QueryParams, RetrievedContext, UploadRequest,
};
use crate::types::{AppError, AppResult};
use crate::vertex::RagBackend;

pub const PARENT: &str = "projects/test/locations/us-central1";

#[derive(Default)]
struct FakeState {
    corpora: Vec<Corpus>,
    files: HashMap<String, Vec<Document>>,
    failing_deletes: HashSet<String>,
    contexts: Vec<RetrievedContext>,
    uploads: Vec<UploadRequest>,
    imports: Vec<(String, Vec<String>)>,
    next_id: u64,
}

#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<FakeState>,
    calls: AtomicUsize,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a corpus and returns its resource name.
    pub fn add_corpus(&self, display_name: &str) -> String {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let name = format!("{}/ragCorpora/{}", PARENT, state.next_id);
        state.corpora.push(Corpus {
            name: name.clone(),
            display_name: display_name.to_string(),
        });
        state.files.insert(name.clone(), Vec::new());
        name
    }

    pub fn add_document(
        &self,
        corpus: &str,
        display_name: &str,
        size_bytes: u64,
        create_time: Option<DateTime<Utc>>,
    ) -> String {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let name = format!("{}/ragFiles/{}", corpus, state.next_id);
        state.files.entry(corpus.to_string()).or_default().push(Document {
            name: name.clone(),
            display_name: display_name.to_string(),
            size_bytes,
            create_time,
            update_time: create_time,
        });
        name
    }

    pub fn remove_corpus(&self, corpus: &str) {
        let mut state = self.state.lock().unwrap();
        state.corpora.retain(|c| c.name != corpus);
        state.files.remove(corpus);
    }

    pub fn fail_delete(&self, name: &str) {
        self.state.lock().unwrap().failing_deletes.insert(name.to_string());
    }

    pub fn set_contexts(&self, contexts: Vec<RetrievedContext>) {
        self.state.lock().unwrap().contexts = contexts;
    }

    pub fn uploads(&self) -> Vec<UploadRequest> {
        self.state.lock().unwrap().uploads.clone()
    }

    pub fn imports(&self) -> Vec<(String, Vec<String>)> {
        self.state.lock().unwrap().imports.clone()
    }

    pub fn document_names(&self, corpus: &str) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state
            .files
            .get(corpus)
            .map(|docs| docs.iter().map(|d| d.display_name.clone()).collect())
            .unwrap_or_default()
    }

    /// Number of remote calls made so far.
    pub fn remote_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl RagBackend for FakeBackend {
    async fn list_corpora(&self) -> AppResult<Vec<Corpus>> {
        self.record();
        Ok(self.state.lock().unwrap().corpora.clone())
    }

    async fn create_corpus(&self, display_name: &str, _embedding_model: &str) -> AppResult<Corpus> {
        self.record();
        let name = self.add_corpus(display_name);
        Ok(Corpus {
            name,
            display_name: display_name.to_string(),
        })
    }

    async fn delete_corpus(&self, corpus: &str) -> AppResult<()> {
        self.record();
        self.remove_corpus(corpus);
        Ok(())
    }

    async fn list_files(&self, corpus: &str) -> AppResult<Vec<Document>> {
        self.record();
        let state = self.state.lock().unwrap();
        state
            .files
            .get(corpus)
            .cloned()
            .ok_or_else(|| AppError::NotFound(corpus.to_string()))
    }

    async fn upload_file(&self, corpus: &str, request: UploadRequest) -> AppResult<Document> {
        self.record();
        let name = self.add_document(corpus, &request.display_name, request.data.len() as u64, Some(Utc::now()));
        let mut state = self.state.lock().unwrap();
        state.uploads.push(request.clone());
        Ok(Document {
            name,
            display_name: request.display_name,
            size_bytes: request.data.len() as u64,
            create_time: None,
            update_time: None,
        })
    }

    async fn import_files(
        &self,
        corpus: &str,
        uris: &[String],
        _options: ImportOptions,
    ) -> AppResult<ImportSummary> {
        self.record();
        for uri in uris {
            let file_name = uri.rsplit('/').next().unwrap_or(uri);
            self.add_document(corpus, file_name, 1, Some(Utc::now()));
        }
        self.state
            .lock()
            .unwrap()
            .imports
            .push((corpus.to_string(), uris.to_vec()));
        Ok(ImportSummary {
            imported: uris.len() as u64,
            failed: 0,
            skipped: 0,
        })
    }

    async fn delete_file(&self, name: &str) -> AppResult<()> {
        self.record();
        let mut state = self.state.lock().unwrap();
        if state.failing_deletes.contains(name) {
            return Err(AppError::platform(403, format!("permission denied for {}", name)));
        }
        for docs in state.files.values_mut() {
            if let Some(pos) = docs.iter().position(|d| d.name == name) {
                docs.remove(pos);
                return Ok(());
            }
        }
        Err(AppError::NotFound(name.to_string()))
    }

    async fn retrieve_contexts(
        &self,
        _corpus: &str,
        _text: &str,
        params: QueryParams,
    ) -> AppResult<Vec<RetrievedContext>> {
        self.record();
        let state = self.state.lock().unwrap();
        Ok(state
            .contexts
            .iter()
            .take(params.top_k as usize)
            .cloned()
            .collect())
    }
}

pub const TEST_CORPUS: &str = "student-report-cards";

pub fn test_config() -> Config {
    let vars: HashMap<&str, &str> = [
        ("GOOGLE_CLOUD_PROJECT", "test"),
        ("GOOGLE_CLOUD_LOCATION", "us-central1"),
        ("RAG_CORPUS_NAME", TEST_CORPUS),
        ("GOOGLE_CLOUD_ACCESS_TOKEN", "test-token"),
    ]
    .into_iter()
    .collect();
    Config::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap()
}

/// Application state over `backend`, configured for `TEST_CORPUS`.
pub fn app_state(backend: Arc<FakeBackend>) -> AppState {
    let config = test_config();
    let corpus = CorpusService::new(backend, &config.vertex, config.upload.clone());
    AppState {
        config,
        corpus: Arc::new(corpus),
    }
}
