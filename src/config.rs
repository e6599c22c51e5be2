use crate::types::{AppError, AppResult};
use serde::Deserialize;
use std::env;
use std::str::FromStr;

pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-005";
pub const DEFAULT_AGENT_MODEL: &str = "gemini-2.0-flash";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub vertex: VertexConfig,
    pub upload: UploadConfig,
    pub agent: AgentConfig,
    pub log_dir: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VertexConfig {
    pub project_id: String,
    pub location: String,
    /// Display name of the corpus, or a full `projects/...` resource path
    pub corpus_name: String,
    pub bucket_name: Option<String>,
    pub embedding_model: String,
    pub access_token: Option<String>,
    pub api_endpoint: String,
    pub storage_endpoint: String,
    pub retry_attempts: u32,
    pub operation_poll_secs: u64,
    pub operation_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    pub chunk_size: u32,
    pub chunk_overlap: u32,
    pub max_file_size_mb: u64,
    pub supported_file_types: Vec<String>,
    pub max_embedding_requests_per_min: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    pub model: String,
    /// Corpus resource handed to the retrieval tool of the exported agents
    pub rag_corpus: Option<String>,
    pub sample_profile_path: String,
}

const BYTES_PER_MB: u64 = 1024 * 1024;

impl UploadConfig {
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb.saturating_mul(BYTES_PER_MB)
    }

    pub fn is_supported(&self, extension: &str) -> bool {
        let extension = extension.trim_start_matches('.').to_lowercase();
        self.supported_file_types.iter().any(|t| *t == extension)
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            chunk_size: 512,
            chunk_overlap: 100,
            max_file_size_mb: 50,
            supported_file_types: ["pdf", "docx", "doc", "txt"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_embedding_requests_per_min: 1000,
        }
    }
}

impl VertexConfig {
    /// `projects/{project}/locations/{location}`
    pub fn parent(&self) -> String {
        format!("projects/{}/locations/{}", self.project_id, self.location)
    }

    /// Fully qualified publisher model used to embed corpus chunks
    pub fn embedding_model_resource(&self) -> String {
        format!(
            "projects/{}/locations/{}/publishers/google/models/{}",
            self.project_id, self.location, self.embedding_model
        )
    }
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// Every missing required variable is reported in a single error so the
    /// operator can fix them all at once.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let required = ["GOOGLE_CLOUD_PROJECT", "GOOGLE_CLOUD_LOCATION", "RAG_CORPUS_NAME"];
        let missing: Vec<&str> = required
            .iter()
            .copied()
            .filter(|key| get(key).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(AppError::Config(format!(
                "Missing required environment variables: {}",
                missing.join(", ")
            )));
        }

        let project_id = get("GOOGLE_CLOUD_PROJECT").unwrap_or_default();
        let location = get("GOOGLE_CLOUD_LOCATION").unwrap_or_default();
        let corpus_name = get("RAG_CORPUS_NAME").unwrap_or_default();

        let defaults = UploadConfig::default();
        let supported_file_types = match get("SUPPORTED_FILE_TYPES") {
            Some(raw) => raw
                .split(',')
                .map(|s| s.trim().trim_start_matches('.').to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
            None => defaults.supported_file_types.clone(),
        };

        let max_file_size_mb = parse_or(&get, "MAX_FILE_SIZE_MB", defaults.max_file_size_mb)?;
        if max_file_size_mb.checked_mul(BYTES_PER_MB).is_none() {
            return Err(AppError::Config(format!(
                "Invalid value for MAX_FILE_SIZE_MB: '{}' (too large)",
                max_file_size_mb
            )));
        }

        Ok(Self {
            server: ServerConfig {
                port: parse_or(&get, "PORT", 8501)?,
                host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            },
            vertex: VertexConfig {
                api_endpoint: get("VERTEX_API_ENDPOINT")
                    .unwrap_or_else(|| format!("https://{}-aiplatform.googleapis.com", location))
                    .trim_end_matches('/')
                    .to_string(),
                storage_endpoint: get("GCS_API_ENDPOINT")
                    .unwrap_or_else(|| "https://storage.googleapis.com".to_string())
                    .trim_end_matches('/')
                    .to_string(),
                project_id,
                location,
                corpus_name,
                bucket_name: get("BUCKET_NAME"),
                embedding_model: get("EMBEDDING_MODEL")
                    .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
                access_token: get("GOOGLE_CLOUD_ACCESS_TOKEN"),
                retry_attempts: parse_or(&get, "RAG_RETRY_ATTEMPTS", 3)?,
                operation_poll_secs: parse_or(&get, "OPERATION_POLL_SECS", 2)?,
                operation_timeout_secs: parse_or(&get, "OPERATION_TIMEOUT_SECS", 600)?,
            },
            upload: UploadConfig {
                chunk_size: parse_or(&get, "UPLOAD_CHUNK_SIZE", defaults.chunk_size)?,
                chunk_overlap: parse_or(&get, "UPLOAD_CHUNK_OVERLAP", defaults.chunk_overlap)?,
                max_file_size_mb,
                supported_file_types,
                max_embedding_requests_per_min: parse_or(
                    &get,
                    "MAX_EMBEDDING_REQUESTS_PER_MIN",
                    defaults.max_embedding_requests_per_min,
                )?,
            },
            agent: AgentConfig {
                model: get("AGENT_MODEL").unwrap_or_else(|| DEFAULT_AGENT_MODEL.to_string()),
                rag_corpus: get("RAG_CORPUS"),
                sample_profile_path: get("RAG_SAMPLE_PROFILE")
                    .unwrap_or_else(|| "sample/sample_student_profile.json".to_string()),
            },
            log_dir: get("LOG_DIR"),
        })
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid value for {}: '{}' ({})", key, raw, e))),
        None => Ok(default),
    }
}
