// Cloud Storage staging for local files that are imported by URI

use reqwest::Client;
use serde::Deserialize;
use tracing::info;

use super::auth::TokenSource;
use crate::config::VertexConfig;
use crate::types::{AppError, AppResult};

/// Folder inside the bucket where files wait for import
pub const STAGING_PREFIX: &str = "processing";

pub struct GcsUploader {
    client: Client,
    tokens: TokenSource,
    endpoint: String,
    bucket: String,
}

#[derive(Deserialize)]
struct ObjectResource {
    name: String,
    bucket: String,
}

impl GcsUploader {
    pub fn new(config: &VertexConfig) -> AppResult<Self> {
        let bucket = config.bucket_name.clone().ok_or_else(|| {
            AppError::Config("BUCKET_NAME must be set to upload local files for import".to_string())
        })?;

        Ok(Self {
            client: Client::new(),
            tokens: TokenSource::from_config(config.access_token.as_deref()),
            endpoint: config.storage_endpoint.clone(),
            bucket,
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn staging_object(file_name: &str) -> String {
        format!("{}/{}", STAGING_PREFIX, file_name)
    }

    /// Uploads `data` as `object` and returns its `gs://` URI.
    pub async fn upload(&self, object: &str, content_type: &str, data: Vec<u8>) -> AppResult<String> {
        let url = format!("{}/upload/storage/v1/b/{}/o", self.endpoint, self.bucket);
        let token = self.tokens.token().await?;
        let bytes = data.len();

        let response = self
            .client
            .post(&url)
            .query(&[("uploadType", "media"), ("name", object)])
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(data)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::platform(
                status.as_u16(),
                format!("Cloud Storage upload of {} failed: {}", object, body),
            ));
        }

        let resource: ObjectResource = response.json().await?;
        let uri = format!("gs://{}/{}", resource.bucket, resource.name);
        info!(uri = %uri, bytes, "Staged file in Cloud Storage");
        Ok(uri)
    }
}
