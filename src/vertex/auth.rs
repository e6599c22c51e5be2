//! Bearer tokens for Google Cloud REST calls.
//!
//! A token supplied through configuration is used as-is. Otherwise the token
//! is obtained from the local `gcloud` installation and cached until shortly
//! before it expires.

use std::time::{Duration, Instant};

use tokio::process::Command;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::types::{AppError, AppResult};

// gcloud access tokens live for one hour
const GCLOUD_TOKEN_TTL: Duration = Duration::from_secs(50 * 60);

pub enum TokenSource {
    Static(String),
    Gcloud(Mutex<Option<CachedToken>>),
}

pub struct CachedToken {
    value: String,
    fetched_at: Instant,
}

impl TokenSource {
    pub fn from_config(access_token: Option<&str>) -> Self {
        match access_token {
            Some(token) => TokenSource::Static(token.to_string()),
            None => TokenSource::Gcloud(Mutex::new(None)),
        }
    }

    pub async fn token(&self) -> AppResult<String> {
        match self {
            TokenSource::Static(token) => Ok(token.clone()),
            TokenSource::Gcloud(cache) => {
                let mut guard = cache.lock().await;
                if let Some(cached) = guard.as_ref() {
                    if cached.fetched_at.elapsed() < GCLOUD_TOKEN_TTL {
                        return Ok(cached.value.clone());
                    }
                    debug!("Cached gcloud token expired");
                }

                let value = fetch_gcloud_token().await?;
                *guard = Some(CachedToken {
                    value: value.clone(),
                    fetched_at: Instant::now(),
                });
                Ok(value)
            }
        }
    }
}

async fn fetch_gcloud_token() -> AppResult<String> {
    info!("Requesting access token from gcloud");
    let output = Command::new("gcloud")
        .args(["auth", "print-access-token"])
        .output()
        .await
        .map_err(|e| {
            AppError::Config(format!(
                "GOOGLE_CLOUD_ACCESS_TOKEN is not set and gcloud could not be run: {}",
                e
            ))
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(AppError::Config(format!(
            "gcloud auth print-access-token failed: {}",
            stderr.trim()
        )));
    }

    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if token.is_empty() {
        return Err(AppError::Config("gcloud returned an empty access token".to_string()));
    }
    Ok(token)
}
