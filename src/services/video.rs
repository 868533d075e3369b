//! External video host. Recordings are pulled by the host from a public URL;
//! only the returned id and an embeddable player URL are stored.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

use crate::config::IntegrationsConfig;

const PLAYER_BASE_URL: &str = "https://player.vimeo.com/video";

#[derive(Debug, Error)]
pub enum VideoError {
    #[error("Video hosting is not configured")]
    NotConfigured,

    #[error("Video host request failed: {0}")]
    Upstream(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadedVideo {
    pub video_id: String,
    pub embed_url: String,
}

#[async_trait]
pub trait VideoHost: Send + Sync {
    async fn upload_from_url(&self, source_url: &str, title: &str) -> Result<UploadedVideo, VideoError>;
}

pub struct VimeoClient {
    http: reqwest::Client,
    api_url: String,
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreateVideoResponse {
    uri: Option<String>,
}

impl VimeoClient {
    pub fn new(api_url: impl Into<String>, access_token: Option<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            access_token,
        }
    }

    pub fn from_config(integrations: &IntegrationsConfig) -> Self {
        Self::new(&integrations.vimeo_api_url, integrations.vimeo_access_token.clone())
    }
}

#[async_trait]
impl VideoHost for VimeoClient {
    async fn upload_from_url(&self, source_url: &str, title: &str) -> Result<UploadedVideo, VideoError> {
        let token = self.access_token.as_deref().ok_or(VideoError::NotConfigured)?;

        let response = self
            .http
            .post(format!("{}/me/videos", self.api_url))
            .bearer_auth(token)
            .json(&json!({
                "name": title,
                "upload": { "approach": "pull", "link": source_url },
                "privacy": { "view": "unlisted" },
            }))
            .send()
            .await
            .map_err(|e| VideoError::Upstream(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Video host rejected upload of {}: {}", source_url, status);
            return Err(VideoError::Upstream(format!("video host responded with {}", status)));
        }

        let body: CreateVideoResponse = response
            .json()
            .await
            .map_err(|e| VideoError::Upstream(e.to_string()))?;

        let video_id = body
            .uri
            .as_deref()
            .and_then(video_id_from_uri)
            .ok_or_else(|| VideoError::Upstream("video host returned no video id".to_string()))?;

        Ok(UploadedVideo {
            embed_url: embed_url(&video_id),
            video_id,
        })
    }
}

/// `/videos/123456` -> `123456`
pub fn video_id_from_uri(uri: &str) -> Option<String> {
    uri.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

pub fn embed_url(video_id: &str) -> String {
    format!("{}/{}", PLAYER_BASE_URL, video_id)
}
