use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

use crate::config::YoutubeConfig;
use crate::foundation::error::{ShortsError, ShortsResult};
use crate::services::{ensure_success, http_client};

pub const YOUTUBE_UPLOAD_ENDPOINT: &str =
    "https://www.googleapis.com/upload/youtube/v3/videos?uploadType=resumable&part=snippet,status";

/// Snippet and status of an uploaded video.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub category_id: String,
    pub privacy_status: String,
}

impl VideoMetadata {
    /// Title and description for a generated short.
    pub fn for_short(script_stem: &str, pages: usize, total_secs: f64, cfg: &YoutubeConfig) -> Self {
        Self {
            title: format!("AI Generated Short: {script_stem}"),
            description: format!("AI生成ショート動画 ({pages}ページ, {total_secs:.1}秒)"),
            tags: ["shorts", "ai", "generated"].map(String::from).to_vec(),
            category_id: cfg.default_category.clone(),
            privacy_status: cfg.default_privacy.clone(),
        }
    }

    pub(crate) fn request_body(&self) -> serde_json::Value {
        json!({
            "snippet": {
                "title": self.title,
                "description": self.description,
                "tags": self.tags,
                "categoryId": self.category_id,
            },
            "status": {
                "privacyStatus": self.privacy_status,
                "selfDeclaredMadeForKids": false,
            }
        })
    }
}

/// Publishes a finished video and returns its id.
pub trait Uploader {
    fn upload(&self, video: &Path, meta: &VideoMetadata) -> ShortsResult<String>;
}

pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

/// YouTube Data API v3 resumable upload with a caller-supplied OAuth bearer token.
pub struct YoutubeUploader {
    client: reqwest::blocking::Client,
    access_token: String,
    endpoint: String,
}

impl YoutubeUploader {
    pub fn new(cfg: &YoutubeConfig) -> ShortsResult<Self> {
        if cfg.access_token.is_empty() {
            return Err(ShortsError::validation(
                "YouTube access token is empty (set youtube.access_token or YOUTUBE_ACCESS_TOKEN)",
            ));
        }
        Ok(Self {
            client: http_client(Duration::from_secs(600))?,
            access_token: cfg.access_token.clone(),
            endpoint: YOUTUBE_UPLOAD_ENDPOINT.to_string(),
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn start_session(&self, meta: &VideoMetadata, len: u64) -> ShortsResult<String> {
        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.access_token)
            .header("X-Upload-Content-Type", "video/mp4")
            .header("X-Upload-Content-Length", len.to_string())
            .json(&meta.request_body())
            .timeout(Duration::from_secs(30))
            .send()?;
        let resp = ensure_success(resp, "YouTube upload session")?;
        resp.headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| ShortsError::service("YouTube upload session has no Location header"))
    }
}

#[derive(Deserialize)]
struct UploadedVideo {
    id: String,
}

impl Uploader for YoutubeUploader {
    #[tracing::instrument(skip_all, fields(video = %video.display(), title = %meta.title))]
    fn upload(&self, video: &Path, meta: &VideoMetadata) -> ShortsResult<String> {
        let file = std::fs::File::open(video).map_err(|e| {
            ShortsError::service(format!("open video '{}': {e}", video.display()))
        })?;
        let len = file
            .metadata()
            .map_err(|e| ShortsError::service(format!("stat video '{}': {e}", video.display())))?
            .len();

        let session = self.start_session(meta, len)?;
        tracing::info!(bytes = len, "uploading video");
        let resp = self
            .client
            .put(&session)
            .bearer_auth(&self.access_token)
            .header(reqwest::header::CONTENT_TYPE, "video/mp4")
            .header(reqwest::header::CONTENT_LENGTH, len)
            .body(reqwest::blocking::Body::from(file))
            .send()?;
        let uploaded: UploadedVideo = ensure_success(resp, "YouTube upload")?.json()?;
        tracing::info!(url = %watch_url(&uploaded.id), "upload complete");
        Ok(uploaded.id)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/services/upload.rs"]
mod tests;
