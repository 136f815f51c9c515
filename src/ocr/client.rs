//! OCR service client.
//!
//! Processing code depends only on the [`OcrClient`] trait, so tests (and
//! callers with their own transport) can substitute an in-process
//! implementation. [`HttpOcrClient`] speaks the service's JSON API:
//!
//! ```text
//! GET  {api_url}/health          2xx = healthy
//! POST {api_url}/ocr             {image, filename, save_markdown, save_json, output_dir}
//!                             →  {status, markdown_path?, json_path?, markdown?, message?}
//! ```

use crate::error::Error;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Health probes use their own short timeout so a dead service is detected
/// quickly regardless of the OCR request timeout.
const HEALTH_TIMEOUT: Duration = Duration::from_secs(10);

/// Body of `POST /ocr`.
#[derive(Debug, Clone, Serialize)]
pub struct RecognizeRequest {
    /// Base64 (standard alphabet) of the image file bytes.
    pub image: String,
    pub filename: String,
    pub save_markdown: bool,
    pub save_json: bool,
    pub output_dir: String,
}

/// Answer to a recognition request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognizeResponse {
    /// `"success"` or `"error"`.
    #[serde(default)]
    pub status: String,
    /// Where the service saved the page Markdown. May be relative.
    #[serde(default)]
    pub markdown_path: Option<PathBuf>,
    #[serde(default)]
    pub json_path: Option<PathBuf>,
    /// Inline Markdown, for services that return it instead of saving.
    #[serde(default)]
    pub markdown: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl RecognizeResponse {
    pub fn is_error(&self) -> bool {
        self.status.eq_ignore_ascii_case("error")
    }

    /// A successful response carrying a saved Markdown path.
    pub fn with_markdown_path(path: impl Into<PathBuf>) -> Self {
        Self {
            status: "success".to_string(),
            markdown_path: Some(path.into()),
            ..Self::default()
        }
    }

    /// An error response with `message`.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: Some(message.into()),
            ..Self::default()
        }
    }
}

/// A failed recognition call.
#[derive(Debug, Error)]
pub enum OcrClientError {
    #[error("cannot read image '{path}': {source}")]
    ReadImage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("service answered HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

/// The OCR service as seen by [`crate::ocr::process_document`].
#[async_trait]
pub trait OcrClient: Send + Sync {
    /// `true` when the service is reachable and ready.
    async fn health_check(&self) -> bool;

    /// Recognise one image. `output_dir` is where the service should save
    /// the Markdown (and JSON, if asked).
    async fn recognize_image(
        &self,
        image_path: &Path,
        save_markdown: bool,
        save_json: bool,
        output_dir: &Path,
    ) -> Result<RecognizeResponse, OcrClientError>;
}

/// [`OcrClient`] over HTTP with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpOcrClient {
    api_url: String,
    http: reqwest::Client,
}

impl HttpOcrClient {
    /// Client for the service at `api_url`, with a per-request timeout.
    pub fn new(api_url: impl Into<String>, timeout_secs: u64) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs.max(1)))
            .build()
            .map_err(|e| Error::Internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

#[async_trait]
impl OcrClient for HttpOcrClient {
    async fn health_check(&self) -> bool {
        let url = format!("{}/health", self.api_url);
        match self.http.get(&url).timeout(HEALTH_TIMEOUT).send().await {
            Ok(resp) if resp.status().is_success() => true,
            Ok(resp) => {
                warn!("Health check {} answered HTTP {}", url, resp.status());
                false
            }
            Err(e) => {
                warn!("Health check {} failed: {}", url, e);
                false
            }
        }
    }

    async fn recognize_image(
        &self,
        image_path: &Path,
        save_markdown: bool,
        save_json: bool,
        output_dir: &Path,
    ) -> Result<RecognizeResponse, OcrClientError> {
        let bytes = tokio::fs::read(image_path)
            .await
            .map_err(|e| OcrClientError::ReadImage {
                path: image_path.to_path_buf(),
                source: e,
            })?;

        let request = RecognizeRequest {
            image: STANDARD.encode(&bytes),
            filename: image_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            save_markdown,
            save_json,
            output_dir: output_dir.to_string_lossy().into_owned(),
        };
        debug!(
            "POST {}/ocr: {} ({} bytes base64)",
            self.api_url,
            request.filename,
            request.image.len()
        );

        let resp = self
            .http
            .post(format!("{}/ocr", self.api_url))
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(OcrClientError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.json::<RecognizeResponse>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_tolerates_missing_fields() {
        let r: RecognizeResponse = serde_json::from_str(r#"{"status":"success","markdown_path":"page_001.md"}"#).unwrap();
        assert!(!r.is_error());
        assert_eq!(r.markdown_path, Some(PathBuf::from("page_001.md")));
        assert!(r.markdown.is_none());

        let r: RecognizeResponse = serde_json::from_str(r#"{"status":"error","message":"model busy"}"#).unwrap();
        assert!(r.is_error());
        assert_eq!(r.message.as_deref(), Some("model busy"));
    }

    #[test]
    fn request_serialises_expected_keys() {
        let req = RecognizeRequest {
            image: STANDARD.encode(b"png"),
            filename: "page_001.png".into(),
            save_markdown: true,
            save_json: false,
            output_dir: "output".into(),
        };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["image"], "cG5n");
        assert_eq!(v["filename"], "page_001.png");
        assert_eq!(v["save_markdown"], true);
        assert_eq!(v["save_json"], false);
        assert_eq!(v["output_dir"], "output");
    }

    #[test]
    fn client_trims_trailing_slash() {
        let c = HttpOcrClient::new("http://localhost:8000/", 5).unwrap();
        assert_eq!(c.api_url(), "http://localhost:8000");
    }

    #[tokio::test]
    async fn unreadable_image_is_read_error() {
        let c = HttpOcrClient::new("http://127.0.0.1:9", 1).unwrap();
        let err = c
            .recognize_image(Path::new("/definitely/missing.png"), true, false, Path::new("out"))
            .await
            .unwrap_err();
        assert!(matches!(err, OcrClientError::ReadImage { .. }));
    }
}
