//! Google Vision OCR client (text extractor)
//!
//! Sends the uploaded photo to the Vision `images:annotate` endpoint with a
//! `TEXT_DETECTION` feature and returns the detected text normalized for
//! catalog search (newlines collapsed to spaces, trimmed).
//!
//! When no API key is configured the client is permanently disabled and
//! every extraction is a miss without a network call.

use base64::Engine as _;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

use crate::types::{Lookup, OcrProvider};

const VISION_BASE_URL: &str = "https://vision.googleapis.com/v1/images:annotate";
const USER_AGENT: &str = "waxid/0.1.0";

/// Vision client errors
#[derive(Debug, Error)]
pub enum VisionError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Vision service error: {0}")]
    ServiceError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Vision annotate response (one entry per submitted image)
#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<ImageResponse>,
}

#[derive(Debug, Default, Deserialize)]
struct ImageResponse {
    /// First annotation holds the full detected text; the rest are
    /// per-word regions.
    #[serde(rename = "textAnnotations", default)]
    text_annotations: Vec<TextAnnotation>,
    /// Service-level error for this image, if any.
    error: Option<VisionStatus>,
}

#[derive(Debug, Deserialize)]
struct TextAnnotation {
    description: String,
}

#[derive(Debug, Deserialize)]
struct VisionStatus {
    #[serde(default)]
    message: String,
}

/// Google Vision API client
pub struct VisionClient {
    http_client: reqwest::Client,
    api_key: Option<String>,
}

impl VisionClient {
    /// `api_key: None` builds a permanently disabled client.
    pub fn new(api_key: Option<String>) -> Result<Self, VisionError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| VisionError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    async fn annotate(&self, api_key: &str, image: &[u8]) -> Result<Option<String>, VisionError> {
        let body = json!({
            "requests": [{
                "image": { "content": base64::engine::general_purpose::STANDARD.encode(image) },
                "features": [{ "type": "TEXT_DETECTION" }],
            }]
        });

        let response = self
            .http_client
            .post(VISION_BASE_URL)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| VisionError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(VisionError::ApiError(status.as_u16(), error_text));
        }

        let annotate: AnnotateResponse = response
            .json()
            .await
            .map_err(|e| VisionError::ParseError(e.to_string()))?;

        let image_response = annotate.responses.into_iter().next().unwrap_or_default();

        if let Some(error) = image_response.error {
            return Err(VisionError::ServiceError(error.message));
        }

        Ok(image_response
            .text_annotations
            .into_iter()
            .next()
            .map(|a| a.description))
    }
}

#[async_trait::async_trait]
impl OcrProvider for VisionClient {
    async fn extract_text(&self, image: &[u8]) -> Lookup<String> {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::debug!("OCR disabled: no Vision API key configured");
            return Lookup::Miss;
        };

        match self.annotate(api_key, image).await {
            Ok(Some(raw_text)) => {
                let text = normalize_text(&raw_text);
                if text.is_empty() {
                    Lookup::Miss
                } else {
                    tracing::info!(text = %text, "Vision detected text on photo");
                    Lookup::Hit(text)
                }
            }
            Ok(None) => {
                tracing::info!("Vision detected no text regions");
                Lookup::Miss
            }
            Err(e) => {
                tracing::warn!(provider = "vision", "OCR lookup failed: {}", e);
                Lookup::Fault(e.to_string())
            }
        }
    }
}

/// Collapse newlines to spaces and trim, so multi-line sleeve text becomes
/// a single search query.
pub fn normalize_text(raw: &str) -> String {
    raw.replace('\n', " ").trim().to_string()
}
