//! Image provider trait and the OpenAI images backend.

use async_trait::async_trait;
use base64::Engine;
use muse_core::error::MuseError;
use serde::Deserialize;
use tracing::{debug, warn};

/// External image generator — a black box with unspecified latency and
/// non-deterministic availability. No retries: a failed call means no
/// image for that prompt.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Human-readable provider name.
    fn name(&self) -> &str;

    /// Generate one image for a prompt. Returns raw PNG bytes.
    async fn generate(&self, prompt: &str, size: &str) -> Result<Vec<u8>, MuseError>;
}

/// OpenAI image generation API provider.
pub struct OpenAiImages {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiImages {
    /// Create from config values.
    pub fn from_config(base_url: String, api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
            model,
        }
    }
}

#[derive(Deserialize)]
struct ImagesResponse {
    data: Option<Vec<ImageDatum>>,
}

#[derive(Deserialize)]
struct ImageDatum {
    b64_json: Option<String>,
}

#[async_trait]
impl ImageProvider for OpenAiImages {
    fn name(&self) -> &str {
        "openai-images"
    }

    async fn generate(&self, prompt: &str, size: &str) -> Result<Vec<u8>, MuseError> {
        let url = format!("{}/images/generations", self.base_url.trim_end_matches('/'));
        let body = serde_json::json!({
            "model": self.model,
            "prompt": prompt,
            "n": 1,
            "size": size,
            "response_format": "b64_json",
        });
        debug!("images: POST {url} model={}", self.model);

        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| MuseError::Image(format!("image request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(MuseError::Image(format!(
                "image provider returned {status}: {text}"
            )));
        }

        let parsed: ImagesResponse = resp
            .json()
            .await
            .map_err(|e| MuseError::Image(format!("failed to parse image response: {e}")))?;

        let encoded = parsed
            .data
            .and_then(|mut d| d.pop())
            .and_then(|d| d.b64_json)
            .ok_or_else(|| MuseError::Image("image response carried no b64_json data".into()))?;

        base64::engine::general_purpose::STANDARD
            .decode(encoded.as_bytes())
            .map_err(|e| MuseError::Image(format!("failed to decode image payload: {e}")))
    }
}

impl OpenAiImages {
    /// Basic availability check: a key is configured.
    pub fn is_configured(&self) -> bool {
        if self.api_key.is_empty() {
            warn!("images: no API key configured");
            return false;
        }
        true
    }
}
