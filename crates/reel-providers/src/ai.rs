//! AI image generation client.
//!
//! Terminal fallback tier: talks to an OpenAI-compatible image endpoint
//! that returns base64-encoded image data. There is no "no results"
//! outcome; the tier fails only when the generation call itself errors.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use reel_models::{Asset, MediaType, ProviderKind, Resolution};

use crate::error::{ProviderError, ProviderResult};
use crate::traits::ImageGenerator;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "dall-e-3";
const DEFAULT_IMAGE_SIZE: &str = "1024x1024";
const GENERATION_TIMEOUT: Duration = Duration::from_secs(120);

/// Client for an OpenAI-compatible image generation API.
pub struct AiImageClient {
    api_key: String,
    http: Client,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u32,
    size: &'a str,
    response_format: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerationResponse {
    data: Vec<GeneratedImage>,
}

#[derive(Debug, Deserialize)]
struct GeneratedImage {
    b64_json: String,
}

impl AiImageClient {
    /// Create a client with an already-resolved API key.
    pub fn new(api_key: impl Into<String>) -> ProviderResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ProviderError::MissingApiKey("ai"));
        }
        let http = Client::builder().timeout(GENERATION_TIMEOUT).build()?;
        Ok(Self {
            api_key,
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        })
    }

    /// Override the API endpoint, for tests or self-hosted gateways.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[async_trait]
impl ImageGenerator for AiImageClient {
    async fn generate(&self, prompt: &str, dest: &Path) -> ProviderResult<Asset> {
        let url = format!("{}/v1/images/generations", self.base_url);
        debug!(prompt = prompt, "Requesting AI image generation");

        let request = GenerationRequest {
            model: &self.model,
            prompt,
            n: 1,
            size: DEFAULT_IMAGE_SIZE,
            response_format: "b64_json",
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::generation_failed(format!(
                "image API returned {}: {}",
                status, body
            )));
        }

        let parsed: GenerationResponse = response.json().await?;
        let image = parsed
            .data
            .first()
            .ok_or_else(|| ProviderError::generation_failed("empty image data"))?;

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(&image.b64_json)
            .map_err(|e| ProviderError::generation_failed(format!("invalid base64: {e}")))?;

        // Write-then-rename so a failed write never leaves a partial
        // file at the destination.
        let tmp = crate::download::partial_path(dest);
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, dest).await?;

        let (width, height) = parse_size(DEFAULT_IMAGE_SIZE);
        info!(
            dest = %dest.display(),
            size_bytes = bytes.len(),
            "Generated AI image"
        );

        Ok(Asset {
            path: dest.to_path_buf(),
            media_type: MediaType::Image,
            provider: ProviderKind::Ai,
            keyword: Some(prompt.to_string()),
            resolution: Some(Resolution::new(width, height)),
            size_bytes: bytes.len() as u64,
        })
    }
}

fn parse_size(size: &str) -> (u32, u32) {
    size.split_once('x')
        .and_then(|(w, h)| Some((w.parse().ok()?, h.parse().ok()?)))
        .unwrap_or((1024, 1024))
}
