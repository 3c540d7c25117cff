//! Pixabay stock photo client.
//!
//! Serves the photo tier of the waterfall. Pixabay reports exact image
//! dimensions and byte sizes per hit, so constraint violations are
//! usually caught before any download starts.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use reel_models::{Asset, DownloadConstraints, MediaType, ProviderKind};

use crate::download::download_to_file;
use crate::error::{ProviderError, ProviderResult};
use crate::traits::MediaProvider;
use crate::types::Candidate;

const DEFAULT_BASE_URL: &str = "https://pixabay.com";
const SEARCH_TIMEOUT: Duration = Duration::from_secs(15);
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(120);

/// Pixabay API client.
pub struct PixabayClient {
    api_key: String,
    http: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: Vec<PixabayHit>,
}

#[derive(Debug, Deserialize)]
struct PixabayHit {
    id: u64,
    #[serde(rename = "largeImageURL")]
    large_image_url: String,
    #[serde(rename = "imageWidth")]
    image_width: u32,
    #[serde(rename = "imageHeight")]
    image_height: u32,
    #[serde(rename = "imageSize")]
    image_size: u64,
}

impl PixabayClient {
    /// Create a client with an already-resolved API key.
    pub fn new(api_key: impl Into<String>) -> ProviderResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ProviderError::MissingApiKey("pixabay"));
        }
        let http = Client::builder().timeout(DOWNLOAD_TIMEOUT).build()?;
        Ok(Self {
            api_key,
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Override the API endpoint, for tests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl MediaProvider for PixabayClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Pixabay
    }

    async fn search(
        &self,
        query: &str,
        constraints: &DownloadConstraints,
    ) -> ProviderResult<Vec<Candidate>> {
        let url = format!("{}/api/", self.base_url);
        debug!(query = query, "Searching Pixabay photos");

        // Pixabay rejects per_page below 3.
        let per_page = constraints.candidates_per_tier.max(3).to_string();
        let response = self
            .http
            .get(&url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("q", query),
                ("image_type", "photo"),
                ("safesearch", "true"),
                ("per_page", per_page.as_str()),
            ])
            .timeout(SEARCH_TIMEOUT)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::search_failed(format!(
                "Pixabay returned {}: {}",
                status, body
            )));
        }

        let parsed: SearchResponse = response.json().await?;
        let candidates = parsed
            .hits
            .into_iter()
            .map(|hit| Candidate {
                id: hit.id.to_string(),
                url: hit.large_image_url,
                keyword: query.to_string(),
                width: hit.image_width,
                height: hit.image_height,
                size_bytes: Some(hit.image_size),
                duration_secs: None,
                media_type: MediaType::Image,
            })
            .collect::<Vec<_>>();

        info!(
            query = query,
            count = candidates.len(),
            "Pixabay photo search complete"
        );
        Ok(candidates)
    }

    async fn fetch(
        &self,
        candidate: &Candidate,
        constraints: &DownloadConstraints,
        dest: &Path,
    ) -> ProviderResult<Asset> {
        let size = download_to_file(
            &self.http,
            &candidate.url,
            dest,
            constraints.max_file_size_bytes,
        )
        .await?;

        Ok(Asset {
            path: dest.to_path_buf(),
            media_type: MediaType::Image,
            provider: ProviderKind::Pixabay,
            keyword: Some(candidate.keyword.clone()),
            resolution: Some(candidate.resolution()),
            size_bytes: size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn search_body() -> serde_json::Value {
        serde_json::json!({
            "total": 1,
            "totalHits": 1,
            "hits": [
                {
                    "id": 42,
                    "largeImageURL": "https://cdn.example.com/sunset_1280.jpg",
                    "imageWidth": 1920,
                    "imageHeight": 1280,
                    "imageSize": 350_000
                }
            ]
        })
    }

    #[tokio::test]
    async fn test_search_parses_hits() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/"))
            .and(query_param("q", "sunset"))
            .and(query_param("key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_body()))
            .mount(&server)
            .await;

        let client = PixabayClient::new("test-key")
            .unwrap()
            .with_base_url(server.uri());

        let candidates = client
            .search("sunset", &DownloadConstraints::default())
            .await
            .unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].id, "42");
        assert_eq!(candidates[0].width, 1920);
        assert_eq!(candidates[0].size_bytes, Some(350_000));
        assert_eq!(candidates[0].media_type, MediaType::Image);
    }

    #[tokio::test]
    async fn test_search_empty_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "total": 0, "totalHits": 0, "hits": []
            })))
            .mount(&server)
            .await;

        let client = PixabayClient::new("test-key")
            .unwrap()
            .with_base_url(server.uri());

        let candidates = client
            .search("xyzzy", &DownloadConstraints::default())
            .await
            .unwrap();
        assert!(candidates.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_downloads_image() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sunset.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8; 512]))
            .mount(&server)
            .await;

        let client = PixabayClient::new("test-key")
            .unwrap()
            .with_base_url(server.uri());

        let candidate = Candidate {
            id: "42".into(),
            url: format!("{}/sunset.jpg", server.uri()),
            keyword: "sunset".into(),
            width: 1920,
            height: 1280,
            size_bytes: Some(512),
            duration_secs: None,
            media_type: MediaType::Image,
        };

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("s1_sunset_abcd1234.jpg");
        let asset = client
            .fetch(&candidate, &DownloadConstraints::default(), &dest)
            .await
            .unwrap();

        assert_eq!(asset.provider, ProviderKind::Pixabay);
        assert_eq!(asset.keyword.as_deref(), Some("sunset"));
        assert_eq!(asset.size_bytes, 512);
        assert!(dest.exists());
    }
}
