//! Pexels stock video client.
//!
//! Serves the video tier of the waterfall via the Pexels `videos/search`
//! endpoint. Each hit carries several encoded files; the smallest file
//! satisfying the resolution constraints is selected per hit to keep
//! downloads lean.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use reel_models::{Asset, DownloadConstraints, MediaType, ProviderKind, Resolution};

use crate::download::download_to_file;
use crate::error::{ProviderError, ProviderResult};
use crate::traits::MediaProvider;
use crate::types::Candidate;

const DEFAULT_BASE_URL: &str = "https://api.pexels.com";
const SEARCH_TIMEOUT: Duration = Duration::from_secs(15);
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(180);

/// Pexels API client.
pub struct PexelsClient {
    api_key: String,
    http: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    videos: Vec<PexelsVideo>,
}

#[derive(Debug, Deserialize)]
struct PexelsVideo {
    id: u64,
    #[serde(default)]
    duration: f64,
    #[serde(default)]
    video_files: Vec<PexelsVideoFile>,
}

#[derive(Debug, Deserialize)]
struct PexelsVideoFile {
    #[serde(default)]
    file_type: String,
    width: Option<u32>,
    height: Option<u32>,
    size: Option<u64>,
    link: String,
}

impl PexelsClient {
    /// Create a client with an already-resolved API key.
    pub fn new(api_key: impl Into<String>) -> ProviderResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ProviderError::MissingApiKey("pexels"));
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

    /// Pick the leanest file per hit that still satisfies resolution
    /// constraints; falls back to the largest file when nothing does
    /// (the candidate is then rejected by validation, not silently kept).
    fn select_file<'a>(
        files: &'a [PexelsVideoFile],
        constraints: &DownloadConstraints,
    ) -> Option<&'a PexelsVideoFile> {
        let mp4s: Vec<&PexelsVideoFile> = files
            .iter()
            .filter(|f| f.file_type == "video/mp4" && f.width.is_some() && f.height.is_some())
            .collect();

        let fitting = mp4s
            .iter()
            .filter(|f| match &constraints.min_resolution {
                Some(min) => Resolution::new(f.width.unwrap_or(0), f.height.unwrap_or(0))
                    .meets_minimum(min),
                None => true,
            })
            .min_by_key(|f| (f.width.unwrap_or(0) as u64) * (f.height.unwrap_or(0) as u64));

        fitting.copied().or_else(|| {
            mp4s.into_iter()
                .max_by_key(|f| (f.width.unwrap_or(0) as u64) * (f.height.unwrap_or(0) as u64))
        })
    }
}

#[async_trait]
impl MediaProvider for PexelsClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Pexels
    }

    async fn search(
        &self,
        query: &str,
        constraints: &DownloadConstraints,
    ) -> ProviderResult<Vec<Candidate>> {
        let url = format!("{}/videos/search", self.base_url);
        debug!(query = query, "Searching Pexels videos");

        let response = self
            .http
            .get(&url)
            .header("Authorization", &self.api_key)
            .query(&[
                ("query", query),
                ("per_page", &constraints.candidates_per_tier.to_string()),
            ])
            .timeout(SEARCH_TIMEOUT)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::search_failed(format!(
                "Pexels returned {}: {}",
                status, body
            )));
        }

        let parsed: SearchResponse = response.json().await?;
        let candidates = parsed
            .videos
            .iter()
            .filter_map(|video| {
                let file = Self::select_file(&video.video_files, constraints)?;
                Some(Candidate {
                    id: video.id.to_string(),
                    url: file.link.clone(),
                    keyword: query.to_string(),
                    width: file.width.unwrap_or(0),
                    height: file.height.unwrap_or(0),
                    size_bytes: file.size,
                    duration_secs: Some(video.duration),
                    media_type: MediaType::Video,
                })
            })
            .collect::<Vec<_>>();

        info!(
            query = query,
            count = candidates.len(),
            "Pexels video search complete"
        );
        Ok(candidates)
    }

    async fn fetch(
        &self,
        candidate: &Candidate,
        constraints: &DownloadConstraints,
        dest: &Path,
    ) -> ProviderResult<Asset> {
        // Sizes reported by the API are advisory; the stream check is
        // authoritative.
        let size = download_to_file(
            &self.http,
            &candidate.url,
            dest,
            constraints.max_file_size_bytes,
        )
        .await?;

        Ok(Asset {
            path: dest.to_path_buf(),
            media_type: MediaType::Video,
            provider: ProviderKind::Pexels,
            keyword: Some(candidate.keyword.clone()),
            resolution: Some(candidate.resolution()),
            size_bytes: size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn search_body() -> serde_json::Value {
        serde_json::json!({
            "page": 1,
            "per_page": 2,
            "videos": [
                {
                    "id": 101,
                    "duration": 12.0,
                    "video_files": [
                        {"file_type": "video/mp4", "width": 640, "height": 360,
                         "size": 1000, "link": "https://cdn.example.com/sd.mp4"},
                        {"file_type": "video/mp4", "width": 1920, "height": 1080,
                         "size": 9000, "link": "https://cdn.example.com/hd.mp4"},
                        {"file_type": "application/x-mpegURL", "width": null, "height": null,
                         "size": null, "link": "https://cdn.example.com/stream.m3u8"}
                    ]
                }
            ]
        })
    }

    #[tokio::test]
    async fn test_search_parses_and_selects_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/videos/search"))
            .and(header("Authorization", "test-key"))
            .and(query_param("query", "sunset"))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_body()))
            .mount(&server)
            .await;

        let client = PexelsClient::new("test-key")
            .unwrap()
            .with_base_url(server.uri());

        let constraints = DownloadConstraints {
            min_resolution: Some(Resolution::new(1280, 720)),
            ..Default::default()
        };
        let candidates = client.search("sunset", &constraints).await.unwrap();
        assert_eq!(candidates.len(), 1);
        // HD file is the smallest that meets 720p.
        assert_eq!(candidates[0].url, "https://cdn.example.com/hd.mp4");
        assert_eq!(candidates[0].keyword, "sunset");
        assert_eq!(candidates[0].media_type, MediaType::Video);
    }

    #[tokio::test]
    async fn test_search_prefers_smallest_without_minimum() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/videos/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_body()))
            .mount(&server)
            .await;

        let client = PexelsClient::new("test-key")
            .unwrap()
            .with_base_url(server.uri());

        let candidates = client
            .search("sunset", &DownloadConstraints::default())
            .await
            .unwrap();
        assert_eq!(candidates[0].url, "https://cdn.example.com/sd.mp4");
    }

    #[tokio::test]
    async fn test_search_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/videos/search"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let client = PexelsClient::new("test-key")
            .unwrap()
            .with_base_url(server.uri());

        let err = client
            .search("sunset", &DownloadConstraints::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::SearchFailed(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_empty_api_key_rejected() {
        assert!(matches!(
            PexelsClient::new("  "),
            Err(ProviderError::MissingApiKey("pexels"))
        ));
    }
}
