//! Provider-neutral candidate types and constraint checks.

use reel_models::{DownloadConstraints, MediaType, Resolution};

use crate::error::{ProviderError, ProviderResult};

/// One downloadable search result, normalized across providers.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Provider-side identifier, surfaced in rejection logs
    pub id: String,
    /// Direct download URL
    pub url: String,
    /// Search term that produced this candidate; becomes the installed
    /// asset's provenance keyword
    pub keyword: String,
    /// Pixel width
    pub width: u32,
    /// Pixel height
    pub height: u32,
    /// File size in bytes, when the provider reports it
    pub size_bytes: Option<u64>,
    /// Clip duration in seconds, video candidates only
    pub duration_secs: Option<f64>,
    /// Video or image
    pub media_type: MediaType,
}

impl Candidate {
    /// Resolution of the candidate file.
    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width, self.height)
    }

    /// File extension for the installed file, derived from the download
    /// URL with a per-media-type default.
    pub fn file_ext(&self) -> &str {
        let default = match self.media_type {
            MediaType::Video => "mp4",
            MediaType::Image => "jpg",
        };
        self.url
            .rsplit('/')
            .next()
            .and_then(|name| name.split('?').next())
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext)
            .filter(|ext| ext.len() <= 4 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or(default)
    }
}

/// Check a candidate against download constraints.
///
/// Violations are never retried; the caller moves on to the next
/// candidate instead.
pub fn validate_candidate(
    candidate: &Candidate,
    constraints: &DownloadConstraints,
) -> ProviderResult<()> {
    let resolution = candidate.resolution();

    if let Some(min) = &constraints.min_resolution {
        if !resolution.meets_minimum(min) {
            return Err(ProviderError::constraint(format!(
                "resolution {} below minimum {}",
                resolution, min
            )));
        }
    }

    if !constraints.aspect_matches(&resolution) {
        return Err(ProviderError::constraint(format!(
            "aspect ratio of {} outside tolerance",
            resolution
        )));
    }

    if let Some(size) = candidate.size_bytes {
        if !constraints.size_within_limit(size) {
            return Err(ProviderError::constraint(format!(
                "file size {} bytes exceeds limit",
                size
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(width: u32, height: u32, size: Option<u64>) -> Candidate {
        Candidate {
            id: "1".into(),
            url: "https://cdn.example.com/file.mp4".into(),
            keyword: "sunset".into(),
            width,
            height,
            size_bytes: size,
            duration_secs: Some(10.0),
            media_type: MediaType::Video,
        }
    }

    #[test]
    fn test_validate_resolution() {
        let constraints = DownloadConstraints {
            min_resolution: Some(Resolution::new(1280, 720)),
            ..Default::default()
        };
        assert!(validate_candidate(&candidate(1920, 1080, None), &constraints).is_ok());
        assert!(matches!(
            validate_candidate(&candidate(640, 360, None), &constraints),
            Err(ProviderError::ConstraintViolation(_))
        ));
    }

    #[test]
    fn test_validate_size() {
        let constraints = DownloadConstraints {
            max_file_size_bytes: Some(1_000),
            ..Default::default()
        };
        assert!(validate_candidate(&candidate(1920, 1080, Some(999)), &constraints).is_ok());
        assert!(validate_candidate(&candidate(1920, 1080, Some(1_001)), &constraints).is_err());
        // Unknown size passes the pre-check; the streaming download
        // enforces the cap instead.
        assert!(validate_candidate(&candidate(1920, 1080, None), &constraints).is_ok());
    }

    #[test]
    fn test_file_ext() {
        let mut c = candidate(1920, 1080, None);
        assert_eq!(c.file_ext(), "mp4");
        c.url = "https://cdn.example.com/pic.jpeg?dl=1".into();
        c.media_type = MediaType::Image;
        assert_eq!(c.file_ext(), "jpeg");
        c.url = "https://cdn.example.com/download".into();
        assert_eq!(c.file_ext(), "jpg");
    }
}
