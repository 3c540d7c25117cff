//! Asset types.
//!
//! An asset is a concrete local media file (video clip or image) with
//! provenance metadata. Assets are immutable once created; replacing a
//! scene's media creates a new `Asset` reference rather than mutating the
//! file in place.

use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Kind of visual media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    /// Video clip
    Video,
    /// Still image (photo or generated)
    Image,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Video => "video",
            MediaType::Image => "image",
        }
    }

    /// Infer the media type from a file extension, if recognized.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "mp4" | "mov" | "mkv" | "webm" | "avi" => Some(MediaType::Video),
            "jpg" | "jpeg" | "png" | "webp" | "bmp" => Some(MediaType::Image),
            _ => None,
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Origin of an asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Already present in the project media directories
    Local,
    /// Pexels stock video
    Pexels,
    /// Pixabay stock photo
    Pixabay,
    /// AI image generation
    Ai,
    /// User-supplied source tag
    #[serde(untagged)]
    Other(String),
}

impl ProviderKind {
    pub fn as_str(&self) -> &str {
        match self {
            ProviderKind::Local => "local",
            ProviderKind::Pexels => "pexels",
            ProviderKind::Pixabay => "pixabay",
            ProviderKind::Ai => "ai",
            ProviderKind::Other(s) => s,
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pixel dimensions of a media file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Whether both dimensions meet a required minimum.
    pub fn meets_minimum(&self, min: &Resolution) -> bool {
        self.width >= min.width && self.height >= min.height
    }

    /// Width-over-height ratio.
    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            return 0.0;
        }
        self.width as f64 / self.height as f64
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A unit of visual media on local disk.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    /// Local filesystem location, owned by the project media directories
    pub path: PathBuf,
    /// Video or image
    pub media_type: MediaType,
    /// Origin tag
    pub provider: ProviderKind,
    /// Search term that produced this asset (None for user-imported files)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    /// Pixel dimensions, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
    /// File size in bytes
    pub size_bytes: u64,
}

impl Asset {
    /// Create a locally-sourced asset with no provenance keyword.
    pub fn local(path: impl Into<PathBuf>, media_type: MediaType, size_bytes: u64) -> Self {
        Self {
            path: path.into(),
            media_type,
            provider: ProviderKind::Local,
            keyword: None,
            resolution: None,
            size_bytes,
        }
    }

    /// Set the provenance keyword (builder style).
    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    /// File name stem, used for token matching against scene keywords.
    pub fn file_stem(&self) -> &str {
        Path::new(&self.path)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_serialization() {
        assert_eq!(
            serde_json::to_string(&ProviderKind::Pexels).unwrap(),
            "\"pexels\""
        );
        assert_eq!(
            serde_json::to_string(&ProviderKind::Other("drive".into())).unwrap(),
            "\"drive\""
        );
        let parsed: ProviderKind = serde_json::from_str("\"ai\"").unwrap();
        assert_eq!(parsed, ProviderKind::Ai);
    }

    #[test]
    fn test_media_type_from_extension() {
        assert_eq!(MediaType::from_extension("MP4"), Some(MediaType::Video));
        assert_eq!(MediaType::from_extension("jpeg"), Some(MediaType::Image));
        assert_eq!(MediaType::from_extension("srt"), None);
    }

    #[test]
    fn test_resolution_checks() {
        let res = Resolution::new(1920, 1080);
        assert!(res.meets_minimum(&Resolution::new(1280, 720)));
        assert!(!res.meets_minimum(&Resolution::new(3840, 2160)));
        assert!((res.aspect_ratio() - 16.0 / 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_asset_file_stem() {
        let asset = Asset::local("/media/video/sunset_beach.mp4", MediaType::Video, 1024);
        assert_eq!(asset.file_stem(), "sunset_beach");
    }
}
