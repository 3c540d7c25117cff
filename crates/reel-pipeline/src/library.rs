//! Project media library.
//!
//! Owns the `video/` and `images/` directories under the project media
//! root: scans them for matchable local assets and hands out unique
//! destination paths for acquired files.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use reel_models::{Asset, MediaType, SceneId};

use crate::error::PipelineResult;

const VIDEO_DIR: &str = "video";
const IMAGE_DIR: &str = "images";

/// Maximum keyword length carried into an installed file name.
const SLUG_MAX_LEN: usize = 32;

#[derive(Debug, Clone)]
pub struct MediaLibrary {
    root: PathBuf,
}

impl MediaLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn video_dir(&self) -> PathBuf {
        self.root.join(VIDEO_DIR)
    }

    pub fn image_dir(&self) -> PathBuf {
        self.root.join(IMAGE_DIR)
    }

    /// Create the media directories if they do not exist yet.
    pub async fn ensure_dirs(&self) -> PipelineResult<()> {
        tokio::fs::create_dir_all(self.video_dir()).await?;
        tokio::fs::create_dir_all(self.image_dir()).await?;
        Ok(())
    }

    /// Scan both media directories for usable assets.
    ///
    /// Deterministic: entries are sorted by file name within each
    /// directory, videos before images. Unrecognized extensions and
    /// leftover `.part` temp files are skipped.
    pub async fn scan(&self) -> PipelineResult<Vec<Asset>> {
        let mut assets = Vec::new();
        for dir in [self.video_dir(), self.image_dir()] {
            assets.extend(scan_dir(&dir).await?);
        }
        debug!(
            root = %self.root.display(),
            count = assets.len(),
            "Scanned media library"
        );
        Ok(assets)
    }

    /// Unique destination path for a file acquired for `scene_id`.
    ///
    /// The name embeds the scene, a keyword slug and a random suffix, so
    /// concurrent acquisitions for the same scene or keyword never
    /// collide: `{sceneId}_{slug}_{suffix}.{ext}` under the directory for
    /// `media_type`.
    pub fn dest_path(
        &self,
        scene_id: &SceneId,
        keyword: &str,
        media_type: MediaType,
        ext: &str,
    ) -> PathBuf {
        let dir = match media_type {
            MediaType::Video => self.video_dir(),
            MediaType::Image => self.image_dir(),
        };
        let suffix = &uuid::Uuid::new_v4().simple().to_string()[..8];
        dir.join(format!(
            "{}_{}_{}.{}",
            slug(scene_id.as_str()),
            slug(keyword),
            suffix,
            ext
        ))
    }
}

/// Lowercase alphanumeric slug with underscores, bounded in length.
fn slug(input: &str) -> String {
    let mut out = String::with_capacity(input.len().min(SLUG_MAX_LEN));
    let mut last_sep = true;
    for c in input.chars() {
        if out.len() >= SLUG_MAX_LEN {
            break;
        }
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
            last_sep = false;
        } else if !last_sep {
            out.push('_');
            last_sep = true;
        }
    }
    let trimmed = out.trim_end_matches('_');
    if trimmed.is_empty() {
        "media".to_string()
    } else {
        trimmed.to_string()
    }
}

async fn scan_dir(dir: &Path) -> PipelineResult<Vec<Asset>> {
    let mut assets = Vec::new();
    let mut reader = match tokio::fs::read_dir(dir).await {
        Ok(reader) => reader,
        // A missing directory is an empty library, not an error.
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(assets),
        Err(e) => return Err(e.into()),
    };

    let mut entries = Vec::new();
    while let Some(entry) = reader.next_entry().await? {
        entries.push(entry.path());
    }
    entries.sort();

    for path in entries {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        if ext.eq_ignore_ascii_case("part") {
            warn!(path = %path.display(), "Skipping leftover partial download");
            continue;
        }
        let Some(media_type) = MediaType::from_extension(ext) else {
            continue;
        };
        let metadata = tokio::fs::metadata(&path).await?;
        if !metadata.is_file() {
            continue;
        }
        assets.push(Asset::local(path, media_type, metadata.len()));
    }
    Ok(assets)
}
