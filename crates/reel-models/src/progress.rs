//! Acquisition progress event types.
//!
//! One `ProgressUpdate` is emitted per state transition per scene so a
//! caller can render per-scene badges, aggregate completed/total counts
//! and an ETA.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::scene::SceneId;

/// One stage of the acquisition waterfall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MediaTier {
    /// Stock video search
    Video,
    /// Stock photo search
    Photo,
    /// AI image generation (terminal fallback)
    Ai,
}

impl MediaTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaTier::Video => "video",
            MediaTier::Photo => "photo",
            MediaTier::Ai => "ai",
        }
    }
}

impl std::fmt::Display for MediaTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-scene acquisition status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum AcquisitionStatus {
    /// Waiting for a worker slot
    #[default]
    Queued,
    /// Querying a stock provider
    Searching,
    /// Downloading a candidate file
    Downloading,
    /// Waiting on AI image generation
    Generating,
    /// Scene bound to an asset
    Completed,
    /// All tiers exhausted
    Failed,
}

impl AcquisitionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AcquisitionStatus::Queued => "queued",
            AcquisitionStatus::Searching => "searching",
            AcquisitionStatus::Downloading => "downloading",
            AcquisitionStatus::Generating => "generating",
            AcquisitionStatus::Completed => "completed",
            AcquisitionStatus::Failed => "failed",
        }
    }

    /// Whether no more updates are expected for this scene.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AcquisitionStatus::Completed | AcquisitionStatus::Failed
        )
    }
}

impl std::fmt::Display for AcquisitionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ephemeral per-scene acquisition record.
///
/// Exists only for the duration of an orchestrator run; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadJob {
    pub scene_id: SceneId,
    pub keyword: String,
    pub tier: MediaTier,
    pub status: AcquisitionStatus,
    pub progress_percent: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DownloadJob {
    pub fn new(scene_id: SceneId, keyword: impl Into<String>) -> Self {
        Self {
            scene_id,
            keyword: keyword.into(),
            tier: MediaTier::Video,
            status: AcquisitionStatus::Queued,
            progress_percent: 0,
            error: None,
        }
    }

    /// Move to a new tier, resetting tier-local progress.
    pub fn enter_tier(&mut self, tier: MediaTier) {
        self.tier = tier;
        self.progress_percent = 0;
    }

    pub fn set_status(&mut self, status: AcquisitionStatus) {
        self.status = status;
    }

    pub fn fail(&mut self, error: impl Into<String>) {
        self.status = AcquisitionStatus::Failed;
        self.error = Some(error.into());
    }
}

/// Progress event for one scene state transition.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    /// Scene being processed
    pub scene_id: SceneId,
    /// Search keyword for the scene
    pub keyword: String,
    /// Current status
    pub status: AcquisitionStatus,
    /// Progress within the scene (0-100)
    pub progress: u8,
    /// Acquisition tier, when one is active
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<MediaTier>,
    /// Completed scene count within the batch
    pub video_index: usize,
    /// Total scenes in the acquisition batch
    pub total_videos: usize,
    /// Installed file name, present on completion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Failure reason, present on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Estimated seconds remaining for the batch, once samples exist
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eta_seconds: Option<u64>,
    /// Event timestamp
    pub timestamp: DateTime<Utc>,
}

impl ProgressUpdate {
    fn base(
        scene_id: SceneId,
        keyword: impl Into<String>,
        status: AcquisitionStatus,
        progress: u8,
    ) -> Self {
        Self {
            scene_id,
            keyword: keyword.into(),
            status,
            progress: progress.min(100),
            media_type: None,
            video_index: 0,
            total_videos: 0,
            filename: None,
            error: None,
            eta_seconds: None,
            timestamp: Utc::now(),
        }
    }

    /// Scene queued for acquisition.
    pub fn queued(scene_id: SceneId, keyword: impl Into<String>) -> Self {
        Self::base(scene_id, keyword, AcquisitionStatus::Queued, 0)
    }

    /// Searching a stock provider tier.
    pub fn searching(scene_id: SceneId, keyword: impl Into<String>, tier: MediaTier) -> Self {
        let mut update = Self::base(scene_id, keyword, AcquisitionStatus::Searching, 10);
        update.media_type = Some(tier);
        update
    }

    /// Downloading a candidate.
    pub fn downloading(scene_id: SceneId, keyword: impl Into<String>, tier: MediaTier) -> Self {
        let mut update = Self::base(scene_id, keyword, AcquisitionStatus::Downloading, 50);
        update.media_type = Some(tier);
        update
    }

    /// Waiting on AI generation.
    pub fn generating(scene_id: SceneId, keyword: impl Into<String>) -> Self {
        let mut update = Self::base(scene_id, keyword, AcquisitionStatus::Generating, 50);
        update.media_type = Some(MediaTier::Ai);
        update
    }

    /// Scene bound to a new asset.
    pub fn completed(
        scene_id: SceneId,
        keyword: impl Into<String>,
        tier: MediaTier,
        filename: impl Into<String>,
    ) -> Self {
        let mut update = Self::base(scene_id, keyword, AcquisitionStatus::Completed, 100);
        update.media_type = Some(tier);
        update.filename = Some(filename.into());
        update
    }

    /// All tiers exhausted for the scene.
    pub fn failed(scene_id: SceneId, keyword: impl Into<String>, error: impl Into<String>) -> Self {
        let mut update = Self::base(scene_id, keyword, AcquisitionStatus::Failed, 100);
        update.error = Some(error.into());
        update
    }

    /// Attach batch position (builder style).
    pub fn with_batch_position(mut self, video_index: usize, total_videos: usize) -> Self {
        self.video_index = video_index;
        self.total_videos = total_videos;
        self
    }

    /// Attach an ETA estimate (builder style).
    pub fn with_eta(mut self, eta_seconds: Option<u64>) -> Self {
        self.eta_seconds = eta_seconds;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_clamped() {
        let update = ProgressUpdate::base(
            SceneId::from_string("s1"),
            "sunset",
            AcquisitionStatus::Downloading,
            150,
        );
        assert_eq!(update.progress, 100);
    }

    #[test]
    fn test_serialization_camel_case() {
        let update = ProgressUpdate::completed(
            SceneId::from_string("s1"),
            "sunset",
            MediaTier::Photo,
            "s1_sunset_abc123.jpg",
        )
        .with_batch_position(3, 5);
        let json = serde_json::to_string(&update).unwrap();
        assert!(json.contains("\"sceneId\":\"s1\""));
        assert!(json.contains("\"status\":\"completed\""));
        assert!(json.contains("\"mediaType\":\"photo\""));
        assert!(json.contains("\"videoIndex\":3"));
        assert!(json.contains("\"totalVideos\":5"));
    }

    #[test]
    fn test_failed_carries_error() {
        let update =
            ProgressUpdate::failed(SceneId::from_string("s1"), "sunset", "all tiers exhausted");
        assert_eq!(update.status, AcquisitionStatus::Failed);
        assert!(update.status.is_terminal());
        assert_eq!(update.error.as_deref(), Some("all tiers exhausted"));
    }

    #[test]
    fn test_download_job_tier_transition() {
        let mut job = DownloadJob::new(SceneId::from_string("s1"), "sunset");
        assert_eq!(job.status, AcquisitionStatus::Queued);

        job.set_status(AcquisitionStatus::Downloading);
        job.progress_percent = 70;
        job.enter_tier(MediaTier::Photo);
        assert_eq!(job.tier, MediaTier::Photo);
        assert_eq!(job.progress_percent, 0);

        job.fail("no results");
        assert_eq!(job.status, AcquisitionStatus::Failed);
    }
}
