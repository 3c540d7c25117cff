//! Assignment policy and download constraint options.
//!
//! These are plain options objects supplied by the caller. Malformed
//! values are the only condition that surfaces as a hard error from the
//! matching engine or the orchestrator; everything network-related is
//! folded into per-scene status instead.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::asset::Resolution;

/// Relative tolerance when comparing aspect ratios.
const ASPECT_TOLERANCE: f64 = 0.05;

/// Errors raised for malformed option values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptionsError {
    #[error("minScore must be within [0, 1], got {0}")]
    MinScoreOutOfRange(f64),

    #[error("candidatesPerTier must be at least 1")]
    NoCandidates,

    #[error("aspectRatio must be positive, got {0}")]
    InvalidAspectRatio(f64),
}

/// Policy for a matching run.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentOptions {
    /// Restrict candidate scenes to those without an asset
    pub empty_only: bool,
    /// Score assets against scene keywords
    pub by_keywords: bool,
    /// Fall back to positional assignment when no keyword match clears
    /// the score threshold
    pub by_order: bool,
    /// Allow replacing an existing assignment
    pub overwrite: bool,
    /// Allow the same asset to be assigned to multiple scenes in one run
    pub allow_duplicates: bool,
    /// Minimum keyword score for an asset to qualify (0..=1)
    pub min_score: f64,
}

impl Default for AssignmentOptions {
    fn default() -> Self {
        Self {
            empty_only: true,
            by_keywords: true,
            by_order: true,
            overwrite: false,
            allow_duplicates: false,
            min_score: 0.2,
        }
    }
}

impl AssignmentOptions {
    /// Validate option values. Malformed options are a programming-contract
    /// violation and propagate as hard errors.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if !(0.0..=1.0).contains(&self.min_score) || self.min_score.is_nan() {
            return Err(OptionsError::MinScoreOutOfRange(self.min_score));
        }
        Ok(())
    }
}

/// User-configured constraints for candidate selection and download.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DownloadConstraints {
    /// Minimum acceptable resolution for a candidate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_resolution: Option<Resolution>,
    /// Maximum file size in bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_file_size_bytes: Option<u64>,
    /// Target aspect ratio (width / height), matched within tolerance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<f64>,
    /// How many top search candidates to try before abandoning a tier
    pub candidates_per_tier: usize,
    /// How many retries a single candidate download gets before moving on
    pub retries_per_candidate: u32,
}

impl Default for DownloadConstraints {
    fn default() -> Self {
        Self {
            min_resolution: None,
            max_file_size_bytes: None,
            aspect_ratio: None,
            candidates_per_tier: 2,
            retries_per_candidate: 1,
        }
    }
}

impl DownloadConstraints {
    /// Validate constraint values.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.candidates_per_tier == 0 {
            return Err(OptionsError::NoCandidates);
        }
        if let Some(aspect) = self.aspect_ratio {
            if !(aspect > 0.0) || aspect.is_nan() {
                return Err(OptionsError::InvalidAspectRatio(aspect));
            }
        }
        Ok(())
    }

    /// Whether a candidate's aspect ratio is acceptable.
    pub fn aspect_matches(&self, resolution: &Resolution) -> bool {
        match self.aspect_ratio {
            Some(target) => {
                let actual = resolution.aspect_ratio();
                (actual - target).abs() <= target * ASPECT_TOLERANCE
            }
            None => true,
        }
    }

    /// Whether a known file size is within the configured cap.
    pub fn size_within_limit(&self, size_bytes: u64) -> bool {
        match self.max_file_size_bytes {
            Some(max) => size_bytes <= max,
            None => true,
        }
    }
}
