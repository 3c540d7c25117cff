//! Shared data models for the ReelForge assignment pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Scenes (timed subtitle spans) and their bound media assets
//! - Assignment options, download constraints and run statistics
//! - Acquisition progress events and tier/status enums

pub mod asset;
pub mod options;
pub mod progress;
pub mod scene;
pub mod stats;

// Re-export common types
pub use asset::{Asset, MediaType, ProviderKind, Resolution};
pub use options::{AssignmentOptions, DownloadConstraints, OptionsError};
pub use progress::{AcquisitionStatus, DownloadJob, MediaTier, ProgressUpdate};
pub use scene::{Scene, SceneId};
pub use stats::{AssignmentStats, RunSummary};
