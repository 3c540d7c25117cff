//! Acquisition pipeline and job orchestrator.
//!
//! When the matching engine leaves scenes unassigned, this crate drives
//! a tiered provider waterfall per scene (stock video, stock photo, AI
//! image generation) with bounded parallelism, per-transition progress
//! events, ETA estimation and cooperative cancellation.
//!
//! The entry point is [`Orchestrator::run`].

mod acquire;
mod config;
mod error;
mod library;
mod orchestrator;
mod progress;
mod retry;

pub use acquire::{ProviderSet, SceneOutcome};
pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
pub use library::MediaLibrary;
pub use orchestrator::{Orchestrator, RunOutcome};
pub use progress::{EtaTracker, ProgressSink};
