//! Pipeline error types.
//!
//! Hard errors are reserved for contract violations and environment
//! faults (bad options, unreachable media root). A scene that exhausts
//! every acquisition tier is reported through its per-scene status and
//! the run summary, never as an `Err` from the orchestrator.

use thiserror::Error;

use reel_match::MatchError;
use reel_models::OptionsError;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid options: {0}")]
    InvalidOptions(#[from] OptionsError),

    #[error("matching failed: {0}")]
    Match(#[from] MatchError),

    #[error("media library error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl PipelineError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
