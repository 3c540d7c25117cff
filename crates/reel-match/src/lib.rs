//! Matching engine: scores (scene, asset) pairs and assigns the best
//! unused local asset per scene under a configurable policy.
//!
//! Pure and synchronous; performs no I/O. Scenes the engine cannot
//! resolve are left unassigned for the acquisition pipeline.

mod engine;
mod score;

pub use engine::{assign, MatchError, MatchOutcome, MatchResult};
pub use score::score_pair;
