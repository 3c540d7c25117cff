//! Uniform provider contracts.

use std::path::Path;

use async_trait::async_trait;

use reel_models::{Asset, DownloadConstraints, ProviderKind};

use crate::error::ProviderResult;
use crate::types::Candidate;

/// A stock media backend: search for candidates, then fetch one to disk.
///
/// Implementations are independently swappable; the pipeline never sees
/// a provider's concrete response shape.
#[async_trait]
pub trait MediaProvider: Send + Sync {
    /// Provenance tag, stamped on fetched assets and carried into logs.
    fn kind(&self) -> ProviderKind;

    /// Search for candidates matching `query` under `constraints`.
    ///
    /// An empty result set is a normal outcome, not an error.
    async fn search(
        &self,
        query: &str,
        constraints: &DownloadConstraints,
    ) -> ProviderResult<Vec<Candidate>>;

    /// Download a candidate to `dest` and return the installed asset.
    ///
    /// The size cap in `constraints` is enforced mid-stream, which covers
    /// providers that do not report file sizes up front. On failure no
    /// file remains at `dest`.
    async fn fetch(
        &self,
        candidate: &Candidate,
        constraints: &DownloadConstraints,
        dest: &Path,
    ) -> ProviderResult<Asset>;
}

/// The AI image tier: always available unless the generation call itself
/// errors; there is no "no results" outcome.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Generate an image for `prompt`, writing it to `dest`.
    async fn generate(&self, prompt: &str, dest: &Path) -> ProviderResult<Asset>;
}
