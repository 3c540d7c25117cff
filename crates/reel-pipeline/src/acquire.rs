//! Per-scene acquisition waterfall.
//!
//! Walks the configured tier list in order for one scene: stock video,
//! stock photo, then AI generation. A tier whose provider is missing or
//! whose prerequisites are unmet is skipped; a tier that was genuinely
//! attempted and failed is abandoned and the next tier runs. There is no
//! backtracking to an earlier tier.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use reel_models::{
    AcquisitionStatus, Asset, DownloadConstraints, DownloadJob, MediaTier, MediaType,
    ProgressUpdate, Scene,
};
use reel_providers::{
    partial_path, validate_candidate, ImageGenerator, MediaProvider, ProviderError,
    ProviderResult,
};

use crate::library::MediaLibrary;
use crate::progress::ProgressSink;
use crate::retry::{retry_provider_call, RetryPolicy};

/// Providers backing the waterfall tiers. Any tier may be absent; absent
/// tiers are skipped, not failed.
#[derive(Clone, Default)]
pub struct ProviderSet {
    pub video: Option<Arc<dyn MediaProvider>>,
    pub photo: Option<Arc<dyn MediaProvider>>,
    pub generator: Option<Arc<dyn ImageGenerator>>,
}

impl ProviderSet {
    pub fn with_video(mut self, provider: Arc<dyn MediaProvider>) -> Self {
        self.video = Some(provider);
        self
    }

    pub fn with_photo(mut self, provider: Arc<dyn MediaProvider>) -> Self {
        self.photo = Some(provider);
        self
    }

    pub fn with_generator(mut self, generator: Arc<dyn ImageGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }
}

/// Terminal result of one scene's acquisition.
#[derive(Debug)]
pub enum SceneOutcome {
    /// An asset was installed and is ready to bind
    Acquired(Asset),
    /// Every tier was skipped or abandoned
    Failed(String),
    /// The run was cancelled before this scene finished
    Cancelled,
}

/// Outcome of one tier attempt.
enum TierResult {
    Acquired(Asset),
    /// Tier attempted and exhausted; the waterfall moves on
    Abandoned(String),
    /// Tier prerequisites unmet; not counted as a failure
    Skipped(String),
    Cancelled,
}

/// Shared context for the acquisition workers of one run.
pub(crate) struct AcquireCtx {
    pub providers: ProviderSet,
    pub constraints: DownloadConstraints,
    pub library: MediaLibrary,
    pub progress: ProgressSink,
    pub cancel: CancellationToken,
    pub tiers: Vec<MediaTier>,
    pub search_timeout: Duration,
    pub transfer_timeout: Duration,
    /// Scenes finished so far, for batch position on events
    pub completed: AtomicUsize,
    /// Scenes in the acquisition batch
    pub total: usize,
}

impl AcquireCtx {
    fn emit(&self, update: ProgressUpdate) {
        let done = self.completed.load(Ordering::Relaxed);
        self.progress.emit(update.with_batch_position(done, self.total));
    }
}

/// Drive the waterfall for one scene.
///
/// A `DownloadJob` records the scene's tier and status for the duration
/// of the attempt; it is dropped with the outcome and never persisted.
/// Cancellation is honored at tier boundaries and while any provider
/// call is in flight; a cancelled scene never reports `Failed`.
pub(crate) async fn acquire_scene(ctx: &AcquireCtx, scene: &Scene) -> SceneOutcome {
    let mut job = DownloadJob::new(scene.id.clone(), scene.search_term());
    let mut last_error = String::from("no acquisition tiers configured");

    for &tier in &ctx.tiers {
        if ctx.cancel.is_cancelled() {
            return SceneOutcome::Cancelled;
        }
        job.enter_tier(tier);
        match run_tier(ctx, scene, &mut job).await {
            TierResult::Acquired(asset) => {
                job.set_status(AcquisitionStatus::Completed);
                job.progress_percent = 100;
                info!(
                    scene_id = %job.scene_id,
                    tier = %job.tier,
                    path = %asset.path.display(),
                    "Acquired media for scene"
                );
                return SceneOutcome::Acquired(asset);
            }
            TierResult::Skipped(reason) => {
                debug!(scene_id = %scene.id, tier = %tier, reason = %reason, "Tier skipped");
                last_error = reason;
            }
            TierResult::Abandoned(reason) => {
                warn!(scene_id = %scene.id, tier = %tier, reason = %reason, "Tier abandoned");
                last_error = reason;
            }
            TierResult::Cancelled => return SceneOutcome::Cancelled,
        }
    }

    job.fail(last_error);
    warn!(
        scene_id = %job.scene_id,
        keyword = %job.keyword,
        "All acquisition tiers exhausted"
    );
    SceneOutcome::Failed(job.error.unwrap_or_default())
}

async fn run_tier(ctx: &AcquireCtx, scene: &Scene, job: &mut DownloadJob) -> TierResult {
    match job.tier {
        MediaTier::Video => stock_tier(ctx, scene, job, ctx.providers.video.as_deref()).await,
        MediaTier::Photo => stock_tier(ctx, scene, job, ctx.providers.photo.as_deref()).await,
        MediaTier::Ai => ai_tier(ctx, scene, job).await,
    }
}

/// Search a stock provider and try the top candidates in order.
///
/// Constraint violations move straight to the next candidate; only
/// transient download failures consume the per-candidate retry budget.
async fn stock_tier(
    ctx: &AcquireCtx,
    scene: &Scene,
    job: &mut DownloadJob,
    provider: Option<&dyn MediaProvider>,
) -> TierResult {
    let tier = job.tier;
    let Some(provider) = provider else {
        return TierResult::Skipped(format!("no {tier} provider configured"));
    };
    if !scene.has_keyword() {
        return TierResult::Skipped("scene has no search keyword".to_string());
    }
    let keyword = scene.search_term().to_string();

    job.set_status(AcquisitionStatus::Searching);
    debug!(
        scene_id = %scene.id,
        provider = %provider.kind(),
        keyword = %keyword,
        "Searching stock provider"
    );
    ctx.emit(ProgressUpdate::searching(scene.id.clone(), &keyword, tier));

    let policy = RetryPolicy::new(ctx.constraints.retries_per_candidate);
    let search = retry_provider_call(&policy, "search", || {
        with_timeout(ctx.search_timeout, provider.search(&keyword, &ctx.constraints))
    });
    let candidates = tokio::select! {
        _ = ctx.cancel.cancelled() => return TierResult::Cancelled,
        result = search => match result {
            Ok(candidates) => candidates,
            Err(e) if e.is_tier_skip() => return TierResult::Skipped(e.to_string()),
            Err(e) => return TierResult::Abandoned(format!("search failed: {e}")),
        },
    };

    if candidates.is_empty() {
        return TierResult::Abandoned(format!("no {tier} results for {keyword:?}"));
    }

    let mut last_error = String::new();
    for candidate in candidates.iter().take(ctx.constraints.candidates_per_tier) {
        if ctx.cancel.is_cancelled() {
            return TierResult::Cancelled;
        }
        if let Err(e) = validate_candidate(candidate, &ctx.constraints) {
            debug!(
                scene_id = %scene.id,
                candidate = %candidate.id,
                reason = %e,
                "Candidate rejected"
            );
            last_error = e.to_string();
            continue;
        }

        job.set_status(AcquisitionStatus::Downloading);
        ctx.emit(ProgressUpdate::downloading(scene.id.clone(), &keyword, tier));
        let dest = ctx.library.dest_path(
            &scene.id,
            &keyword,
            candidate.media_type,
            candidate.file_ext(),
        );

        let fetch = retry_provider_call(&policy, "fetch", || {
            with_timeout(
                ctx.transfer_timeout,
                provider.fetch(candidate, &ctx.constraints, &dest),
            )
        });
        let result = tokio::select! {
            _ = ctx.cancel.cancelled() => {
                sweep_partial(&dest).await;
                return TierResult::Cancelled;
            }
            result = fetch => result,
        };

        match result {
            Ok(asset) => return TierResult::Acquired(asset),
            Err(e) => {
                sweep_partial(&dest).await;
                if e.is_tier_skip() {
                    return TierResult::Skipped(e.to_string());
                }
                last_error = e.to_string();
            }
        }
    }

    TierResult::Abandoned(format!("all {tier} candidates failed: {last_error}"))
}

/// Terminal fallback: generate an image from the scene's search term.
///
/// Unlike the stock tiers this tier runs even without an extracted
/// keyword, falling back to the scene text as the prompt.
async fn ai_tier(ctx: &AcquireCtx, scene: &Scene, job: &mut DownloadJob) -> TierResult {
    let Some(generator) = ctx.providers.generator.as_deref() else {
        return TierResult::Skipped("no image generator configured".to_string());
    };
    let prompt = scene.search_term().to_string();
    if prompt.trim().is_empty() {
        return TierResult::Skipped("scene has no usable prompt".to_string());
    }

    job.set_status(AcquisitionStatus::Generating);
    ctx.emit(ProgressUpdate::generating(scene.id.clone(), &prompt));
    let dest = ctx
        .library
        .dest_path(&scene.id, &prompt, MediaType::Image, "png");

    let policy = RetryPolicy::new(ctx.constraints.retries_per_candidate);
    let generate = retry_provider_call(&policy, "generate", || {
        with_timeout(ctx.transfer_timeout, generator.generate(&prompt, &dest))
    });
    let result = tokio::select! {
        _ = ctx.cancel.cancelled() => {
            sweep_partial(&dest).await;
            return TierResult::Cancelled;
        }
        result = generate => result,
    };

    match result {
        Ok(asset) => TierResult::Acquired(asset),
        Err(e) => {
            sweep_partial(&dest).await;
            if e.is_tier_skip() {
                TierResult::Skipped(e.to_string())
            } else {
                TierResult::Abandoned(format!("generation failed: {e}"))
            }
        }
    }
}

async fn with_timeout<T>(
    budget: Duration,
    fut: impl std::future::Future<Output = ProviderResult<T>>,
) -> ProviderResult<T> {
    match tokio::time::timeout(budget, fut).await {
        Ok(result) => result,
        Err(_) => Err(ProviderError::Timeout(budget)),
    }
}

/// Remove any file an aborted transfer may have left behind.
async fn sweep_partial(dest: &Path) {
    tokio::fs::remove_file(partial_path(dest)).await.ok();
    tokio::fs::remove_file(dest).await.ok();
}
