//! Job orchestrator.
//!
//! Runs the full assignment flow for a scene document: synchronous
//! matching against the local media library first, then the acquisition
//! waterfall for every scene still unassigned, with a bounded worker
//! pool. The orchestrator returns `Err` only for contract violations and
//! an unusable media root; provider failures surface per scene in the
//! run summary.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use reel_match::assign;
use reel_models::{
    Asset, AssignmentOptions, DownloadConstraints, MediaTier, MediaType, ProgressUpdate,
    ProviderKind, RunSummary, Scene,
};

use crate::acquire::{acquire_scene, AcquireCtx, ProviderSet, SceneOutcome};
use crate::config::PipelineConfig;
use crate::error::PipelineResult;
use crate::library::MediaLibrary;
use crate::progress::{EtaTracker, ProgressSink};

/// Result of a full orchestrator run.
#[derive(Debug)]
pub struct RunOutcome {
    /// Scenes with all successful assignments applied
    pub scenes: Vec<Scene>,
    pub summary: RunSummary,
}

pub struct Orchestrator {
    config: PipelineConfig,
    providers: ProviderSet,
    progress: ProgressSink,
}

impl Orchestrator {
    pub fn new(config: PipelineConfig, providers: ProviderSet) -> Self {
        Self {
            config,
            providers,
            progress: ProgressSink::disabled(),
        }
    }

    /// Attach a progress sink (builder style).
    pub fn with_progress(mut self, progress: ProgressSink) -> Self {
        self.progress = progress;
        self
    }

    /// Run matching and acquisition over `scenes`.
    ///
    /// Cancelling `cancel` stops the run at the next safe point: scenes
    /// already completed keep their assignments, in-flight transfers are
    /// aborted and their partial files removed, and the summary is
    /// marked cancelled. Cancellation is not an error.
    pub async fn run(
        &self,
        scenes: &[Scene],
        options: &AssignmentOptions,
        constraints: &DownloadConstraints,
        cancel: CancellationToken,
    ) -> PipelineResult<RunOutcome> {
        self.config.validate()?;
        constraints.validate()?;

        let library = MediaLibrary::new(&self.config.media_root);
        library.ensure_dirs().await?;
        let local_assets = library.scan().await?;

        let matched = assign(scenes, &local_assets, options)?;
        let mut scenes = matched.scenes;

        let pending: Vec<usize> = scenes
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_assignable() && !s.has_asset())
            .map(|(idx, _)| idx)
            .collect();

        info!(
            total = scenes.len(),
            matched = matched.stats.assigned_count,
            pending = pending.len(),
            "Matching complete, starting acquisition"
        );

        let mut summary = RunSummary {
            total: scenes.len(),
            ..Default::default()
        };
        summary.absorb_match_stats(&matched.stats);

        if pending.is_empty() {
            summary.success = scenes.iter().filter(|s| s.has_asset()).count();
            return Ok(RunOutcome { scenes, summary });
        }

        let total = pending.len();
        let ctx = Arc::new(AcquireCtx {
            providers: self.providers.clone(),
            constraints: constraints.clone(),
            library,
            progress: self.progress.clone(),
            cancel: cancel.clone(),
            tiers: self.config.tiers.clone(),
            search_timeout: self.config.search_timeout,
            transfer_timeout: self.config.transfer_timeout,
            completed: AtomicUsize::new(0),
            total,
        });
        let eta = Arc::new(Mutex::new(EtaTracker::new(
            total,
            self.config.max_parallel_scenes,
        )));
        let pool = Arc::new(Semaphore::new(self.config.max_parallel_scenes));

        for &idx in &pending {
            self.progress.emit(
                ProgressUpdate::queued(scenes[idx].id.clone(), scenes[idx].search_term())
                    .with_batch_position(0, total),
            );
        }

        let mut tasks: JoinSet<(usize, SceneOutcome)> = JoinSet::new();
        for &idx in &pending {
            let ctx = Arc::clone(&ctx);
            let eta = Arc::clone(&eta);
            let pool = Arc::clone(&pool);
            let scene = scenes[idx].clone();

            tasks.spawn(async move {
                // Queued scenes must not start new work once cancelled.
                let _permit = tokio::select! {
                    _ = ctx.cancel.cancelled() => return (idx, SceneOutcome::Cancelled),
                    permit = pool.acquire_owned() => match permit {
                        Ok(permit) => permit,
                        Err(_) => return (idx, SceneOutcome::Cancelled),
                    },
                };

                let started = Instant::now();
                let outcome = acquire_scene(&ctx, &scene).await;

                match &outcome {
                    SceneOutcome::Acquired(asset) => {
                        let done = ctx.completed.fetch_add(1, Ordering::SeqCst) + 1;
                        let eta_secs = {
                            let mut tracker = eta.lock().await;
                            tracker.record(started.elapsed());
                            tracker.estimate()
                        };
                        let filename = asset
                            .path
                            .file_name()
                            .map(|n| n.to_string_lossy().into_owned())
                            .unwrap_or_default();
                        ctx.progress.emit(
                            ProgressUpdate::completed(
                                scene.id.clone(),
                                scene.search_term(),
                                tier_for_asset(asset),
                                filename,
                            )
                            .with_batch_position(done, ctx.total)
                            .with_eta(eta_secs),
                        );
                    }
                    SceneOutcome::Failed(reason) => {
                        let done = ctx.completed.fetch_add(1, Ordering::SeqCst) + 1;
                        let eta_secs = {
                            let mut tracker = eta.lock().await;
                            tracker.record(started.elapsed());
                            tracker.estimate()
                        };
                        ctx.progress.emit(
                            ProgressUpdate::failed(
                                scene.id.clone(),
                                scene.search_term(),
                                reason.as_str(),
                            )
                                .with_batch_position(done, ctx.total)
                                .with_eta(eta_secs),
                        );
                    }
                    SceneOutcome::Cancelled => {}
                }

                (idx, outcome)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            let (idx, outcome) = match joined {
                Ok(pair) => pair,
                Err(e) => {
                    error!(error = %e, "Acquisition task aborted");
                    continue;
                }
            };
            match outcome {
                SceneOutcome::Acquired(asset) => {
                    summary.record_acquired(&asset.provider);
                    scenes[idx].asset = Some(asset);
                }
                SceneOutcome::Failed(reason) => {
                    warn!(
                        scene_id = %scenes[idx].id,
                        reason = %reason,
                        "Scene acquisition failed"
                    );
                    summary.failed.push(scenes[idx].id.clone());
                }
                SceneOutcome::Cancelled => {
                    summary.cancelled = true;
                }
            }
        }

        summary.cancelled = summary.cancelled || cancel.is_cancelled();
        summary.success = scenes.iter().filter(|s| s.has_asset()).count();

        info!(
            success = summary.success,
            failed = summary.failed.len(),
            cancelled = summary.cancelled,
            "Run finished"
        );

        Ok(RunOutcome { scenes, summary })
    }
}

/// Waterfall tier an installed asset came from, for the completion event.
fn tier_for_asset(asset: &Asset) -> MediaTier {
    match (asset.media_type, &asset.provider) {
        (MediaType::Video, _) => MediaTier::Video,
        (MediaType::Image, ProviderKind::Ai) => MediaTier::Ai,
        (MediaType::Image, _) => MediaTier::Photo,
    }
}
