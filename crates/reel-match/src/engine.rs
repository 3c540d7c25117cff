//! Assignment engine.

use thiserror::Error;
use tracing::debug;

use reel_models::{Asset, AssignmentOptions, AssignmentStats, OptionsError, Scene};

use crate::score::score_pair;

pub type MatchResult<T> = Result<T, MatchError>;

/// Hard errors from a matching run. Only programming-contract violations
/// land here; an unmatchable scene is not an error.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("invalid options: {0}")]
    InvalidOptions(#[from] OptionsError),
}

/// Result of a matching run: the scenes with assignments applied, plus
/// summary statistics.
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    pub scenes: Vec<Scene>,
    pub stats: AssignmentStats,
}

/// Assign the best unused local asset to every candidate scene.
///
/// Pure and deterministic: scenes are walked in document order (`start`
/// ascending), score ties break by asset insertion order, and the
/// positional fallback consumes assets in pool order. Re-running with
/// `empty_only = true` against an unchanged pool is a no-op.
pub fn assign(
    scenes: &[Scene],
    assets: &[Asset],
    opts: &AssignmentOptions,
) -> MatchResult<MatchOutcome> {
    opts.validate()?;

    let mut scenes: Vec<Scene> = scenes.to_vec();
    let mut stats = AssignmentStats {
        total_scenes: scenes.len(),
        ..Default::default()
    };

    // Document order by start time; stable so equal starts keep input order.
    let mut order: Vec<usize> = (0..scenes.len()).collect();
    order.sort_by(|&a, &b| {
        scenes[a]
            .start
            .partial_cmp(&scenes[b].start)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    // Pool indices consumed in this run. Irrelevant when duplicates are
    // allowed, in which case the same asset may win repeatedly on score.
    let mut used = vec![false; assets.len()];
    // Cursor for the positional fallback; advances monotonically so
    // repeated runs pair scenes and assets identically.
    let mut order_cursor = 0usize;

    for &scene_idx in &order {
        if !is_candidate(&scenes[scene_idx], opts) {
            continue;
        }

        let picked = pick_by_keywords(&scenes[scene_idx], assets, &used, opts)
            .or_else(|| pick_by_order(assets, &used, &mut order_cursor, opts));

        if let Some(asset_idx) = picked {
            let asset = assets[asset_idx].clone();
            debug!(
                scene_id = %scenes[scene_idx].id,
                asset = %asset.path.display(),
                provider = %asset.provider,
                "Assigned local asset"
            );
            stats.record(&asset.provider);
            scenes[scene_idx].asset = Some(asset);
            if !opts.allow_duplicates {
                used[asset_idx] = true;
            }
        }
    }

    stats.missing_count = scenes.iter().filter(|s| !s.has_asset()).count();

    Ok(MatchOutcome { scenes, stats })
}

/// Whether a scene participates in this run.
fn is_candidate(scene: &Scene, opts: &AssignmentOptions) -> bool {
    if !scene.is_assignable() {
        return false;
    }
    if scene.has_asset() {
        // An occupied scene is only revisited when the caller both widens
        // the candidate set and permits replacement.
        return !opts.empty_only && opts.overwrite;
    }
    true
}

/// Highest-scoring eligible asset clearing the minimum score, if any.
fn pick_by_keywords(
    scene: &Scene,
    assets: &[Asset],
    used: &[bool],
    opts: &AssignmentOptions,
) -> Option<usize> {
    if !opts.by_keywords {
        return None;
    }

    let mut best: Option<(usize, f64)> = None;
    for (idx, asset) in assets.iter().enumerate() {
        if !opts.allow_duplicates && used[idx] {
            continue;
        }
        let score = score_pair(scene, asset);
        if score < opts.min_score || score == 0.0 {
            continue;
        }
        // Strict greater-than keeps the earliest asset on ties.
        if best.map(|(_, s)| score > s).unwrap_or(true) {
            best = Some((idx, score));
        }
    }
    best.map(|(idx, _)| idx)
}

/// Next unused asset in pool order.
fn pick_by_order(
    assets: &[Asset],
    used: &[bool],
    cursor: &mut usize,
    opts: &AssignmentOptions,
) -> Option<usize> {
    if !opts.by_order {
        return None;
    }
    while *cursor < assets.len() {
        let idx = *cursor;
        *cursor += 1;
        if opts.allow_duplicates || !used[idx] {
            return Some(idx);
        }
    }
    None
}
