//! Run statistics.
//!
//! Returned alongside the mutated scenes so a caller can render a summary
//! without re-deriving it.

use std::collections::HashMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::asset::ProviderKind;
use crate::scene::SceneId;

/// Statistics for a synchronous matching run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentStats {
    /// Total scenes examined
    pub total_scenes: usize,
    /// Scenes assigned during this run
    pub assigned_count: usize,
    /// Scenes still lacking an asset after the run
    pub missing_count: usize,
    /// Assignments grouped by asset provider
    pub by_provider: HashMap<ProviderKind, usize>,
}

impl AssignmentStats {
    /// Record one assignment from the given provider.
    pub fn record(&mut self, provider: &ProviderKind) {
        self.assigned_count += 1;
        *self.by_provider.entry(provider.clone()).or_insert(0) += 1;
    }
}

/// Summary of a full orchestrator run (matching plus acquisition).
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    /// Scenes holding an asset after the run
    pub success: usize,
    /// Total scenes in the document
    pub total: usize,
    /// Scenes whose acquisition exhausted every tier
    pub failed: Vec<SceneId>,
    /// Whether the run was cancelled before completing
    pub cancelled: bool,
    /// Assignments grouped by provider, across matching and acquisition
    pub by_provider: HashMap<ProviderKind, usize>,
}

impl RunSummary {
    /// Record one acquisition success from the given provider.
    pub fn record_acquired(&mut self, provider: &ProviderKind) {
        *self.by_provider.entry(provider.clone()).or_insert(0) += 1;
    }

    /// Fold matching-phase provider counts into the summary.
    pub fn absorb_match_stats(&mut self, stats: &AssignmentStats) {
        for (provider, count) in &stats.by_provider {
            *self.by_provider.entry(provider.clone()).or_insert(0) += count;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_record() {
        let mut stats = AssignmentStats::default();
        stats.record(&ProviderKind::Local);
        stats.record(&ProviderKind::Local);
        stats.record(&ProviderKind::Ai);
        assert_eq!(stats.assigned_count, 3);
        assert_eq!(stats.by_provider[&ProviderKind::Local], 2);
        assert_eq!(stats.by_provider[&ProviderKind::Ai], 1);
    }

    #[test]
    fn test_summary_absorbs_match_stats() {
        let mut stats = AssignmentStats::default();
        stats.record(&ProviderKind::Local);

        let mut summary = RunSummary::default();
        summary.record_acquired(&ProviderKind::Pexels);
        summary.absorb_match_stats(&stats);

        assert_eq!(summary.by_provider[&ProviderKind::Local], 1);
        assert_eq!(summary.by_provider[&ProviderKind::Pexels], 1);
    }
}
