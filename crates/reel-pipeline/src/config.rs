//! Pipeline configuration.

use std::path::PathBuf;
use std::time::Duration;

use reel_models::MediaTier;

use crate::error::{PipelineError, PipelineResult};

/// Tunables for an orchestrator run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Root of the project media directories (`video/` and `images/`)
    pub media_root: PathBuf,
    /// How many scenes may acquire concurrently
    pub max_parallel_scenes: usize,
    /// Budget for one provider search call
    pub search_timeout: Duration,
    /// Budget for one download or generation call
    pub transfer_timeout: Duration,
    /// Waterfall tiers in the order they are attempted
    pub tiers: Vec<MediaTier>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            media_root: PathBuf::from("."),
            max_parallel_scenes: 2,
            search_timeout: Duration::from_secs(15),
            transfer_timeout: Duration::from_secs(120),
            tiers: vec![MediaTier::Video, MediaTier::Photo, MediaTier::Ai],
        }
    }
}

impl PipelineConfig {
    /// Load configuration from `REELFORGE_*` environment variables,
    /// falling back to defaults for anything unset.
    pub fn from_env() -> PipelineResult<Self> {
        let defaults = Self::default();
        let config = Self {
            media_root: std::env::var("REELFORGE_MEDIA_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.media_root),
            max_parallel_scenes: env_parse(
                "REELFORGE_MAX_PARALLEL_SCENES",
                defaults.max_parallel_scenes,
            )?,
            search_timeout: Duration::from_secs(env_parse(
                "REELFORGE_SEARCH_TIMEOUT_SECS",
                defaults.search_timeout.as_secs(),
            )?),
            transfer_timeout: Duration::from_secs(env_parse(
                "REELFORGE_TRANSFER_TIMEOUT_SECS",
                defaults.transfer_timeout.as_secs(),
            )?),
            tiers: defaults.tiers,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> PipelineResult<()> {
        if self.max_parallel_scenes == 0 {
            return Err(PipelineError::config("maxParallelScenes must be at least 1"));
        }
        if self.tiers.is_empty() {
            return Err(PipelineError::config("tier list must not be empty"));
        }
        Ok(())
    }

    /// Override the tier order (builder style).
    pub fn with_tiers(mut self, tiers: Vec<MediaTier>) -> Self {
        self.tiers = tiers;
        self
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> PipelineResult<T> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| PipelineError::config(format!("{} has invalid value {:?}", key, raw))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(
            config.tiers,
            vec![MediaTier::Video, MediaTier::Photo, MediaTier::Ai]
        );
    }

    #[test]
    fn test_zero_parallelism_rejected() {
        let config = PipelineConfig {
            max_parallel_scenes: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PipelineError::Config(_))
        ));
    }

    #[test]
    fn test_empty_tier_list_rejected() {
        let config = PipelineConfig::default().with_tiers(vec![]);
        assert!(config.validate().is_err());
    }
}
