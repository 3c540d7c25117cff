//! Scene types.
//!
//! A scene is a timed subtitle span from the generated script. Scenes are
//! created by script/SRT import and must end up bound to a media asset
//! before export.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::asset::Asset;

/// Stable scene identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct SceneId(String);

impl SceneId {
    /// Generate a new random scene ID.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Create a scene ID from an existing string.
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SceneId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SceneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A timed subtitle unit with optional bound media.
///
/// Within a document, scenes are ordered by `start` and never overlap.
/// `end > start` always holds for well-formed scenes.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    /// Stable identifier
    pub id: SceneId,
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds (always greater than `start`)
    pub end: f64,
    /// Source subtitle text (may be empty, which makes the scene
    /// ineligible for assignment)
    #[serde(default)]
    pub text: String,
    /// Short search term derived from `text` by the keyword extractor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    /// Bound media asset, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset: Option<Asset>,
}

impl Scene {
    /// Create a new scene without a keyword or asset.
    pub fn new(id: SceneId, start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            id,
            start,
            end,
            text: text.into(),
            keyword: None,
            asset: None,
        }
    }

    /// Set the extracted keyword (builder style).
    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    /// Scene duration in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Whether the scene is occupied by an asset.
    pub fn has_asset(&self) -> bool {
        self.asset.is_some()
    }

    /// Whether the scene can participate in assignment at all.
    ///
    /// Scenes with empty text are skipped by both matching and acquisition.
    pub fn is_assignable(&self) -> bool {
        !self.text.trim().is_empty()
    }

    /// The term used for keyword search: the extracted keyword when
    /// present, the raw text otherwise.
    pub fn search_term(&self) -> &str {
        match self.keyword.as_deref() {
            Some(kw) if !kw.trim().is_empty() => kw,
            _ => &self.text,
        }
    }

    /// Whether the scene has a usable (non-empty) keyword for provider
    /// search. Without one the video/photo tiers are skipped.
    pub fn has_keyword(&self) -> bool {
        self.keyword
            .as_deref()
            .map(|k| !k.trim().is_empty())
            .unwrap_or(false)
    }
}
