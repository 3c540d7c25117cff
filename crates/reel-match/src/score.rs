//! Lexical token scoring.

use std::collections::HashSet;

use reel_models::{Asset, Scene};

/// Lowercase a string and split it into alphanumeric tokens.
///
/// Underscores, hyphens and any other non-alphanumeric characters act as
/// separators, so `"sunset_beach-4k.mp4"` yields the same tokens as
/// `"Sunset Beach 4k mp4"`.
pub(crate) fn tokenize(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect()
}

/// Jaccard similarity: intersection size over union size.
pub(crate) fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    if intersection == 0 {
        return 0.0;
    }
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}

/// Score an asset against a scene's search terms.
///
/// The scene side uses the extracted keyword when present, the subtitle
/// text otherwise. The asset side combines its provenance keyword with
/// its file name stem, so user-dropped files still match on naming alone.
pub fn score_pair(scene: &Scene, asset: &Asset) -> f64 {
    let scene_tokens = tokenize(scene.search_term());

    let mut asset_tokens = tokenize(asset.file_stem());
    if let Some(keyword) = &asset.keyword {
        asset_tokens.extend(tokenize(keyword));
    }

    jaccard(&scene_tokens, &asset_tokens)
}
