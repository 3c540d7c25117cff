//! Provider clients for the acquisition pipeline.
//!
//! Each tier of the waterfall is served by one client behind a uniform
//! contract: stock providers implement [`MediaProvider`] (`search` +
//! `fetch`), the AI tier implements [`ImageGenerator`] (`generate`).
//! The pipeline depends only on these traits, never on a provider's
//! concrete API shape.

pub mod ai;
mod download;
pub mod error;
pub mod pexels;
pub mod pixabay;
mod traits;
pub mod types;

pub use ai::AiImageClient;
pub use download::{download_to_file, partial_path};
pub use error::{ProviderError, ProviderResult};
pub use pexels::PexelsClient;
pub use pixabay::PixabayClient;
pub use traits::{ImageGenerator, MediaProvider};
pub use types::{validate_candidate, Candidate};
