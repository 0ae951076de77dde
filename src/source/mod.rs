//! Data source abstraction layer.
//!
//! This module defines the [`VideoSource`] trait and the common [`Video`]
//! type.  The only concrete source is [`YouTubeSource`], which loads the
//! most-popular chart from the YouTube Data API.
//!
//! The feed controller is generic over [`VideoSource`], which is what lets
//! its tests swap the network out for an in-memory fake.

mod video;
mod youtube;

pub use video::Video;
pub use youtube::{CatalogConfig, YouTubeSource, DEFAULT_BASE_URL};

use async_trait::async_trait;

use crate::error::FetchError;

/// Anything that can produce one page of videos.
///
/// [`fetch()`](VideoSource::fetch) is called at most once per load, from a
/// task on the tokio runtime, so implementations must be [`Send`] and
/// [`Sync`].
#[async_trait]
pub trait VideoSource: Send + Sync {
    /// Human-readable label used in log lines.
    fn name(&self) -> &str;

    /// Fetch the result set, in the order the catalog ranks it.
    async fn fetch(&self) -> Result<Vec<Video>, FetchError>;
}
