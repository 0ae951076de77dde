//! The catalog entry type shared by the fetcher, the feed controller and the
//! card renderer.
//!
//! `Video` is the normalised form of one element of the API's `items` array.
//! The wire structs in [`super::youtube`] are converted into it as soon as a
//! response has been parsed, so nothing downstream depends on the JSON shape.

use chrono::{DateTime, Utc};

/// Prefix of the public watch page for a video id.
const WATCH_URL: &str = "https://www.youtube.com/watch?v=";

/// One trending video.
///
/// Immutable once fetched.  The controller keeps the whole result set for
/// the lifetime of the session and only ever reads from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Video {
    /// Catalog identifier.
    pub id: String,

    /// Video title.
    pub title: String,

    /// Name of the uploading channel.
    pub channel_title: String,

    /// URL of the high-resolution thumbnail.
    pub thumbnail_url: String,

    /// Total views.
    pub view_count: u64,

    /// Upload time, when the API reports one.
    pub published_at: Option<DateTime<Utc>>,
}

impl Video {
    /// Public page where the video can be watched.
    pub fn watch_url(&self) -> String {
        format!("{WATCH_URL}{}", self.id)
    }
}
