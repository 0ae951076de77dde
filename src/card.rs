//! Video cards: the displayable form of a [`Video`].
//!
//! Rendering is pure and stateless.  The feed controller calls [`render`] for
//! each revealed video and appends the result to the display surface; the
//! terminal layer only decides how a [`VideoCard`] is laid out.

use crate::source::Video;

/// Everything the feed list shows for one video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoCard {
    pub thumbnail_url: String,
    pub title: String,
    pub channel: String,
    /// Abbreviated view count, e.g. `"1.2M views"`.
    pub views: String,
    /// Upload date, or empty when unknown.
    pub published: String,
    pub link: String,
}

pub fn render(video: &Video) -> VideoCard {
    VideoCard {
        thumbnail_url: video.thumbnail_url.clone(),
        title: video.title.clone(),
        channel: video.channel_title.clone(),
        views: format!("{} views", format_count(video.view_count)),
        published: video
            .published_at
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        link: video.watch_url(),
    }
}

/// Abbreviate a count: `1234567` → `"1.2M"`, `12345` → `"12.3K"`, `999` →
/// `"999"`.
///
/// The thresholds are applied to the integer, so `999_999` stays in the
/// thousands and prints as `"1000.0K"`.
pub fn format_count(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{}M", to_fixed_one(n as f64 / 1_000_000.0))
    } else if n >= 1_000 {
        format!("{}K", to_fixed_one(n as f64 / 1_000.0))
    } else {
        n.to_string()
    }
}

/// One decimal place of the exact binary value, with exact ties rounded up.
///
/// `{:.1}` already formats the exact value of the `f64` (so `1.15`, stored as
/// `1.1499…`, prints `1.1`) but breaks exact ties towards even.  Exact ties at
/// one decimal are the quarter values, which are representable, so they are
/// detected and rounded up explicitly.
fn to_fixed_one(value: f64) -> String {
    let quarter = (value * 4.0).fract() == 0.0 && (value * 2.0).fract() != 0.0;
    if quarter {
        format!("{:.1}", (value * 10.0).ceil() / 10.0)
    } else {
        format!("{value:.1}")
    }
}
