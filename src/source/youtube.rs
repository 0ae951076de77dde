//! YouTube Data API source.
//!
//! Requests the most-popular chart for one region with a single
//! `videos.list` call and converts the response into [`Video`]s.
//!
//! Parsing is split out into [`parse_response`], a pure function over the
//! status code and body text, so tests can exercise every response shape
//! without hitting the network.

use async_trait::async_trait;
use serde::{de, Deserialize, Deserializer};
use tracing::debug;

use super::{Video, VideoSource};
use crate::error::FetchError;

/// Endpoint of the `videos.list` method.
pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3/videos";

/// Resource parts requested for every video.
const PARTS: &str = "snippet,contentDetails,statistics";
/// Chart that yields the trending videos.
const CHART: &str = "mostPopular";
/// Largest page the API hands out.
const MAX_RESULTS: &str = "50";

/// Where and how to reach the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    /// `videos.list` endpoint URL.
    pub base_url: String,
    /// API credential sent as the `key` query parameter.
    pub api_key: String,
    /// ISO 3166-1 alpha-2 region whose chart is requested.
    pub region_code: String,
}

/// The trending chart of the YouTube Data API.
pub struct YouTubeSource {
    client: reqwest::Client,
    config: CatalogConfig,
}

impl YouTubeSource {
    pub fn new(config: CatalogConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, config })
    }

    /// Query string of the one request this source makes.
    fn query(&self) -> [(&'static str, &str); 5] {
        [
            ("part", PARTS),
            ("chart", CHART),
            ("maxResults", MAX_RESULTS),
            ("regionCode", &self.config.region_code),
            ("key", &self.config.api_key),
        ]
    }
}

#[async_trait]
impl VideoSource for YouTubeSource {
    fn name(&self) -> &str {
        "YouTube"
    }

    async fn fetch(&self) -> Result<Vec<Video>, FetchError> {
        debug!(region = %self.config.region_code, "requesting most-popular chart");
        let response = self
            .client
            .get(&self.config.base_url)
            .query(&self.query())
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        let page = parse_response(status, &body)?;
        if let Some(token) = &page.next_page_token {
            debug!(next_page_token = %token, "catalog has further pages; only the first is used");
        }
        Ok(page.videos)
    }
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

/// One parsed page of the chart.
#[derive(Debug, PartialEq, Eq)]
pub struct VideoPage {
    pub videos: Vec<Video>,
    pub next_page_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoListResponse {
    error: Option<ApiError>,
    items: Option<Vec<RawVideo>>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

#[derive(Deserialize)]
struct RawVideo {
    id: String,
    snippet: Snippet,
    statistics: Statistics,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    title: String,
    channel_title: String,
    thumbnails: Thumbnails,
    published_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Deserialize)]
struct Thumbnails {
    high: Thumbnail,
}

#[derive(Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Statistics {
    #[serde(deserialize_with = "count_from_text_or_number")]
    view_count: u64,
}

/// The API encodes counts as decimal strings; accept plain numbers too.
fn count_from_text_or_number<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Number(u64),
        Text(String),
    }

    match Count::deserialize(deserializer)? {
        Count::Number(n) => Ok(n),
        Count::Text(text) => text.trim().parse().map_err(de::Error::custom),
    }
}

impl RawVideo {
    fn into_video(self) -> Video {
        Video {
            id: self.id,
            title: self.snippet.title,
            channel_title: self.snippet.channel_title,
            thumbnail_url: self.snippet.thumbnails.high.url,
            view_count: self.statistics.view_count,
            published_at: self.snippet.published_at,
        }
    }
}

/// Interpret one `videos.list` response.
///
/// An `error` payload wins over the status code.  Missing `items`, or an item
/// lacking its `snippet` or `statistics`, fails the whole page.
pub fn parse_response(status: u16, body: &str) -> Result<VideoPage, FetchError> {
    let success = (200..300).contains(&status);

    let parsed: VideoListResponse = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(_) if !success => return Err(FetchError::Status { status }),
        Err(e) => return Err(FetchError::Malformed(e.to_string())),
    };

    if let Some(error) = parsed.error {
        return Err(FetchError::Upstream(error.message));
    }
    if !success {
        return Err(FetchError::Status { status });
    }

    let items = parsed
        .items
        .ok_or_else(|| FetchError::Malformed("response has no `items` field".into()))?;

    Ok(VideoPage {
        videos: items.into_iter().map(RawVideo::into_video).collect(),
        next_page_token: parsed.next_page_token,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
