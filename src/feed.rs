//! The paging state machine behind the feed.
//!
//! [`FeedController`] loads the whole chart with one request, keeps it in
//! memory, and reveals it to the [`DisplaySurface`] in fixed-size batches.
//!
//! ```text
//!            load_all()                      success | failure
//!   Idle ─────────────────► Fetching ──────────────────────────► Idle
//!     ▲                        ▲  │                                │
//!     │   reveal_if_idle()     │  └─ reveal_next_batch() ...       │ cursor >= len
//!     └────────────────────────┘                                   ▼
//!                                                              Exhausted
//! ```
//!
//! The busy flag is the only thing that keeps two triggers (say, a scroll
//! evaluation firing while the initial load is still in flight) from both
//! running.  It is taken through [`BusyGuard`], whose `Drop` releases it and
//! hides the loading indicator on every exit path, including a dropped
//! future.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time;
use tracing::{debug, error, info};

use crate::card::{self, VideoCard};
use crate::error::FetchError;
use crate::source::{Video, VideoSource};

/// Videos revealed per batch unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 6;

/// Pause between a reveal request and the cards appearing.
pub const DEFAULT_REVEAL_DELAY: Duration = Duration::from_millis(800);

/// Tuning knobs of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedSettings {
    /// Videos per batch.  Always at least one.
    pub batch_size: usize,
    /// Pacing delay applied before every batch.
    pub reveal_delay: Duration,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            reveal_delay: DEFAULT_REVEAL_DELAY,
        }
    }
}

/// What the controller is doing, as seen from the outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadingState {
    /// Ready for a load or a reveal.
    Idle,
    /// A load or a scroll-triggered reveal holds the busy flag.
    Fetching,
    /// Every video of the loaded result set has been revealed.
    Exhausted,
}

/// Where revealed cards go.
///
/// Append-only: cards are never removed or reordered.
pub trait DisplaySurface: Send + Sync {
    fn append(&self, card: VideoCard);

    /// Show or hide the loading indicator.
    fn set_loading(&self, active: bool);
}

/// Messages from the feed to the terminal UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedEvent {
    Card(VideoCard),
    Loading(bool),
    /// A load finished; the result set holds this many videos.
    Loaded(usize),
    /// A load failed with this description.
    Failed(String),
}

/// The binary's surface: every update becomes a [`FeedEvent`] for the UI
/// loop.  A closed channel means the UI is gone, so sends are best-effort.
impl DisplaySurface for mpsc::UnboundedSender<FeedEvent> {
    fn append(&self, card: VideoCard) {
        let _ = self.send(FeedEvent::Card(card));
    }

    fn set_loading(&self, active: bool) {
        let _ = self.send(FeedEvent::Loading(active));
    }
}

#[derive(Default)]
struct FeedState {
    /// The result set of the last successful load.
    videos: Vec<Video>,
    /// How many videos have been handed out.  May run past `videos.len()`.
    cursor: usize,
    /// Set by a successful load; a failed load clears it.
    loaded: bool,
    busy: bool,
}

impl FeedState {
    fn drained(&self) -> bool {
        self.cursor >= self.videos.len()
    }

    fn loading_state(&self) -> LoadingState {
        if self.busy {
            LoadingState::Fetching
        } else if self.loaded && self.drained() {
            LoadingState::Exhausted
        } else {
            LoadingState::Idle
        }
    }
}

pub struct FeedController<S> {
    source: S,
    surface: Arc<dyn DisplaySurface>,
    settings: FeedSettings,
    state: Mutex<FeedState>,
}

/// Scoped ownership of the busy flag.
struct BusyGuard<'a> {
    state: &'a Mutex<FeedState>,
    surface: &'a dyn DisplaySurface,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).busy = false;
        self.surface.set_loading(false);
    }
}

impl<S: VideoSource> FeedController<S> {
    pub fn new(source: S, surface: Arc<dyn DisplaySurface>, settings: FeedSettings) -> Self {
        let settings = FeedSettings {
            batch_size: settings.batch_size.max(1),
            ..settings
        };
        Self {
            source,
            surface,
            settings,
            state: Mutex::new(FeedState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, FeedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Take the busy flag if the controller is [`LoadingState::Idle`].
    fn begin(&self) -> Option<BusyGuard<'_>> {
        let mut state = self.state();
        if state.loading_state() != LoadingState::Idle {
            return None;
        }
        state.busy = true;
        Some(BusyGuard {
            state: &self.state,
            surface: self.surface.as_ref(),
        })
    }

    pub fn loading_state(&self) -> LoadingState {
        self.state().loading_state()
    }

    /// Size of the result set.
    pub fn total(&self) -> usize {
        self.state().videos.len()
    }

    /// Number of videos already on the display surface.
    pub fn revealed(&self) -> usize {
        let state = self.state();
        state.cursor.min(state.videos.len())
    }

    /// Fetch the chart and reveal its first batch.
    ///
    /// Does nothing unless the controller is idle.  A failure is logged,
    /// leaves the result set empty, and is returned; nothing is retried.
    pub async fn load_all(&self) -> Result<(), FetchError> {
        let Some(_busy) = self.begin() else {
            debug!("load requested while not idle; ignoring");
            return Ok(());
        };
        self.surface.set_loading(true);
        info!(source = self.source.name(), "fetching trending videos");

        match self.source.fetch().await {
            Ok(videos) => {
                info!(count = videos.len(), "fetched trending videos");
                {
                    let mut state = self.state();
                    state.videos = videos;
                    state.cursor = 0;
                    state.loaded = true;
                }
                self.reveal_next_batch().await;
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "error fetching videos");
                let mut state = self.state();
                state.videos.clear();
                state.cursor = 0;
                state.loaded = false;
                Err(e)
            }
        }
    }

    /// Reveal the next `batch_size` videos after the pacing delay.
    ///
    /// Returns whether videos remain.  Once the cursor has passed the end
    /// this returns `false` immediately and touches nothing but the loading
    /// indicator.
    pub async fn reveal_next_batch(&self) -> bool {
        if self.state().drained() {
            self.surface.set_loading(false);
            return false;
        }

        self.surface.set_loading(true);
        time::sleep(self.settings.reveal_delay).await;

        let (batch, more) = {
            let mut state = self.state();
            let end = (state.cursor + self.settings.batch_size).min(state.videos.len());
            let start = state.cursor.min(end);
            let batch: Vec<VideoCard> = state.videos[start..end].iter().map(card::render).collect();
            state.cursor += self.settings.batch_size;
            (batch, !state.drained())
        };

        debug!(count = batch.len(), more, "revealing batch");
        for card in batch {
            self.surface.append(card);
        }
        self.surface.set_loading(false);
        more
    }

    /// Scroll-triggered reveal.
    ///
    /// Returns `None` when the trigger was ignored because a load or another
    /// reveal is running, or the feed is exhausted.
    pub async fn reveal_if_idle(&self) -> Option<bool> {
        let Some(_busy) = self.begin() else {
            debug!(state = ?self.loading_state(), "reveal trigger ignored");
            return None;
        };
        let more = self.reveal_next_batch().await;
        if !more {
            info!(revealed = self.revealed(), "all videos have been loaded");
        }
        Some(more)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    /// Records everything the controller does to the surface.
    #[derive(Default)]
    pub(crate) struct RecordingSurface {
        cards: Mutex<Vec<VideoCard>>,
        loading: Mutex<Vec<bool>>,
    }

    impl RecordingSurface {
        pub(crate) fn cards(&self) -> Vec<VideoCard> {
            self.cards.lock().unwrap().clone()
        }

        pub(crate) fn loading_visible(&self) -> bool {
            self.loading.lock().unwrap().last().copied().unwrap_or(false)
        }

        fn loading_history(&self) -> Vec<bool> {
            self.loading.lock().unwrap().clone()
        }
    }

    impl DisplaySurface for RecordingSurface {
        fn append(&self, card: VideoCard) {
            self.cards.lock().unwrap().push(card);
        }

        fn set_loading(&self, active: bool) {
            self.loading.lock().unwrap().push(active);
        }
    }

    /// In-memory source answering every fetch with the same outcome after
    /// an optional simulated network delay.
    pub(crate) struct FakeSource {
        outcome: fn() -> Result<Vec<Video>, FetchError>,
        latency: Duration,
        pub(crate) calls: AtomicUsize,
    }

    impl FakeSource {
        pub(crate) fn new(outcome: fn() -> Result<Vec<Video>, FetchError>) -> Self {
            Self {
                outcome,
                latency: Duration::ZERO,
                calls: AtomicUsize::new(0),
            }
        }

        fn with_latency(mut self, latency: Duration) -> Self {
            self.latency = latency;
            self
        }
    }

    #[async_trait]
    impl VideoSource for FakeSource {
        fn name(&self) -> &str {
            "fake"
        }

        async fn fetch(&self) -> Result<Vec<Video>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            time::sleep(self.latency).await;
            (self.outcome)()
        }
    }

    pub(crate) fn videos(count: usize) -> Vec<Video> {
        (0..count)
            .map(|i| Video {
                id: format!("v{i}"),
                title: format!("Video {i}"),
                channel_title: "Channel".to_string(),
                thumbnail_url: format!("https://i.ytimg.com/vi/v{i}/hqdefault.jpg"),
                view_count: 1_000 * i as u64,
                published_at: None,
            })
            .collect()
    }

    fn thirteen() -> Result<Vec<Video>, FetchError> {
        Ok(videos(13))
    }

    fn none() -> Result<Vec<Video>, FetchError> {
        Ok(Vec::new())
    }

    fn quota_exceeded() -> Result<Vec<Video>, FetchError> {
        Err(FetchError::Upstream("quota exceeded".to_string()))
    }

    pub(crate) fn controller(
        source: FakeSource,
    ) -> (Arc<FeedController<FakeSource>>, Arc<RecordingSurface>) {
        let surface = Arc::new(RecordingSurface::default());
        let controller = FeedController::new(source, surface.clone(), FeedSettings::default());
        (Arc::new(controller), surface)
    }

    /// A controller whose result set is already in memory, nothing revealed.
    pub(crate) fn seeded(count: usize) -> (Arc<FeedController<FakeSource>>, Arc<RecordingSurface>) {
        let (controller, surface) = controller(FakeSource::new(none));
        {
            let mut state = controller.state();
            state.videos = videos(count);
            state.loaded = true;
        }
        (controller, surface)
    }

    // -- reveal_next_batch ---------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn thirteen_videos_reveal_as_six_six_one() {
        let (controller, surface) = seeded(13);

        let mut returns = Vec::new();
        let mut sizes = Vec::new();
        for _ in 0..3 {
            let before = surface.cards().len();
            returns.push(controller.reveal_next_batch().await);
            sizes.push(surface.cards().len() - before);
        }

        assert_eq!(sizes, vec![6, 6, 1]);
        assert_eq!(returns, vec![true, true, false]);
        assert_eq!(controller.revealed(), 13);

        let ids: Vec<String> = surface.cards().iter().map(|c| c.title.clone()).collect();
        let expected: Vec<String> = (0..13).map(|i| format!("Video {i}")).collect();
        assert_eq!(ids, expected, "cards are appended in result-set order");
    }

    #[tokio::test(start_paused = true)]
    async fn reveal_after_exhaustion_returns_false_without_appending() {
        let (controller, surface) = seeded(13);
        for _ in 0..3 {
            controller.reveal_next_batch().await;
        }

        assert!(!controller.reveal_next_batch().await);
        assert_eq!(surface.cards().len(), 13);
        assert!(!surface.loading_visible());
        assert_eq!(controller.loading_state(), LoadingState::Exhausted);
    }

    #[tokio::test(start_paused = true)]
    async fn exact_multiple_reports_no_more_on_last_batch() {
        let (controller, surface) = seeded(12);
        assert!(controller.reveal_next_batch().await);
        assert!(!controller.reveal_next_batch().await);
        assert_eq!(surface.cards().len(), 12);
    }

    #[tokio::test(start_paused = true)]
    async fn batch_appears_only_after_reveal_delay() {
        let (controller, surface) = seeded(13);

        let task = tokio::spawn({
            let controller = controller.clone();
            async move { controller.reveal_next_batch().await }
        });
        tokio::task::yield_now().await;
        assert!(surface.loading_visible(), "indicator shows while waiting");

        time::advance(Duration::from_millis(799)).await;
        tokio::task::yield_now().await;
        assert!(surface.cards().is_empty());

        time::advance(Duration::from_millis(1)).await;
        assert!(task.await.unwrap());
        assert_eq!(surface.cards().len(), 6);
        assert!(!surface.loading_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn custom_batch_size_is_honoured() {
        let surface = Arc::new(RecordingSurface::default());
        let settings = FeedSettings {
            batch_size: 4,
            reveal_delay: Duration::from_millis(10),
        };
        let controller = FeedController::new(FakeSource::new(thirteen), surface.clone(), settings);

        controller.load_all().await.unwrap();
        assert_eq!(surface.cards().len(), 4);
        assert!(controller.reveal_next_batch().await);
        assert_eq!(surface.cards().len(), 8);
    }

    #[test]
    fn zero_batch_size_is_raised_to_one() {
        let settings = FeedSettings {
            batch_size: 0,
            ..FeedSettings::default()
        };
        let controller = FeedController::new(
            FakeSource::new(none),
            Arc::new(RecordingSurface::default()),
            settings,
        );
        assert_eq!(controller.settings.batch_size, 1);
    }

    // -- load_all ------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn load_all_reveals_first_batch_and_returns_to_idle() {
        let (controller, surface) = controller(FakeSource::new(thirteen));

        controller.load_all().await.unwrap();

        assert_eq!(controller.total(), 13);
        assert_eq!(controller.revealed(), 6);
        assert_eq!(surface.cards().len(), 6);
        assert_eq!(controller.loading_state(), LoadingState::Idle);
        assert!(!surface.loading_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn load_all_while_fetching_is_a_noop() {
        let source = FakeSource::new(thirteen).with_latency(Duration::from_secs(1));
        let (controller, surface) = controller(source);

        let first = tokio::spawn({
            let controller = controller.clone();
            async move { controller.load_all().await }
        });
        tokio::task::yield_now().await;
        assert_eq!(controller.loading_state(), LoadingState::Fetching);

        controller.load_all().await.unwrap();
        assert_eq!(controller.total(), 0, "second call must not touch the result set");
        assert_eq!(controller.revealed(), 0);
        assert_eq!(controller.loading_state(), LoadingState::Fetching);

        first.await.unwrap().unwrap();
        assert_eq!(controller.source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(surface.cards().len(), 6);
        assert_eq!(controller.loading_state(), LoadingState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_loads_fetch_once() {
        let (controller, _surface) = controller(FakeSource::new(thirteen));

        let (a, b) = tokio::join!(controller.load_all(), controller.load_all());
        assert!(a.is_ok() && b.is_ok());
        assert_eq!(controller.source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn upstream_error_leaves_feed_empty_and_idle() {
        let (controller, surface) = controller(FakeSource::new(quota_exceeded));

        let result = controller.load_all().await;

        assert!(matches!(result, Err(FetchError::Upstream(m)) if m == "quota exceeded"));
        assert_eq!(controller.total(), 0);
        assert!(surface.cards().is_empty());
        assert_eq!(controller.loading_state(), LoadingState::Idle);
        assert_eq!(surface.loading_history(), vec![true, false]);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_load_can_be_retried() {
        let (controller, _surface) = controller(FakeSource::new(quota_exceeded));
        assert!(controller.load_all().await.is_err());
        assert!(controller.load_all().await.is_err());
        assert_eq!(controller.source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn network_failure_returns_to_idle() {
        use crate::source::{CatalogConfig, YouTubeSource};

        let source = YouTubeSource::new(CatalogConfig {
            base_url: "http://127.0.0.1:9/youtube/v3/videos".to_string(),
            api_key: "k".to_string(),
            region_code: "US".to_string(),
        })
        .unwrap();
        let surface = Arc::new(RecordingSurface::default());
        let controller = FeedController::new(source, surface.clone(), FeedSettings::default());

        assert!(matches!(controller.load_all().await, Err(FetchError::Network(_))));
        assert_eq!(controller.loading_state(), LoadingState::Idle);
        assert!(surface.cards().is_empty());
        assert!(!surface.loading_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn empty_result_set_reveals_nothing() {
        let (controller, surface) = controller(FakeSource::new(none));

        controller.load_all().await.unwrap();

        assert!(!controller.reveal_next_batch().await);
        assert!(surface.cards().is_empty());
        assert_eq!(controller.loading_state(), LoadingState::Exhausted);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_load_releases_the_busy_flag() {
        let source = FakeSource::new(thirteen).with_latency(Duration::from_secs(5));
        let (controller, surface) = controller(source);

        let load = tokio::spawn({
            let controller = controller.clone();
            async move { controller.load_all().await }
        });
        tokio::task::yield_now().await;
        assert_eq!(controller.loading_state(), LoadingState::Fetching);

        load.abort();
        let _ = load.await;
        assert_eq!(controller.loading_state(), LoadingState::Idle);
        assert!(!surface.loading_visible());
    }

    // -- reveal_if_idle ------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn reveal_if_idle_is_ignored_while_loading() {
        let source = FakeSource::new(thirteen).with_latency(Duration::from_secs(1));
        let (controller, surface) = controller(source);

        let load = tokio::spawn({
            let controller = controller.clone();
            async move { controller.load_all().await }
        });
        tokio::task::yield_now().await;

        assert_eq!(controller.reveal_if_idle().await, None);
        load.await.unwrap().unwrap();
        assert_eq!(surface.cards().len(), 6, "only the initial batch");
    }

    #[tokio::test(start_paused = true)]
    async fn reveal_if_idle_walks_to_exhaustion() {
        let (controller, surface) = seeded(13);

        assert_eq!(controller.reveal_if_idle().await, Some(true));
        assert_eq!(controller.reveal_if_idle().await, Some(true));
        assert_eq!(controller.reveal_if_idle().await, Some(false));
        assert_eq!(controller.loading_state(), LoadingState::Exhausted);
        assert_eq!(controller.reveal_if_idle().await, None);
        assert_eq!(surface.cards().len(), 13);
    }

    // -- channel surface -----------------------------------------------------

    #[test]
    fn channel_surface_forwards_events() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let card = card::render(&videos(1)[0]);

        tx.set_loading(true);
        tx.append(card.clone());

        assert_eq!(rx.try_recv().unwrap(), FeedEvent::Loading(true));
        assert_eq!(rx.try_recv().unwrap(), FeedEvent::Card(card));
    }
}
