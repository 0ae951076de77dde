//! Scroll-driven reveal of further batches.
//!
//! Every scroll event goes to a [`ScrollListener`].  The listener debounces
//! them: each event cancels the evaluation still waiting from the previous
//! one, so a burst of events produces a single check once the burst has been
//! quiet for the debounce window.  The check reads the latest [`Viewport`]
//! and, when the view is close to the end of the list, asks the controller
//! for another batch.
//!
//! Dropping the listener cancels whatever evaluation is still pending.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time;
use tracing::trace;

use crate::feed::FeedController;
use crate::source::VideoSource;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

/// Rows from the bottom of the list at which the next batch is requested.
pub const DEFAULT_THRESHOLD_ROWS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollSettings {
    pub debounce: Duration,
    pub threshold_rows: usize,
}

impl Default for ScrollSettings {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            threshold_rows: DEFAULT_THRESHOLD_ROWS,
        }
    }
}

/// The visible window of the feed list, in terminal rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    /// Rows scrolled past at the top.
    pub offset: usize,
    /// Rows visible at once.
    pub height: usize,
    /// Rows the whole list would take.
    pub content_height: usize,
}

impl Viewport {
    /// Whether the bottom edge of the view is within `threshold` rows of the
    /// end of the content.  A list shorter than the view is always near its
    /// end.
    pub fn is_near_end(&self, threshold: usize) -> bool {
        self.offset + self.height + threshold >= self.content_height
    }
}

/// At most one pending delayed task.
///
/// Scheduling a new task aborts the pending one.  A task that has already
/// fired is detached from the timer and always runs to completion.
pub struct Debouncer {
    window: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    pub fn schedule<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        let window = self.window;
        self.pending = Some(tokio::spawn(async move {
            time::sleep(window).await;
            tokio::spawn(task);
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Turns scroll events into reveal requests for one controller.
pub struct ScrollListener<S> {
    controller: Arc<FeedController<S>>,
    viewport: watch::Receiver<Viewport>,
    threshold_rows: usize,
    debouncer: Debouncer,
}

impl<S: VideoSource + 'static> ScrollListener<S> {
    pub fn new(
        controller: Arc<FeedController<S>>,
        viewport: watch::Receiver<Viewport>,
        settings: ScrollSettings,
    ) -> Self {
        Self {
            controller,
            viewport,
            threshold_rows: settings.threshold_rows,
            debouncer: Debouncer::new(settings.debounce),
        }
    }

    pub fn on_scroll(&mut self) {
        let controller = Arc::clone(&self.controller);
        let viewport = self.viewport.clone();
        let threshold = self.threshold_rows;

        if self.debouncer.is_pending() {
            trace!("replacing pending scroll evaluation");
        }
        self.debouncer.schedule(async move {
            let view = *viewport.borrow();
            if view.is_near_end(threshold) {
                controller.reveal_if_idle().await;
            }
        });
    }
}
