use ratatui::widgets::ListState;

use crate::card::VideoCard;
use crate::feed::{FeedEvent, LoadingState};
use crate::scroll::Viewport;
use crate::ui::CARD_HEIGHT;

pub struct App {
    /// Revealed cards, in reveal order.  Only ever appended to.
    pub cards: Vec<VideoCard>,
    /// List selection state for scrolling.
    pub list_state: ListState,
    /// Whether the user has requested to quit.
    pub quit: bool,
    /// Last status message.
    pub status: String,
    /// Whether the loading indicator is shown.
    pub loading: bool,
    /// Controller state, refreshed every tick.
    pub feed_state: LoadingState,
    /// Size of the loaded result set.
    pub total: usize,
    /// Description of the last failed load, cleared by a retry.
    pub last_error: Option<String>,
    /// Rows available to the list, recorded by the last draw.
    pub list_height: u16,
}

impl App {
    pub fn new() -> Self {
        Self {
            cards: Vec::new(),
            list_state: ListState::default(),
            quit: false,
            status: "Starting…".into(),
            loading: false,
            feed_state: LoadingState::Idle,
            total: 0,
            last_error: None,
            list_height: 0,
        }
    }

    pub fn apply(&mut self, event: FeedEvent) {
        match event {
            FeedEvent::Card(card) => self.cards.push(card),
            FeedEvent::Loading(active) => self.loading = active,
            FeedEvent::Loaded(total) => {
                self.total = total;
                self.last_error = None;
                self.status = format!("Fetched {total} videos");
            }
            FeedEvent::Failed(message) => {
                self.status = format!("Error: {message}");
                self.last_error = Some(message);
            }
        }
    }

    /// A failed load can be retried once nothing else is running.
    pub fn can_retry(&self) -> bool {
        self.last_error.is_some() && self.feed_state == LoadingState::Idle
    }

    /// Forget the failure ahead of a retry.
    pub fn begin_retry(&mut self) {
        self.last_error = None;
        self.status = "Retrying…".into();
    }

    /// The list's visible window, as of the last draw.
    pub fn viewport(&self) -> Viewport {
        Viewport {
            offset: self.list_state.offset() * CARD_HEIGHT,
            height: usize::from(self.list_height),
            content_height: self.cards.len() * CARD_HEIGHT,
        }
    }

    // -- navigation ----------------------------------------------------------

    pub fn select_next(&mut self) {
        self.select_by(1);
    }

    pub fn select_previous(&mut self) {
        self.select_by(-1);
    }

    /// Move a screenful of cards down.
    pub fn page_down(&mut self) {
        self.select_by(self.cards_per_page() as isize);
    }

    pub fn page_up(&mut self) {
        self.select_by(-(self.cards_per_page() as isize));
    }

    pub fn select_first(&mut self) {
        if !self.cards.is_empty() {
            self.list_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        if !self.cards.is_empty() {
            self.list_state.select(Some(self.cards.len() - 1));
        }
    }

    fn select_by(&mut self, delta: isize) {
        if self.cards.is_empty() {
            return;
        }
        let last = self.cards.len() - 1;
        let i = match self.list_state.selected() {
            Some(i) => i.saturating_add_signed(delta).min(last),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    fn cards_per_page(&self) -> usize {
        (usize::from(self.list_height) / CARD_HEIGHT).max(1)
    }
}
