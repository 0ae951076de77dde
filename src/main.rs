//! trendscroll: a lazily scrolling feed of trending videos for the terminal.
//!
//! ## Architecture overview
//!
//! ```text
//!                    FeedEvent           draw()
//! ┌──────────┐  (channel surface)  ┌──────────┐ ───────► ┌──────────┐
//! │ feed.rs  │ ──────────────────► │  app.rs  │          │  ui.rs   │
//! │(control.)│                     │ (state)  │ ◄─────── │ (render) │
//! └──────────┘                     └──────────┘  height  └──────────┘
//!      ▲ reveal_if_idle()            │      ▲
//!      │                    Viewport │      │ handle_*_event()
//! ┌──────────┐   (watch channel)     │ ┌──────────┐   Event   ┌──────────┐
//! │scroll.rs │ ◄─────────────────────┘ │ input.rs │ ◄──────── │ poll.rs  │
//! │(debounce)│                         └──────────┘           │ (thread) │
//! └──────────┘                                                └──────────┘
//! ```
//!
//! * **`source/`**: the `VideoSource` trait and the YouTube implementation.
//! * **`feed`** fetches once, then reveals the result set in batches.
//! * **`card`** turns a video into a displayable card.
//! * **`scroll`**: debounced scroll evaluation and proximity check.
//! * **`poll`** forwards terminal events from a background thread.
//! * **`app`** owns UI state (cards, selection, status).
//! * **`ui`** reads `App` state and draws widgets.
//! * **`input`** maps key and mouse events to `App` mutations.
//! * **`main`** wires everything together: configuration, logging, the
//!   terminal, and the event loop.

mod app;
mod card;
mod config;
mod error;
mod feed;
mod input;
mod poll;
mod scroll;
mod source;
mod ui;

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::{mpsc, watch};
use tracing::info;
use tracing_subscriber::EnvFilter;

use app::App;
use config::Config;
use feed::{FeedController, FeedEvent};
use input::InputOutcome;
use scroll::{ScrollListener, Viewport};
use source::{VideoSource, YouTubeSource};

// ---------------------------------------------------------------------------
// RAII terminal guard
// ---------------------------------------------------------------------------

/// Manages raw mode, the alternate screen and mouse capture via [`Drop`].
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            DisableMouseCapture,
            LeaveAlternateScreen
        );
        let _ = self.terminal.show_cursor();
    }
}

/// Install a panic hook that restores the terminal before printing the
/// panic message.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
        original_hook(info);
    }));
}

/// Send tracing output to `path`; `RUST_LOG` overrides the `info` default.
fn init_tracing(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Run one load in the background and report its outcome to the UI.
fn spawn_load<S: VideoSource + 'static>(
    controller: &Arc<FeedController<S>>,
    events: mpsc::UnboundedSender<FeedEvent>,
) {
    let controller = Arc::clone(controller);
    tokio::spawn(async move {
        let event = match controller.load_all().await {
            Ok(()) => FeedEvent::Loaded(controller.total()),
            Err(e) => FeedEvent::Failed(e.to_string()),
        };
        let _ = events.send(event);
    });
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    install_panic_hook();

    // -- configuration and logging -------------------------------------------
    let config = Config::from_env().context("loading configuration")?;
    init_tracing(&config.log_file)?;
    info!(region = %config.catalog.region_code, "starting");

    // -- feed ------------------------------------------------------------------
    let source = YouTubeSource::new(config.catalog.clone()).context("building HTTP client")?;
    let (feed_tx, mut feed_rx) = mpsc::unbounded_channel();
    let controller = Arc::new(FeedController::new(
        source,
        Arc::new(feed_tx.clone()),
        config.feed,
    ));

    let (viewport_tx, viewport_rx) = watch::channel(Viewport::default());
    let mut scroll = ScrollListener::new(Arc::clone(&controller), viewport_rx, config.scroll);

    spawn_load(&controller, feed_tx.clone());

    // -- terminal setup (Drop restores on exit or panic) -----------------------
    let mut terminal_events = poll::spawn();
    let mut guard = TerminalGuard::new()?;
    let mut app = App::new();

    // Redraw at least every 100 ms so the status bar follows the controller.
    let mut ticker = tokio::time::interval(Duration::from_millis(100));

    loop {
        while let Ok(event) = feed_rx.try_recv() {
            app.apply(event);
        }
        app.feed_state = controller.loading_state();

        guard.terminal.draw(|f| ui::draw(&mut app, f))?;
        viewport_tx.send_replace(app.viewport());

        let outcome = tokio::select! {
            Some(event) = terminal_events.recv() => match event {
                Event::Key(key) => input::handle_key_event(&mut app, key),
                Event::Mouse(mouse) => input::handle_mouse_event(&mut app, mouse),
                _ => InputOutcome::Ignored,
            },
            Some(event) = feed_rx.recv() => {
                app.apply(event);
                InputOutcome::Ignored
            }
            _ = ticker.tick() => InputOutcome::Ignored,
        };

        match outcome {
            InputOutcome::Scrolled => scroll.on_scroll(),
            InputOutcome::Retry => spawn_load(&controller, feed_tx.clone()),
            InputOutcome::Ignored => {}
        }

        if app.quit {
            break;
        }
    }

    // Tear down the scroll listener before the terminal is restored.
    drop(scroll);
    info!("exiting");
    Ok(())
}
