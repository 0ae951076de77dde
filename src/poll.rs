//! Background terminal-event polling.
//!
//! crossterm's event API blocks, and the UI loop runs on a single-threaded
//! tokio runtime, so reading happens on a dedicated thread that forwards
//! every event to the UI loop over a tokio [`mpsc`] channel.

use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event};
use tokio::sync::mpsc;
use tracing::warn;

/// How long one blocking poll waits before checking whether the UI is gone.
const POLL_TIMEOUT: Duration = Duration::from_millis(250);

/// Spawn the polling thread.
///
/// The thread stops on its own once the receiver has been dropped.
pub fn spawn() -> mpsc::UnboundedReceiver<Event> {
    let (tx, rx) = mpsc::unbounded_channel();

    thread::spawn(move || loop {
        if tx.is_closed() {
            return;
        }
        match event::poll(POLL_TIMEOUT) {
            Ok(false) => continue,
            Ok(true) => {}
            Err(e) => {
                warn!(error = %e, "terminal event poll failed");
                return;
            }
        }
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    return;
                }
            }
            Err(e) => {
                warn!(error = %e, "reading terminal event failed");
                return;
            }
        }
    });

    rx
}
