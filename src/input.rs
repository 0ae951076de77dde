//! Keyboard and mouse input handling.
//!
//! Maps terminal events to [`App`] mutations and tells the main loop what
//! else has to happen.  Anything that moves the list counts as a scroll
//! event and is forwarded to the scroll listener, even when the selection is
//! already clamped at the last card.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind};

use crate::app::App;

/// Follow-up work for the main loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    Ignored,
    /// The list was scrolled; proximity to the end must be re-evaluated.
    Scrolled,
    /// The user asked to retry a failed load.
    Retry,
}

/// Process a single key event.
///
/// Only reacts to key-press events (ignoring release / repeat) so that each
/// physical keypress triggers exactly one action.
pub fn handle_key_event(app: &mut App, key: KeyEvent) -> InputOutcome {
    if key.kind != KeyEventKind::Press {
        return InputOutcome::Ignored;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit = true,
        KeyCode::Char('r') if app.can_retry() => {
            app.begin_retry();
            return InputOutcome::Retry;
        }
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
        KeyCode::PageDown => app.page_down(),
        KeyCode::PageUp => app.page_up(),
        KeyCode::Home | KeyCode::Char('g') => app.select_first(),
        KeyCode::End | KeyCode::Char('G') => app.select_last(),
        _ => return InputOutcome::Ignored,
    }

    if app.quit {
        InputOutcome::Ignored
    } else {
        InputOutcome::Scrolled
    }
}

/// Mouse wheel scrolling.
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent) -> InputOutcome {
    match mouse.kind {
        MouseEventKind::ScrollDown => app.select_next(),
        MouseEventKind::ScrollUp => app.select_previous(),
        _ => return InputOutcome::Ignored,
    }
    InputOutcome::Scrolled
}
