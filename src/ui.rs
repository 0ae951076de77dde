//! Terminal UI rendering.
//!
//! All drawing logic lives here, separated from application state ([`App`])
//! and input handling ([`crate::input`]).
//!
//! The layout is a two-row split: the card list on top and a one-line status
//! bar at the bottom.  Every card takes exactly [`CARD_HEIGHT`] rows, which
//! is what lets [`App::viewport`] convert list offsets into rows.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::App;
use crate::card::VideoCard;
use crate::feed::LoadingState;

/// Rows per card: title, channel line, watch link, thumbnail, spacer.
pub const CARD_HEIGHT: usize = 5;

/// Draw the complete UI for one frame.
pub fn draw(app: &mut App, frame: &mut Frame) {
    let [main_area, status_area] = Layout::vertical([
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    draw_card_list(app, frame, main_area);
    draw_status_bar(app, frame, status_area);
}

fn card_item(card: &VideoCard) -> ListItem<'_> {
    let mut meta = vec![
        Span::styled(&card.channel, Style::default().fg(Color::Cyan)),
        Span::raw("  "),
        Span::styled(&card.views, Style::default().fg(Color::Green)),
    ];
    if !card.published.is_empty() {
        meta.push(Span::raw("  "));
        meta.push(Span::styled(&card.published, Style::default().fg(Color::DarkGray)));
    }

    ListItem::new(vec![
        Line::from(Span::styled(
            &card.title,
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(meta),
        Line::from(Span::styled(
            &card.link,
            Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::UNDERLINED),
        )),
        Line::from(Span::styled(
            &card.thumbnail_url,
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )),
        Line::default(),
    ])
}

/// Render the scrollable card list.
fn draw_card_list(app: &mut App, frame: &mut Frame, area: Rect) {
    let list_items: Vec<ListItem> = app.cards.iter().map(card_item).collect();

    let list = List::new(list_items)
        .block(
            Block::default()
                .title(" Trending ")
                .borders(Borders::ALL),
        )
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("▸ ");

    // Inside the borders.
    app.list_height = area.height.saturating_sub(2);
    frame.render_stateful_widget(list, area, &mut app.list_state);
}

/// Render the bottom status bar.
fn draw_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let mut spans = vec![
        Span::raw(" "),
        Span::styled(&app.status, Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::styled(
            format!("{}/{} videos", app.cards.len(), app.total),
            Style::default().fg(Color::Green),
        ),
    ];

    if app.loading {
        spans.push(Span::styled(
            "  loading…",
            Style::default().fg(Color::Magenta),
        ));
    } else if app.feed_state == LoadingState::Exhausted {
        spans.push(Span::styled(
            "  end of feed",
            Style::default().fg(Color::DarkGray),
        ));
    }

    let help = if app.can_retry() {
        "  r: retry  q: quit"
    } else {
        "  q: quit  ↑/↓: scroll  PgUp/PgDn: page"
    };
    spans.push(Span::raw(help));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
