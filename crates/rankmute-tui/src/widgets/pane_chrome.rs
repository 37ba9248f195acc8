//! Bordered pane with focus styling, a title and an optional status badge.

use ratatui::{
    layout::{Margin, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::inflight::LoadState;
use crate::theme::{
    C_ERROR, C_MUTED, C_PANEL_BORDER, C_PANEL_BORDER_FOCUSED, C_PENDING, C_PRIMARY, C_SECONDARY,
};

/// Shown in the top-right of the pane border (e.g. a count or "LOADING").
pub struct Badge {
    pub text: String,
    pub color: Color,
}

impl Badge {
    pub fn new(text: impl Into<String>, color: Color) -> Self {
        Self {
            text: text.into(),
            color,
        }
    }

    /// Badge for a page load that has not produced rows yet.
    pub fn for_load(load: &LoadState) -> Option<Self> {
        match load {
            LoadState::Loading => Some(Self::new("LOADING", C_PENDING)),
            LoadState::Failed(_) => Some(Self::new("ERR", C_ERROR)),
            LoadState::LoggedOut => Some(Self::new("LOGGED OUT", C_MUTED)),
            LoadState::Idle | LoadState::Loaded => None,
        }
    }
}

pub fn pane_chrome<'a>(title: &'a str, focused: bool, badge: Option<Badge>) -> Block<'a> {
    let (border, title_style) = if focused {
        (
            Style::default().fg(C_PANEL_BORDER_FOCUSED),
            Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
        )
    } else {
        (
            Style::default().fg(C_PANEL_BORDER),
            Style::default().fg(C_MUTED),
        )
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(Line::from(Span::styled(format!(" {} ", title), title_style)));

    match badge {
        Some(b) => block.title_top(
            Line::from(Span::styled(
                format!(" {} ", b.text),
                Style::default().fg(b.color).add_modifier(Modifier::BOLD),
            ))
            .right_aligned(),
        ),
        None => block,
    }
}

/// Rows of a bordered list pane, above the filter line when it shows.
pub fn list_area(area: Rect, filter_visible: bool) -> Rect {
    let inner = area.inner(Margin::new(1, 1));
    Rect {
        height: inner.height.saturating_sub(u16::from(filter_visible)),
        ..inner
    }
}

/// Offset of the list row under (`column`, `row`); `None` on the border or
/// the filter line.
pub fn row_at(rows: Rect, column: u16, row: u16) -> Option<usize> {
    rows.contains(Position::new(column, row))
        .then(|| usize::from(row - rows.y))
}

/// Centered message inside an empty pane (loading, error, login hint).
pub fn draw_placeholder(frame: &mut Frame, area: Rect, message: &str, color: Color) {
    if area.height == 0 {
        return;
    }
    let top = area.y + area.height.saturating_sub(1) / 2;
    let line_area = Rect {
        y: top,
        height: area.bottom().saturating_sub(top),
        ..area
    };
    let paragraph = Paragraph::new(Line::from(Span::styled(message, Style::default().fg(color))))
        .centered()
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, line_area);
}

/// Text for an empty list given its load state.
pub fn placeholder_for(load: &LoadState, empty_text: &str) -> (String, Color) {
    match load {
        LoadState::Idle | LoadState::Loading => ("Loading…".to_string(), C_SECONDARY),
        LoadState::LoggedOut => ("Not logged in. Press 3 to log in.".to_string(), C_SECONDARY),
        LoadState::Failed(e) => (format!("Could not load: {}  (R to retry)", e), C_ERROR),
        LoadState::Loaded => (empty_text.to_string(), C_MUTED),
    }
}
