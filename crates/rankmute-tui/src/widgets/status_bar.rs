//! Footer: input mode, session state and the keys that apply right now.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::router::Route;
use crate::theme::{C_ACCENT, C_MODE_FILTER, C_MODE_NORMAL, C_MUTED, C_OK};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Filter,
}

impl InputMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Filter => "FILTER",
        }
    }

    pub fn color(self) -> Color {
        match self {
            Self::Normal => C_MODE_NORMAL,
            Self::Filter => C_MODE_FILTER,
        }
    }
}

fn keys_for(mode: InputMode, route: Route) -> &'static str {
    match (mode, route) {
        (InputMode::Filter, _) => "type to filter  Enter keep  Esc clear/close",
        (InputMode::Normal, Route::Ranking) => {
            "↑↓/jk select  Enter/m mute  P replace playlist  R reload  Tab pane  / filter  0-3 pages  ? help  q quit"
        }
        (InputMode::Normal, Route::Playlists) => {
            "↑↓/jk select  Enter set target  R reload  / filter  0-3 pages  ? help  q quit"
        }
        (InputMode::Normal, Route::Login | Route::LoginCallback) => {
            "Enter open login  y copy URL  0-3 pages  ? help  q quit"
        }
        (InputMode::Normal, Route::Home) => "1 ranking  2 playlists  3 login  ? help  q quit",
    }
}

pub fn draw_keys_bar(frame: &mut Frame, area: Rect, mode: InputMode, route: Route, logged_in: bool) {
    let session = if logged_in {
        Span::styled("●", Style::default().fg(C_OK))
    } else {
        Span::styled("○", Style::default().fg(C_ACCENT))
    };
    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", mode.label()),
            Style::default().fg(mode.color()).add_modifier(Modifier::BOLD),
        ),
        session,
        Span::raw("  "),
        Span::styled(keys_for(mode, route), Style::default().fg(C_MUTED)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
