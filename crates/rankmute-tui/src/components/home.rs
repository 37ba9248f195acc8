//! Home page — where unknown routes and finished logins land.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    router::Route,
    theme::{C_ACCENT, C_MUTED, C_OK, C_PRIMARY, C_SECONDARY},
    widgets::pane_chrome::pane_chrome,
};

#[derive(Default)]
pub struct Home;

impl Component for Home {
    fn id(&self) -> ComponentId {
        ComponentId::Home
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        match key.code {
            KeyCode::Enter if state.logged_in => vec![Action::Navigate(Route::Ranking)],
            KeyCode::Enter => vec![Action::Navigate(Route::Login)],
            _ => vec![],
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let block = pane_chrome("rankmute", focused, None);
        let bold = Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD);
        let dim = Style::default().fg(C_SECONDARY);

        let session = if state.logged_in {
            Span::styled("● logged in", Style::default().fg(C_OK))
        } else {
            Span::styled("○ not logged in", Style::default().fg(C_ACCENT))
        };
        let mut lines = vec![
            Line::from(Span::styled("Curate your top-tracks playlist.", bold)),
            Line::from(""),
            Line::from(Span::styled(
                "Mute tracks or whole artists, then rebuild the playlist without them.",
                dim,
            )),
            Line::from(""),
            Line::from(vec![
                session,
                Span::styled(format!("   backend {}", state.backend_url), dim),
            ]),
            Line::from(""),
        ];
        for (key, route) in Route::NAV {
            lines.push(Line::from(vec![
                Span::styled(format!("  {}  ", key), bold),
                Span::styled(route.title(), dim),
            ]));
        }
        lines.push(Line::from(""));
        let hint = if state.logged_in {
            "Enter opens the ranking."
        } else {
            "Enter opens the login page."
        };
        lines.push(Line::from(Span::styled(hint, Style::default().fg(C_MUTED))));

        frame.render_widget(
            Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
            area,
        );
    }
}
