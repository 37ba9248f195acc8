//! HelpOverlay — centered popup listing the keys.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{C_MUTED, C_PANEL_BORDER, C_PRIMARY, C_SECONDARY},
};

const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "pages",
        &[
            ("0 / 1 / 2 / 3", "home / ranking / playlists / login"),
            ("tab / shift-tab", "switch pane"),
            ("R", "reload the current page"),
        ],
    ),
    (
        "ranking",
        &[
            ("enter / m / space", "mute or unmute the selected row"),
            ("click [mute]", "same, with the mouse"),
            ("P", "replace the playlist without muted items"),
        ],
    ),
    (
        "lists",
        &[
            ("↑ / ↓  or  j / k", "move (shift = 5 rows)"),
            ("pg up / pg dn", "jump 10 rows"),
            ("g / G", "first / last"),
            ("/", "filter (esc clears, esc again closes)"),
        ],
    ),
    (
        "login",
        &[
            ("enter", "open the login page in the browser"),
            ("y", "copy the login URL"),
        ],
    ),
    (
        "ui",
        &[
            ("K", "toggle keys bar"),
            ("?", "toggle this help"),
            ("q / ctrl+c", "quit"),
        ],
    ),
];

#[derive(Default)]
pub struct HelpOverlay;

impl Component for HelpOverlay {
    fn id(&self) -> ComponentId {
        ComponentId::HelpOverlay
    }

    /// Consumes every key while open; the closing keys hide it.
    fn handle_key(&mut self, key: KeyEvent, _state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        match key.code {
            KeyCode::Char('?') | KeyCode::Char('q') | KeyCode::Esc => vec![Action::ToggleHelp],
            _ => vec![],
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, _focused: bool, _state: &AppState) {
        let key_style = Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD);
        let heading = Style::default().fg(C_MUTED).add_modifier(Modifier::BOLD);

        let mut lines = vec![Line::from(Span::styled(" keyboard shortcuts", key_style))];
        for (title, rows) in SECTIONS {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(format!(" {}", title), heading)));
            for (key, desc) in rows.iter() {
                lines.push(Line::from(vec![
                    Span::styled(format!(" {:<20}", key), key_style),
                    Span::styled(*desc, Style::default().fg(C_SECONDARY)),
                ]));
            }
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            " press ? or esc to close",
            Style::default().fg(C_MUTED),
        )));

        let popup = centered(area, 64, lines.len() as u16 + 2);
        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(lines).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(C_PANEL_BORDER))
                    .style(Style::default().bg(Color::Rgb(18, 18, 26))),
            ),
            popup,
        );
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .areas(area);
    let [popup] = Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .areas(row);
    popup
}
