//! NavBar — top line with page tabs, the replace-playlist control and the
//! session indicator.

use ratatui::crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::{
    action::Action,
    app_state::AppState,
    inflight::RenderHint,
    router::Route,
    theme::{C_ACCENT, C_MUTED, C_OK, C_PANEL_BORDER_FOCUSED, C_PENDING, C_PRIMARY, C_SECONDARY},
};

#[derive(Default)]
pub struct NavBar {
    /// Column ranges of the tabs from the last draw.
    tabs: Vec<(u16, u16, Route)>,
}

impl NavBar {
    pub fn handle_mouse(&self, event: MouseEvent) -> Vec<Action> {
        if event.kind != MouseEventKind::Down(MouseButton::Left) {
            return vec![];
        }
        self.tabs
            .iter()
            .find(|(start, end, _)| (*start..*end).contains(&event.column))
            .map(|(_, _, route)| vec![Action::Navigate(*route)])
            .unwrap_or_default()
    }

    pub fn draw(&mut self, frame: &mut Frame, area: Rect, state: &AppState) {
        let mut spans = vec![Span::styled(
            " rankmute ",
            Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD),
        )];
        let mut x = area.x + spans[0].content.width() as u16;
        self.tabs.clear();

        for (key, route) in Route::NAV {
            let label = format!(" {} {} ", key, route.title());
            let width = label.width() as u16;
            let style = if route == state.route {
                Style::default()
                    .fg(C_PRIMARY)
                    .bg(C_PANEL_BORDER_FOCUSED)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(C_SECONDARY)
            };
            self.tabs.push((x, x + width, route));
            spans.push(Span::styled(label, style));
            spans.push(Span::raw(" "));
            x += width + 1;
        }

        let replace = match state.replace.render_hint() {
            RenderHint::Normal if state.logged_in => {
                Span::styled("  P replace playlist", Style::default().fg(C_MUTED))
            }
            RenderHint::Normal => Span::raw(""),
            RenderHint::PendingVisible => Span::styled(
                "  ⟳ replacing playlist…",
                Style::default().fg(C_PENDING).add_modifier(Modifier::BOLD),
            ),
            RenderHint::PendingHidden => {
                Span::styled("    replacing playlist…", Style::default().fg(C_PENDING))
            }
        };
        spans.push(replace);

        let left = Line::from(spans);
        let session = if state.logged_in {
            Span::styled("● logged in ", Style::default().fg(C_OK))
        } else {
            Span::styled("○ logged out ", Style::default().fg(C_ACCENT))
        };

        frame.render_widget(Paragraph::new(left), area);
        frame.render_widget(Paragraph::new(Line::from(session).right_aligned()), area);
    }
}
