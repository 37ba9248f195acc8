//! Login page — starts the browser login and shows where it stands.

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
    login::LoginStatus,
    theme::{C_ERROR, C_FILTER_FG, C_MUTED, C_OK, C_PENDING, C_PRIMARY, C_SECONDARY},
    widgets::pane_chrome::{pane_chrome, Badge},
};

#[derive(Default)]
pub struct LoginPage;

impl Component for LoginPage {
    fn id(&self) -> ComponentId {
        ComponentId::Login
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        match key.code {
            KeyCode::Enter if state.login != LoginStatus::Exchanging => vec![Action::StartLogin],
            KeyCode::Char('y') if state.login_url().is_some() => vec![Action::CopyLoginUrl],
            _ => vec![],
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let badge = match &state.login {
            LoginStatus::Waiting { .. } => Some(Badge::new("WAITING", C_PENDING)),
            LoginStatus::Exchanging => Some(Badge::new("EXCHANGING", C_PENDING)),
            LoginStatus::Failed(_) => Some(Badge::new("ERR", C_ERROR)),
            LoginStatus::Idle if state.logged_in => Some(Badge::new("LOGGED IN", C_OK)),
            LoginStatus::Idle => None,
        };
        let block = pane_chrome("login", focused, badge);
        let text = Style::default().fg(C_PRIMARY);
        let dim = Style::default().fg(C_SECONDARY);

        let mut lines = Vec::new();
        match &state.login {
            LoginStatus::Idle => {
                if state.logged_in {
                    lines.push(Line::from(Span::styled("You are logged in.", text)));
                    lines.push(Line::from(Span::styled(
                        "Press Enter to log in again with a different account.",
                        dim,
                    )));
                } else {
                    lines.push(Line::from(Span::styled(
                        "Press Enter to log in with Spotify in your browser.",
                        text,
                    )));
                }
            }
            LoginStatus::Waiting { url } => {
                lines.push(Line::from(Span::styled(
                    "Finish the login in your browser.",
                    text,
                )));
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    "If no browser opened, visit (y copies it):",
                    dim,
                )));
                lines.push(Line::from(Span::styled(
                    url.clone(),
                    Style::default().fg(C_FILTER_FG).add_modifier(Modifier::UNDERLINED),
                )));
            }
            LoginStatus::Exchanging => {
                lines.push(Line::from(Span::styled("Completing login…", text)));
            }
            LoginStatus::Failed(e) => {
                lines.push(Line::from(Span::styled(
                    format!("Login failed: {}", e),
                    Style::default().fg(C_ERROR),
                )));
                lines.push(Line::from(Span::styled("Press Enter to try again.", dim)));
            }
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("Redirects are received at {}", state.callback_url),
            Style::default().fg(C_MUTED),
        )));

        frame.render_widget(
            Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
            area,
        );
    }
}
