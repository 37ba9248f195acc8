//! Filter bar shown at the bottom of a list pane, backed by tui-input.

use ratatui::crossterm::event::{Event, KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tui_input::{backend::crossterm::EventHandler, Input};

use crate::theme::{C_FILTER_BG, C_FILTER_FG, C_MUTED};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterEvent {
    Changed(String),
    /// Enter: keep the query, leave the bar.
    Kept,
    /// Esc on an empty query: leave the bar.
    Closed,
}

pub struct FilterInput {
    input: Input,
    active: bool,
    placeholder: &'static str,
}

impl FilterInput {
    pub fn new(placeholder: &'static str) -> Self {
        Self {
            input: Input::default(),
            active: false,
            placeholder,
        }
    }

    pub fn open(&mut self) {
        self.active = true;
    }

    pub fn close(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    #[cfg(test)]
    pub fn value(&self) -> &str {
        self.input.value()
    }

    /// True when the bar should take a row: open, or closed with a query.
    pub fn is_visible(&self) -> bool {
        self.active || !self.input.value().is_empty()
    }

    /// First Esc clears the text, a second one closes the bar.
    pub fn handle_key(&mut self, key: KeyEvent) -> FilterEvent {
        match key.code {
            KeyCode::Esc if !self.input.value().is_empty() => {
                self.input = Input::default();
                FilterEvent::Changed(String::new())
            }
            KeyCode::Esc => {
                self.active = false;
                FilterEvent::Closed
            }
            KeyCode::Enter => {
                self.active = false;
                FilterEvent::Kept
            }
            _ => {
                self.input.handle_event(&Event::Key(key));
                FilterEvent::Changed(self.input.value().to_string())
            }
        }
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect) {
        let width = area.width.saturating_sub(3) as usize;
        let scroll = self.input.visual_scroll(width);
        let value = self.input.value();
        let text = if value.is_empty() {
            Span::styled(format!("/ {}", self.placeholder), Style::default().fg(C_MUTED))
        } else {
            let shown: String = value.chars().skip(scroll).collect();
            Span::styled(format!("/ {}", shown), Style::default().fg(C_FILTER_FG))
        };
        frame.render_widget(
            Paragraph::new(Line::from(text)).style(Style::default().bg(C_FILTER_BG)),
            area,
        );

        if self.active {
            let x = area.x + 2 + self.input.visual_cursor().saturating_sub(scroll) as u16;
            frame.set_cursor_position((x.min(area.right().saturating_sub(1)), area.y));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_typing_then_double_escape() {
        let mut filter = FilterInput::new("filter tracks...");
        filter.open();
        assert_eq!(filter.handle_key(key(KeyCode::Char('a'))), FilterEvent::Changed("a".into()));
        assert_eq!(filter.handle_key(key(KeyCode::Char('b'))), FilterEvent::Changed("ab".into()));
        assert_eq!(filter.handle_key(key(KeyCode::Esc)), FilterEvent::Changed(String::new()));
        assert!(filter.is_active());
        assert_eq!(filter.handle_key(key(KeyCode::Esc)), FilterEvent::Closed);
        assert!(!filter.is_visible());
    }

    #[test]
    fn test_enter_keeps_query_visible() {
        let mut filter = FilterInput::new("filter...");
        filter.open();
        filter.handle_key(key(KeyCode::Char('x')));
        assert_eq!(filter.handle_key(key(KeyCode::Enter)), FilterEvent::Kept);
        assert!(!filter.is_active());
        assert!(filter.is_visible());
        assert_eq!(filter.value(), "x");
    }
}
