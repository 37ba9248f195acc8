//! Component trait — the interface every page pane implements.
//!
//! - Components own their view state (selection, filter) and render themselves.
//! - Domain data comes from `AppState`, read-only.
//! - Components produce `Vec<Action>`; the App applies them.

use ratatui::crossterm::event::{KeyEvent, MouseEvent};
use ratatui::{layout::Rect, Frame};

use crate::action::{Action, ComponentId};
use crate::app_state::AppState;

pub trait Component {
    fn id(&self) -> ComponentId;

    /// Only called when this component has focus.
    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action>;

    /// `area` is where the component was last drawn.
    fn handle_mouse(&mut self, _event: MouseEvent, _area: Rect, _state: &AppState) -> Vec<Action> {
        Vec::new()
    }

    /// Bring view state in line with `state` after the App changed it.
    fn sync(&mut self, _state: &AppState) {}

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState);
}
