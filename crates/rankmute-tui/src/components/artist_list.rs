//! ArtistList — every artist in the listing.  Muting one here blocks all of
//! its tracks in the track pane on the next frame.

use ratatui::crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{List, ListItem},
    Frame,
};

use rankmute_proto::{ArtistId, EntityRef};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    components::{mute_button, BUTTON_WIDTH},
    theme::{
        style_blocked, style_blocked_selected, style_default, style_selected_focused, C_MUTED,
        C_SECONDARY,
    },
    widgets::{
        filter_input::{FilterEvent, FilterInput},
        status_bar::InputMode,
        pane_chrome::{draw_placeholder, list_area, pane_chrome, placeholder_for, row_at, Badge},
        scrollable_list::ScrollableList,
    },
};

struct ArtistRow {
    id: ArtistId,
    name: String,
    track_count: usize,
}

pub struct ArtistList {
    list: ScrollableList<ArtistRow>,
    filter: FilterInput,
    synced: Option<u64>,
}

impl ArtistList {
    pub fn new() -> Self {
        Self {
            list: ScrollableList::new(|row: &ArtistRow, q: &str| {
                row.name.to_lowercase().contains(q)
            }),
            filter: FilterInput::new("filter artists..."),
            synced: None,
        }
    }

    fn toggle_selected(&self) -> Vec<Action> {
        self.list
            .selected_item()
            .map(|row| vec![Action::ToggleMute(EntityRef::Artist(row.id.clone()))])
            .unwrap_or_default()
    }
}

impl Default for ArtistList {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for ArtistList {
    fn id(&self) -> ComponentId {
        ComponentId::ArtistList
    }

    fn sync(&mut self, state: &AppState) {
        // The App left filter mode without a key reaching this pane.
        if state.input_mode == InputMode::Normal && self.filter.is_active() {
            self.filter.close();
        }
        let (snapshot, _) = state.ranking.version();
        if self.synced == Some(snapshot) {
            return;
        }
        self.synced = Some(snapshot);
        let rows = match state.ranking.listing() {
            Some(listing) => listing
                .artists()
                .iter()
                .map(|a| ArtistRow {
                    id: a.id().clone(),
                    name: a.name().to_string(),
                    track_count: listing.tracks_by(a.id()).count(),
                })
                .collect(),
            None => Vec::new(),
        };
        self.list.replace_items(rows, |r| r.id.clone());
    }

    fn handle_key(&mut self, key: KeyEvent, _state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        if self.filter.is_active() {
            match key.code {
                KeyCode::Up => self.list.select_up(1),
                KeyCode::Down => self.list.select_down(1),
                _ => match self.filter.handle_key(key) {
                    FilterEvent::Changed(q) => self.list.set_filter(&q),
                    FilterEvent::Kept => return vec![Action::CloseFilter],
                    FilterEvent::Closed => {
                        self.list.set_filter("");
                        return vec![Action::CloseFilter];
                    }
                },
            }
            return vec![];
        }
        if self.list.handle_nav_key(&key) {
            return vec![];
        }
        match key.code {
            KeyCode::Enter | KeyCode::Char('m') | KeyCode::Char(' ') => self.toggle_selected(),
            KeyCode::Char('/') => {
                self.filter.open();
                vec![Action::OpenFilter]
            }
            _ => vec![],
        }
    }

    fn handle_mouse(&mut self, event: MouseEvent, area: Rect, _state: &AppState) -> Vec<Action> {
        match event.kind {
            MouseEventKind::ScrollUp => self.list.select_up(1),
            MouseEventKind::ScrollDown => self.list.select_down(1),
            MouseEventKind::Down(MouseButton::Left) => {
                let rows = list_area(area, self.filter.is_visible());
                if let Some(row) = row_at(rows, event.column, event.row) {
                    if self.list.click(row) && event.column < rows.x + BUTTON_WIDTH {
                        return self.toggle_selected();
                    }
                }
            }
            _ => {}
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let badge = Badge::for_load(state.ranking.load_state()).or_else(|| {
            state.ranking.listing().map(|l| {
                let muted = l.artists().iter().filter(|a| a.is_blocked()).count();
                Badge::new(format!("{} muted", muted), C_MUTED)
            })
        });
        let block = pane_chrome("artists", focused, badge);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let filter_rows = u16::from(self.filter.is_visible());
        let list_area = list_area(area, filter_rows > 0);

        if self.list.total_len() == 0 {
            let (text, color) = placeholder_for(state.ranking.load_state(), "no artists");
            draw_placeholder(frame, list_area, &text, color);
        } else if self.list.is_empty() {
            draw_placeholder(frame, list_area, "no artists match filter", C_MUTED);
        } else {
            let height = list_area.height as usize;
            self.list.ensure_visible(height);
            let selected = self.list.selected();
            let listing = state.ranking.listing();
            let items: Vec<ListItem> = self
                .list
                .visible_items(height)
                .map(|(pos, row)| {
                    let target = EntityRef::Artist(row.id.clone());
                    let blocked = listing.and_then(|l| l.is_blocked(&target)).unwrap_or(false);
                    let plural = if row.track_count == 1 { "" } else { "s" };
                    let line = Line::from(vec![
                        mute_button(blocked, state.ranking.row_hint(&target)),
                        Span::raw(row.name.clone()),
                        Span::styled(
                            format!("  {} track{}", row.track_count, plural),
                            Style::default().fg(C_SECONDARY),
                        ),
                    ]);
                    let style = match (pos == selected, blocked) {
                        (true, true) => style_blocked_selected(),
                        (true, false) => style_selected_focused(),
                        (false, true) => style_blocked(),
                        (false, false) => style_default(),
                    };
                    ListItem::new(line).style(style)
                })
                .collect();
            frame.render_widget(List::new(items), list_area);
        }

        if filter_rows > 0 {
            let filter_area = Rect {
                y: inner.bottom().saturating_sub(1),
                height: 1,
                ..inner
            };
            self.filter.draw(frame, filter_area);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyModifiers;
    use rankmute_proto::protocol::{ArtistEntry, ListingResponse};

    use crate::router::Route;

    fn state_with_artists(n: usize) -> AppState {
        let mut state = AppState::new(
            Route::Ranking,
            true,
            "http://localhost:8000".into(),
            "http://127.0.0.1:8765/app/login/callback".into(),
        );
        let resp = ListingResponse {
            tracks: vec![],
            artists: (1..=n)
                .map(|i| ArtistEntry {
                    id: format!("a{}", i),
                    name: format!("Band {}", i),
                    blocked: false,
                })
                .collect(),
        };
        let ticket = state.ranking.mount(true).unwrap();
        state.ranking.on_listing(ticket, Ok(resp));
        state
    }

    fn left_click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_bottom_border_click_does_not_toggle_hidden_artist() {
        let state = state_with_artists(8);
        let mut list = ArtistList::new();
        list.sync(&state);
        let area = Rect::new(0, 0, 40, 5);
        assert!(list.handle_mouse(left_click(1, 4), area, &state).is_empty());
        assert_eq!(
            list.handle_mouse(left_click(1, 3), area, &state),
            vec![Action::ToggleMute(EntityRef::Artist("a3".into()))]
        );
    }
}
