//! TrackList — ranked tracks with a mute button per row.

use std::time::Instant;

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

use rankmute_proto::{EntityRef, TrackId};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    components::{mute_button, BUTTON_WIDTH},
    theme::{
        style_blocked, style_blocked_selected, style_default, style_selected_focused, C_ARTIST,
        C_MUTED, C_PENDING, C_RANK,
    },
    widgets::{
        filter_input::{FilterEvent, FilterInput},
        status_bar::InputMode,
        pane_chrome::{draw_placeholder, list_area, pane_chrome, placeholder_for, row_at, Badge},
        scrollable_list::ScrollableList,
    },
};

struct TrackRow {
    rank: usize,
    id: TrackId,
    name: String,
    artists: String,
}

pub struct TrackList {
    list: ScrollableList<TrackRow>,
    filter: FilterInput,
    synced: Option<u64>,
    last_click: Option<(usize, Instant)>,
}

impl TrackList {
    pub fn new() -> Self {
        Self {
            list: ScrollableList::new(|row: &TrackRow, q: &str| {
                row.name.to_lowercase().contains(q) || row.artists.to_lowercase().contains(q)
            }),
            filter: FilterInput::new("filter tracks or artists..."),
            synced: None,
            last_click: None,
        }
    }

    fn toggle_selected(&self) -> Vec<Action> {
        match self.list.selected_item() {
            Some(row) => vec![Action::ToggleMute(EntityRef::Track(row.id.clone()))],
            None => vec![],
        }
    }

    fn row_line(&self, row: &TrackRow, selected: bool, state: &AppState) -> ListItem<'static> {
        let target = EntityRef::Track(row.id.clone());
        let view = state.ranking.listing().and_then(|l| l.track(&row.id));
        let own = view.is_some_and(|v| v.track().is_blocked());
        let effective = view.is_some_and(|v| v.effective_blocked());
        let by_artist = view.is_some_and(|v| v.blocked_by_artist());

        let mut spans = vec![
            mute_button(own, state.ranking.row_hint(&target)),
            Span::styled(format!("{:>4}  ", row.rank), Style::default().fg(C_RANK)),
            Span::raw(row.name.clone()),
            Span::styled(format!("  {}", row.artists), Style::default().fg(C_ARTIST)),
        ];
        if by_artist {
            spans.push(Span::styled("  (artist muted)", Style::default().fg(C_MUTED)));
        }

        let style = match (selected, effective) {
            (true, true) => style_blocked_selected(),
            (true, false) => style_selected_focused(),
            (false, true) => style_blocked(),
            (false, false) => style_default(),
        };
        ListItem::new(Line::from(spans)).style(style)
    }
}

impl Default for TrackList {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for TrackList {
    fn id(&self) -> ComponentId {
        ComponentId::TrackList
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
        let rows = state
            .ranking
            .listing()
            .map(|listing| {
                listing
                    .tracks()
                    .enumerate()
                    .map(|(i, t)| TrackRow {
                        rank: i + 1,
                        id: t.id().clone(),
                        name: t.name().to_string(),
                        artists: t.artist_names(),
                    })
                    .collect()
            })
            .unwrap_or_default();
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
                let Some(row) = row_at(rows, event.column, event.row) else {
                    return vec![];
                };
                if !self.list.click(row) {
                    return vec![];
                }
                let on_button = event.column < rows.x + BUTTON_WIDTH;
                let double = self
                    .last_click
                    .is_some_and(|(r, t)| r == row && t.elapsed().as_millis() < 400);
                self.last_click = Some((row, Instant::now()));
                if on_button || double {
                    self.last_click = None;
                    return self.toggle_selected();
                }
            }
            _ => {}
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let badge = Badge::for_load(state.ranking.load_state()).or_else(|| {
            state.ranking.listing().map(|l| {
                match state.ranking.in_flight_count() {
                    0 => Badge::new(
                        format!(
                            "{}/{} muted · {}",
                            l.blocked_track_count(),
                            l.track_count(),
                            l.fetched_at().format("%H:%M")
                        ),
                        C_MUTED,
                    ),
                    n => Badge::new(format!("{} pending", n), C_PENDING),
                }
            })
        });
        let block = pane_chrome("tracks", focused, badge);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let filter_rows = u16::from(self.filter.is_visible());
        let list_area = list_area(area, filter_rows > 0);

        if self.list.total_len() == 0 {
            let (text, color) = placeholder_for(state.ranking.load_state(), "no tracks ranked yet");
            draw_placeholder(frame, list_area, &text, color);
        } else if self.list.is_empty() {
            draw_placeholder(frame, list_area, "no tracks match filter", C_MUTED);
        } else {
            let height = list_area.height as usize;
            self.list.ensure_visible(height);
            let selected = self.list.selected();
            let items: Vec<ListItem> = self
                .list
                .visible_items(height)
                .map(|(pos, row)| self.row_line(row, pos == selected, state))
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
    use rankmute_proto::protocol::{ArtistEntry, ListingResponse, TrackEntry};

    use crate::router::Route;

    fn state_with_tracks(n: usize) -> AppState {
        let mut state = AppState::new(
            Route::Ranking,
            true,
            "http://localhost:8000".into(),
            "http://127.0.0.1:8765/app/login/callback".into(),
        );
        let resp = ListingResponse {
            tracks: (1..=n)
                .map(|i| TrackEntry {
                    id: format!("t{}", i),
                    name: format!("Song {}", i),
                    artist_ids: vec!["a1".into()],
                    blocked: false,
                })
                .collect(),
            artists: vec![ArtistEntry {
                id: "a1".into(),
                name: "Band".into(),
                blocked: false,
            }],
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

    fn toggle(id: &str) -> Vec<Action> {
        vec![Action::ToggleMute(EntityRef::Track(id.into()))]
    }

    #[test]
    fn test_button_click_toggles_visible_row() {
        let state = state_with_tracks(10);
        let mut list = TrackList::new();
        list.sync(&state);
        // 5 rows tall: border, t1..t3, border
        let area = Rect::new(0, 0, 60, 5);
        assert_eq!(list.handle_mouse(left_click(2, 2), area, &state), toggle("t2"));
    }

    #[test]
    fn test_border_clicks_do_nothing() {
        let state = state_with_tracks(10);
        let mut list = TrackList::new();
        list.sync(&state);
        let area = Rect::new(0, 0, 60, 5);
        for (column, row) in [(0, 4), (2, 4), (0, 0), (0, 2)] {
            assert!(
                list.handle_mouse(left_click(column, row), area, &state).is_empty(),
                "click at ({}, {})",
                column,
                row
            );
        }
        assert_eq!(list.list.selected_item().map(|r| r.id.as_str()), Some("t1"));
    }

    #[test]
    fn test_filter_line_click_does_nothing() {
        let state = state_with_tracks(10);
        let mut list = TrackList::new();
        list.sync(&state);
        list.filter.open();
        // border, t1..t3, filter line, border
        let area = Rect::new(0, 0, 60, 6);
        assert!(list.handle_mouse(left_click(2, 4), area, &state).is_empty());
        assert_eq!(list.handle_mouse(left_click(2, 3), area, &state), toggle("t3"));
    }

    #[test]
    fn test_sync_closes_filter_when_app_leaves_filter_mode() {
        let mut state = state_with_tracks(3);
        let mut list = TrackList::new();
        list.filter.open();

        state.input_mode = InputMode::Filter;
        list.sync(&state);
        assert!(list.filter.is_active());

        state.input_mode = InputMode::Normal;
        list.sync(&state);
        assert!(!list.filter.is_active());
    }
}
