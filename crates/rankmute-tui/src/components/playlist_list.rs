//! PlaylistList — the user's playlists; Enter makes one the rewrite target.

use ratatui::crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem},
    Frame,
};

use rankmute_proto::protocol::Playlist;

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    inflight::RenderHint,
    theme::{style_default, style_selected_focused, C_MUTED, C_OK, C_PENDING, C_SECONDARY},
    widgets::{
        filter_input::{FilterEvent, FilterInput},
        status_bar::InputMode,
        pane_chrome::{draw_placeholder, list_area, pane_chrome, placeholder_for, row_at, Badge},
        scrollable_list::ScrollableList,
    },
};

pub struct PlaylistList {
    list: ScrollableList<Playlist>,
    filter: FilterInput,
    synced: Option<u64>,
}

impl PlaylistList {
    pub fn new() -> Self {
        Self {
            list: ScrollableList::new(|p: &Playlist, q: &str| p.name.to_lowercase().contains(q)),
            filter: FilterInput::new("filter playlists..."),
            synced: None,
        }
    }

    fn set_selected(&self) -> Vec<Action> {
        self.list
            .selected_item()
            .map(|p| vec![Action::SetTargetPlaylist(p.id.clone())])
            .unwrap_or_default()
    }
}

impl Default for PlaylistList {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for PlaylistList {
    fn id(&self) -> ComponentId {
        ComponentId::PlaylistList
    }

    fn sync(&mut self, state: &AppState) {
        // The App left filter mode without a key reaching this pane.
        if state.input_mode == InputMode::Normal && self.filter.is_active() {
            self.filter.close();
        }
        let version = state.playlists.version();
        if self.synced != Some(version) {
            self.synced = Some(version);
            self.list
                .replace_items(state.playlists.playlists().to_vec(), |p| p.id.clone());
        }
    }

    fn handle_key(&mut self, key: KeyEvent, _state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        if self.filter.is_active() {
            return match self.filter.handle_key(key) {
                FilterEvent::Changed(q) => {
                    self.list.set_filter(&q);
                    vec![]
                }
                FilterEvent::Kept => vec![Action::CloseFilter],
                FilterEvent::Closed => {
                    self.list.set_filter("");
                    vec![Action::CloseFilter]
                }
            };
        }
        if self.list.handle_nav_key(&key) {
            return vec![];
        }
        match key.code {
            KeyCode::Enter => self.set_selected(),
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
                    self.list.click(row);
                }
            }
            _ => {}
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let ctl = &state.playlists;
        let badge = Badge::for_load(ctl.load_state())
            .or_else(|| ctl.is_setting().then(|| Badge::new("SETTING…", C_PENDING)));
        let block = pane_chrome("playlists", focused, badge);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let filter_rows = u16::from(self.filter.is_visible());
        let list_area = list_area(area, filter_rows > 0);

        if self.list.total_len() == 0 {
            let (text, color) = placeholder_for(ctl.load_state(), "no playlists");
            draw_placeholder(frame, list_area, &text, color);
        } else {
            let height = list_area.height as usize;
            self.list.ensure_visible(height);
            let selected = self.list.selected();
            let items: Vec<ListItem> = self
                .list
                .visible_items(height)
                .map(|(pos, p)| {
                    let is_target = ctl.target() == Some(p.id.as_str());
                    let marker = match ctl.row_hint(&p.id) {
                        RenderHint::PendingVisible => {
                            Span::styled(" … ", Style::default().fg(C_PENDING))
                        }
                        RenderHint::PendingHidden => Span::raw("   "),
                        RenderHint::Normal if is_target => Span::styled(
                            " ✓ ",
                            Style::default().fg(C_OK).add_modifier(Modifier::BOLD),
                        ),
                        RenderHint::Normal => Span::raw("   "),
                    };
                    let visibility = if p.public { "public" } else { "private" };
                    let line = Line::from(vec![
                        marker,
                        Span::raw(p.name.clone()),
                        Span::styled(
                            format!("  {} · {}", visibility, p.owner_id),
                            Style::default().fg(C_SECONDARY),
                        ),
                    ]);
                    let style = if pos == selected {
                        style_selected_focused()
                    } else {
                        style_default()
                    };
                    ListItem::new(line).style(style)
                })
                .collect();
            if items.is_empty() {
                draw_placeholder(frame, list_area, "no playlists match filter", C_MUTED);
            } else {
                frame.render_widget(List::new(items), list_area);
            }
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
