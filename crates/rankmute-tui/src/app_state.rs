//! AppState — shared read-only data passed to all components during render/event.
//!
//! Components read this; only the App event-loop writes to it.

use crate::login::LoginStatus;
use crate::playlists::PlaylistsController;
use crate::ranking::{PlaylistAction, RankingController};
use crate::router::Route;
use crate::widgets::status_bar::InputMode;

pub struct AppState {
    pub route: Route,
    pub input_mode: InputMode,

    // ── Session ─────────────────────────────────────────────────────────────
    pub logged_in: bool,
    pub login: LoginStatus,
    pub backend_url: String,
    /// Where the loopback listener expects the login redirect.
    pub callback_url: String,

    // ── Pages ───────────────────────────────────────────────────────────────
    pub ranking: RankingController,
    pub replace: PlaylistAction,
    pub playlists: PlaylistsController,
}

impl AppState {
    pub fn new(route: Route, logged_in: bool, backend_url: String, callback_url: String) -> Self {
        Self {
            route,
            input_mode: InputMode::Normal,
            logged_in,
            login: LoginStatus::Idle,
            backend_url,
            callback_url,
            ranking: RankingController::new(),
            replace: PlaylistAction::default(),
            playlists: PlaylistsController::default(),
        }
    }

    /// The login URL currently offered to the user, if any.
    pub fn login_url(&self) -> Option<&str> {
        match &self.login {
            LoginStatus::Waiting { url } => Some(url),
            _ => None,
        }
    }
}
