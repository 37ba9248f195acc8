//! Action enum — everything a component can ask the App to do.

use rankmute_proto::EntityRef;

use crate::router::Route;

/// Unique identifier for a focusable component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentId {
    Home,
    TrackList,
    ArtistList,
    PlaylistList,
    Login,
    HelpOverlay,
}

/// Components produce Actions; the App dispatches them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // ── Navigation ───────────────────────────────────────────────────────────
    Navigate(Route),
    FocusNext,
    FocusPrev,
    FocusPane(ComponentId),

    // ── Ranking ──────────────────────────────────────────────────────────────
    ToggleMute(EntityRef),
    ReplacePlaylist,
    Reload,

    // ── Playlists ────────────────────────────────────────────────────────────
    SetTargetPlaylist(String),

    // ── Login ────────────────────────────────────────────────────────────────
    StartLogin,
    CopyLoginUrl,

    // ── Filter/search ────────────────────────────────────────────────────────
    OpenFilter,
    CloseFilter,

    // ── UI toggles ───────────────────────────────────────────────────────────
    ToggleHelp,
    ToggleKeys,

    // ── System ───────────────────────────────────────────────────────────────
    Quit,
    Noop,
}
