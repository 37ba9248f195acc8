//! App — component-based event loop.
//!
//! - `App` owns every component, the controllers (inside `AppState`) and the
//!   session store handle.
//! - Backend calls run in spawned tasks and come back as `AppMessage`s over
//!   one `mpsc` channel; results are applied one at a time.
//! - Components return `Vec<Action>`; App applies each Action.
//! - A login changes the session store, whose watch channel re-mounts the
//!   page that was waiting for it.

use std::future::Future;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use ratatui::crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    Frame, Terminal,
};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use rankmute_proto::config::{Config, LoginConfig};
use rankmute_proto::protocol::{ListingResponse, Playlist};
use rankmute_proto::{ApiClient, ApiError, EntityRef, Session, SessionStore};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    components::{
        artist_list::ArtistList, help_overlay::HelpOverlay, home::Home, login_page::LoginPage,
        nav_bar::NavBar, playlist_list::PlaylistList, track_list::TrackList,
    },
    inflight::{FetchTicket, LoadState},
    login::{complete_login, CallbackParams, LoginOutcome, LoginStatus},
    playlists::SetTargetRequest,
    ranking::{ListingOutcome, MuteOutcome, MuteRequest},
    router::{Route, Router},
    widgets::{
        status_bar::{self, InputMode},
        toast::{Severity, ToastManager},
    },
};

/// Everything that wakes the event loop.
pub enum AppMessage {
    Event(Event),
    ListingLoaded(FetchTicket, Result<ListingResponse, ApiError>),
    MuteDone(MuteRequest, Result<(), ApiError>),
    PlaylistReplaced(Result<(), ApiError>),
    PlaylistsLoaded(FetchTicket, Result<Vec<Playlist>, ApiError>),
    TargetSet(SetTargetRequest, Result<(), ApiError>),
    /// Redirect parameters from the loopback listener.
    Callback(CallbackParams),
    LoginFinished(LoginOutcome),
}

/// Screen areas from the last draw, for mouse hit-testing.
#[derive(Default)]
struct PaneAreas {
    nav: Rect,
    panes: Vec<(ComponentId, Rect)>,
}

pub struct App {
    api: ApiClient,
    sessions: Arc<SessionStore>,
    login: LoginConfig,
    state: AppState,
    router: Router,

    nav_bar: NavBar,
    home: Home,
    track_list: TrackList,
    artist_list: ArtistList,
    playlist_list: PlaylistList,
    login_page: LoginPage,
    help_overlay: HelpOverlay,
    toast: ToastManager,

    tx: Option<mpsc::Sender<AppMessage>>,
    pane_areas: PaneAreas,
    should_quit: bool,
}

impl App {
    /// `start` overrides the first page; otherwise Ranking when a session
    /// exists and Login when it does not.
    pub fn new(
        config: &Config,
        api: ApiClient,
        sessions: Arc<SessionStore>,
        start: Option<Route>,
    ) -> Self {
        let logged_in = sessions.is_logged_in();
        let route = start.unwrap_or(if logged_in { Route::Ranking } else { Route::Login });
        let callback_url = format!("{}{}", config.login.origin(), config.login.callback_path);
        Self {
            state: AppState::new(route, logged_in, api.base_url().to_string(), callback_url),
            router: Router::new(route),
            api,
            sessions,
            login: config.login.clone(),
            nav_bar: NavBar::default(),
            home: Home,
            track_list: TrackList::new(),
            artist_list: ArtistList::new(),
            playlist_list: PlaylistList::new(),
            login_page: LoginPage,
            help_overlay: HelpOverlay,
            toast: ToastManager::default(),
            tx: None,
            pane_areas: PaneAreas::default(),
            should_quit: false,
        }
    }

    pub async fn run(mut self, mut callback_rx: mpsc::Receiver<CallbackParams>) -> anyhow::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

        let (tx, mut rx) = mpsc::channel::<AppMessage>(256);
        self.tx = Some(tx.clone());

        // ── Background task: keyboard/mouse events ────────────────────────────
        let event_tx = tx.clone();
        tokio::task::spawn_blocking(move || loop {
            match event::read() {
                Ok(ev) => {
                    if event_tx.blocking_send(AppMessage::Event(ev)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        });

        // ── Background task: login redirects → AppMessage ─────────────────────
        let callback_tx = tx.clone();
        tokio::spawn(async move {
            while let Some(params) = callback_rx.recv().await {
                if callback_tx.send(AppMessage::Callback(params)).await.is_err() {
                    break;
                }
            }
        });

        let mut session_rx: watch::Receiver<Option<Session>> = self.sessions.subscribe();

        // Toast expiry, spinner and in-flight pulse
        let mut ui_tick = tokio::time::interval(Duration::from_millis(100));
        ui_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        self.mount_page(self.router.route());
        self.sync_components();
        info!(route = self.router.route().path(), "ui started");

        // ── Main loop ─────────────────────────────────────────────────────────
        loop {
            terminal.draw(|f| self.draw(f))?;
            if self.should_quit {
                break;
            }

            tokio::select! {
                Some(msg) = rx.recv() => {
                    self.handle_message(msg);
                    while let Ok(next) = rx.try_recv() {
                        self.handle_message(next);
                        if self.should_quit {
                            break;
                        }
                    }
                }
                Ok(()) = session_rx.changed() => {
                    let logged_in = session_rx.borrow_and_update().is_some();
                    self.on_session_changed(logged_in);
                }
                _ = ui_tick.tick() => {
                    self.toast.tick();
                }
            }
            self.sync_components();
        }

        // ── Teardown ──────────────────────────────────────────────────────────
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
        terminal.show_cursor()?;
        info!("ui stopped");
        Ok(())
    }

    // ── Messages ──────────────────────────────────────────────────────────────

    fn handle_message(&mut self, msg: AppMessage) {
        match msg {
            AppMessage::Event(Event::Key(key)) => {
                if key.kind == KeyEventKind::Release {
                    return;
                }
                for action in self.handle_key(key) {
                    self.apply_action(action);
                }
            }
            AppMessage::Event(Event::Mouse(mouse)) => {
                for action in self.handle_mouse(mouse) {
                    self.apply_action(action);
                }
            }
            AppMessage::Event(_) => {}

            AppMessage::ListingLoaded(ticket, result) => {
                let unauthorized = matches!(&result, Err(e) if e.is_unauthorized());
                match self.state.ranking.on_listing(ticket, result) {
                    ListingOutcome::Installed { .. } | ListingOutcome::Stale => {}
                    ListingOutcome::Failed(_) if unauthorized => {
                        self.toast.error("session rejected by the backend; press 3 to log in again");
                    }
                    ListingOutcome::Failed(e) => {
                        self.toast.error(format!("could not load ranking: {}", e));
                    }
                }
            }

            AppMessage::MuteDone(req, result) => match self.state.ranking.on_mute_result(&req, result) {
                MuteOutcome::Applied { target, mute } => {
                    let verb = if mute { "muted" } else { "unmuted" };
                    let name = self.entity_name(&target);
                    self.toast.success(format!("{} {}", verb, name));
                }
                MuteOutcome::Failed { target, error } => {
                    let name = self.entity_name(&target);
                    self.toast.error(format!("could not update {}: {}", name, error));
                }
                MuteOutcome::Stale => {}
            },

            AppMessage::PlaylistReplaced(result) => {
                self.state.replace.finish(&result);
                match result {
                    Ok(()) => self.toast.success("playlist replaced"),
                    Err(e) => self.toast.error(format!("could not replace playlist: {}", e)),
                }
            }

            AppMessage::PlaylistsLoaded(ticket, result) => {
                if self.state.playlists.on_playlists(ticket, result) {
                    if let LoadState::Failed(e) = self.state.playlists.load_state() {
                        self.toast.error(format!("could not load playlists: {}", e));
                    }
                }
            }

            AppMessage::TargetSet(req, result) => {
                match self.state.playlists.on_set_result(&req, result) {
                    Ok(()) if self.state.playlists.target() == Some(req.playlist_id.as_str()) => {
                        self.toast.success("target playlist set");
                    }
                    Ok(()) => {}
                    Err(e) => self.toast.error(format!("could not set playlist: {}", e)),
                }
            }

            AppMessage::Callback(params) => self.on_callback(params),

            AppMessage::LoginFinished(outcome) => {
                let next = match outcome {
                    LoginOutcome::LoggedIn => {
                        self.state.login = LoginStatus::Idle;
                        self.toast.resolve_spinner(Severity::Success, "logged in");
                        Route::Home
                    }
                    LoginOutcome::NoCode { error } => {
                        self.state.login = LoginStatus::Idle;
                        let detail = error.map(|e| format!(": {}", e)).unwrap_or_default();
                        self.toast
                            .resolve_spinner(Severity::Warning, format!("login cancelled{}", detail));
                        Route::Home
                    }
                    LoginOutcome::Failed(e) => {
                        self.toast
                            .resolve_spinner(Severity::Error, format!("login failed: {}", e));
                        self.state.login = LoginStatus::Failed(e);
                        Route::Login
                    }
                };
                self.navigate(next);
            }
        }
    }

    fn on_callback(&mut self, params: CallbackParams) {
        self.navigate(Route::LoginCallback);
        if params.code.is_some() {
            self.state.login = LoginStatus::Exchanging;
            self.toast.spinner("completing login…");
        }
        let api = self.api.clone();
        let sessions = self.sessions.clone();
        let origin = self.login.origin();
        self.spawn(async move {
            AppMessage::LoginFinished(complete_login(&api, &sessions, &origin, params).await)
        });
    }

    fn on_session_changed(&mut self, logged_in: bool) {
        info!(logged_in, "session changed");
        self.state.logged_in = logged_in;
        let route = self.router.route();
        if matches!(route, Route::Ranking | Route::Playlists) {
            self.mount_page(route);
        }
    }

    // ── Key handling ──────────────────────────────────────────────────────────

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        if key.code == KeyCode::Char('c') && key.modifiers == KeyModifiers::CONTROL {
            return vec![Action::Quit];
        }

        if self.router.show_help {
            return self.help_overlay.handle_key(key, &self.state);
        }

        if self.state.input_mode == InputMode::Normal {
            match key.code {
                KeyCode::Char('q') => return vec![Action::Quit],
                KeyCode::Char('?') => return vec![Action::ToggleHelp],
                KeyCode::Char('K') => return vec![Action::ToggleKeys],
                KeyCode::Tab => return vec![Action::FocusNext],
                KeyCode::BackTab => return vec![Action::FocusPrev],
                KeyCode::Char('P') => return vec![Action::ReplacePlaylist],
                KeyCode::Char('R') => return vec![Action::Reload],
                KeyCode::Char(c) => {
                    if let Some(route) = Route::from_key(c) {
                        return vec![Action::Navigate(route)];
                    }
                }
                _ => {}
            }
        }

        let s = &self.state;
        match self.router.focused() {
            Some(ComponentId::Home) => self.home.handle_key(key, s),
            Some(ComponentId::TrackList) => self.track_list.handle_key(key, s),
            Some(ComponentId::ArtistList) => self.artist_list.handle_key(key, s),
            Some(ComponentId::PlaylistList) => self.playlist_list.handle_key(key, s),
            Some(ComponentId::Login) => self.login_page.handle_key(key, s),
            Some(ComponentId::HelpOverlay) | None => vec![],
        }
    }

    // ── Mouse handling ────────────────────────────────────────────────────────

    fn handle_mouse(&mut self, event: MouseEvent) -> Vec<Action> {
        let interesting = matches!(
            event.kind,
            MouseEventKind::Down(_) | MouseEventKind::ScrollUp | MouseEventKind::ScrollDown
        );
        // Typing a filter or reading help: the mouse does nothing.
        if !interesting || self.router.show_help || self.state.input_mode == InputMode::Filter {
            return vec![];
        }

        let hit = |r: Rect| r.contains(ratatui::layout::Position::new(event.column, event.row));
        if hit(self.pane_areas.nav) {
            return self.nav_bar.handle_mouse(event);
        }

        let Some((id, area)) = self.pane_areas.panes.iter().copied().find(|(_, r)| hit(*r)) else {
            return vec![];
        };
        let s = &self.state;
        let mut actions = match id {
            ComponentId::Home => self.home.handle_mouse(event, area, s),
            ComponentId::TrackList => self.track_list.handle_mouse(event, area, s),
            ComponentId::ArtistList => self.artist_list.handle_mouse(event, area, s),
            ComponentId::PlaylistList => self.playlist_list.handle_mouse(event, area, s),
            ComponentId::Login => self.login_page.handle_mouse(event, area, s),
            ComponentId::HelpOverlay => vec![],
        };
        if !self.router.is_focused(id) {
            actions.insert(0, Action::FocusPane(id));
        }
        actions
    }

    // ── Actions ───────────────────────────────────────────────────────────────

    fn apply_action(&mut self, action: Action) {
        if action != Action::Noop {
            debug!("apply_action: {:?}", action);
        }
        match action {
            Action::Navigate(route) => self.navigate(route),
            Action::FocusNext => self.router.focus_next(),
            Action::FocusPrev => self.router.focus_prev(),
            Action::FocusPane(id) => self.router.focus(id),

            Action::ToggleMute(target) => self.toggle_mute(target),
            Action::ReplacePlaylist => self.replace_playlist(),
            Action::Reload => match self.router.route() {
                Route::Ranking | Route::Playlists => self.mount_page(self.router.route()),
                _ => {}
            },
            Action::SetTargetPlaylist(id) => self.set_target_playlist(&id),

            Action::StartLogin => self.start_login(),
            Action::CopyLoginUrl => {
                let Some(url) = self.state.login_url().map(str::to_string) else {
                    return;
                };
                match arboard::Clipboard::new().and_then(|mut cb| cb.set_text(url)) {
                    Ok(()) => self.toast.success("login URL copied"),
                    Err(e) => {
                        warn!("clipboard error: {}", e);
                        self.toast.error(format!("clipboard error: {}", e));
                    }
                }
            }

            Action::OpenFilter => self.state.input_mode = InputMode::Filter,
            Action::CloseFilter => self.state.input_mode = InputMode::Normal,

            Action::ToggleHelp => self.router.show_help = !self.router.show_help,
            Action::ToggleKeys => self.router.show_keys_bar = !self.router.show_keys_bar,

            Action::Quit => self.should_quit = true,
            Action::Noop => {}
        }
    }

    fn navigate(&mut self, route: Route) {
        if let Some(previous) = self.router.go(route) {
            info!(from = previous.path(), to = route.path(), "navigate");
            self.unmount_page(previous);
            if matches!(self.state.login, LoginStatus::Waiting { .. })
                && route != Route::LoginCallback
            {
                // Abandoned browser login; a late redirect still completes it.
                self.state.login = LoginStatus::Idle;
                self.toast.dismiss_spinner();
            }
            self.state.route = route;
            self.state.input_mode = InputMode::Normal;
            self.mount_page(route);
        }
    }

    fn mount_page(&mut self, route: Route) {
        let session = self.sessions.current();
        match route {
            Route::Ranking => {
                let ticket = self.state.ranking.mount(session.is_some());
                if let (Some(ticket), Some(session)) = (ticket, session) {
                    let api = self.api.clone();
                    self.spawn(async move {
                        AppMessage::ListingLoaded(ticket, api.fetch_listing(&session).await)
                    });
                }
            }
            Route::Playlists => {
                let ticket = self.state.playlists.mount(session.is_some());
                if let (Some(ticket), Some(session)) = (ticket, session) {
                    let api = self.api.clone();
                    self.spawn(async move {
                        AppMessage::PlaylistsLoaded(ticket, api.fetch_playlists(&session).await)
                    });
                }
            }
            Route::Home | Route::Login | Route::LoginCallback => {}
        }
    }

    fn unmount_page(&mut self, route: Route) {
        match route {
            Route::Ranking => self.state.ranking.unmount(),
            Route::Playlists => self.state.playlists.unmount(),
            Route::Home | Route::Login | Route::LoginCallback => {}
        }
    }

    fn toggle_mute(&mut self, target: EntityRef) {
        let Some(session) = self.session_or_hint() else {
            return;
        };
        let Some(req) = self.state.ranking.begin_toggle(target) else {
            return;
        };
        let api = self.api.clone();
        self.spawn(async move {
            let result = api.set_muted(&session, &req.target, req.mute).await;
            AppMessage::MuteDone(req, result)
        });
    }

    fn replace_playlist(&mut self) {
        let Some(session) = self.session_or_hint() else {
            return;
        };
        if !self.state.replace.begin() {
            self.toast.info("playlist replace already running");
            return;
        }
        let api = self.api.clone();
        self.spawn(async move { AppMessage::PlaylistReplaced(api.replace_playlist(&session).await) });
    }

    fn set_target_playlist(&mut self, playlist_id: &str) {
        let Some(session) = self.session_or_hint() else {
            return;
        };
        let Some(req) = self.state.playlists.begin_set(playlist_id) else {
            return;
        };
        let api = self.api.clone();
        self.spawn(async move {
            let result = api.set_target_playlist(&session, &req.playlist_id).await;
            AppMessage::TargetSet(req, result)
        });
    }

    fn start_login(&mut self) {
        let url = match self.api.login_url(&self.login.origin()) {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, "cannot build login URL");
                self.toast.error(format!("cannot start login: {}", e));
                return;
            }
        };
        info!(url = %url, "starting browser login");
        self.state.login = LoginStatus::Waiting { url: url.clone() };
        self.toast.spinner("waiting for browser login…");
        if self.login.open_browser {
            if let Err(e) = open::that_detached(&url) {
                warn!("could not open browser: {}", e);
                self.toast.warning("could not open a browser; press y to copy the URL");
            }
        }
    }

    fn session_or_hint(&mut self) -> Option<Session> {
        let session = self.sessions.current();
        if session.is_none() {
            self.toast.warning("not logged in; press 3 to log in");
        }
        session
    }

    fn entity_name(&self, target: &EntityRef) -> String {
        let listing = self.state.ranking.listing();
        let name = match target {
            EntityRef::Track(id) => listing.and_then(|l| l.track(id)).map(|t| t.name().to_string()),
            EntityRef::Artist(id) => listing.and_then(|l| l.artist(id)).map(|a| a.name().to_string()),
        };
        name.unwrap_or_else(|| target.to_string())
    }

    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = AppMessage> + Send + 'static,
    {
        if let Some(tx) = self.tx.clone() {
            tokio::spawn(async move {
                // Receiver gone means the app is shutting down.
                let _ = tx.send(fut.await).await;
            });
        }
    }

    fn sync_components(&mut self) {
        self.track_list.sync(&self.state);
        self.artist_list.sync(&self.state);
        self.playlist_list.sync(&self.state);
    }

    // ── Drawing ───────────────────────────────────────────────────────────────

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let footer = u16::from(self.router.show_keys_bar);
        let [nav, body, status] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(footer),
        ])
        .areas(area);

        self.nav_bar.draw(frame, nav, &self.state);
        self.pane_areas.nav = nav;
        self.pane_areas.panes.clear();

        let s = &self.state;
        match self.router.route() {
            Route::Home => {
                self.home.draw(frame, body, true, s);
                self.pane_areas.panes.push((self.home.id(), body));
            }
            Route::Ranking => {
                let [tracks, artists] =
                    Layout::horizontal([Constraint::Percentage(62), Constraint::Percentage(38)])
                        .areas(body);
                let focused = self.router.focused();
                self.track_list
                    .draw(frame, tracks, focused == Some(ComponentId::TrackList), s);
                self.artist_list
                    .draw(frame, artists, focused == Some(ComponentId::ArtistList), s);
                self.pane_areas.panes.push((self.track_list.id(), tracks));
                self.pane_areas.panes.push((self.artist_list.id(), artists));
            }
            Route::Playlists => {
                self.playlist_list.draw(frame, body, true, s);
                self.pane_areas.panes.push((self.playlist_list.id(), body));
            }
            Route::Login | Route::LoginCallback => {
                self.login_page.draw(frame, body, true, s);
                self.pane_areas.panes.push((self.login_page.id(), body));
            }
        }

        if self.router.show_keys_bar {
            status_bar::draw_keys_bar(frame, status, s.input_mode, s.route, s.logged_in);
        }
        if self.router.show_help {
            self.help_overlay.draw(frame, area, true, s);
        }
        self.toast.draw(frame, area);
    }
}
