//! Router — which page is showing and which of its panes has focus.

use crate::action::ComponentId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Ranking,
    Playlists,
    Login,
    /// Transient page while the login redirect is processed.
    LoginCallback,
}

impl Route {
    /// Resolve a path.  Anything unrecognised lands on Home.
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or("");
        match path.trim_end_matches('/') {
            "/ranking" => Route::Ranking,
            "/playlist" => Route::Playlists,
            "/login" => Route::Login,
            "/login/callback" => Route::LoginCallback,
            _ => Route::Home,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Ranking => "/ranking",
            Route::Playlists => "/playlist",
            Route::Login => "/login",
            Route::LoginCallback => "/login/callback",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Route::Home => "Home",
            Route::Ranking => "Ranking",
            Route::Playlists => "Playlists",
            Route::Login => "Login",
            Route::LoginCallback => "Logging in",
        }
    }

    /// Pages reachable from the nav bar, with their number keys.
    pub const NAV: [(char, Route); 4] = [
        ('0', Route::Home),
        ('1', Route::Ranking),
        ('2', Route::Playlists),
        ('3', Route::Login),
    ];

    pub fn from_key(c: char) -> Option<Self> {
        Self::NAV.iter().find(|(k, _)| *k == c).map(|(_, r)| *r)
    }

    /// Focusable panes of this page, in Tab order.
    fn panes(self) -> Vec<ComponentId> {
        match self {
            Route::Home => vec![ComponentId::Home],
            Route::Ranking => vec![ComponentId::TrackList, ComponentId::ArtistList],
            Route::Playlists => vec![ComponentId::PlaylistList],
            Route::Login | Route::LoginCallback => vec![ComponentId::Login],
        }
    }
}

pub struct Router {
    route: Route,
    panes: Vec<ComponentId>,
    focus: usize,
    pub show_help: bool,
    /// Footer keybindings bar.
    pub show_keys_bar: bool,
}

impl Router {
    pub fn new(route: Route) -> Self {
        Self {
            route,
            panes: route.panes(),
            focus: 0,
            show_help: false,
            show_keys_bar: true,
        }
    }

    pub fn route(&self) -> Route {
        self.route
    }

    /// Switch pages.  Returns the page being left, or `None` when `route` is
    /// already showing.
    pub fn go(&mut self, route: Route) -> Option<Route> {
        if route == self.route {
            return None;
        }
        let previous = self.route;
        self.route = route;
        self.panes = route.panes();
        self.focus = 0;
        Some(previous)
    }

    pub fn focused(&self) -> Option<ComponentId> {
        self.panes.get(self.focus).copied()
    }

    pub fn is_focused(&self, id: ComponentId) -> bool {
        self.focused() == Some(id)
    }

    pub fn focus_next(&mut self) {
        if !self.panes.is_empty() {
            self.focus = (self.focus + 1) % self.panes.len();
        }
    }

    pub fn focus_prev(&mut self) {
        if !self.panes.is_empty() {
            self.focus = (self.focus + self.panes.len() - 1) % self.panes.len();
        }
    }

    pub fn focus(&mut self, id: ComponentId) {
        if let Some(pos) = self.panes.iter().position(|&p| p == id) {
            self.focus = pos;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_paths() {
        for (_, route) in Route::NAV {
            assert_eq!(Route::from_path(route.path()), route);
        }
        assert_eq!(Route::from_path("/login/callback?code=x"), Route::LoginCallback);
        assert_eq!(Route::from_path("/ranking/"), Route::Ranking);
    }

    #[test]
    fn test_unmatched_paths_go_home() {
        for path in ["", "/nope", "/rankings", "/login/other", "ranking"] {
            assert_eq!(Route::from_path(path), Route::Home, "{}", path);
        }
    }

    #[test]
    fn test_focus_cycles_within_page() {
        let mut router = Router::new(Route::Ranking);
        assert!(router.is_focused(ComponentId::TrackList));
        router.focus_next();
        assert!(router.is_focused(ComponentId::ArtistList));
        router.focus_next();
        assert!(router.is_focused(ComponentId::TrackList));
        router.focus_prev();
        assert!(router.is_focused(ComponentId::ArtistList));
    }

    #[test]
    fn test_go_reports_previous_page() {
        let mut router = Router::new(Route::Home);
        assert_eq!(router.go(Route::Ranking), Some(Route::Home));
        assert_eq!(router.go(Route::Ranking), None);
        assert_eq!(router.focused(), Some(ComponentId::TrackList));
        assert_eq!(Route::from_key('2'), Some(Route::Playlists));
        assert_eq!(Route::from_key('9'), None);
    }
}
