//! Playlists page: which of the user's playlists the backend rewrites.

use rankmute_proto::protocol::Playlist;
use rankmute_proto::ApiError;
use tracing::{debug, info, warn};

use crate::inflight::{ActionGuard, FetchTicket, LoadState, MountGuard, RenderHint};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetTargetRequest {
    pub playlist_id: String,
    generation: u64,
}

#[derive(Debug, Default)]
pub struct PlaylistsController {
    playlists: Vec<Playlist>,
    load: LoadState,
    mount: MountGuard,
    setting: ActionGuard,
    pending_id: Option<String>,
    /// Last playlist the backend accepted as target.
    target: Option<String>,
    snapshot: u64,
}

impl PlaylistsController {
    pub fn mount(&mut self, logged_in: bool) -> Option<FetchTicket> {
        let ticket = self.mount.mount();
        self.reset();
        if !logged_in {
            self.load = LoadState::LoggedOut;
            return None;
        }
        self.load = LoadState::Loading;
        Some(ticket)
    }

    pub fn unmount(&mut self) {
        self.mount.unmount();
        self.reset();
        self.load = LoadState::Idle;
    }

    /// Returns `true` when the result was for the current mount.
    pub fn on_playlists(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<Playlist>, ApiError>,
    ) -> bool {
        if !self.mount.accepts(ticket) {
            debug!("dropping playlists for a stale mount");
            return false;
        }
        match result {
            Ok(playlists) => {
                info!(count = playlists.len(), "playlists loaded");
                self.playlists = playlists;
                self.load = LoadState::Loaded;
            }
            Err(e) => {
                warn!(error = %e, "playlists fetch failed");
                self.playlists.clear();
                self.load = LoadState::Failed(e.to_string());
            }
        }
        self.snapshot += 1;
        true
    }

    pub fn begin_set(&mut self, playlist_id: &str) -> Option<SetTargetRequest> {
        if !self.playlists.iter().any(|p| p.id == playlist_id) {
            return None;
        }
        if !self.setting.try_begin() {
            debug!(playlist_id, "set target ignored; request in flight");
            return None;
        }
        self.pending_id = Some(playlist_id.to_string());
        Some(SetTargetRequest {
            playlist_id: playlist_id.to_string(),
            generation: self.mount.generation(),
        })
    }

    /// Apply a set-target result.  Stale results are ignored and report `Ok`.
    pub fn on_set_result(
        &mut self,
        req: &SetTargetRequest,
        result: Result<(), ApiError>,
    ) -> Result<(), String> {
        if req.generation != self.mount.generation() {
            return Ok(());
        }
        self.setting.finish();
        self.pending_id = None;
        match result {
            Ok(()) => {
                info!(playlist_id = %req.playlist_id, "target playlist set");
                self.target = Some(req.playlist_id.clone());
                Ok(())
            }
            Err(e) => {
                warn!(playlist_id = %req.playlist_id, error = %e, "set target failed");
                Err(e.to_string())
            }
        }
    }

    pub fn playlists(&self) -> &[Playlist] {
        &self.playlists
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn row_hint(&self, playlist_id: &str) -> RenderHint {
        if self.pending_id.as_deref() == Some(playlist_id) {
            self.setting.render_hint()
        } else {
            RenderHint::Normal
        }
    }

    pub fn is_setting(&self) -> bool {
        self.setting.is_active()
    }

    pub fn version(&self) -> u64 {
        self.snapshot
    }

    fn reset(&mut self) {
        self.playlists.clear();
        self.setting.finish();
        self.pending_id = None;
        self.snapshot += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playlist(id: &str) -> Playlist {
        Playlist {
            id: id.into(),
            name: format!("list {}", id),
            public: true,
            uri: format!("spotify:playlist:{}", id),
            owner_id: "me".into(),
        }
    }

    fn loaded() -> PlaylistsController {
        let mut ctl = PlaylistsController::default();
        let ticket = ctl.mount(true).unwrap();
        assert!(ctl.on_playlists(ticket, Ok(vec![playlist("p1"), playlist("p2")])));
        ctl
    }

    #[test]
    fn test_stale_playlists_dropped() {
        let mut ctl = PlaylistsController::default();
        let old = ctl.mount(true).unwrap();
        ctl.unmount();
        assert!(!ctl.on_playlists(old, Ok(vec![playlist("p1")])));
        assert!(ctl.playlists().is_empty());
    }

    #[test]
    fn test_set_target_single_flight() {
        let mut ctl = loaded();
        let req = ctl.begin_set("p1").unwrap();
        assert!(ctl.begin_set("p2").is_none());
        assert!(ctl.row_hint("p1").is_pending());
        assert!(!ctl.row_hint("p2").is_pending());

        assert!(ctl.on_set_result(&req, Ok(())).is_ok());
        assert_eq!(ctl.target(), Some("p1"));
        assert!(!ctl.is_setting());
    }

    #[test]
    fn test_failed_set_keeps_previous_target() {
        let mut ctl = loaded();
        let req = ctl.begin_set("p1").unwrap();
        ctl.on_set_result(&req, Ok(())).unwrap();

        let req = ctl.begin_set("p2").unwrap();
        let err = ApiError::Status {
            status: 404,
            message: "no such playlist".into(),
        };
        assert!(ctl.on_set_result(&req, Err(err)).is_err());
        assert_eq!(ctl.target(), Some("p1"));
        assert!(!ctl.is_setting());
    }

    #[test]
    fn test_unknown_playlist_not_requested() {
        let mut ctl = loaded();
        assert!(ctl.begin_set("nope").is_none());
        assert!(!ctl.is_setting());
    }
}
