//! Ranking page controller: the listing snapshot, its load state, and the
//! per-row mute protocol.
//!
//! The App owns one `RankingController`.  Components never touch it except
//! through `&AppState`; every write goes through the methods below, called
//! from the event loop when a user action or a request result arrives.

use rankmute_proto::protocol::ListingResponse;
use rankmute_proto::{ApiError, EntityRef, Listing};
use tracing::{debug, info, warn};

use crate::inflight::{ActionGuard, FetchTicket, InFlight, LoadState, MountGuard, RenderHint};

/// A mute/unmute call the App should perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MuteRequest {
    pub target: EntityRef,
    pub mute: bool,
    generation: u64,
}

/// What happened to a listing result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingOutcome {
    Installed { tracks: usize, artists: usize },
    Failed(String),
    /// Result belonged to an earlier mount; dropped.
    Stale,
}

/// What happened to a mute result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MuteOutcome {
    Applied { target: EntityRef, mute: bool },
    Failed { target: EntityRef, error: String },
    Stale,
}

#[derive(Debug)]
pub struct RankingController {
    listing: Option<Listing>,
    load: LoadState,
    mount: MountGuard,
    rows: InFlight<EntityRef>,
    /// Bumped every time a new snapshot is installed or dropped.
    snapshot: u64,
}

impl RankingController {
    pub fn new() -> Self {
        Self {
            listing: None,
            load: LoadState::Idle,
            mount: MountGuard::default(),
            rows: InFlight::new(),
            snapshot: 0,
        }
    }

    /// Enter the page.  Returns a ticket for the listing fetch, or `None`
    /// when there is no session to fetch with.
    pub fn mount(&mut self, logged_in: bool) -> Option<FetchTicket> {
        let ticket = self.mount.mount();
        self.drop_snapshot();
        self.rows.clear();
        if !logged_in {
            self.load = LoadState::LoggedOut;
            debug!("ranking mounted without a session; not fetching");
            return None;
        }
        self.load = LoadState::Loading;
        debug!(generation = self.mount.generation(), "ranking mounted");
        Some(ticket)
    }

    /// Leave the page.  Later results for the old mount are ignored.
    pub fn unmount(&mut self) {
        self.mount.unmount();
        self.drop_snapshot();
        self.rows.clear();
        self.load = LoadState::Idle;
    }

    pub fn on_listing(
        &mut self,
        ticket: FetchTicket,
        result: Result<ListingResponse, ApiError>,
    ) -> ListingOutcome {
        if !self.mount.accepts(ticket) {
            debug!("dropping listing for a stale mount");
            return ListingOutcome::Stale;
        }
        let built = result
            .map_err(|e| e.to_string())
            .and_then(|resp| Listing::from_response(resp).map_err(|e| e.to_string()));
        match built {
            Ok(listing) => {
                let tracks = listing.track_count();
                let artists = listing.artists().len();
                info!(tracks, artists, "listing installed");
                self.listing = Some(listing);
                self.snapshot += 1;
                self.load = LoadState::Loaded;
                ListingOutcome::Installed { tracks, artists }
            }
            Err(error) => {
                warn!(%error, "listing fetch failed");
                self.drop_snapshot();
                self.load = LoadState::Failed(error.clone());
                ListingOutcome::Failed(error)
            }
        }
    }

    /// Activate a row.  Returns the request to send, or `None` when the row
    /// already has a request in flight (or is not in the current listing).
    pub fn begin_toggle(&mut self, target: EntityRef) -> Option<MuteRequest> {
        let current = self.listing.as_ref()?.is_blocked(&target)?;
        if !self.rows.try_begin(target.clone()) {
            debug!(entity = %target, "toggle ignored; request in flight");
            return None;
        }
        Some(MuteRequest {
            target,
            mute: !current,
            generation: self.mount.generation(),
        })
    }

    pub fn on_mute_result(&mut self, req: &MuteRequest, result: Result<(), ApiError>) -> MuteOutcome {
        if req.generation != self.mount.generation() {
            debug!(entity = %req.target, "dropping mute result for a stale mount");
            return MuteOutcome::Stale;
        }
        self.rows.finish(&req.target);
        match result {
            Ok(()) => {
                if let Some(listing) = self.listing.as_mut() {
                    listing.set_blocked(&req.target, req.mute);
                }
                info!(entity = %req.target, mute = req.mute, "mute applied");
                MuteOutcome::Applied {
                    target: req.target.clone(),
                    mute: req.mute,
                }
            }
            Err(e) => {
                warn!(entity = %req.target, error = %e, "mute request failed");
                MuteOutcome::Failed {
                    target: req.target.clone(),
                    error: e.to_string(),
                }
            }
        }
    }

    pub fn listing(&self) -> Option<&Listing> {
        self.listing.as_ref()
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load
    }

    #[cfg(test)]
    pub fn is_in_flight(&self, target: &EntityRef) -> bool {
        self.rows.contains(target)
    }

    pub fn in_flight_count(&self) -> usize {
        self.rows.len()
    }

    pub fn row_hint(&self, target: &EntityRef) -> RenderHint {
        self.rows.render_hint(target)
    }

    /// Changes whenever the visible data changes: a new snapshot or a write
    /// to the current one.
    pub fn version(&self) -> (u64, u64) {
        (self.snapshot, self.listing.as_ref().map_or(0, Listing::rev))
    }

    fn drop_snapshot(&mut self) {
        if self.listing.take().is_some() {
            self.snapshot += 1;
        }
    }
}

impl Default for RankingController {
    fn default() -> Self {
        Self::new()
    }
}

/// Label of a row's mute button.
pub fn mute_label(blocked: bool, in_flight: bool) -> &'static str {
    match (in_flight, blocked) {
        (true, _) => "…",
        (false, true) => "unmute",
        (false, false) => "mute",
    }
}

/// The "replace playlist" button: one request at a time.
#[derive(Debug, Default)]
pub struct PlaylistAction {
    guard: ActionGuard,
}

impl PlaylistAction {
    /// Returns `false` while a previous request is still outstanding.
    pub fn begin(&mut self) -> bool {
        self.guard.try_begin()
    }

    pub fn finish(&mut self, result: &Result<(), ApiError>) {
        self.guard.finish();
        match result {
            Ok(()) => info!("playlist replaced"),
            Err(e) => warn!(error = %e, "playlist replace failed"),
        }
    }

    #[cfg(test)]
    pub fn is_in_flight(&self) -> bool {
        self.guard.is_active()
    }

    pub fn render_hint(&self) -> RenderHint {
        self.guard.render_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use rankmute_proto::protocol::{ArtistEntry, TrackEntry};
    use rankmute_proto::{ApiClient, Session};
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn song_listing() -> ListingResponse {
        ListingResponse {
            tracks: vec![
                TrackEntry {
                    id: "t1".into(),
                    name: "Song".into(),
                    artist_ids: vec!["a1".into()],
                    blocked: false,
                },
                TrackEntry {
                    id: "t2".into(),
                    name: "Other".into(),
                    artist_ids: vec!["a2".into()],
                    blocked: false,
                },
            ],
            artists: vec![
                ArtistEntry {
                    id: "a1".into(),
                    name: "Band".into(),
                    blocked: false,
                },
                ArtistEntry {
                    id: "a2".into(),
                    name: "Solo".into(),
                    blocked: false,
                },
            ],
        }
    }

    fn loaded() -> RankingController {
        let mut ctl = RankingController::new();
        let ticket = ctl.mount(true).unwrap();
        ctl.on_listing(ticket, Ok(song_listing()));
        ctl
    }

    fn t1() -> EntityRef {
        EntityRef::Track("t1".into())
    }

    fn blocked(ctl: &RankingController, target: &EntityRef) -> bool {
        ctl.listing().unwrap().is_blocked(target).unwrap()
    }

    #[test]
    fn test_mount_without_session_does_not_fetch() {
        let mut ctl = RankingController::new();
        assert!(ctl.mount(false).is_none());
        assert_eq!(ctl.load_state(), &LoadState::LoggedOut);
        assert!(ctl.listing().is_none());
    }

    #[test]
    fn test_listing_installed_on_current_ticket() {
        let ctl = loaded();
        assert_eq!(ctl.load_state(), &LoadState::Loaded);
        assert_eq!(ctl.listing().unwrap().track_count(), 2);
    }

    #[test]
    fn test_stale_listing_is_ignored() {
        let mut ctl = RankingController::new();
        let old = ctl.mount(true).unwrap();
        let current = ctl.mount(true).unwrap();

        assert_eq!(ctl.on_listing(old, Ok(song_listing())), ListingOutcome::Stale);
        assert!(ctl.listing().is_none());
        assert_eq!(ctl.load_state(), &LoadState::Loading);

        assert!(matches!(
            ctl.on_listing(current, Ok(song_listing())),
            ListingOutcome::Installed { tracks: 2, artists: 2 }
        ));
    }

    #[test]
    fn test_result_after_unmount_is_ignored() {
        let mut ctl = RankingController::new();
        let ticket = ctl.mount(true).unwrap();
        ctl.unmount();
        assert_eq!(ctl.on_listing(ticket, Ok(song_listing())), ListingOutcome::Stale);
        assert_eq!(ctl.load_state(), &LoadState::Idle);
    }

    #[test]
    fn test_unknown_artist_fails_the_load() {
        let mut resp = song_listing();
        resp.tracks[0].artist_ids.push("ghost".into());
        let mut ctl = RankingController::new();
        let ticket = ctl.mount(true).unwrap();
        assert!(matches!(ctl.on_listing(ticket, Ok(resp)), ListingOutcome::Failed(_)));
        assert!(ctl.listing().is_none());
        assert!(matches!(ctl.load_state(), LoadState::Failed(_)));
    }

    #[test]
    fn test_fetch_error_leaves_list_empty() {
        let mut ctl = RankingController::new();
        let ticket = ctl.mount(true).unwrap();
        let err = ApiError::Status {
            status: 500,
            message: "down".into(),
        };
        assert!(matches!(ctl.on_listing(ticket, Err(err)), ListingOutcome::Failed(_)));
        assert!(ctl.listing().is_none());
    }

    #[test]
    fn test_toggle_is_single_flight() {
        let mut ctl = loaded();
        let req = ctl.begin_toggle(t1()).unwrap();
        assert!(req.mute);
        assert!(ctl.begin_toggle(t1()).is_none());
        assert!(ctl.is_in_flight(&t1()));
        // Other rows are independent.
        assert!(ctl.begin_toggle(EntityRef::Artist("a2".into())).is_some());
        assert_eq!(ctl.in_flight_count(), 2);
    }

    #[test]
    fn test_success_applies_and_reenables() {
        let mut ctl = loaded();
        let before = ctl.version();
        let req = ctl.begin_toggle(t1()).unwrap();
        let outcome = ctl.on_mute_result(&req, Ok(()));
        assert_eq!(outcome, MuteOutcome::Applied { target: t1(), mute: true });
        assert!(blocked(&ctl, &t1()));
        assert!(!ctl.is_in_flight(&t1()));
        assert_ne!(ctl.version(), before);

        // Next activation flips back.
        let req = ctl.begin_toggle(t1()).unwrap();
        assert!(!req.mute);
    }

    #[test]
    fn test_failure_leaves_flag_and_reenables() {
        let mut ctl = loaded();
        let before = ctl.version();
        let req = ctl.begin_toggle(t1()).unwrap();
        let err = ApiError::Status {
            status: 500,
            message: "boom".into(),
        };
        assert!(matches!(ctl.on_mute_result(&req, Err(err)), MuteOutcome::Failed { .. }));
        assert!(!blocked(&ctl, &t1()));
        assert!(!ctl.is_in_flight(&t1()));
        assert_eq!(ctl.version(), before);
        assert!(ctl.begin_toggle(t1()).is_some());
    }

    #[test]
    fn test_artist_mute_blocks_tracks_without_refetch() {
        let mut ctl = loaded();
        let a1 = EntityRef::Artist("a1".into());
        let req = ctl.begin_toggle(a1).unwrap();
        ctl.on_mute_result(&req, Ok(()));

        let listing = ctl.listing().unwrap();
        assert!(listing.track(&"t1".into()).unwrap().effective_blocked());
        assert!(!listing.track(&"t2".into()).unwrap().effective_blocked());
    }

    #[test]
    fn test_mute_result_after_remount_is_dropped() {
        let mut ctl = loaded();
        let req = ctl.begin_toggle(t1()).unwrap();
        let ticket = ctl.mount(true).unwrap();
        ctl.on_listing(ticket, Ok(song_listing()));
        assert_eq!(ctl.on_mute_result(&req, Ok(())), MuteOutcome::Stale);
        assert!(!blocked(&ctl, &t1()));
    }

    #[test]
    fn test_mute_label() {
        assert_eq!(mute_label(false, false), "mute");
        assert_eq!(mute_label(true, false), "unmute");
        assert_eq!(mute_label(true, true), "…");
    }

    #[test]
    fn test_playlist_action_guard_clears_on_failure() {
        let mut action = PlaylistAction::default();
        assert!(action.begin());
        assert!(!action.begin());
        action.finish(&Err(ApiError::Unreachable("refused".into())));
        assert!(!action.is_in_flight());
        assert!(action.begin());
    }

    #[tokio::test]
    async fn test_rapid_activations_send_one_request() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/tracks/t1"))
            .and(body_json(json!({"mute": true})))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(50)))
            .expect(1)
            .mount(&server)
            .await;

        let api = ApiClient::new(&server.uri(), Duration::from_secs(5)).unwrap();
        let session = Session::new("tok");
        let mut ctl = loaded();

        let mut sent = Vec::new();
        for _ in 0..5 {
            if let Some(req) = ctl.begin_toggle(t1()) {
                let api = api.clone();
                let session = session.clone();
                sent.push(tokio::spawn(async move {
                    let result = api.set_muted(&session, &req.target, req.mute).await;
                    (req, result)
                }));
            }
        }
        assert_eq!(sent.len(), 1);

        for handle in sent {
            let (req, result) = handle.await.unwrap();
            ctl.on_mute_result(&req, result);
        }
        assert!(blocked(&ctl, &t1()));
        server.verify().await;
    }
}
