//! Listing store — the tracks and artists of one fetch, indexed by id.
//!
//! A track refers to its artists by slot in the listing's artist table, so an
//! artist shared by many tracks exists exactly once and a mute on it is seen
//! by every track immediately.  Whether a track is blocked is always derived
//! on read; nothing is cached.
//!
//! The only write is [`Listing::set_blocked`].  Every effective write bumps
//! [`Listing::rev`], which views compare to decide whether to rebuild.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::protocol::ListingResponse;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtistId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(pub String);

impl ArtistId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TrackId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ArtistId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<&str> for TrackId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for ArtistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The entity a mute/unmute call targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityRef {
    Track(TrackId),
    Artist(ArtistId),
}

impl EntityRef {
    /// Backend collection the entity lives under (`/tracks/{id}`).
    pub fn collection(&self) -> &'static str {
        match self {
            EntityRef::Track(_) => "tracks",
            EntityRef::Artist(_) => "artists",
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            EntityRef::Track(_) => "track",
            EntityRef::Artist(_) => "artist",
        }
    }

    pub fn id(&self) -> &str {
        match self {
            EntityRef::Track(id) => id.as_str(),
            EntityRef::Artist(id) => id.as_str(),
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artist {
    id: ArtistId,
    name: String,
    blocked: bool,
}

impl Artist {
    pub fn id(&self) -> &ArtistId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    id: TrackId,
    name: String,
    /// Slots into `Listing::artists`, in response order.
    artists: Vec<usize>,
    blocked: bool,
}

impl Track {
    pub fn id(&self) -> &TrackId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The track's own flag, ignoring its artists.
    pub fn is_blocked(&self) -> bool {
        self.blocked
    }
}

/// A response that breaks the listing contract.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ListingError {
    #[error("track {track} references unknown artist {artist}")]
    UnknownArtist { track: TrackId, artist: ArtistId },
    #[error("artist {0} appears more than once")]
    DuplicateArtist(ArtistId),
    #[error("track {0} appears more than once")]
    DuplicateTrack(TrackId),
}

#[derive(Debug, Clone)]
pub struct Listing {
    artists: Vec<Artist>,
    artist_slots: HashMap<ArtistId, usize>,
    tracks: Vec<Track>,
    track_slots: HashMap<TrackId, usize>,
    rev: u64,
    fetched_at: DateTime<Local>,
}

impl Listing {
    /// Build a listing from one response: artists first, then tracks resolved
    /// against them.  Any track naming an artist that is not in the same
    /// response rejects the whole listing.
    pub fn from_response(resp: ListingResponse) -> Result<Self, ListingError> {
        let mut artists = Vec::with_capacity(resp.artists.len());
        let mut artist_slots = HashMap::with_capacity(resp.artists.len());
        for entry in resp.artists {
            let id = ArtistId(entry.id);
            if artist_slots.insert(id.clone(), artists.len()).is_some() {
                return Err(ListingError::DuplicateArtist(id));
            }
            artists.push(Artist {
                id,
                name: entry.name,
                blocked: entry.blocked,
            });
        }

        let mut tracks = Vec::with_capacity(resp.tracks.len());
        let mut track_slots = HashMap::with_capacity(resp.tracks.len());
        for entry in resp.tracks {
            let id = TrackId(entry.id);
            let mut slots = Vec::with_capacity(entry.artist_ids.len());
            for artist_id in entry.artist_ids {
                let artist = ArtistId(artist_id);
                match artist_slots.get(&artist) {
                    Some(&slot) => slots.push(slot),
                    None => {
                        return Err(ListingError::UnknownArtist {
                            track: id,
                            artist,
                        })
                    }
                }
            }
            if track_slots.insert(id.clone(), tracks.len()).is_some() {
                return Err(ListingError::DuplicateTrack(id));
            }
            tracks.push(Track {
                id,
                name: entry.name,
                artists: slots,
                blocked: entry.blocked,
            });
        }

        Ok(Self {
            artists,
            artist_slots,
            tracks,
            track_slots,
            rev: 0,
            fetched_at: Local::now(),
        })
    }

    pub fn artists(&self) -> &[Artist] {
        &self.artists
    }

    /// Tracks in ranking order, each paired with this listing.
    pub fn tracks(&self) -> impl Iterator<Item = TrackView<'_>> + '_ {
        self.tracks.iter().map(move |track| TrackView {
            listing: self,
            track,
        })
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    pub fn artist(&self, id: &ArtistId) -> Option<&Artist> {
        self.artist_slots.get(id).map(|&slot| &self.artists[slot])
    }

    pub fn track(&self, id: &TrackId) -> Option<TrackView<'_>> {
        self.track_slots.get(id).map(|&slot| TrackView {
            listing: self,
            track: &self.tracks[slot],
        })
    }

    /// Artists of `track`, borrowed from this listing's artist table.
    pub fn artists_of<'a>(&'a self, track: &'a Track) -> impl Iterator<Item = &'a Artist> + 'a {
        track.artists.iter().map(move |&slot| &self.artists[slot])
    }

    /// Tracks that credit `artist`.
    pub fn tracks_by<'a>(&'a self, artist: &ArtistId) -> impl Iterator<Item = &'a Track> + 'a {
        let slot = self.artist_slots.get(artist).copied();
        self.tracks
            .iter()
            .filter(move |t| slot.is_some_and(|s| t.artists.contains(&s)))
    }

    /// Own flag of the targeted entity, if it is in this listing.
    pub fn is_blocked(&self, target: &EntityRef) -> Option<bool> {
        match target {
            EntityRef::Track(id) => self.track_slots.get(id).map(|&s| self.tracks[s].blocked),
            EntityRef::Artist(id) => self.artist_slots.get(id).map(|&s| self.artists[s].blocked),
        }
    }

    /// Set the `blocked` flag of one entity.  Returns `false` when the entity
    /// is not part of this listing.
    pub fn set_blocked(&mut self, target: &EntityRef, blocked: bool) -> bool {
        let flag = match target {
            EntityRef::Track(id) => match self.track_slots.get(id) {
                Some(&s) => &mut self.tracks[s].blocked,
                None => return false,
            },
            EntityRef::Artist(id) => match self.artist_slots.get(id) {
                Some(&s) => &mut self.artists[s].blocked,
                None => return false,
            },
        };
        if *flag != blocked {
            *flag = blocked;
            self.rev += 1;
        }
        true
    }

    /// Write counter; starts at 0 for a fresh snapshot.
    pub fn rev(&self) -> u64 {
        self.rev
    }

    pub fn fetched_at(&self) -> DateTime<Local> {
        self.fetched_at
    }

    pub fn blocked_track_count(&self) -> usize {
        self.tracks().filter(|t| t.effective_blocked()).count()
    }
}

/// A track read through its listing, so derived state can see the artists.
#[derive(Debug, Clone, Copy)]
pub struct TrackView<'a> {
    listing: &'a Listing,
    track: &'a Track,
}

impl<'a> TrackView<'a> {
    pub fn track(&self) -> &'a Track {
        self.track
    }

    pub fn id(&self) -> &'a TrackId {
        &self.track.id
    }

    pub fn name(&self) -> &'a str {
        &self.track.name
    }

    pub fn artists(&self) -> impl Iterator<Item = &'a Artist> + 'a {
        self.listing.artists_of(self.track)
    }

    /// Own flag OR any credited artist's flag, evaluated now.
    pub fn effective_blocked(&self) -> bool {
        self.track.blocked || self.artists().any(|a| a.blocked)
    }

    /// True when the track is blocked only because of an artist.
    pub fn blocked_by_artist(&self) -> bool {
        !self.track.blocked && self.artists().any(|a| a.blocked)
    }

    pub fn artist_names(&self) -> String {
        self.artists().map(|a| a.name.as_str()).collect::<Vec<_>>().join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{ArtistEntry, TrackEntry};

    fn artist(id: &str, name: &str, blocked: bool) -> ArtistEntry {
        ArtistEntry {
            id: id.to_string(),
            name: name.to_string(),
            blocked,
        }
    }

    fn track(id: &str, name: &str, artists: &[&str], blocked: bool) -> TrackEntry {
        TrackEntry {
            id: id.to_string(),
            name: name.to_string(),
            artist_ids: artists.iter().map(|s| s.to_string()).collect(),
            blocked,
        }
    }

    fn sample() -> Listing {
        Listing::from_response(ListingResponse {
            tracks: vec![
                track("t1", "First", &["a1"], false),
                track("t2", "Second", &["a1", "a2"], false),
                track("t3", "Third", &["a2"], true),
                track("t4", "Fourth", &[], false),
            ],
            artists: vec![artist("a1", "One", false), artist("a2", "Two", false)],
        })
        .unwrap()
    }

    #[test]
    fn test_artist_blocked_marks_track_blocked() {
        let body = r#"{"tracks":[{"id":"t1","name":"Song","artistIds":["a1"],"blocked":false}],
                       "artists":[{"id":"a1","name":"Band","blocked":true}]}"#;
        let listing = Listing::from_response(serde_json::from_str(body).unwrap()).unwrap();
        let song = listing.track(&"t1".into()).unwrap();
        assert_eq!(song.name(), "Song");
        assert!(!song.track().is_blocked());
        assert!(song.effective_blocked());
        assert!(song.blocked_by_artist());
    }

    #[test]
    fn test_effective_blocked_is_own_or_any_artist() {
        let mut listing = sample();
        for t in listing.tracks() {
            let expected = t.track().is_blocked() || t.artists().any(|a| a.is_blocked());
            assert_eq!(t.effective_blocked(), expected);
        }

        listing.set_blocked(&EntityRef::Artist("a2".into()), true);
        for t in listing.tracks() {
            let expected = t.track().is_blocked() || t.artists().any(|a| a.is_blocked());
            assert_eq!(t.effective_blocked(), expected);
        }
        // Track with no artists depends on its own flag only.
        assert!(!listing.track(&"t4".into()).unwrap().effective_blocked());
    }

    #[test]
    fn test_artist_mute_propagates_without_refetch() {
        let mut listing = sample();
        assert!(!listing.track(&"t1".into()).unwrap().effective_blocked());
        assert!(!listing.track(&"t2".into()).unwrap().effective_blocked());

        assert!(listing.set_blocked(&EntityRef::Artist("a1".into()), true));
        assert!(listing.track(&"t1".into()).unwrap().effective_blocked());
        assert!(listing.track(&"t2".into()).unwrap().effective_blocked());
        assert!(!listing.track(&"t4".into()).unwrap().effective_blocked());

        listing.set_blocked(&EntityRef::Artist("a1".into()), false);
        assert!(!listing.track(&"t1".into()).unwrap().effective_blocked());
    }

    #[test]
    fn test_one_entity_per_entry_in_order() {
        let listing = sample();
        let ids: Vec<&str> = listing.tracks().map(|t| t.id().as_str()).collect();
        assert_eq!(ids, vec!["t1", "t2", "t3", "t4"]);
        let names: Vec<&str> = listing.artists().iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["One", "Two"]);
        assert_eq!(listing.track_count(), 4);
    }

    #[test]
    fn test_track_artists_are_shared_not_copied() {
        let listing = sample();
        let a1 = listing.artist(&"a1".into()).unwrap();
        let from_t1 = listing.track(&"t1".into()).unwrap().artists().next().unwrap();
        let from_t2 = listing.track(&"t2".into()).unwrap().artists().next().unwrap();
        assert!(std::ptr::eq(a1, from_t1));
        assert!(std::ptr::eq(a1, from_t2));
    }

    #[test]
    fn test_unknown_artist_rejects_listing() {
        let err = Listing::from_response(ListingResponse {
            tracks: vec![track("t1", "Song", &["a1", "ghost"], false)],
            artists: vec![artist("a1", "Band", false)],
        })
        .unwrap_err();
        assert_eq!(
            err,
            ListingError::UnknownArtist {
                track: "t1".into(),
                artist: "ghost".into(),
            }
        );
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let err = Listing::from_response(ListingResponse {
            tracks: vec![],
            artists: vec![artist("a1", "Band", false), artist("a1", "Band", true)],
        })
        .unwrap_err();
        assert_eq!(err, ListingError::DuplicateArtist("a1".into()));

        let err = Listing::from_response(ListingResponse {
            tracks: vec![track("t1", "A", &[], false), track("t1", "B", &[], false)],
            artists: vec![],
        })
        .unwrap_err();
        assert_eq!(err, ListingError::DuplicateTrack("t1".into()));
    }

    #[test]
    fn test_set_blocked_bumps_rev_only_on_change() {
        let mut listing = sample();
        assert_eq!(listing.rev(), 0);
        assert!(listing.set_blocked(&EntityRef::Track("t1".into()), true));
        assert_eq!(listing.rev(), 1);
        assert!(listing.set_blocked(&EntityRef::Track("t1".into()), true));
        assert_eq!(listing.rev(), 1);
        assert!(!listing.set_blocked(&EntityRef::Track("nope".into()), true));
        assert_eq!(listing.rev(), 1);
    }

    #[test]
    fn test_tracks_by_artist() {
        let listing = sample();
        let ids: Vec<&str> = listing
            .tracks_by(&"a2".into())
            .map(|t| t.id().as_str())
            .collect();
        assert_eq!(ids, vec!["t2", "t3"]);
        assert_eq!(listing.tracks_by(&"missing".into()).count(), 0);
    }

    #[test]
    fn test_entity_ref_paths() {
        assert_eq!(EntityRef::Track("t1".into()).collection(), "tracks");
        assert_eq!(EntityRef::Artist("a1".into()).collection(), "artists");
        assert_eq!(EntityRef::Artist("a1".into()).to_string(), "artist a1");
    }
}
