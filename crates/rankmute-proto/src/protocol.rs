//! Wire types exchanged with the ranking backend.

use serde::{Deserialize, Serialize};

/// Body of `GET /tracks_and_artists`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListingResponse {
    #[serde(default)]
    pub tracks: Vec<TrackEntry>,
    #[serde(default)]
    pub artists: Vec<ArtistEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrackEntry {
    pub id: String,
    pub name: String,
    #[serde(rename = "artistIds", default)]
    pub artist_ids: Vec<String>,
    #[serde(default)]
    pub blocked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArtistEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub blocked: bool,
}

/// Body of `PUT /tracks/{id}` and `PUT /artists/{id}`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MuteBody {
    pub mute: bool,
}

/// One entry of `GET /playlists`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub owner_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_response_uses_camel_case_artist_ids() {
        let body = r#"{
            "tracks": [{"id": "t1", "name": "Song", "artistIds": ["a1", "a2"], "blocked": false}],
            "artists": [{"id": "a1", "name": "Band", "blocked": true}]
        }"#;
        let resp: ListingResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.tracks[0].artist_ids, vec!["a1", "a2"]);
        assert!(resp.artists[0].blocked);
    }

    #[test]
    fn test_mute_body_shape() {
        let json = serde_json::to_string(&MuteBody { mute: true }).unwrap();
        assert_eq!(json, r#"{"mute":true}"#);
    }

    #[test]
    fn test_playlist_tolerates_missing_optional_fields() {
        let p: Playlist = serde_json::from_str(r#"{"id": "p1", "name": "Weekly"}"#).unwrap();
        assert_eq!(p.name, "Weekly");
        assert!(!p.public);
        assert!(p.owner_id.is_empty());
    }
}
