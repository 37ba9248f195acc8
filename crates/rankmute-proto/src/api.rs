//! HTTP client for the ranking backend.
//!
//! One method per endpoint.  Methods that need authentication take the
//! [`Session`] as an argument; the client itself holds no credentials.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::error::{ApiError, Result};
use crate::model::EntityRef;
use crate::protocol::{ListingResponse, MuteBody, Playlist};
use crate::session::Session;

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        if base_url.is_empty() {
            return Err(ApiError::InvalidUrl("URL cannot be empty".into()));
        }
        let base_url = base_url.trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ApiError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }
        Url::parse(&base_url).map_err(|e| ApiError::InvalidUrl(e.to_string()))?;

        let http = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("rankmute/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Base URL plus `segments`, each percent-encoded as one path segment.
    fn segments_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(format!("{} cannot take a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Where to send the browser to start the login.  The backend redirects
    /// the provider back to `origin` + its callback path.
    pub fn login_url(&self, origin: &str) -> Result<String> {
        let url = Url::parse_with_params(&self.url("/login"), &[("origin", origin)])
            .map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
        Ok(url.into())
    }

    /// Trade the authorization code for a bearer token.
    pub async fn exchange_code(&self, code: &str, origin: &str) -> Result<String> {
        let url = self.url("/login/callback");
        debug!(url = %url, "exchanging authorization code");
        let response = self
            .http
            .get(&url)
            .query(&[("code", code), ("origin", origin)])
            .send()
            .await
            .map_err(ApiError::from_send)?;
        let token: String = read_json(response, "token").await?;
        if token.is_empty() {
            return Err(ApiError::Parse("backend returned an empty token".into()));
        }
        info!("authorization code exchanged");
        Ok(token)
    }

    pub async fn fetch_listing(&self, session: &Session) -> Result<ListingResponse> {
        let response = self
            .authed(self.http.get(self.url("/tracks_and_artists")), session)
            .send()
            .await
            .map_err(ApiError::from_send)?;
        let listing: ListingResponse = read_json(response, "listing").await?;
        debug!(
            tracks = listing.tracks.len(),
            artists = listing.artists.len(),
            "listing fetched"
        );
        Ok(listing)
    }

    /// `PUT /tracks/{id}` or `PUT /artists/{id}` with `{"mute": mute}`.
    pub async fn set_muted(&self, session: &Session, target: &EntityRef, mute: bool) -> Result<()> {
        let url = self.segments_url(&[target.collection(), target.id()])?;
        debug!(url = %url, mute, "mute request");
        let response = self
            .authed(self.http.put(url), session)
            .json(&MuteBody { mute })
            .send()
            .await
            .map_err(ApiError::from_send)?;
        expect_success(response).await
    }

    /// Ask the backend to rebuild the playlist without muted items.
    pub async fn replace_playlist(&self, session: &Session) -> Result<()> {
        let response = self
            .authed(self.http.post(self.url("/replace_playlist")), session)
            .send()
            .await
            .map_err(ApiError::from_send)?;
        expect_success(response).await?;
        info!("playlist replace requested");
        Ok(())
    }

    pub async fn fetch_playlists(&self, session: &Session) -> Result<Vec<Playlist>> {
        let response = self
            .authed(self.http.get(self.url("/playlists")), session)
            .send()
            .await
            .map_err(ApiError::from_send)?;
        read_json(response, "playlists").await
    }

    /// Choose which playlist `replace_playlist` rewrites.
    pub async fn set_target_playlist(&self, session: &Session, playlist_id: &str) -> Result<()> {
        let url = self.segments_url(&["playlists", playlist_id, "set"])?;
        let response = self
            .authed(self.http.post(url), session)
            .send()
            .await
            .map_err(ApiError::from_send)?;
        expect_success(response).await
    }

    fn authed(&self, builder: RequestBuilder, session: &Session) -> RequestBuilder {
        builder.header(reqwest::header::AUTHORIZATION, session.bearer())
    }
}

async fn expect_success(response: Response) -> Result<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    Err(status_error(response).await)
}

async fn read_json<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(status_error(response).await);
    }
    response
        .json()
        .await
        .map_err(|e| ApiError::Parse(format!("{}: {}", what, e)))
}

async fn status_error(response: Response) -> ApiError {
    let status = response.status().as_u16();
    let message = response.text().await.unwrap_or_default();
    warn!(status, body = %message, "backend returned an error");
    match status {
        401 | 403 => ApiError::Unauthorized { status },
        _ => ApiError::Status { status, message },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_base_urls() {
        let t = Duration::from_secs(1);
        assert!(matches!(ApiClient::new("", t), Err(ApiError::InvalidUrl(_))));
        assert!(matches!(
            ApiClient::new("localhost:8000", t),
            Err(ApiError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = ApiClient::new("http://localhost:8000/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[test]
    fn test_ids_are_encoded_as_single_segments() {
        let client = ApiClient::new("http://localhost:8000/api/", Duration::from_secs(1)).unwrap();
        let url = client.segments_url(&["tracks", "a/b c?"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/tracks/a%2Fb%20c%3F");

        let root = ApiClient::new("http://localhost:8000", Duration::from_secs(1)).unwrap();
        let url = root.segments_url(&["playlists", "p1", "set"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/playlists/p1/set");
    }

    #[test]
    fn test_login_url_encodes_origin() {
        let client = ApiClient::new("http://localhost:8000", Duration::from_secs(1)).unwrap();
        let url = client.login_url("http://127.0.0.1:8765").unwrap();
        assert_eq!(
            url,
            "http://localhost:8000/login?origin=http%3A%2F%2F127.0.0.1%3A8765"
        );
    }
}
