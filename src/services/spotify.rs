//! Spotify adapter — OAuth code exchange, profile fetch, playlist reads.
//!
//! DESIGN
//! ======
//! Thin HTTP wrapper over the accounts service and the Web API. Response
//! decoding lives in pure `parse_*` functions so it can be tested without a
//! network. Playlist reads sit behind the [`PlaylistSource`] trait so the
//! sampler can run against a mock.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::HttpTimeouts;

const AUTHORIZE_URL: &str = "https://accounts.spotify.com/authorize";
const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const SCOPES: &str = "user-read-private user-read-email playlist-read-private";

// =============================================================================
// CONFIG
// =============================================================================

/// Spotify OAuth client registration loaded from environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

impl SpotifyConfig {
    /// Load from `SPOTIFY_CLIENT_ID`, `SPOTIFY_CLIENT_SECRET`, `SPOTIFY_REDIRECT_URI`.
    /// Returns `None` if any are missing (login will be disabled).
    #[must_use]
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let client_id = lookup("SPOTIFY_CLIENT_ID")?;
        let client_secret = lookup("SPOTIFY_CLIENT_SECRET")?;
        let redirect_uri = lookup("SPOTIFY_REDIRECT_URI")?;
        Some(Self { client_id, client_secret, redirect_uri })
    }

    /// Build the Spotify authorization URL carrying the CSRF `state`.
    ///
    /// # Errors
    ///
    /// Returns an error if the authorize endpoint cannot be parsed.
    pub fn authorize_url(&self, state: &str) -> Result<reqwest::Url, SpotifyError> {
        reqwest::Url::parse_with_params(
            AUTHORIZE_URL,
            &[
                ("client_id", self.client_id.as_str()),
                ("response_type", "code"),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("scope", SCOPES),
                ("state", state),
            ],
        )
        .map_err(|e| SpotifyError::InvalidUrl(e.to_string()))
    }
}

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SpotifyError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
    #[error("spotify token exchange failed: {0}")]
    TokenExchange(String),
    #[error("spotify request failed: {0}")]
    ApiRequest(String),
    #[error("spotify api error: status {status}")]
    ApiResponse { status: u16, body: String },
    #[error("spotify response parse failed: {0}")]
    ApiParse(String),
}

// =============================================================================
// DOMAIN TYPES
// =============================================================================

/// Read-only playlist render data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    /// First cover image, if Spotify returned one.
    pub image_url: Option<String>,
    /// `external_urls.spotify` link opened from the gallery.
    pub external_url: String,
}

/// Profile of the logged-in Spotify account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpotifyUser {
    pub id: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub followers: u64,
}

/// Read capability over the current user's playlists.
#[async_trait::async_trait]
pub trait PlaylistSource: Send + Sync {
    async fn current_user_playlists(&self, access_token: &str) -> Result<Vec<Playlist>, SpotifyError>;
}

// =============================================================================
// CLIENT
// =============================================================================

pub struct SpotifyClient {
    http: reqwest::Client,
    api_base_url: String,
}

impl SpotifyClient {
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(api_base_url: impl Into<String>, timeouts: HttpTimeouts) -> Result<Self, SpotifyError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| SpotifyError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, api_base_url: api_base_url.into() })
    }

    /// Exchange an OAuth authorization code for an access token.
    pub async fn exchange_code(&self, config: &SpotifyConfig, code: &str) -> Result<String, SpotifyError> {
        let resp = self
            .http
            .post(TOKEN_URL)
            .basic_auth(&config.client_id, Some(&config.client_secret))
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", config.redirect_uri.as_str()),
            ])
            .send()
            .await
            .map_err(|e| SpotifyError::TokenExchange(e.to_string()))?;

        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| SpotifyError::TokenExchange(e.to_string()))?;
        if !(200..300).contains(&status) {
            return Err(SpotifyError::TokenExchange(format!("status {status}: {body}")));
        }
        parse_token(&body)
    }

    /// Fetch the profile behind `access_token` (`GET /v1/me`).
    pub async fn fetch_profile(&self, access_token: &str) -> Result<SpotifyUser, SpotifyError> {
        let body = self.get_authorized("/v1/me", access_token).await?;
        parse_profile(&body)
    }

    async fn get_authorized(&self, path: &str, access_token: &str) -> Result<String, SpotifyError> {
        let resp = self
            .http
            .get(format!("{}{path}", self.api_base_url))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| SpotifyError::ApiRequest(e.to_string()))?;

        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| SpotifyError::ApiRequest(e.to_string()))?;
        if !(200..300).contains(&status) {
            return Err(SpotifyError::ApiResponse { status, body });
        }
        Ok(body)
    }
}

#[async_trait::async_trait]
impl PlaylistSource for SpotifyClient {
    async fn current_user_playlists(&self, access_token: &str) -> Result<Vec<Playlist>, SpotifyError> {
        let body = self.get_authorized("/v1/me/playlists", access_token).await?;
        parse_playlists(&body)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct ImageObject {
    url: String,
}

#[derive(Deserialize)]
struct ExternalUrls {
    spotify: String,
}

#[derive(Deserialize)]
struct PlaylistPage {
    items: Vec<Option<PlaylistObject>>,
}

#[derive(Deserialize)]
struct PlaylistObject {
    id: String,
    name: String,
    #[serde(default)]
    images: Option<Vec<ImageObject>>,
    external_urls: ExternalUrls,
}

#[derive(Deserialize)]
struct Followers {
    total: u64,
}

#[derive(Deserialize)]
struct ProfileObject {
    id: String,
    display_name: Option<String>,
    #[serde(default)]
    images: Option<Vec<ImageObject>>,
    followers: Option<Followers>,
}

// =============================================================================
// PARSING
// =============================================================================

fn first_image(images: Option<Vec<ImageObject>>) -> Option<String> {
    images.and_then(|imgs| imgs.into_iter().next()).map(|img| img.url)
}

pub(crate) fn parse_token(json: &str) -> Result<String, SpotifyError> {
    let token: TokenResponse =
        serde_json::from_str(json).map_err(|_| SpotifyError::TokenExchange(format!("unexpected response: {json}")))?;
    Ok(token.access_token)
}

/// Decode a `/v1/me/playlists` page, preserving API order. Null items are dropped.
pub(crate) fn parse_playlists(json: &str) -> Result<Vec<Playlist>, SpotifyError> {
    let page: PlaylistPage = serde_json::from_str(json).map_err(|e| SpotifyError::ApiParse(e.to_string()))?;
    Ok(page
        .items
        .into_iter()
        .flatten()
        .map(|p| Playlist {
            id: p.id,
            name: p.name,
            image_url: first_image(p.images),
            external_url: p.external_urls.spotify,
        })
        .collect())
}

pub(crate) fn parse_profile(json: &str) -> Result<SpotifyUser, SpotifyError> {
    let profile: ProfileObject = serde_json::from_str(json).map_err(|e| SpotifyError::ApiParse(e.to_string()))?;
    Ok(SpotifyUser {
        display_name: profile.display_name.unwrap_or_else(|| profile.id.clone()),
        id: profile.id,
        avatar_url: first_image(profile.images),
        followers: profile.followers.map_or(0, |f| f.total),
    })
}

#[cfg(test)]
#[path = "spotify_test.rs"]
mod tests;
