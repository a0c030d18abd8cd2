//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the session store, the playlist sampler, compiled templates and the
//! optional Spotify login wiring. Clone is required by Axum; every field is
//! Arc-wrapped or cheap to clone.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::render::Renderer;
use crate::services::sampler::PlaylistSampler;
use crate::services::session::SessionStore;
use crate::services::spotify::{SpotifyClient, SpotifyConfig};

/// Spotify login wiring. Absent when OAuth env vars are not configured.
#[derive(Clone)]
pub struct SpotifyAuth {
    pub config: SpotifyConfig,
    pub client: Arc<SpotifyClient>,
}

#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    pub sampler: Arc<PlaylistSampler>,
    pub renderer: Arc<Renderer>,
    pub spotify: Option<SpotifyAuth>,
    pub cookie_secure: bool,
}

impl AppState {
    #[must_use]
    pub fn new(
        config: &AppConfig,
        sampler: PlaylistSampler,
        renderer: Renderer,
        spotify: Option<SpotifyAuth>,
    ) -> Self {
        let cookie_secure = config.cookie_secure.unwrap_or_else(|| {
            spotify
                .as_ref()
                .is_some_and(|s| s.config.redirect_uri.starts_with("https://"))
        });
        Self {
            sessions: SessionStore::new(config.session_ttl),
            sampler: Arc::new(sampler),
            renderer: Arc::new(renderer),
            spotify,
            cookie_secure,
        }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::services::session::SessionUser;
    use crate::services::spotify::{Playlist, PlaylistSource, SpotifyError};

    /// Playlist source with a canned answer and a call counter.
    pub struct MockPlaylists {
        result: Result<Vec<Playlist>, u16>,
        pub calls: AtomicUsize,
        tokens: Mutex<Vec<String>>,
    }

    impl MockPlaylists {
        #[must_use]
        pub fn ok(playlists: Vec<Playlist>) -> Self {
            Self { result: Ok(playlists), calls: AtomicUsize::new(0), tokens: Mutex::new(Vec::new()) }
        }

        /// Every call fails with this HTTP status.
        #[must_use]
        pub fn failing(status: u16) -> Self {
            Self { result: Err(status), calls: AtomicUsize::new(0), tokens: Mutex::new(Vec::new()) }
        }

        pub fn last_token(&self) -> Option<String> {
            self.tokens.lock().unwrap().last().cloned()
        }
    }

    #[async_trait::async_trait]
    impl PlaylistSource for MockPlaylists {
        async fn current_user_playlists(&self, access_token: &str) -> Result<Vec<Playlist>, SpotifyError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.tokens.lock().unwrap().push(access_token.to_owned());
            match &self.result {
                Ok(p) => Ok(p.clone()),
                Err(status) => Err(SpotifyError::ApiResponse { status: *status, body: String::new() }),
            }
        }
    }

    #[must_use]
    pub fn playlist(id: &str) -> Playlist {
        Playlist {
            id: id.to_owned(),
            name: format!("Playlist {id}"),
            image_url: Some(format!("https://i.scdn.co/image/{id}")),
            external_url: format!("https://open.spotify.com/playlist/{id}"),
        }
    }

    #[must_use]
    pub fn playlists(n: usize) -> Vec<Playlist> {
        (0..n).map(|i| playlist(&format!("p{i}"))).collect()
    }

    #[must_use]
    pub fn dummy_user() -> SessionUser {
        SessionUser {
            id: "ada".into(),
            name: "Ada".into(),
            avatar_url: Some("https://i.scdn.co/image/ada".into()),
            followers: 34_554,
        }
    }

    /// App state with no Spotify login and the given playlist source.
    #[must_use]
    pub fn test_app_state(source: Arc<MockPlaylists>) -> AppState {
        let renderer = Renderer::new().expect("templates should compile");
        AppState::new(&AppConfig::default(), PlaylistSampler::with_seed(source, 7), renderer, None)
    }

    /// Seed an authenticated session and return its cookie token.
    pub async fn seed_authenticated(state: &AppState, access_token: &str) -> String {
        let (token, _) = state.sessions.begin_login().await;
        state
            .sessions
            .complete_login(&token, access_token.to_owned(), dummy_user())
            .await
            .expect("pending session should complete");
        token
    }
}
