//! In-memory session store.
//!
//! ARCHITECTURE
//! ============
//! A session is created in `Loading` state when the visitor starts the
//! Spotify login, and promoted to `Authenticated` by the OAuth callback.
//! Anything missing or expired reads back as `Unauthenticated`. The gate
//! and sampler only ever see a [`SessionView`] snapshot; per-session
//! mutable data (sampled playlists, composer draft) is reached through
//! [`SessionStore::with_session`].
//!
//! TRADE-OFFS
//! ==========
//! Sessions are process-local and vanish on restart. Expiry is absolute from
//! creation, so reads never need the write lock.

use std::collections::HashMap;
use std::fmt::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::Rng;
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use super::composer::ComposerDraft;
use super::spotify::{Playlist, SpotifyUser};

/// How long a login may stay between redirect and callback.
pub const PENDING_LOGIN_TTL: Duration = Duration::from_secs(600);

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Generate a cryptographically random 32-byte hex token.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Loading,
    Authenticated,
    Unauthenticated,
}

/// Display fields of the logged-in visitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionUser {
    pub id: String,
    pub name: String,
    pub avatar_url: Option<String>,
    pub followers: u64,
}

impl From<SpotifyUser> for SessionUser {
    fn from(u: SpotifyUser) -> Self {
        Self { id: u.id, name: u.display_name, avatar_url: u.avatar_url, followers: u.followers }
    }
}

/// Read-only snapshot handed to the gate and sampler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    pub status: SessionStatus,
    pub user: Option<SessionUser>,
    #[serde(skip)]
    pub access_token: Option<String>,
}

impl SessionView {
    #[must_use]
    pub fn unauthenticated() -> Self {
        Self { status: SessionStatus::Unauthenticated, user: None, access_token: None }
    }
}

#[derive(Debug)]
pub struct Session {
    pub status: SessionStatus,
    pub oauth_state: Option<String>,
    pub access_token: Option<String>,
    pub user: Option<SessionUser>,
    /// Playlists currently shown in the profile gallery.
    pub playlists: Vec<Playlist>,
    pub draft: ComposerDraft,
    created_at: Instant,
}

impl Session {
    fn pending(oauth_state: String) -> Self {
        Self {
            status: SessionStatus::Loading,
            oauth_state: Some(oauth_state),
            access_token: None,
            user: None,
            playlists: Vec::new(),
            draft: ComposerDraft::default(),
            created_at: Instant::now(),
        }
    }

    fn view(&self) -> SessionView {
        SessionView { status: self.status, user: self.user.clone(), access_token: self.access_token.clone() }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session not found")]
    NotFound,
    #[error("oauth state mismatch")]
    StateMismatch,
    #[error("session is not awaiting login")]
    NotPending,
}

#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    ttl: Duration,
    pending_ttl: Duration,
}

impl SessionStore {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self::with_ttls(ttl, PENDING_LOGIN_TTL)
    }

    #[must_use]
    pub fn with_ttls(ttl: Duration, pending_ttl: Duration) -> Self {
        Self { sessions: Arc::new(RwLock::new(HashMap::new())), ttl, pending_ttl }
    }

    fn is_expired(&self, session: &Session, now: Instant) -> bool {
        let limit = match session.status {
            SessionStatus::Loading => self.pending_ttl,
            _ => self.ttl,
        };
        now.duration_since(session.created_at) >= limit
    }

    /// Start a login. Returns `(session_token, oauth_state)`.
    pub async fn begin_login(&self) -> (String, String) {
        let token = generate_token();
        let oauth_state = generate_token();
        self.sessions
            .write()
            .await
            .insert(token.clone(), Session::pending(oauth_state.clone()));
        (token, oauth_state)
    }

    /// Verify the callback `state` for a pending session without consuming it.
    pub async fn check_login_state(&self, token: &str, state: &str) -> Result<(), SessionError> {
        let sessions = self.sessions.read().await;
        let session = sessions
            .get(token)
            .filter(|s| !self.is_expired(s, Instant::now()))
            .ok_or(SessionError::NotFound)?;
        if session.status != SessionStatus::Loading {
            return Err(SessionError::NotPending);
        }
        match session.oauth_state.as_deref() {
            Some(expected) if !expected.is_empty() && expected == state => Ok(()),
            _ => Err(SessionError::StateMismatch),
        }
    }

    /// Promote a pending session once the provider has issued a token.
    pub async fn complete_login(
        &self,
        token: &str,
        access_token: String,
        user: SessionUser,
    ) -> Result<(), SessionError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(token).ok_or(SessionError::NotFound)?;
        if session.status != SessionStatus::Loading {
            return Err(SessionError::NotPending);
        }
        session.status = SessionStatus::Authenticated;
        session.oauth_state = None;
        session.access_token = Some(access_token);
        session.user = Some(user);
        session.created_at = Instant::now();
        Ok(())
    }

    /// Snapshot of the session behind `token`; missing or expired reads as unauthenticated.
    pub async fn view(&self, token: Option<&str>) -> SessionView {
        let Some(token) = token else {
            return SessionView::unauthenticated();
        };
        let sessions = self.sessions.read().await;
        sessions
            .get(token)
            .filter(|s| !self.is_expired(s, Instant::now()))
            .map_or_else(SessionView::unauthenticated, Session::view)
    }

    /// Run `f` against an authenticated session. `None` if there is none.
    pub async fn with_session<R>(&self, token: &str, f: impl FnOnce(&mut Session) -> R) -> Option<R> {
        let mut sessions = self.sessions.write().await;
        let now = Instant::now();
        let session = sessions
            .get_mut(token)
            .filter(|s| s.status == SessionStatus::Authenticated && !self.is_expired(s, now))?;
        Some(f(session))
    }

    /// Remove a session. Returns whether one existed.
    pub async fn delete(&self, token: &str) -> bool {
        self.sessions.write().await.remove(token).is_some()
    }

    /// Drop expired sessions. Returns how many were removed.
    pub async fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !self.is_expired(s, now));
        before - sessions.len()
    }

    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Spawn the background expiry sweep. Returns a handle for shutdown.
pub fn spawn_sweeper(store: SessionStore, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every.max(Duration::from_secs(1)));
        loop {
            interval.tick().await;
            let removed = store.sweep().await;
            if removed > 0 {
                let remaining = store.count().await;
                tracing::debug!(removed, remaining, "expired sessions swept");
            }
        }
    })
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
