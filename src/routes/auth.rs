//! Auth routes — Spotify OAuth flow, session cookie, session gate extractor.

use axum::extract::{FromRef, FromRequestParts, Query, State};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{Html, IntoResponse, Json, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use time::Duration;

use crate::render::LOADING_HTML;
use crate::services::gate::{self, GateOutcome};
use crate::services::session::{SessionError, SessionUser, SessionView};
use crate::state::AppState;

pub(crate) const COOKIE_NAME: &str = "session_token";

pub(crate) fn session_token(jar: &CookieJar) -> Option<String> {
    jar.get(COOKIE_NAME)
        .map(Cookie::value)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

fn cleared_session_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::ZERO)
        .build()
}

pub(crate) fn session_error_to_status(err: &SessionError) -> StatusCode {
    match err {
        SessionError::NotFound | SessionError::StateMismatch => StatusCode::UNAUTHORIZED,
        SessionError::NotPending => StatusCode::CONFLICT,
    }
}

// =============================================================================
// GATE EXTRACTOR
// =============================================================================

/// Visitor that passed the session gate.
/// Use as a handler parameter to protect a view.
pub struct Gated {
    pub user: SessionUser,
    pub view: SessionView,
    pub token: String,
}

/// What a protected view shows instead when the gate does not open.
#[derive(Debug, PartialEq, Eq)]
pub enum GateRejection {
    Loading,
    Redirect(&'static str),
    Empty,
}

impl IntoResponse for GateRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Loading => Html(LOADING_HTML).into_response(),
            Self::Redirect(path) => Redirect::temporary(path).into_response(),
            Self::Empty => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for Gated
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = GateRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = session_token(&jar);

        let app_state = AppState::from_ref(state);
        let (outcome, view) = gate::check(&app_state.sessions, token.as_deref()).await;
        match outcome {
            GateOutcome::Render(user) => Ok(Self { user, view, token: token.unwrap_or_default() }),
            GateOutcome::Loading => Err(GateRejection::Loading),
            GateOutcome::Redirect(path) => Err(GateRejection::Redirect(path)),
            GateOutcome::Empty => Err(GateRejection::Empty),
        }
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `GET /auth/spotify` — open a pending session and redirect to Spotify.
pub async fn spotify_redirect(State(state): State<AppState>, jar: CookieJar) -> Response {
    let Some(spotify) = &state.spotify else {
        return (StatusCode::SERVICE_UNAVAILABLE, "Spotify login not configured").into_response();
    };

    if let Some(previous) = session_token(&jar) {
        state.sessions.delete(&previous).await;
    }

    let (token, oauth_state) = state.sessions.begin_login().await;
    let url = match spotify.config.authorize_url(&oauth_state) {
        Ok(url) => url,
        Err(e) => {
            tracing::error!(error = %e, "failed to build authorize url");
            state.sessions.delete(&token).await;
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let jar = jar.add(session_cookie(token, state.cookie_secure));
    (jar, Redirect::temporary(url.as_str())).into_response()
}

#[derive(Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

/// `GET /auth/spotify/callback` — exchange code, load profile, authenticate session.
pub async fn spotify_callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<CallbackQuery>,
) -> Response {
    let Some(spotify) = &state.spotify else {
        return (StatusCode::SERVICE_UNAVAILABLE, "Spotify login not configured").into_response();
    };
    let secure = state.cookie_secure;

    let Some(token) = session_token(&jar) else {
        return (StatusCode::UNAUTHORIZED, "missing session").into_response();
    };

    if let Some(error) = params.error.as_deref() {
        tracing::warn!(error, "spotify authorization declined");
        state.sessions.delete(&token).await;
        let jar = jar.add(cleared_session_cookie(secure));
        return (jar, Redirect::temporary("/")).into_response();
    }

    // Verify OAuth CSRF state against the pending session.
    let Some(callback_state) = params.state.as_deref() else {
        return (StatusCode::BAD_REQUEST, "missing oauth state").into_response();
    };
    if let Err(e) = state.sessions.check_login_state(&token, callback_state).await {
        tracing::warn!(error = %e, "oauth state check failed");
        return (session_error_to_status(&e), "invalid oauth state").into_response();
    }
    let Some(code) = params.code.as_deref() else {
        return (StatusCode::BAD_REQUEST, "missing code").into_response();
    };

    let access_token = match spotify.client.exchange_code(&spotify.config, code).await {
        Ok(t) => t,
        Err(e) => {
            tracing::error!(error = %e, "oauth code exchange failed");
            state.sessions.delete(&token).await;
            return (StatusCode::BAD_GATEWAY, "OAuth code exchange failed").into_response();
        }
    };

    let profile = match spotify.client.fetch_profile(&access_token).await {
        Ok(p) => p,
        Err(e) => {
            tracing::error!(error = %e, "spotify profile fetch failed");
            state.sessions.delete(&token).await;
            return (StatusCode::BAD_GATEWAY, "Failed to fetch Spotify profile").into_response();
        }
    };

    if let Err(e) = state
        .sessions
        .complete_login(&token, access_token, profile.into())
        .await
    {
        tracing::error!(error = %e, "session completion failed");
        return session_error_to_status(&e).into_response();
    }

    tracing::info!("spotify login completed");
    Redirect::temporary("/home").into_response()
}

/// `GET /api/auth/session` — read-only session status for the visitor.
pub async fn session(State(state): State<AppState>, jar: CookieJar) -> Json<SessionView> {
    let token = session_token(&jar);
    Json(state.sessions.view(token.as_deref()).await)
}

/// `POST /api/auth/logout` — delete session, clear cookie, go to the landing page.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    if let Some(token) = session_token(&jar) {
        state.sessions.delete(&token).await;
    }
    let jar = jar.add(cleared_session_cookie(state.cookie_secure));
    (jar, Redirect::to("/"))
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
