//! Page routes — landing, dashboard and profile.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use super::auth::Gated;
use super::playlists::refresh_displayed;
use crate::render::{HomePage, LandingPage, ProfilePage, UserCard};
use crate::services::spotify::Playlist;
use crate::state::AppState;

fn render_or_500<T: serde::Serialize>(state: &AppState, page: &str, context: &T) -> Response {
    match state.renderer.render(page, context) {
        Ok(html) => html.into_response(),
        Err(e) => {
            tracing::error!(error = %e, page, "template render failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// `GET /` — public landing page.
pub async fn landing(State(state): State<AppState>) -> Response {
    render_or_500(&state, "landing", &LandingPage { login_enabled: state.spotify.is_some() })
}

/// `GET /home` — gated dashboard.
pub async fn home(State(state): State<AppState>, gated: Gated) -> Response {
    render_or_500(&state, "home", &HomePage { user: UserCard::from(&gated.user) })
}

#[derive(Debug, Default, Deserialize)]
pub struct ProfileQuery {
    /// Present when returning from a composer action.
    composer: Option<String>,
}

/// `GET /my-profile` — gated profile. A visit re-samples the gallery; a
/// return from the composer shows the set already on display.
pub async fn profile(State(state): State<AppState>, gated: Gated, Query(query): Query<ProfileQuery>) -> Response {
    let playlists = if query.composer.is_some() {
        stored_playlists(&state, &gated).await
    } else {
        refresh_displayed(&state, &gated).await
    };
    render_profile(&state, &gated, &playlists, None).await
}

async fn stored_playlists(state: &AppState, gated: &Gated) -> Vec<Playlist> {
    state
        .sessions
        .with_session(&gated.token, |s| s.playlists.clone())
        .await
        .unwrap_or_default()
}

/// Render the profile page around the session's current draft.
pub(crate) async fn render_profile_with_error(state: &AppState, gated: &Gated, error: String) -> Response {
    let playlists = stored_playlists(state, gated).await;
    let mut response = render_profile(state, gated, &playlists, Some(error)).await;
    *response.status_mut() = StatusCode::UNPROCESSABLE_ENTITY;
    response
}

async fn render_profile(
    state: &AppState,
    gated: &Gated,
    playlists: &[Playlist],
    error: Option<String>,
) -> Response {
    let page = state
        .sessions
        .with_session(&gated.token, |s| ProfilePage::new(&gated.user, playlists, &s.draft, error))
        .await;
    match page {
        Some(page) => render_or_500(state, "profile", &page),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

#[cfg(test)]
#[path = "pages_test.rs"]
mod tests;
