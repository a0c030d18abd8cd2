//! Playlist sampling routes.

use axum::extract::State;
use axum::response::Json;

use super::auth::Gated;
use crate::services::sampler::SampleOutcome;
use crate::services::spotify::Playlist;
use crate::state::AppState;

/// Re-sample the gallery for a gated visitor and return the displayed set.
///
/// The fetch runs without holding the session lock; a successful sample is
/// written back afterwards. A failed fetch leaves the stored set alone.
pub(crate) async fn refresh_displayed(state: &AppState, gated: &Gated) -> Vec<Playlist> {
    let mut displayed = state
        .sessions
        .with_session(&gated.token, |s| s.playlists.clone())
        .await
        .unwrap_or_default();

    let outcome = state
        .sampler
        .refresh(gated.view.access_token.as_deref(), &mut displayed)
        .await;

    if let SampleOutcome::Updated(_) = outcome {
        let written = displayed.clone();
        state
            .sessions
            .with_session(&gated.token, move |s| s.playlists = written)
            .await;
    }
    displayed
}

/// `GET /api/playlists/sample` — fresh random sample of the visitor's playlists.
pub async fn sample(State(state): State<AppState>, gated: Gated) -> Json<Vec<Playlist>> {
    Json(refresh_displayed(&state, &gated).await)
}

#[cfg(test)]
#[path = "playlists_test.rs"]
mod tests;
