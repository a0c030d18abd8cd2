//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Public pages and the OAuth endpoints sit next to gated views. Every gated
//! handler takes the [`auth::Gated`] extractor, so the session gate runs
//! before any handler body. Static assets are served from `STATIC_DIR`.

pub mod auth;
pub mod composer;
pub mod pages;
pub mod playlists;

use std::path::Path;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn app(state: AppState, static_dir: &Path) -> Router {
    Router::new()
        .route("/", get(pages::landing))
        .route("/home", get(pages::home))
        .route("/my-profile", get(pages::profile))
        .route("/my-profile/composer", post(composer::submit))
        .route("/my-profile/composer/images", post(composer::upload_images))
        .route("/my-profile/composer/images/{id}", get(composer::preview_image))
        .route("/auth/spotify", get(auth::spotify_redirect))
        .route("/auth/spotify/callback", get(auth::spotify_callback))
        .route("/api/auth/session", get(auth::session))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/playlists/sample", get(playlists::sample))
        .route("/healthz", get(healthz))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(DefaultBodyLimit::max(composer::COMPOSER_BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
