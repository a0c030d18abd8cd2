mod config;
mod render;
mod routes;
mod services;
mod state;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::render::Renderer;
use crate::services::sampler::PlaylistSampler;
use crate::services::spotify::{SpotifyClient, SpotifyConfig};
use crate::state::{AppState, SpotifyAuth};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env();

    let client = Arc::new(
        SpotifyClient::new(config.spotify_api_base_url.clone(), config.spotify_timeouts)
            .expect("spotify http client build failed"),
    );

    // Login is optional: without OAuth credentials only the landing page works.
    let spotify = match SpotifyConfig::from_env() {
        Some(spotify_config) => {
            tracing::info!(redirect_uri = %spotify_config.redirect_uri, "spotify login enabled");
            Some(SpotifyAuth { config: spotify_config, client: client.clone() })
        }
        None => {
            tracing::warn!("SPOTIFY_CLIENT_ID/SECRET/REDIRECT_URI not set — login disabled");
            None
        }
    };

    let renderer = Renderer::new().expect("template compilation failed");
    let sampler = PlaylistSampler::new(client);
    let state = AppState::new(&config, sampler, renderer, spotify);

    // Spawn background session expiry.
    let _sweeper = services::session::spawn_sweeper(state.sessions.clone(), config.session_sweep);

    let app = routes::app(state, &config.static_dir);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .expect("failed to bind");

    tracing::info!(port = config.port, "playlist-pulse listening");
    axum::serve(listener, app).await.expect("server failed");
}
