//! Server configuration parsed from environment variables.
//!
//! DESIGN
//! ======
//! Every knob has a default so a bare `cargo run` serves the landing page.
//! Spotify credentials live in `services::spotify::SpotifyConfig` because
//! their absence disables login rather than failing startup.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SESSION_TTL_SECS: u64 = 86_400;
pub const DEFAULT_SESSION_SWEEP_SECS: u64 = 60;
pub const DEFAULT_SPOTIFY_API_BASE_URL: &str = "https://api.spotify.com";
pub const DEFAULT_SPOTIFY_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SPOTIFY_CONNECT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub static_dir: PathBuf,
    /// Explicit `COOKIE_SECURE` override; inferred from the redirect URI when `None`.
    pub cookie_secure: Option<bool>,
    pub session_ttl: Duration,
    pub session_sweep: Duration,
    pub spotify_api_base_url: String,
    pub spotify_timeouts: HttpTimeouts,
}

impl AppConfig {
    /// Build typed config from process environment variables.
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `STATIC_DIR`: default `<crate>/static`
    /// - `COOKIE_SECURE`: `true`/`false`/`1`/`0`/`yes`/`no`/`on`/`off`
    /// - `SESSION_TTL_SECS`: default 86400
    /// - `SESSION_SWEEP_SECS`: default 60
    /// - `SPOTIFY_API_BASE_URL`: default `https://api.spotify.com`
    /// - `SPOTIFY_REQUEST_TIMEOUT_SECS`: default 10
    /// - `SPOTIFY_CONNECT_TIMEOUT_SECS`: default 5
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup. Unparseable values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let static_dir = lookup("STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("static"));
        let spotify_api_base_url = lookup("SPOTIFY_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_SPOTIFY_API_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Self {
            port: parse_or(&lookup, "PORT", DEFAULT_PORT),
            static_dir,
            cookie_secure: lookup("COOKIE_SECURE").as_deref().and_then(parse_bool),
            session_ttl: Duration::from_secs(parse_or(&lookup, "SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS)),
            session_sweep: Duration::from_secs(parse_or(&lookup, "SESSION_SWEEP_SECS", DEFAULT_SESSION_SWEEP_SECS)),
            spotify_api_base_url,
            spotify_timeouts: HttpTimeouts {
                request_secs: parse_or(&lookup, "SPOTIFY_REQUEST_TIMEOUT_SECS", DEFAULT_SPOTIFY_REQUEST_TIMEOUT_SECS),
                connect_secs: parse_or(&lookup, "SPOTIFY_CONNECT_TIMEOUT_SECS", DEFAULT_SPOTIFY_CONNECT_TIMEOUT_SECS),
            },
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + Copy,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse::<T>().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "invalid value, using default");
            default
        }),
        None => default,
    }
}

/// Parse the usual boolean spellings. Returns `None` for anything else.
pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
