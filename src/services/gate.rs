//! Session gate — decides what a protected view shows for a session status.
//!
//! The gate reads session state through [`SessionSource`] and never writes
//! it. Each request is one pass through [`evaluate`]; nothing is remembered
//! between passes.

use super::session::{SessionStatus, SessionStore, SessionUser, SessionView};

/// Where unauthenticated visitors are sent.
pub const LANDING_PATH: &str = "/";

/// Read-only access to the visitor's session.
#[async_trait::async_trait]
pub trait SessionSource: Send + Sync {
    async fn session(&self, token: Option<&str>) -> SessionView;
}

#[async_trait::async_trait]
impl SessionSource for SessionStore {
    async fn session(&self, token: Option<&str>) -> SessionView {
        self.view(token).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// Status not yet known; show a placeholder.
    Loading,
    /// Navigate away.
    Redirect(&'static str),
    /// Authenticated but no session data; show nothing.
    Empty,
    /// Show the wrapped view for this user.
    Render(SessionUser),
}

#[must_use]
pub fn evaluate(view: &SessionView) -> GateOutcome {
    match view.status {
        SessionStatus::Loading => GateOutcome::Loading,
        SessionStatus::Unauthenticated => GateOutcome::Redirect(LANDING_PATH),
        SessionStatus::Authenticated => view
            .user
            .clone()
            .map_or(GateOutcome::Empty, GateOutcome::Render),
    }
}

/// Look up the session and evaluate it. Returns the snapshot used.
pub async fn check(source: &dyn SessionSource, token: Option<&str>) -> (GateOutcome, SessionView) {
    let view = source.session(token).await;
    (evaluate(&view), view)
}

#[cfg(test)]
#[path = "gate_test.rs"]
mod tests;
