//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own session state, provider calls and the sampling logic
//! so route handlers can stay focused on cookies, gating and rendering.

pub mod composer;
pub mod gate;
pub mod sampler;
pub mod session;
pub mod spotify;
