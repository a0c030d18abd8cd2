//! Playlist sampler — pick a few random playlists for the profile gallery.
//!
//! DESIGN
//! ======
//! The shuffle is a pure function over an injected RNG so tests can pin a
//! seed. [`PlaylistSampler`] owns the fetch-shuffle-truncate step; callers
//! own the displayed set and hand it in by `&mut`, which keeps the
//! "failure leaves the previous set untouched" rule local to one function.
//!
//! TRADE-OFFS
//! ==========
//! No cancellation, retry or in-flight de-duplication. Two overlapping
//! refreshes for the same session both write back; the last one wins.

use std::sync::{Arc, Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::spotify::{Playlist, PlaylistSource};

/// Number of playlists shown in the profile gallery.
pub const SAMPLE_SIZE: usize = 4;

/// Unbiased Fisher–Yates permutation.
pub fn shuffle<T, R: Rng + ?Sized>(mut items: Vec<T>, rng: &mut R) -> Vec<T> {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
    items
}

/// Shuffle, then keep the first `min(count, len)` items.
pub fn sample<T, R: Rng + ?Sized>(items: Vec<T>, count: usize, rng: &mut R) -> Vec<T> {
    let mut shuffled = shuffle(items, rng);
    shuffled.truncate(count);
    shuffled
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleOutcome {
    /// No access credential; nothing was fetched.
    Skipped,
    /// Displayed set replaced with this many playlists.
    Updated(usize),
    /// Fetch failed; displayed set left as it was.
    Failed,
}

pub struct PlaylistSampler {
    source: Arc<dyn PlaylistSource>,
    rng: Mutex<StdRng>,
}

impl PlaylistSampler {
    /// Sampler seeded from the operating system.
    #[must_use]
    pub fn new(source: Arc<dyn PlaylistSource>) -> Self {
        Self { source, rng: Mutex::new(StdRng::from_os_rng()) }
    }

    /// Sampler with a fixed seed, for reproducible ordering.
    #[must_use]
    pub fn with_seed(source: Arc<dyn PlaylistSource>, seed: u64) -> Self {
        Self { source, rng: Mutex::new(StdRng::seed_from_u64(seed)) }
    }

    /// Fetch the credential owner's playlists and replace `displayed` with a
    /// random sample of at most [`SAMPLE_SIZE`].
    pub async fn refresh(&self, credential: Option<&str>, displayed: &mut Vec<Playlist>) -> SampleOutcome {
        let Some(token) = credential else {
            return SampleOutcome::Skipped;
        };

        let playlists = match self.source.current_user_playlists(token).await {
            Ok(p) => p,
            Err(e) => {
                tracing::error!(error = %e, "error fetching playlists");
                return SampleOutcome::Failed;
            }
        };

        let total = playlists.len();
        let picked = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            sample(playlists, SAMPLE_SIZE, &mut *rng)
        };
        tracing::debug!(total, shown = picked.len(), "sampled playlists");

        let shown = picked.len();
        *displayed = picked;
        SampleOutcome::Updated(shown)
    }
}

#[cfg(test)]
#[path = "sampler_test.rs"]
mod tests;
