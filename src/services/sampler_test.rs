use std::collections::HashSet;
use std::sync::atomic::Ordering;

use super::*;
use crate::state::test_helpers::{MockPlaylists, playlist, playlists};

// =============================================================================
// shuffle / sample
// =============================================================================

#[test]
fn shuffle_is_a_permutation() {
    let mut rng = StdRng::seed_from_u64(7);
    let input: Vec<u32> = (0..50).collect();
    let mut out = shuffle(input.clone(), &mut rng);
    assert_eq!(out.len(), input.len());
    out.sort_unstable();
    assert_eq!(out, input);
}

#[test]
fn shuffle_same_seed_same_order() {
    let input: Vec<u32> = (0..20).collect();
    let a = shuffle(input.clone(), &mut StdRng::seed_from_u64(42));
    let b = shuffle(input, &mut StdRng::seed_from_u64(42));
    assert_eq!(a, b);
}

#[test]
fn shuffle_empty_and_single() {
    let mut rng = StdRng::seed_from_u64(1);
    assert!(shuffle(Vec::<u8>::new(), &mut rng).is_empty());
    assert_eq!(shuffle(vec!['a'], &mut rng), vec!['a']);
}

#[test]
fn sample_five_keeps_four_distinct() {
    let mut rng = StdRng::seed_from_u64(3);
    let source = vec!['A', 'B', 'C', 'D', 'E'];
    for _ in 0..100 {
        let out = sample(source.clone(), SAMPLE_SIZE, &mut rng);
        assert_eq!(out.len(), 4);
        let unique: HashSet<char> = out.iter().copied().collect();
        assert_eq!(unique.len(), 4, "duplicates in {out:?}");
        assert!(out.iter().all(|c| source.contains(c)));
    }
}

#[test]
fn sample_two_keeps_both() {
    let mut rng = StdRng::seed_from_u64(9);
    let out = sample(vec!['A', 'B'], SAMPLE_SIZE, &mut rng);
    let got: HashSet<char> = out.into_iter().collect();
    assert_eq!(got, HashSet::from(['A', 'B']));
}

#[test]
fn sample_empty_is_empty() {
    let mut rng = StdRng::seed_from_u64(9);
    assert!(sample(Vec::<u8>::new(), SAMPLE_SIZE, &mut rng).is_empty());
}

#[test]
fn sample_inclusion_is_roughly_uniform() {
    let mut rng = StdRng::seed_from_u64(2024);
    let trials = 10_000;
    let mut included = [0_u32; 5];
    let mut first = [0_u32; 5];
    for _ in 0..trials {
        let out = sample(vec![0_usize, 1, 2, 3, 4], SAMPLE_SIZE, &mut rng);
        first[out[0]] += 1;
        for idx in out {
            included[idx] += 1;
        }
    }
    // Each element is kept with probability 4/5 and leads with probability 1/5.
    for (idx, count) in included.iter().enumerate() {
        assert!((7_600..=8_400).contains(count), "element {idx} kept {count} times");
    }
    for (idx, count) in first.iter().enumerate() {
        assert!((1_700..=2_300).contains(count), "element {idx} led {count} times");
    }
}

// =============================================================================
// PlaylistSampler::refresh
// =============================================================================

#[tokio::test]
async fn refresh_without_credential_skips_fetch() {
    let source = Arc::new(MockPlaylists::ok(playlists(6)));
    let sampler = PlaylistSampler::with_seed(source.clone(), 1);
    let mut displayed = Vec::new();

    let outcome = sampler.refresh(None, &mut displayed).await;

    assert_eq!(outcome, SampleOutcome::Skipped);
    assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    assert!(displayed.is_empty());
}

#[tokio::test]
async fn refresh_replaces_displayed_with_sample() {
    let all = playlists(6);
    let source = Arc::new(MockPlaylists::ok(all.clone()));
    let sampler = PlaylistSampler::with_seed(source.clone(), 1);
    let mut displayed = vec![playlist("stale")];

    let outcome = sampler.refresh(Some("token"), &mut displayed).await;

    assert_eq!(outcome, SampleOutcome::Updated(4));
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    assert_eq!(source.last_token().as_deref(), Some("token"));
    assert_eq!(displayed.len(), 4);
    assert!(displayed.iter().all(|p| all.contains(p)));
    let ids: HashSet<&str> = displayed.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids.len(), 4);
}

#[tokio::test]
async fn refresh_with_short_list_shows_all() {
    let source = Arc::new(MockPlaylists::ok(playlists(2)));
    let sampler = PlaylistSampler::with_seed(source, 5);
    let mut displayed = Vec::new();

    assert_eq!(sampler.refresh(Some("t"), &mut displayed).await, SampleOutcome::Updated(2));
    assert_eq!(displayed.len(), 2);
}

#[tokio::test]
async fn refresh_failure_keeps_previous_set() {
    let source = Arc::new(MockPlaylists::failing(502));
    let sampler = PlaylistSampler::with_seed(source.clone(), 1);
    let previous = vec![playlist("a"), playlist("b")];
    let mut displayed = previous.clone();

    let outcome = sampler.refresh(Some("token"), &mut displayed).await;

    assert_eq!(outcome, SampleOutcome::Failed);
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    assert_eq!(displayed, previous);
}

#[tokio::test]
async fn refresh_failure_on_fresh_session_stays_empty() {
    let sampler = PlaylistSampler::with_seed(Arc::new(MockPlaylists::failing(500)), 1);
    let mut displayed = Vec::new();
    assert_eq!(sampler.refresh(Some("token"), &mut displayed).await, SampleOutcome::Failed);
    assert!(displayed.is_empty());
}
