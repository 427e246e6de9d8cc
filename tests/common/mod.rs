//! Shared helpers for the integration tests.
//!
//! - [`init_tracing`] installs a subscriber once, filtered by `RUST_LOG`
//!   (e.g. `RUST_LOG=btree_index::merge=trace`)
//! - [`unique_keys`] produces reproducible key sets from an explicit seed
//! - [`assert_valid`] checks every structural invariant

#![allow(dead_code)]

use std::sync::Once;

use btree_index::BTree;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;

/// Ensures tracing is only initialized once across all tests.
static INIT: Once = Once::new();

/// Initialize a test-friendly tracing subscriber.
///
/// Safe to call multiple times - only the first call takes effect.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// `count` distinct keys drawn from `1..=max_value`, in random order.
///
/// The same `seed` always yields the same sequence.
///
/// # Panics
/// Panics if `count > max_value`.
pub fn unique_keys(seed: u64, count: usize, max_value: u32) -> Vec<u32> {
    assert!(
        count <= max_value as usize,
        "Not enough unique values available"
    );
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut pool: Vec<u32> = (1..=max_value).collect();
    pool.shuffle(&mut rng);
    pool.truncate(count);
    pool
}

/// Fail the test with the violation if `tree` is structurally broken.
pub fn assert_valid<K: Ord>(tree: &BTree<K>) {
    if let Err(violation) = tree.check_invariants() {
        panic!("B-tree invariant violated: {}", violation);
    }
}

/// Smallest `h` with `t^h >= n + 1`, the height bound for `n` keys.
pub fn height_bound(min_degree: usize, keys: usize) -> usize {
    let mut height = 0;
    let mut reach = 1usize;
    while reach < keys + 1 {
        reach = reach.saturating_mul(min_degree);
        height += 1;
    }
    height
}
