//! B-tree structural statistics.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for the structural operations a tree performs.
///
/// Fields are atomic so they can be bumped from `&self` paths such as
/// [`BTree::search`](crate::BTree::search) without interior-mutability
/// cells, and so the tree stays `Sync`.
///
/// # Memory Ordering
/// All operations use `Ordering::Relaxed`: each counter only needs
/// atomicity, never synchronization with another counter.
///
/// # Example
/// ```
/// use btree_index::BTreeStats;
/// use std::sync::atomic::Ordering;
///
/// let stats = BTreeStats::new();
/// stats.splits.fetch_add(1, Ordering::Relaxed);
/// assert_eq!(stats.snapshot().splits, 1);
/// ```
#[derive(Debug)]
pub struct BTreeStats {
    /// Number of `search` calls.
    pub searches: AtomicU64,

    /// Number of full nodes split into two.
    pub splits: AtomicU64,

    /// Number of sibling pairs merged into one node.
    pub merges: AtomicU64,

    /// Number of keys rotated in from a left sibling.
    pub borrows_left: AtomicU64,

    /// Number of keys rotated in from a right sibling.
    pub borrows_right: AtomicU64,

    /// Number of times the tree grew a new root.
    pub root_grows: AtomicU64,

    /// Number of times an empty root was discarded.
    pub root_collapses: AtomicU64,
}

impl BTreeStats {
    /// Create a new stats tracker with all counters at zero.
    pub fn new() -> Self {
        Self {
            searches: AtomicU64::new(0),
            splits: AtomicU64::new(0),
            merges: AtomicU64::new(0),
            borrows_left: AtomicU64::new(0),
            borrows_right: AtomicU64::new(0),
            root_grows: AtomicU64::new(0),
            root_collapses: AtomicU64::new(0),
        }
    }

    /// Get a snapshot of current statistics.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            searches: self.searches.load(Ordering::Relaxed),
            splits: self.splits.load(Ordering::Relaxed),
            merges: self.merges.load(Ordering::Relaxed),
            borrows_left: self.borrows_left.load(Ordering::Relaxed),
            borrows_right: self.borrows_right.load(Ordering::Relaxed),
            root_grows: self.root_grows.load(Ordering::Relaxed),
            root_collapses: self.root_collapses.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        self.searches.store(0, Ordering::Relaxed);
        self.splits.store(0, Ordering::Relaxed);
        self.merges.store(0, Ordering::Relaxed);
        self.borrows_left.store(0, Ordering::Relaxed);
        self.borrows_right.store(0, Ordering::Relaxed);
        self.root_grows.store(0, Ordering::Relaxed);
        self.root_collapses.store(0, Ordering::Relaxed);
    }
}

impl Default for BTreeStats {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time copy of [`BTreeStats`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub searches: u64,
    pub splits: u64,
    pub merges: u64,
    pub borrows_left: u64,
    pub borrows_right: u64,
    pub root_grows: u64,
    pub root_collapses: u64,
}

impl StatsSnapshot {
    /// Total rotations in either direction.
    pub fn borrows(&self) -> u64 {
        self.borrows_left + self.borrows_right
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stats {{ searches: {}, splits: {}, merges: {}, borrows: {}, root_grows: {}, root_collapses: {} }}",
            self.searches,
            self.splits,
            self.merges,
            self.borrows(),
            self.root_grows,
            self.root_collapses
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = BTreeStats::new();
        assert_eq!(stats.snapshot(), StatsSnapshot::default());
    }

    #[test]
    fn test_stats_snapshot() {
        let stats = BTreeStats::new();
        stats.splits.fetch_add(4, Ordering::Relaxed);
        stats.borrows_left.fetch_add(2, Ordering::Relaxed);
        stats.borrows_right.fetch_add(1, Ordering::Relaxed);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.splits, 4);
        assert_eq!(snapshot.borrows(), 3);
    }

    #[test]
    fn test_stats_reset() {
        let stats = BTreeStats::new();
        stats.merges.fetch_add(100, Ordering::Relaxed);
        stats.root_collapses.fetch_add(1, Ordering::Relaxed);

        stats.reset();

        assert_eq!(stats.snapshot(), StatsSnapshot::default());
    }

    #[test]
    fn test_stats_display() {
        let stats = BTreeStats::new();
        stats.splits.fetch_add(7, Ordering::Relaxed);
        stats.merges.fetch_add(3, Ordering::Relaxed);

        let display = format!("{}", stats.snapshot());

        assert!(display.contains("splits: 7"));
        assert!(display.contains("merges: 3"));
        assert!(display.contains("borrows: 0"));
    }
}
