//! B-tree index implementation.
//!
//! An in-memory B-tree over unique, ordered keys. All rebalancing happens
//! on the way down:
//! - insert splits any full child before descending into it
//! - delete fills any minimal child (borrow, else merge) before descending
//!
//! # Components
//! - [`BTree`] - The tree and its public operations
//! - [`Iter`] - Lazy in-order traversal
//! - [`BTreeStats`] / [`StatsSnapshot`] - Structural operation counters
//! - [`InvariantViolation`] - Reported by [`BTree::check_invariants`]

mod iter;
mod node;
mod stats;
mod tree;
mod validate;

pub use iter::Iter;
pub use stats::{BTreeStats, StatsSnapshot};
pub use tree::BTree;
pub use validate::InvariantViolation;
