//! Structural invariant checking.
//!
//! A tree that fails these checks has a bug; normal operations never
//! produce a violation. Mutations assert validity in debug builds and the
//! test-suite calls [`BTree::check_invariants`](crate::BTree::check_invariants)
//! after every step.

use thiserror::Error;

use crate::common::BTreeConfig;
use crate::index::btree::node::Node;

/// A broken B-tree invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// A node holds too few or too many keys.
    #[error("node at depth {depth} holds {count} keys, expected {min}..={max}")]
    KeyCount {
        depth: usize,
        count: usize,
        min: usize,
        max: usize,
    },

    /// Keys within a node are not strictly increasing.
    #[error("keys out of order in node at depth {depth}")]
    UnsortedKeys { depth: usize },

    /// A key lies outside the range its parent's separators allow.
    #[error("key outside separator bounds in node at depth {depth}")]
    OutOfBounds { depth: usize },

    /// An internal node does not have exactly one more child than keys.
    #[error("internal node at depth {depth} has {children} children for {keys} keys")]
    ChildCount {
        depth: usize,
        keys: usize,
        children: usize,
    },

    /// Leaves sit at different depths.
    #[error("leaf at depth {depth}, expected every leaf at depth {expected}")]
    UnevenLeaves { depth: usize, expected: usize },

    /// The cached key count disagrees with the keys actually stored.
    #[error("tree reports {reported} keys but holds {actual}")]
    LengthMismatch { reported: usize, actual: usize },
}

/// Walk the whole tree and report the first violation found.
pub(crate) fn check_tree<K: Ord>(
    root: Option<&Node<K>>,
    config: &BTreeConfig,
    len: usize,
) -> Result<(), InvariantViolation> {
    let mut checker = Checker {
        config,
        leaf_depth: None,
        keys_seen: 0,
    };

    if let Some(root) = root {
        checker.check_node(root, 0, None, None)?;
    }

    if checker.keys_seen != len {
        return Err(InvariantViolation::LengthMismatch {
            reported: len,
            actual: checker.keys_seen,
        });
    }
    Ok(())
}

struct Checker<'c> {
    config: &'c BTreeConfig,
    leaf_depth: Option<usize>,
    keys_seen: usize,
}

impl Checker<'_> {
    fn check_node<K: Ord>(
        &mut self,
        node: &Node<K>,
        depth: usize,
        lower: Option<&K>,
        upper: Option<&K>,
    ) -> Result<(), InvariantViolation> {
        // An empty tree has no root at all, so a present root needs a key.
        let min = if depth == 0 { 1 } else { self.config.min_keys() };
        let max = self.config.max_keys();
        let count = node.key_count();
        if count < min || count > max {
            return Err(InvariantViolation::KeyCount {
                depth,
                count,
                min,
                max,
            });
        }

        if node.keys.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(InvariantViolation::UnsortedKeys { depth });
        }

        let below_lower = matches!((lower, node.keys.first()), (Some(lo), Some(first)) if first <= lo);
        let above_upper = matches!((upper, node.keys.last()), (Some(hi), Some(last)) if last >= hi);
        if below_lower || above_upper {
            return Err(InvariantViolation::OutOfBounds { depth });
        }

        self.keys_seen += count;

        if node.is_leaf() {
            return match self.leaf_depth {
                None => {
                    self.leaf_depth = Some(depth);
                    Ok(())
                }
                Some(expected) if expected == depth => Ok(()),
                Some(expected) => Err(InvariantViolation::UnevenLeaves { depth, expected }),
            };
        }

        if node.children.len() != count + 1 {
            return Err(InvariantViolation::ChildCount {
                depth,
                keys: count,
                children: node.children.len(),
            });
        }

        for (i, child) in node.children.iter().enumerate() {
            let child_lower = if i == 0 { lower } else { node.keys.get(i - 1) };
            let child_upper = if i == count { upper } else { node.keys.get(i) };
            self.check_node(child, depth + 1, child_lower, child_upper)?;
        }
        Ok(())
    }
}
