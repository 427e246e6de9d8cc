//! B-tree node storage and the structural operations on it.
//!
//! Every operation here is top-down: a parent makes sure a child can absorb
//! the change (split before an insert descends, fill before a delete
//! descends), so nothing ever has to report an overflow or underflow back
//! to its caller.

use std::mem;
use std::sync::atomic::Ordering;

use tracing::trace;

use crate::common::BTreeConfig;
use crate::index::btree::BTreeStats;

/// A single B-tree node.
///
/// # Layout
/// ```text
///            keys:  [ k0 ,  k1 ,  k2 ]
///   children:    [c0] [c1] [c2] [c3]
///
///   c0 < k0 < c1 < k1 < c2 < k2 < c3
/// ```
///
/// A leaf has no children. An internal node always has exactly
/// `keys.len() + 1` children. Children are exclusively owned through
/// `Box`, so detaching a child from `children` is the only way a node is
/// ever freed.
#[derive(Debug)]
pub(crate) struct Node<K> {
    pub(crate) keys: Vec<K>,
    pub(crate) children: Vec<Box<Node<K>>>,
}

impl<K: Ord> Node<K> {
    /// Create a leaf holding a single key.
    pub(crate) fn leaf_with(key: K) -> Self {
        Self {
            keys: vec![key],
            children: Vec::new(),
        }
    }

    /// Create an empty internal node whose only child is `child`.
    ///
    /// Used when the tree grows: the new root is immediately given a key by
    /// splitting `child`.
    pub(crate) fn root_over(child: Box<Node<K>>) -> Self {
        Self {
            keys: Vec::new(),
            children: vec![child],
        }
    }

    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    #[inline]
    pub(crate) fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// Locate `key` within this node.
    ///
    /// `Ok(i)` if `keys[i] == key`; otherwise `Err(i)` where `i` is the
    /// index of the smallest key greater than `key`, which is also the
    /// child to descend into.
    #[inline]
    pub(crate) fn find(&self, key: &K) -> Result<usize, usize> {
        self.keys.binary_search(key)
    }

    /// Smallest key in the subtree rooted here.
    pub(crate) fn first_key(&self) -> Option<&K> {
        let mut node = self;
        while let Some(child) = node.children.first() {
            node = child;
        }
        node.keys.first()
    }

    /// Largest key in the subtree rooted here.
    pub(crate) fn last_key(&self) -> Option<&K> {
        let mut node = self;
        while let Some(child) = node.children.last() {
            node = child;
        }
        node.keys.last()
    }

    /// Consume an emptied root, yielding its sole child if it had one.
    ///
    /// A leaf root yields `None`, which leaves the tree empty.
    pub(crate) fn into_only_child(mut self: Box<Self>) -> Option<Box<Node<K>>> {
        debug_assert!(self.keys.is_empty());
        debug_assert!(self.children.len() <= 1);
        self.children.pop()
    }

    // ========================================================================
    // Insertion
    // ========================================================================

    /// Split the full child at `index` around its median.
    ///
    /// ```text
    /// before:  parent [.. a  b ..]          after:  parent [.. a  m  b ..]
    ///                    |                                  |     |
    ///          child  [x x m y y]                    [x x]   [y y]
    /// ```
    ///
    /// The left half keeps `t - 1` keys (and `t` children), the median moves
    /// up to `keys[index]`, and a new right sibling with the remaining
    /// `t - 1` keys (and `t` children) lands at `children[index + 1]`.
    pub(crate) fn split_child(&mut self, index: usize, config: &BTreeConfig, stats: &BTreeStats) {
        let t = config.min_degree();
        let child = &mut self.children[index];
        debug_assert_eq!(child.key_count(), config.max_keys());

        let right_keys = child.keys.split_off(t);
        let right_children = if child.is_leaf() {
            Vec::new()
        } else {
            child.children.split_off(t)
        };
        let median = child.keys.remove(t - 1);
        let leaf = child.is_leaf();

        let sibling = Box::new(Node {
            keys: right_keys,
            children: right_children,
        });

        self.keys.insert(index, median);
        self.children.insert(index + 1, sibling);

        stats.splits.fetch_add(1, Ordering::Relaxed);
        trace!(
            target: "btree_index::split",
            index,
            leaf,
            half = t - 1,
            "split full child"
        );
    }

    /// Insert `key` into the subtree rooted at this non-full node.
    ///
    /// The caller guarantees that this node has room and that `key` is not
    /// already present anywhere in the tree.
    pub(crate) fn insert_non_full(&mut self, key: K, config: &BTreeConfig, stats: &BTreeStats) {
        let mut node = self;
        loop {
            let mut index = match node.find(&key) {
                // Duplicates are rejected before the descent starts.
                Ok(_) => return,
                Err(index) => index,
            };

            if node.is_leaf() {
                node.keys.insert(index, key);
                return;
            }

            if node.children[index].key_count() == config.max_keys() {
                node.split_child(index, config, stats);
                // The promoted median now sits at keys[index]; pick a side.
                if key > node.keys[index] {
                    index += 1;
                }
            }
            node = &mut node.children[index];
        }
    }

    // ========================================================================
    // Deletion
    // ========================================================================

    /// Remove `key` from the subtree rooted here.
    ///
    /// Returns `true` if the key was present. The caller guarantees that
    /// this node holds at least `t` keys, unless it is the root.
    pub(crate) fn remove(&mut self, key: &K, config: &BTreeConfig, stats: &BTreeStats) -> bool {
        match self.find(key) {
            Ok(index) if self.is_leaf() => {
                self.keys.remove(index);
                true
            }
            Ok(index) => {
                self.remove_from_internal(index, config, stats);
                true
            }
            Err(_) if self.is_leaf() => false,
            Err(mut index) => {
                if self.children[index].key_count() < config.min_degree() {
                    self.fill(index, config, stats);
                    // A merge with the left sibling shifts our target down by one.
                    index = index.min(self.key_count());
                }
                self.children[index].remove(key, config, stats)
            }
        }
    }

    /// Remove `keys[index]` from this internal node.
    fn remove_from_internal(&mut self, index: usize, config: &BTreeConfig, stats: &BTreeStats) {
        let t = config.min_degree();

        if self.children[index].key_count() >= t {
            // Replace with the predecessor, pulled out of the left subtree.
            self.keys[index] = self.children[index].pop_last(config, stats);
        } else if self.children[index + 1].key_count() >= t {
            self.keys[index] = self.children[index + 1].pop_first(config, stats);
        } else {
            // Both neighbours are minimal: fold the key down into a merged
            // child and delete it from there.
            self.merge_children(index, stats);
            let merged = &mut self.children[index];
            let position = t - 1;
            debug_assert!(merged.keys.len() > position);
            if merged.is_leaf() {
                merged.keys.remove(position);
            } else {
                merged.remove_from_internal(position, config, stats);
            }
        }
    }

    /// Remove and return the largest key of this subtree.
    ///
    /// Descends the rightmost spine, filling each child before entering it.
    fn pop_last(&mut self, config: &BTreeConfig, stats: &BTreeStats) -> K {
        let mut node = self;
        loop {
            if node.is_leaf() {
                let last = node.keys.len() - 1;
                return node.keys.remove(last);
            }
            let mut index = node.key_count();
            if node.children[index].key_count() < config.min_degree() {
                node.fill(index, config, stats);
                index = node.key_count();
            }
            node = &mut node.children[index];
        }
    }

    /// Remove and return the smallest key of this subtree.
    ///
    /// Descends the leftmost spine, filling each child before entering it.
    fn pop_first(&mut self, config: &BTreeConfig, stats: &BTreeStats) -> K {
        let mut node = self;
        loop {
            if node.is_leaf() {
                return node.keys.remove(0);
            }
            if node.children[0].key_count() < config.min_degree() {
                node.fill(0, config, stats);
            }
            node = &mut node.children[0];
        }
    }

    /// Give the minimal child at `index` a spare key.
    ///
    /// Prefers rotating a key in from a richer sibling; falls back to
    /// merging with the right sibling, or the left one for the last child.
    fn fill(&mut self, index: usize, config: &BTreeConfig, stats: &BTreeStats) {
        let t = config.min_degree();

        if index > 0 && self.children[index - 1].key_count() >= t {
            self.borrow_from_left(index, stats);
        } else if index < self.key_count() && self.children[index + 1].key_count() >= t {
            self.borrow_from_right(index, stats);
        } else if index < self.key_count() {
            self.merge_children(index, stats);
        } else {
            self.merge_children(index - 1, stats);
        }
    }

    /// Rotate the left sibling's last key through the parent into
    /// `children[index]`.
    ///
    /// ```text
    ///        [ .. s .. ]                  [ .. c .. ]
    ///        /        \        ==>        /        \
    ///   [a b c]      [x y]            [a b]      [s x y]
    /// ```
    fn borrow_from_left(&mut self, index: usize, stats: &BTreeStats) {
        let (left, right) = self.children.split_at_mut(index);
        let sibling = &mut left[index - 1];
        let child = &mut right[0];

        let last = sibling.keys.len() - 1;
        let raised = sibling.keys.remove(last);
        let separator = mem::replace(&mut self.keys[index - 1], raised);
        child.keys.insert(0, separator);

        if let Some(grandchild) = sibling.children.pop() {
            child.children.insert(0, grandchild);
        }

        stats.borrows_left.fetch_add(1, Ordering::Relaxed);
        trace!(
            target: "btree_index::borrow",
            index,
            from = "left",
            "rotated key into child"
        );
    }

    /// Rotate the right sibling's first key through the parent into
    /// `children[index]`.
    fn borrow_from_right(&mut self, index: usize, stats: &BTreeStats) {
        let (left, right) = self.children.split_at_mut(index + 1);
        let child = &mut left[index];
        let sibling = &mut right[0];

        let raised = sibling.keys.remove(0);
        let separator = mem::replace(&mut self.keys[index], raised);
        child.keys.push(separator);

        if !sibling.is_leaf() {
            child.children.push(sibling.children.remove(0));
        }

        stats.borrows_right.fetch_add(1, Ordering::Relaxed);
        trace!(
            target: "btree_index::borrow",
            index,
            from = "right",
            "rotated key into child"
        );
    }

    /// Merge `children[index + 1]` and the separator `keys[index]` into
    /// `children[index]`.
    ///
    /// ```text
    ///        [ .. s .. ]
    ///        /        \        ==>     [ .. .. ]
    ///     [a b]      [x y]                 |
    ///                                 [a b s x y]
    /// ```
    ///
    /// The right sibling is detached from `children` and dropped here.
    fn merge_children(&mut self, index: usize, stats: &BTreeStats) {
        let separator = self.keys.remove(index);
        let sibling = self.children.remove(index + 1);
        let Node { keys, children } = *sibling;

        let child = &mut self.children[index];
        child.keys.push(separator);
        child.keys.extend(keys);
        child.children.extend(children);

        stats.merges.fetch_add(1, Ordering::Relaxed);
        trace!(
            target: "btree_index::merge",
            index,
            merged_keys = child.keys.len(),
            "merged sibling into child"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(keys: &[i32]) -> Box<Node<i32>> {
        Box::new(Node {
            keys: keys.to_vec(),
            children: Vec::new(),
        })
    }

    fn internal(keys: &[i32], children: Vec<Box<Node<i32>>>) -> Box<Node<i32>> {
        assert_eq!(children.len(), keys.len() + 1);
        Box::new(Node {
            keys: keys.to_vec(),
            children,
        })
    }

    fn keys_of(node: &Node<i32>) -> Vec<i32> {
        node.keys.clone()
    }

    /// Order 5 / minimum degree 3: nodes hold 2..=5 keys.
    fn config() -> BTreeConfig {
        BTreeConfig::new(5).unwrap()
    }

    #[test]
    fn test_find() {
        let node = leaf(&[10, 20, 30]);
        assert_eq!(node.find(&20), Ok(1));
        assert_eq!(node.find(&5), Err(0));
        assert_eq!(node.find(&25), Err(2));
        assert_eq!(node.find(&40), Err(3));
    }

    #[test]
    fn test_first_and_last_key() {
        let node = internal(&[10], vec![leaf(&[1, 2]), leaf(&[11, 12])]);
        assert_eq!(node.first_key(), Some(&1));
        assert_eq!(node.last_key(), Some(&12));
    }

    #[test]
    fn test_split_leaf_child() {
        let stats = BTreeStats::new();
        let mut root = Node::root_over(leaf(&[1, 2, 3, 4, 5]));

        root.split_child(0, &config(), &stats);

        assert_eq!(keys_of(&root), vec![3]);
        assert_eq!(keys_of(&root.children[0]), vec![1, 2]);
        assert_eq!(keys_of(&root.children[1]), vec![4, 5]);
        assert_eq!(stats.snapshot().splits, 1);
    }

    #[test]
    fn test_split_internal_child_partitions_children() {
        let stats = BTreeStats::new();
        let full = internal(
            &[10, 20, 30, 40, 50],
            (0..6).map(|i| leaf(&[i * 10 + 1, i * 10 + 2])).collect(),
        );
        let mut parent = internal(&[100], vec![full, leaf(&[101, 102])]);

        parent.split_child(0, &config(), &stats);

        assert_eq!(keys_of(&parent), vec![30, 100]);
        let left = &parent.children[0];
        let right = &parent.children[1];
        assert_eq!(keys_of(left), vec![10, 20]);
        assert_eq!(keys_of(right), vec![40, 50]);
        assert_eq!(left.children.len(), 3);
        assert_eq!(right.children.len(), 3);
        assert_eq!(keys_of(&right.children[0]), vec![31, 32]);
    }

    #[test]
    fn test_insert_non_full_splits_on_the_way_down() {
        let stats = BTreeStats::new();
        let mut root = internal(&[10], vec![leaf(&[1, 2, 3, 4, 5]), leaf(&[11, 12])]);

        root.insert_non_full(6, &config(), &stats);

        assert_eq!(keys_of(&root), vec![3, 10]);
        assert_eq!(keys_of(&root.children[1]), vec![4, 5, 6]);
        assert_eq!(stats.snapshot().splits, 1);
    }

    #[test]
    fn test_remove_from_leaf() {
        let stats = BTreeStats::new();
        let mut node = leaf(&[1, 2, 3]);
        assert!(node.remove(&2, &config(), &stats));
        assert_eq!(keys_of(&node), vec![1, 3]);
        assert!(!node.remove(&7, &config(), &stats));
    }

    #[test]
    fn test_remove_internal_uses_predecessor() {
        let stats = BTreeStats::new();
        let mut root = internal(&[10], vec![leaf(&[1, 2, 3]), leaf(&[11, 12])]);

        assert!(root.remove(&10, &config(), &stats));

        assert_eq!(keys_of(&root), vec![3]);
        assert_eq!(keys_of(&root.children[0]), vec![1, 2]);
    }

    #[test]
    fn test_remove_internal_uses_successor() {
        let stats = BTreeStats::new();
        let mut root = internal(&[10], vec![leaf(&[1, 2]), leaf(&[11, 12, 13])]);

        assert!(root.remove(&10, &config(), &stats));

        assert_eq!(keys_of(&root), vec![11]);
        assert_eq!(keys_of(&root.children[1]), vec![12, 13]);
    }

    #[test]
    fn test_remove_internal_merges_minimal_children() {
        let stats = BTreeStats::new();
        let mut root = internal(&[10], vec![leaf(&[1, 2]), leaf(&[11, 12])]);

        assert!(root.remove(&10, &config(), &stats));

        assert!(root.keys.is_empty());
        assert_eq!(root.children.len(), 1);
        assert_eq!(keys_of(&root.children[0]), vec![1, 2, 11, 12]);
        assert_eq!(stats.snapshot().merges, 1);
    }

    #[test]
    fn test_fill_borrows_from_left() {
        let stats = BTreeStats::new();
        let mut root = internal(&[10], vec![leaf(&[1, 2, 3]), leaf(&[11, 12])]);

        assert!(root.remove(&12, &config(), &stats));

        assert_eq!(keys_of(&root), vec![3]);
        assert_eq!(keys_of(&root.children[0]), vec![1, 2]);
        assert_eq!(keys_of(&root.children[1]), vec![10, 11]);
        assert_eq!(stats.snapshot().borrows_left, 1);
    }

    #[test]
    fn test_fill_borrows_from_right() {
        let stats = BTreeStats::new();
        let mut root = internal(&[10], vec![leaf(&[1, 2]), leaf(&[11, 12, 13])]);

        assert!(root.remove(&1, &config(), &stats));

        assert_eq!(keys_of(&root), vec![11]);
        assert_eq!(keys_of(&root.children[0]), vec![2, 10]);
        assert_eq!(keys_of(&root.children[1]), vec![12, 13]);
        assert_eq!(stats.snapshot().borrows_right, 1);
    }

    #[test]
    fn test_fill_borrow_moves_grandchild() {
        let stats = BTreeStats::new();
        let left = internal(
            &[3, 6, 9],
            vec![leaf(&[1, 2]), leaf(&[4, 5]), leaf(&[7, 8]), leaf(&[10, 11])],
        );
        let right = internal(&[30, 40], vec![leaf(&[21, 22]), leaf(&[31, 32]), leaf(&[41, 42])]);
        let mut root = internal(&[20], vec![left, right]);

        assert!(root.remove(&41, &config(), &stats));

        // The rotation hands [10, 11] to the right subtree, whose last two
        // leaves then merge around 40.
        assert_eq!(keys_of(&root), vec![9]);
        assert_eq!(keys_of(&root.children[0]), vec![3, 6]);
        let right = &root.children[1];
        assert_eq!(keys_of(right), vec![20, 30]);
        assert_eq!(right.children.len(), 3);
        assert_eq!(keys_of(&right.children[0]), vec![10, 11]);
        assert_eq!(keys_of(&right.children[2]), vec![31, 32, 40, 42]);
    }

    #[test]
    fn test_fill_last_child_merges_left() {
        let stats = BTreeStats::new();
        let mut root = internal(
            &[10, 20],
            vec![leaf(&[1, 2, 3]), leaf(&[11, 12]), leaf(&[21, 22])],
        );

        assert!(root.remove(&22, &config(), &stats));

        assert_eq!(keys_of(&root), vec![10]);
        assert_eq!(keys_of(&root.children[1]), vec![11, 12, 20, 21]);
        assert_eq!(stats.snapshot().merges, 1);
    }

    #[test]
    fn test_remove_absent_key_from_internal() {
        let stats = BTreeStats::new();
        let mut root = internal(&[10], vec![leaf(&[1, 2, 3]), leaf(&[11, 12, 13])]);

        assert!(!root.remove(&5, &config(), &stats));
        assert_eq!(keys_of(&root), vec![10]);
    }

    #[test]
    fn test_into_only_child() {
        let mut root = internal(&[10], vec![leaf(&[1, 2]), leaf(&[11, 12])]);
        let stats = BTreeStats::new();
        root.remove(&10, &config(), &stats);

        let child = root.into_only_child().unwrap();
        assert_eq!(keys_of(&child), vec![1, 2, 11, 12]);

        let mut lone = leaf(&[1]);
        lone.keys.clear();
        assert!(lone.into_only_child().is_none());
    }
}
