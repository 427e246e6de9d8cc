//! The public B-tree type.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::Ordering;

use tracing::debug;

use crate::common::{BTreeConfig, Error, Result};
use crate::index::btree::node::Node;
use crate::index::btree::validate::{self, InvariantViolation};
use crate::index::btree::{BTreeStats, Iter};

/// An in-memory B-tree holding a set of unique, ordered keys.
///
/// # Architecture
/// ```text
/// ┌───────────────────────────────────────────────────────────┐
/// │                         BTree<K>                          │
/// │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐     │
/// │  │ config       │  │ len          │  │ stats        │     │
/// │  │ order, t     │  │ cached count │  │ atomic ctrs  │     │
/// │  └──────────────┘  └──────────────┘  └──────────────┘     │
/// │  ┌─────────────────────────────────────────────────────┐  │
/// │  │ root: Option<Box<Node<K>>>                          │  │
/// │  │   └─ Node { keys: Vec<K>, children: Vec<Box<..>> }  │  │
/// │  └─────────────────────────────────────────────────────┘  │
/// └───────────────────────────────────────────────────────────┘
/// ```
///
/// Insertion splits full nodes on the way down and deletion fills minimal
/// nodes on the way down, so every operation is a single root-to-leaf pass.
/// The height only changes at the root: it grows when a full root is split
/// and shrinks when a root loses its last key.
///
/// # Duplicates
/// Keys are unique. Inserting a key that is already present returns
/// [`Error::DuplicateKey`] and leaves the tree untouched.
///
/// # Usage
/// ```
/// use btree_index::BTree;
///
/// let mut tree = BTree::new(5)?;
/// for key in [10, 20, 5, 6, 12, 30, 7, 17] {
///     tree.insert(key)?;
/// }
///
/// assert!(tree.search(&17));
/// assert!(!tree.search(&8));
///
/// assert!(tree.delete(&6));
/// assert!(!tree.delete(&6));
///
/// let keys: Vec<_> = tree.iter().copied().collect();
/// assert_eq!(keys, vec![5, 7, 10, 12, 17, 20, 30]);
/// # Ok::<(), btree_index::Error>(())
/// ```
pub struct BTree<K> {
    /// `None` for an empty tree; a present root always holds a key.
    root: Option<Box<Node<K>>>,

    /// Number of keys stored.
    len: usize,

    /// Shape parameters (immutable after construction).
    config: BTreeConfig,

    /// Structural operation counters.
    stats: BTreeStats,
}

impl<K: Ord> BTree<K> {
    /// Create an empty tree of the given order.
    ///
    /// # Errors
    /// `Error::InvalidOrder` if `order < 3`.
    pub fn new(order: usize) -> Result<Self> {
        Ok(Self::with_config(BTreeConfig::new(order)?))
    }

    /// Create an empty tree from an already validated config.
    pub fn with_config(config: BTreeConfig) -> Self {
        debug!(
            order = config.order(),
            min_degree = config.min_degree(),
            max_keys = config.max_keys(),
            "created b-tree"
        );
        Self {
            root: None,
            len: 0,
            config,
            stats: BTreeStats::new(),
        }
    }

    /// Build a tree by inserting every key from `keys` in order.
    ///
    /// # Errors
    /// - `Error::InvalidOrder` if `order < 3`
    /// - `Error::DuplicateKey` if `keys` yields the same key twice
    pub fn from_keys<I>(order: usize, keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = K>,
    {
        let mut tree = Self::new(order)?;
        for key in keys {
            tree.insert(key)?;
        }
        Ok(tree)
    }

    // ========================================================================
    // Public API: Search / Insert / Delete
    // ========================================================================

    /// Return `true` if `key` is stored in the tree.
    ///
    /// Visits one node per level and binary-searches inside each.
    pub fn search(&self, key: &K) -> bool {
        self.stats.searches.fetch_add(1, Ordering::Relaxed);
        self.lookup(key)
    }

    /// Alias of [`search`](Self::search) matching the std collections.
    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.search(key)
    }

    /// Insert `key`.
    ///
    /// # Errors
    /// `Error::DuplicateKey` if `key` is already present; the tree is not
    /// modified.
    pub fn insert(&mut self, key: K) -> Result<()> {
        // Checked up front so a rejected insert never splits anything.
        if self.lookup(&key) {
            return Err(Error::DuplicateKey);
        }

        let root = match self.root.take() {
            None => Box::new(Node::leaf_with(key)),
            Some(mut root) => {
                if root.key_count() == self.config.max_keys() {
                    root = self.grow(root);
                }
                root.insert_non_full(key, &self.config, &self.stats);
                root
            }
        };
        self.root = Some(root);
        self.len += 1;

        debug_assert_eq!(self.check_invariants(), Ok(()));
        Ok(())
    }

    /// Remove `key`.
    ///
    /// Returns `true` if the key was present. Removing an absent key is a
    /// no-op and returns `false`.
    pub fn delete(&mut self, key: &K) -> bool {
        let Some(root) = self.root.as_mut() else {
            return false;
        };

        let removed = root.remove(key, &self.config, &self.stats);
        if root.keys.is_empty() {
            self.collapse_root();
        }
        if removed {
            self.len -= 1;
        }

        debug_assert_eq!(self.check_invariants(), Ok(()));
        removed
    }

    /// Lazy in-order iterator over every key, smallest first.
    pub fn iter(&self) -> Iter<'_, K> {
        Iter::new(self.root.as_deref(), self.len)
    }

    // ========================================================================
    // Public API: Queries
    // ========================================================================

    /// Number of keys stored.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// `true` if the tree holds no keys.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of levels: 0 when empty, 1 for a lone leaf root.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut node = self.root.as_deref();
        while let Some(current) = node {
            height += 1;
            node = current.children.first().map(|child| &**child);
        }
        height
    }

    /// Smallest key, if any.
    pub fn min(&self) -> Option<&K> {
        self.root.as_deref().and_then(Node::first_key)
    }

    /// Largest key, if any.
    pub fn max(&self) -> Option<&K> {
        self.root.as_deref().and_then(Node::last_key)
    }

    /// Order the tree was built with.
    #[inline]
    pub fn order(&self) -> usize {
        self.config.order()
    }

    /// Minimum degree `t`.
    #[inline]
    pub fn min_degree(&self) -> usize {
        self.config.min_degree()
    }

    /// Shape parameters.
    #[inline]
    pub fn config(&self) -> &BTreeConfig {
        &self.config
    }

    /// Structural operation counters.
    pub fn stats(&self) -> &BTreeStats {
        &self.stats
    }

    /// Drop every node, leaving an empty tree with the same config.
    ///
    /// Statistics are kept; use [`BTreeStats::reset`] to clear them.
    pub fn clear(&mut self) {
        debug!(keys = self.len, "cleared b-tree");
        self.root = None;
        self.len = 0;
    }

    // ========================================================================
    // Public API: Visitors
    // ========================================================================

    /// Visit every node depth-first, parents before children.
    ///
    /// `visit(depth, keys)` is called once per node with the root at depth 0.
    /// This is the walk an indented printer needs.
    pub fn visit_preorder<F>(&self, mut visit: F)
    where
        F: FnMut(usize, &[K]),
    {
        let mut stack: Vec<(&Node<K>, usize)> = Vec::new();
        if let Some(root) = self.root.as_deref() {
            stack.push((root, 0));
        }
        while let Some((node, depth)) = stack.pop() {
            visit(depth, &node.keys);
            // Reversed so the leftmost child is popped first.
            for child in node.children.iter().rev() {
                stack.push((&**child, depth + 1));
            }
        }
    }

    /// Visit every node level by level, left to right.
    ///
    /// `visit(level, keys)` is called once per node; all nodes of level `n`
    /// are visited before any node of level `n + 1`.
    pub fn visit_levels<F>(&self, mut visit: F)
    where
        F: FnMut(usize, &[K]),
    {
        let mut queue: VecDeque<(&Node<K>, usize)> = VecDeque::new();
        if let Some(root) = self.root.as_deref() {
            queue.push_back((root, 0));
        }
        while let Some((node, level)) = queue.pop_front() {
            visit(level, &node.keys);
            for child in &node.children {
                queue.push_back((&**child, level + 1));
            }
        }
    }

    /// Check every structural invariant.
    ///
    /// Always `Ok` for a correctly implemented tree; intended for tests and
    /// debug assertions.
    pub fn check_invariants(&self) -> std::result::Result<(), InvariantViolation> {
        validate::check_tree(self.root.as_deref(), &self.config, self.len)
    }

    // ========================================================================
    // Internal helpers
    // ========================================================================

    fn lookup(&self, key: &K) -> bool {
        let mut node = self.root.as_deref();
        while let Some(current) = node {
            match current.find(key) {
                Ok(_) => return true,
                Err(index) => node = current.children.get(index).map(|child| &**child),
            }
        }
        false
    }

    /// Put a new root above the full `root` and split it.
    fn grow(&self, root: Box<Node<K>>) -> Box<Node<K>> {
        let mut new_root = Box::new(Node::root_over(root));
        new_root.split_child(0, &self.config, &self.stats);

        self.stats.root_grows.fetch_add(1, Ordering::Relaxed);
        debug!(keys = self.len, "b-tree grew a new root");
        new_root
    }

    /// Replace a root that lost its last key with its only child, or with
    /// nothing if it was a leaf.
    fn collapse_root(&mut self) {
        if let Some(old_root) = self.root.take() {
            self.root = old_root.into_only_child();

            self.stats.root_collapses.fetch_add(1, Ordering::Relaxed);
            debug!(height = self.height(), "b-tree root collapsed");
        }
    }
}

impl<K: Ord> Default for BTree<K> {
    fn default() -> Self {
        Self::with_config(BTreeConfig::default())
    }
}

impl<'a, K: Ord> IntoIterator for &'a BTree<K> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Iter<'a, K> {
        self.iter()
    }
}

impl<K: Ord + fmt::Debug> fmt::Debug for BTree<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
