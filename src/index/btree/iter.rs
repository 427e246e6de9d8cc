//! In-order iteration over a B-tree.

use std::iter::FusedIterator;

use crate::index::btree::node::Node;

/// Lazy in-order iterator over the keys of a [`BTree`](crate::BTree).
///
/// Holds one `(node, next key index)` frame per level of the current path,
/// so memory use is bounded by the tree height. Created by
/// [`BTree::iter`](crate::BTree::iter); calling that again restarts the
/// traversal from the smallest key.
///
/// # Example
/// ```
/// use btree_index::BTree;
///
/// let mut tree = BTree::new(4).unwrap();
/// for key in [30, 10, 20] {
///     tree.insert(key).unwrap();
/// }
///
/// let keys: Vec<_> = tree.iter().copied().collect();
/// assert_eq!(keys, vec![10, 20, 30]);
/// ```
pub struct Iter<'a, K> {
    stack: Vec<(&'a Node<K>, usize)>,
    remaining: usize,
}

impl<'a, K> Iter<'a, K> {
    pub(crate) fn new(root: Option<&'a Node<K>>, len: usize) -> Self {
        let mut iter = Self {
            stack: Vec::new(),
            remaining: len,
        };
        if let Some(root) = root {
            iter.push_leftmost(root);
        }
        iter
    }

    /// Push `node` and every first child below it.
    fn push_leftmost(&mut self, mut node: &'a Node<K>) {
        loop {
            self.stack.push((node, 0));
            match node.children.first() {
                Some(child) => node = child,
                None => break,
            }
        }
    }
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        loop {
            let frame = self.stack.last_mut()?;
            let node: &'a Node<K> = frame.0;
            let index = frame.1;

            if index < node.keys.len() {
                frame.1 += 1;
                // Everything right of keys[index] comes before keys[index + 1].
                if let Some(child) = node.children.get(index + 1) {
                    self.push_leftmost(child);
                }
                self.remaining = self.remaining.saturating_sub(1);
                return Some(&node.keys[index]);
            }

            self.stack.pop();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K> ExactSizeIterator for Iter<'_, K> {}

impl<K> FusedIterator for Iter<'_, K> {}

impl<K> Clone for Iter<'_, K> {
    fn clone(&self) -> Self {
        Self {
            stack: self.stack.clone(),
            remaining: self.remaining,
        }
    }
}
