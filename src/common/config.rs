//! Configuration for B-tree construction.

use crate::common::{Error, Result};

/// Smallest order a tree may be built with.
///
/// An order of 3 gives a minimum degree of 2, the smallest degree for which
/// a split leaves both halves non-empty.
pub const MIN_ORDER: usize = 3;

/// Order used by [`BTreeConfig::default`].
///
/// Minimum degree 3, so each node holds between 2 and 5 keys.
pub const DEFAULT_ORDER: usize = 6;

/// Validated shape parameters of a B-tree.
///
/// # Capacity
/// For an order `b` the minimum degree is `t = ⌈b/2⌉`. Every node holds at
/// most `2t - 1` keys and every non-root node at least `t - 1`:
///
/// ```text
/// order  t  min keys  max keys  max children
/// -----  -  --------  --------  ------------
///   3    2     1         3           4
///   4    2     1         3           4
///   5    3     2         5           6
///   6    3     2         5           6
/// ```
///
/// For even orders `2t - 1 == b - 1`. Odd orders round the capacity up to
/// `b` keys so that a full node always splits into two halves of `t - 1`.
///
/// # Example
/// ```
/// use btree_index::BTreeConfig;
///
/// let config = BTreeConfig::new(5).unwrap();
/// assert_eq!(config.min_degree(), 3);
/// assert_eq!(config.max_keys(), 5);
/// assert_eq!(config.min_keys(), 2);
///
/// assert!(BTreeConfig::new(2).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BTreeConfig {
    order: usize,
}

impl BTreeConfig {
    /// Create a config for the given order.
    ///
    /// # Errors
    /// `Error::InvalidOrder` if `order < MIN_ORDER`.
    pub fn new(order: usize) -> Result<Self> {
        if order < MIN_ORDER {
            return Err(Error::InvalidOrder {
                order,
                min: MIN_ORDER,
            });
        }
        Ok(Self { order })
    }

    /// Order the tree was configured with.
    #[inline]
    pub fn order(&self) -> usize {
        self.order
    }

    /// Minimum degree `t = ⌈order / 2⌉`.
    #[inline]
    pub fn min_degree(&self) -> usize {
        self.order.div_ceil(2)
    }

    /// Maximum keys per node (`2t - 1`).
    #[inline]
    pub fn max_keys(&self) -> usize {
        2 * self.min_degree() - 1
    }

    /// Minimum keys per non-root node (`t - 1`).
    #[inline]
    pub fn min_keys(&self) -> usize {
        self.min_degree() - 1
    }

    /// Maximum children per internal node (`2t`).
    #[inline]
    pub fn max_children(&self) -> usize {
        2 * self.min_degree()
    }
}

impl Default for BTreeConfig {
    fn default() -> Self {
        Self {
            order: DEFAULT_ORDER,
        }
    }
}
