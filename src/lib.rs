//! An in-memory B-tree ordered index.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          btree_index                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │                Index Layer (index/btree/)                │   │
//! │  │   BTree: search · insert · delete · iter · visitors      │   │
//! │  │        ↓ top-down, one root-to-leaf pass per call        │   │
//! │  │   Node: split · borrow (left/right) · merge · fill       │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │                  Common (common/)                        │   │
//! │  │          BTreeConfig + Error / Result                    │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (config, Error)
//! - [`index`] - Index structures (B-tree)
//!
//! # Quick Start
//! ```
//! use btree_index::BTree;
//!
//! let mut tree = BTree::new(4).unwrap();
//! tree.insert(42).unwrap();
//! tree.insert(7).unwrap();
//!
//! assert!(tree.search(&42));
//! assert!(tree.delete(&42));
//! assert_eq!(tree.iter().collect::<Vec<_>>(), vec![&7]);
//! ```

pub mod common;
pub mod index;

// Re-export commonly used items at crate root for convenience
pub use common::config::{DEFAULT_ORDER, MIN_ORDER};
pub use common::{BTreeConfig, Error, Result};

pub use index::btree::{BTree, BTreeStats, InvariantViolation, Iter, StatsSnapshot};
