//! Common types shared across the crate.
//!
//! - Configuration constants and [`BTreeConfig`]
//! - Error types

pub mod config;
pub mod error;

pub use config::BTreeConfig;
pub use error::{Error, Result};
