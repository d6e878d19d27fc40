//! Metrics dump and aggregation functionality
//!
//! This module turns registry snapshots into filtered exposition text and folds vector
//! metrics into a single value.

/// Vector metric summation
pub mod collector;
/// Filtered text export
pub mod exporter;

pub use collector::*;
pub use exporter::*;
