//! Domain layer containing the metric snapshot model
//!
//! This module contains the value types shared by the exporter, the pusher and the
//! aggregator, together with the snapshot source capability they all drive.

/// Snapshot sources and observation sinks
pub mod source;
/// Core types and errors
pub mod types;

pub use source::*;
pub use types::*;
