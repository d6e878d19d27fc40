//! Infrastructure layer providing text export, remote push and aggregation
//!
//! This module contains the components that drive a snapshot source or a collector on
//! behalf of the caller.

/// Text dumps and vector metric summation
pub mod metrics;
/// Pushgateway delivery
pub mod push;

pub use metrics::*;
pub use push::*;
