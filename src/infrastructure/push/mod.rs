//! Pushgateway delivery
//!
//! Pushes whole registry snapshots to a remote gateway on a best-effort basis.

/// Pushgateway client and the fire-and-forget push helper
pub mod gateway;

pub use gateway::*;
