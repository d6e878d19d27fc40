//! # promexporter
//!
//! Small helpers sitting between an in-process Prometheus registry and the outside world:
//! - Filtered text dumps of a registry snapshot (prefix, comments, literal zero values)
//! - Best-effort delivery of a whole registry to a Pushgateway job
//! - Summation of every time series of a vector metric into one value
//!
//! ## Architecture
//!
//! - **Domain**: the snapshot source capability, observation payloads and errors
//! - **Infrastructure**: exporter, pusher and aggregator driving those sources
//! - **Utils**: logger setup for embedding processes
//!
//! ## Concurrency
//!
//! Every call owns its state; nothing is shared between calls. The exporter is
//! synchronous, the pusher and the aggregator run on tokio. The aggregator offloads
//! one consumer task per call and waits for it without a timeout.
//!
//! ## Example
//!
//! ```ignore
//! use prometheus::Registry;
//! use promexporter::*;
//!
//! let registry = Registry::new();
//! let text = dump_metrics_from(&registry, "app_", true, true);
//! push_metrics(&registry, "http://pushgateway:9091", "nightly").await;
//! ```

pub mod domain;
pub mod infrastructure;

/// Utilities for logging
pub mod utils;

pub use domain::{
    source::{Gatherer, ObservationSink},
    types::*,
};

pub use infrastructure::{
    metrics::{
        dump_metrics_for_test, dump_metrics_from, dump_metrics_with, sum_metric_values,
        sum_observations, try_dump_metrics_from,
    },
    push::{push_metrics, push_metrics_with, push_metrics_within, Pusher, PUSH_METRICS_TIMEOUT},
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
