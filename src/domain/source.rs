use crate::domain::types::{ExporterResult, Observation};
use prometheus::proto::MetricFamily;
use prometheus::Registry;
use tokio::sync::mpsc;

/// Sink a collector pushes its raw observations into
pub type ObservationSink = mpsc::UnboundedSender<Box<dyn Observation>>;

/// Snapshot source producing the current metric families on demand
///
/// Families are returned in the order the source defines; callers must not
/// assume they are sorted.
pub trait Gatherer {
    /// Gathers the current metric families
    fn gather(&self) -> ExporterResult<Vec<MetricFamily>>;
}

impl Gatherer for Registry {
    fn gather(&self) -> ExporterResult<Vec<MetricFamily>> {
        Ok(Registry::gather(self))
    }
}

impl<F> Gatherer for F
where
    F: Fn() -> ExporterResult<Vec<MetricFamily>>,
{
    fn gather(&self) -> ExporterResult<Vec<MetricFamily>> {
        self()
    }
}
