use prometheus::proto::MetricFamily;
use promexporter::{ExporterError, ExporterResult, Gatherer};

/// Snapshot source that always fails to gather
#[derive(Debug, Clone)]
pub struct FailingGatherer {
    reason: String,
}

impl FailingGatherer {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Gatherer for FailingGatherer {
    fn gather(&self) -> ExporterResult<Vec<MetricFamily>> {
        Err(ExporterError::Gather(self.reason.clone()))
    }
}
