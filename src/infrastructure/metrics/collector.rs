use crate::domain::{CollectedMetric, ExporterError, Observation, ObservationSink};
use prometheus::core::Collector;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

/// Sums all the values of a Prometheus collector (`GaugeVec`, `CounterVec`, ...)
///
/// Only works with a top-level vector, not a curried one. Histograms and
/// summaries have no single value and contribute nothing.
pub async fn sum_metric_values<C>(collector: &C) -> f64
where
    C: Collector + ?Sized,
{
    sum_observations(|sink| forward_collected(collector, sink)).await
}

/// Runs `collect` against a fresh sink and sums every observation it sends
///
/// A consumer task drains the channel while `collect` runs on the caller, so a
/// producer never waits on the aggregation. The list is only read after the
/// consumer has returned it, i.e. after the channel was closed and drained.
/// Must be called within a tokio runtime.
pub async fn sum_observations<F>(collect: F) -> f64
where
    F: FnOnce(&ObservationSink),
{
    let (tx, mut rx) = mpsc::unbounded_channel::<Box<dyn Observation>>();

    let consumer = tokio::spawn(async move {
        let mut collected = Vec::with_capacity(100);
        while let Some(observation) = rx.recv().await {
            collected.push(observation);
        }
        collected
    });

    collect(&tx);
    drop(tx);

    let collected = match consumer.await {
        Ok(collected) => collected,
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        Err(e) => {
            warn!("Metric consumer was cancelled, nothing to sum: {}", e);
            Vec::new()
        }
    };

    debug!("Summing {} collected metrics", collected.len());

    collected.iter().map(|observation| value_of(observation.as_ref())).sum()
}

fn value_of(observation: &dyn Observation) -> f64 {
    match observation.write() {
        Ok(value) => value.value(),
        Err(e @ ExporterError::NoScalarPayload(_)) => {
            debug!("Skipping metric '{}': {}", observation.describe(), e);
            0.0
        }
        Err(e) => {
            error!("Failed to read metric '{}': {}", observation.describe(), e);
            0.0
        }
    }
}

fn forward_collected<C>(collector: &C, sink: &ObservationSink)
where
    C: Collector + ?Sized,
{
    for mf in collector.collect() {
        for metric in mf.get_metric() {
            let observation = CollectedMetric::new(mf.get_name(), metric.clone());
            if sink.send(Box::new(observation)).is_err() {
                warn!("Metric sink closed while collecting '{}'", mf.get_name());
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ExporterResult, MetricValue};
    use prometheus::{CounterVec, GaugeVec, HistogramOpts, HistogramVec, Opts};

    struct Broken;

    impl Observation for Broken {
        fn describe(&self) -> String {
            "broken".to_string()
        }

        fn write(&self) -> ExporterResult<MetricValue> {
            Err(ExporterError::Decode("corrupt payload".to_string()))
        }
    }

    #[tokio::test]
    async fn test_sum_gauge_vec() {
        let gauges = GaugeVec::new(Opts::new("queue_depth", "Queue depth"), &["queue"]).unwrap();
        gauges.with_label_values(&["a"]).set(1.5);
        gauges.with_label_values(&["b"]).set(2.5);
        gauges.with_label_values(&["c"]).set(-1.0);

        assert_eq!(sum_metric_values(&gauges).await, 3.0);
    }

    #[tokio::test]
    async fn test_sum_counter_vec() {
        let counters =
            CounterVec::new(Opts::new("requests_total", "Requests"), &["code"]).unwrap();
        counters.with_label_values(&["200"]).inc_by(10.0);
        counters.with_label_values(&["500"]).inc_by(2.0);

        assert_eq!(sum_metric_values(&counters).await, 12.0);
    }

    #[tokio::test]
    async fn test_sum_empty_vec_is_zero() {
        let gauges = GaugeVec::new(Opts::new("idle", "Idle"), &["queue"]).unwrap();
        assert_eq!(sum_metric_values(&gauges).await, 0.0);
    }

    #[tokio::test]
    async fn test_histogram_contributes_zero() {
        let histograms =
            HistogramVec::new(HistogramOpts::new("latency", "Latency"), &["op"]).unwrap();
        histograms.with_label_values(&["read"]).observe(0.5);

        assert_eq!(sum_metric_values(&histograms).await, 0.0);
    }

    #[tokio::test]
    async fn test_decode_failure_does_not_abort() {
        let sum = sum_observations(|sink| {
            let mut gauge = prometheus::proto::Gauge::default();
            gauge.set_value(4.0);
            let mut metric = prometheus::proto::Metric::default();
            metric.set_gauge(gauge);

            sink.send(Box::new(Broken)).unwrap();
            sink.send(Box::new(CollectedMetric::new("ok", metric))).unwrap();
            sink.send(Box::new(Broken)).unwrap();
        })
        .await;

        assert_eq!(sum, 4.0);
    }

    #[tokio::test]
    async fn test_summary_mixed_with_gauges() {
        let sum = sum_observations(|sink| {
            let mut gauge = prometheus::proto::Gauge::default();
            gauge.set_value(1.5);
            let mut scalar = prometheus::proto::Metric::default();
            scalar.set_gauge(gauge);
            let mut summary = prometheus::proto::Metric::default();
            summary.set_summary(prometheus::proto::Summary::default());

            sink.send(Box::new(CollectedMetric::new("rtt", summary))).unwrap();
            sink.send(Box::new(CollectedMetric::new("depth", scalar))).unwrap();
        })
        .await;

        assert_eq!(sum, 1.5);
    }

    #[test]
    fn test_value_of_skips_non_scalar() {
        let mut histogram = prometheus::proto::Metric::default();
        histogram.set_histogram(prometheus::proto::Histogram::default());

        assert_eq!(value_of(&CollectedMetric::new("latency", histogram)), 0.0);
        assert_eq!(value_of(&Broken), 0.0);
    }
}
