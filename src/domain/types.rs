use prometheus::proto;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric payload of a single observation
///
/// A collected metric carries exactly one of these, so the variant is the
/// payload kind and there is no way to populate two at once.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    /// Gauge sample
    Gauge(f64),
    /// Counter sample
    Counter(f64),
    /// Untyped sample
    Untyped(f64),
}

impl MetricValue {
    /// Returns the raw numeric value regardless of kind
    pub fn value(&self) -> f64 {
        match self {
            MetricValue::Gauge(v) | MetricValue::Counter(v) | MetricValue::Untyped(v) => *v,
        }
    }

    /// Decodes the payload of a protobuf metric
    ///
    /// Histograms and summaries have no single value and are rejected with
    /// [`ExporterError::NoScalarPayload`].
    pub fn from_proto(metric: &proto::Metric) -> ExporterResult<Self> {
        if metric.has_gauge() {
            Ok(MetricValue::Gauge(metric.get_gauge().get_value()))
        } else if metric.has_counter() {
            Ok(MetricValue::Counter(metric.get_counter().get_value()))
        } else if metric.has_untyped() {
            Ok(MetricValue::Untyped(metric.get_untyped().get_value()))
        } else if metric.has_histogram() {
            Err(ExporterError::NoScalarPayload("histogram"))
        } else if metric.has_summary() {
            Err(ExporterError::NoScalarPayload("summary"))
        } else {
            Err(ExporterError::Decode("metric carries no payload".to_string()))
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Gauge(v) => write!(f, "gauge({})", v),
            MetricValue::Counter(v) => write!(f, "counter({})", v),
            MetricValue::Untyped(v) => write!(f, "untyped({})", v),
        }
    }
}

/// One raw collected metric, as handed to the aggregator
pub trait Observation: Send + 'static {
    /// Human readable identity used in log messages
    fn describe(&self) -> String;

    /// Writes the observation out to its numeric payload
    fn write(&self) -> ExporterResult<MetricValue>;
}

/// A protobuf metric together with the family it was collected under
#[derive(Debug, Clone)]
pub struct CollectedMetric {
    /// Name of the owning metric family
    pub family: String,
    /// The collected sample
    pub metric: proto::Metric,
}

impl CollectedMetric {
    /// Creates a collected metric for the given family
    pub fn new(family: impl Into<String>, metric: proto::Metric) -> Self {
        Self {
            family: family.into(),
            metric,
        }
    }
}

impl Observation for CollectedMetric {
    fn describe(&self) -> String {
        let labels: Vec<String> = self
            .metric
            .get_label()
            .iter()
            .map(|l| format!("{}=\"{}\"", l.get_name(), l.get_value()))
            .collect();
        format!("{}{{{}}}", self.family, labels.join(","))
    }

    fn write(&self) -> ExporterResult<MetricValue> {
        MetricValue::from_proto(&self.metric)
    }
}

/// One line of exposition text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextLine<'a> {
    /// `# HELP` / `# TYPE` and any other line starting with `#`
    Comment(&'a str),
    /// Everything else, including the empty line left by the final newline
    Sample(&'a str),
}

impl<'a> TextLine<'a> {
    /// Classifies a raw line
    pub fn parse(line: &'a str) -> Self {
        if line.starts_with('#') {
            TextLine::Comment(line)
        } else {
            TextLine::Sample(line)
        }
    }

    /// Returns true for comment lines
    pub fn is_comment(&self) -> bool {
        matches!(self, TextLine::Comment(_))
    }

    /// Returns true if the line ends with the literal text `" 0"`
    ///
    /// This is a textual test: `0.0`, `-0` and `0e0` do not match.
    pub fn is_zero_sample(&self) -> bool {
        self.as_str().ends_with(" 0")
    }

    /// Returns the raw line
    pub fn as_str(&self) -> &'a str {
        match self {
            TextLine::Comment(s) | TextLine::Sample(s) => s,
        }
    }
}

/// Filters applied by the text exporter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Only families whose name starts with this are exported
    pub prefix: String,
    /// Drop lines starting with `#`
    pub skip_comments: bool,
    /// Drop sample lines ending with `" 0"`
    pub skip_zero_values: bool,
}

impl ExportOptions {
    /// Creates export options from their parts
    pub fn new(prefix: impl Into<String>, skip_comments: bool, skip_zero_values: bool) -> Self {
        Self {
            prefix: prefix.into(),
            skip_comments,
            skip_zero_values,
        }
    }

    /// Returns true if the family should be exported
    pub fn includes(&self, family_name: &str) -> bool {
        family_name.starts_with(&self.prefix)
    }

    /// Returns true if the line survives the comment and zero-value filters
    pub fn keeps(&self, line: TextLine<'_>) -> bool {
        !((self.skip_comments && line.is_comment())
            || (self.skip_zero_values && line.is_zero_sample()))
    }
}

/// Pushgateway target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushConfig {
    /// Base URL of the gateway, without path
    pub url: String,
    /// Job label the pushed metrics are grouped under
    pub job: String,
}

impl PushConfig {
    /// Creates a push target
    pub fn new(url: impl Into<String>, job: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            job: job.into(),
        }
    }
}

/// Metrics export errors
#[derive(Debug, thiserror::Error)]
pub enum ExporterError {
    /// The snapshot source could not produce metric families
    #[error("Gather error: {0}")]
    Gather(String),

    /// A metric family could not be encoded as text
    #[error("Encode error for '{family}': {source}")]
    Encode {
        /// Family that failed to encode
        family: String,
        /// Underlying encoder error
        #[source]
        source: prometheus::Error,
    },

    /// The job name cannot be used as a push grouping key
    #[error("Invalid job name: {0}")]
    InvalidJob(String),

    /// The gateway URL could not be parsed
    #[error("Invalid gateway URL '{url}': {reason}")]
    InvalidUrl {
        /// URL as supplied
        url: String,
        /// Parser message
        reason: String,
    },

    /// A pushed metric already carries the grouping label
    #[error("Pushed metric '{family}' already contains grouping label 'job'")]
    GroupingLabelConflict {
        /// Offending family
        family: String,
    },

    /// Transport failure, including timeouts
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway answered with a non-success status
    #[error("Unexpected status code {status} while pushing: {body}")]
    PushStatus {
        /// HTTP status returned by the gateway
        status: u16,
        /// Response body, for diagnostics
        body: String,
    },

    /// An observation could not be decoded to a numeric value
    #[error("Decode error: {0}")]
    Decode(String),

    /// The observation is a histogram or summary and has no single value
    #[error("No scalar payload in {0} metric")]
    NoScalarPayload(&'static str),
}

/// Result type for export operations
pub type ExporterResult<T> = Result<T, ExporterError>;
