use crate::domain::{ExporterError, ExporterResult, Gatherer, PushConfig};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use prometheus::proto::MetricFamily;
use prometheus::{Encoder, TextEncoder};
use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use std::time::Duration;
use tracing::{debug, error};

/// Transport timeout for [`push_metrics`]; reqwest has no timeout by default
pub const PUSH_METRICS_TIMEOUT: Duration = Duration::from_secs(20);

const JOB_LABEL: &str = "job";

/// Pushes all metrics in the given gatherer to the target gateway
///
/// The URL should contain no path for the official pushgateway. Failures are
/// logged and never returned; retrying is up to the caller.
pub async fn push_metrics<G>(gatherer: &G, url: &str, job: &str)
where
    G: Gatherer + ?Sized,
{
    push_metrics_within(gatherer, url, job, PUSH_METRICS_TIMEOUT).await
}

/// Same as [`push_metrics`], with the transport bounded by `timeout`
pub async fn push_metrics_within<G>(gatherer: &G, url: &str, job: &str, timeout: Duration)
where
    G: Gatherer + ?Sized,
{
    let client = match reqwest::Client::builder().timeout(timeout).build()
    {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to push metrics: {}", e);
            return;
        }
    };

    if let Err(e) = Pusher::new(url, job, gatherer).client(client).push().await {
        error!("Failed to push metrics: {}", e);
    }
}

/// Same as [`push_metrics`], targeting a [`PushConfig`]
pub async fn push_metrics_with<G>(gatherer: &G, config: &PushConfig)
where
    G: Gatherer + ?Sized,
{
    push_metrics(gatherer, &config.url, &config.job).await
}

/// Pushgateway client for a single job
pub struct Pusher<'a, G: ?Sized> {
    url: String,
    job: String,
    gatherer: &'a G,
    client: reqwest::Client,
}

impl<'a, G> Pusher<'a, G>
where
    G: Gatherer + ?Sized,
{
    /// Creates a pusher delivering the whole of `gatherer` to `url` under `job`
    ///
    /// A URL without scheme is taken as `http://`.
    pub fn new(url: impl Into<String>, job: impl Into<String>, gatherer: &'a G) -> Self {
        let mut url = url.into();
        if !url.contains("://") {
            url = format!("http://{}", url);
        }
        Self {
            url: url.trim_end_matches('/').to_string(),
            job: job.into(),
            gatherer,
            client: reqwest::Client::new(),
        }
    }

    /// Replaces the HTTP client used for delivery
    pub fn client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Returns the grouping URL metrics are pushed to
    pub fn full_url(&self) -> ExporterResult<Url> {
        if self.job.is_empty() {
            return Err(ExporterError::InvalidJob("job name is empty".to_string()));
        }

        let mut url = Url::parse(&self.url).map_err(|e| ExporterError::InvalidUrl {
            url: self.url.clone(),
            reason: e.to_string(),
        })?;

        let (key, value) = if self.job.contains('/') {
            (
                format!("{}@base64", JOB_LABEL),
                URL_SAFE_NO_PAD.encode(self.job.as_bytes()),
            )
        } else {
            (JOB_LABEL.to_string(), self.job.clone())
        };

        url.path_segments_mut()
            .map_err(|_| ExporterError::InvalidUrl {
                url: self.url.clone(),
                reason: "URL cannot be a base".to_string(),
            })?
            .pop_if_empty()
            .extend(["metrics", key.as_str(), value.as_str()]);

        Ok(url)
    }

    /// Replaces everything stored under this job with the current snapshot
    pub async fn push(&self) -> ExporterResult<()> {
        let url = self.full_url()?;
        let (family_count, body) = {
            let families = self.gatherer.gather()?;
            (families.len(), encode_for_push(&families)?)
        };

        debug!(
            "Pushing {} metric families ({} bytes) to {}",
            family_count,
            body.len(),
            url
        );

        let response = self
            .client
            .put(url)
            .header(CONTENT_TYPE, TextEncoder::new().format_type())
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExporterError::PushStatus {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

fn encode_for_push(families: &[MetricFamily]) -> ExporterResult<String> {
    for mf in families {
        let has_job_label = mf
            .get_metric()
            .iter()
            .flat_map(|m| m.get_label())
            .any(|l| l.get_name() == JOB_LABEL);
        if has_job_label {
            return Err(ExporterError::GroupingLabelConflict {
                family: mf.get_name().to_string(),
            });
        }
    }

    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(families, &mut buffer)
        .map_err(|source| ExporterError::Encode {
            family: families
                .iter()
                .map(|mf| mf.get_name())
                .collect::<Vec<_>>()
                .join(","),
            source,
        })?;

    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
