use crate::domain::{ExportOptions, ExporterError, ExporterResult, Gatherer, TextLine};
use prometheus::proto::MetricFamily;
use prometheus::{Encoder, TextEncoder};
use tracing::{debug, error};

/// Dumps metrics from the given gatherer in the .prom text format
///
/// Gather and encode failures are fatal: the local registry is expected to
/// always be readable, so there is no partial result to return.
pub fn dump_metrics_from<G>(
    gatherer: &G,
    prefix: &str,
    skip_comments: bool,
    skip_zero_values: bool,
) -> String
where
    G: Gatherer + ?Sized,
{
    dump_metrics_with(
        gatherer,
        &ExportOptions::new(prefix, skip_comments, skip_zero_values),
    )
}

/// Dumps metrics in the .prom text format without comments
///
/// For testing only
pub fn dump_metrics_for_test<G>(gatherer: &G, prefix: &str, skip_zero_values: bool) -> String
where
    G: Gatherer + ?Sized,
{
    dump_metrics_from(gatherer, prefix, true, skip_zero_values)
}

/// Same as [`dump_metrics_from`], driven by an [`ExportOptions`]
pub fn dump_metrics_with<G>(gatherer: &G, options: &ExportOptions) -> String
where
    G: Gatherer + ?Sized,
{
    match try_dump_metrics_from(gatherer, options) {
        Ok(text) => text,
        Err(ExporterError::Encode { family, source }) => {
            error!("Failed to export '{}': {}", family, source);
            panic!("failed to export '{}': {}", family, source);
        }
        Err(e) => {
            error!("Failed to gather metrics: {}", e);
            panic!("failed to gather metrics: {}", e);
        }
    }
}

/// Dumps metrics, returning gather and encode failures instead of panicking
pub fn try_dump_metrics_from<G>(gatherer: &G, options: &ExportOptions) -> ExporterResult<String>
where
    G: Gatherer + ?Sized,
{
    let families = gatherer.gather()?;
    let text = encode_families(&families, options)?;

    let lines: Vec<&str> = text
        .split('\n')
        .map(TextLine::parse)
        .filter(|line| options.keeps(*line))
        .map(|line| line.as_str())
        .collect();

    Ok(lines.join("\n"))
}

fn encode_families(families: &[MetricFamily], options: &ExportOptions) -> ExporterResult<String> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();

    for mf in families {
        if !options.includes(mf.get_name()) {
            continue;
        }
        encoder
            .encode(std::slice::from_ref(mf), &mut buffer)
            .map_err(|source| ExporterError::Encode {
                family: mf.get_name().to_string(),
                source,
            })?;
    }

    debug!(
        "Encoded {} bytes of metrics text with prefix '{}'",
        buffer.len(),
        options.prefix
    );

    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
