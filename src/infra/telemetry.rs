use std::io;
use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::cache::{
    METRIC_QUERY_DEDUP_TOTAL, METRIC_QUERY_FAILURE_TOTAL, METRIC_QUERY_FETCH_MS,
    METRIC_QUERY_FETCH_TOTAL, METRIC_QUERY_RETRY_TOTAL,
};
use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
///
/// Events go to stderr; stdout belongs to the rendered views.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(io::stderr)
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_writer(io::stderr)
            .with_target(true)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

pub fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            METRIC_QUERY_FETCH_TOTAL,
            Unit::Count,
            "Total number of remote fetch attempts issued by the query cache."
        );
        describe_counter!(
            METRIC_QUERY_RETRY_TOTAL,
            Unit::Count,
            "Total number of failed fetch attempts that were retried."
        );
        describe_counter!(
            METRIC_QUERY_DEDUP_TOTAL,
            Unit::Count,
            "Total number of observations that joined an in-flight fetch."
        );
        describe_counter!(
            METRIC_QUERY_FAILURE_TOTAL,
            Unit::Count,
            "Total number of queries that failed after exhausting retries."
        );
        describe_histogram!(
            METRIC_QUERY_FETCH_MS,
            Unit::Milliseconds,
            "Query fetch latency including retries, in milliseconds."
        );
    });
}
