//! Logging setup and metric descriptions.

use std::sync::Once;

use anyhow::Context;
use metrics::{Unit, describe_counter};
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::Config;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Installs the global tracing subscriber.
///
/// The filter comes from `RUST_LOG` (default `info`). `LOG_FORMAT=json`
/// switches to one JSON object per line with the current span attached.
///
/// # Errors
///
/// Returns an error if the filter does not parse or a subscriber is already
/// installed.
pub fn init_tracing(config: &Config) -> anyhow::Result<()> {
    describe_metrics();

    let env_filter = EnvFilter::try_new(&config.log_level)
        .with_context(|| format!("invalid log filter '{}'", config.log_level))?;

    let fmt_layer = match config.log_format.as_str() {
        "json" => fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .boxed(),
        _ => fmt::layer().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "pipeline_messages_total",
            Unit::Count,
            "Consumed messages by queue and outcome (acked, requeued, dropped)."
        );
        describe_counter!(
            "pipeline_published_total",
            Unit::Count,
            "Messages confirmed by the broker, by queue."
        );
        describe_counter!(
            "pipeline_cache_lookups_total",
            Unit::Count,
            "Product listing cache lookups by result (hit, miss)."
        );
    });
}
