// Telemetry module for structured logging and metrics

use anyhow::Result;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::models::MigrationStatus;

/// Initialize structured logging with JSON formatting
///
/// This function sets up the tracing subscriber with:
/// - JSON formatting for structured logs
/// - Span context in all log entries
/// - Log levels from configuration or environment
#[tracing::instrument(skip_all)]
pub fn init_logging(log_level: &str) -> Result<()> {
    // Create environment filter from log level
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .map_err(|e| anyhow::anyhow!("Failed to create env filter: {}", e))?;

    // Create JSON formatting layer with span context
    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_filter(env_filter);

    tracing_subscriber::registry()
        .with(json_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing subscriber: {}", e))?;

    tracing::info!(
        log_level = log_level,
        "Structured logging initialized with JSON formatting"
    );

    Ok(())
}

/// Initialize Prometheus metrics exporter
///
/// This function sets up the Prometheus metrics exporter and registers all metrics:
/// - migration_verdict_total: Counter for verdicts by status
/// - translation_failure_total: Counter for schedule translation failures by kind
/// - unit_classification_duration_seconds: Histogram for per-unit classification time
#[tracing::instrument(skip_all)]
pub fn init_metrics(metrics_port: u16) -> Result<()> {
    let addr: SocketAddr = format!("0.0.0.0:{}", metrics_port)
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid metrics port: {}", e))?;

    // Build and install the Prometheus exporter
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus exporter: {}", e))?;

    // Describe all metrics for better Prometheus integration
    describe_counter!(
        "migration_verdict_total",
        "Total number of migration verdicts by status"
    );
    describe_counter!(
        "translation_failure_total",
        "Total number of schedule translation failures by kind"
    );
    describe_histogram!(
        "unit_classification_duration_seconds",
        "Time spent classifying a single analysis unit in seconds"
    );

    tracing::info!(
        metrics_port = metrics_port,
        metrics_endpoint = format!("http://0.0.0.0:{}/metrics", metrics_port),
        "Prometheus metrics exporter initialized"
    );

    Ok(())
}

/// Record one migration verdict
///
/// Increments the migration_verdict_total counter
#[inline]
pub fn record_verdict(status: MigrationStatus) {
    counter!("migration_verdict_total", "status" => status.to_string()).increment(1);
}

/// Record one schedule translation failure
///
/// Increments the translation_failure_total counter
#[inline]
pub fn record_translation_failure(kind: &'static str) {
    counter!("translation_failure_total", "kind" => kind).increment(1);
}

/// Record the time spent classifying a single unit
///
/// Records the duration in the unit_classification_duration_seconds histogram
#[inline]
pub fn record_classification_duration(duration: Duration) {
    histogram!("unit_classification_duration_seconds").record(duration.as_secs_f64());
}
