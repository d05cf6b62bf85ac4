// Analyzer binary entry point

use timerlift_common::config::Settings;
use timerlift_common::engine::{AnalysisEngine, EngineConfig};
use timerlift_common::intake::{FactSource, JsonFileSource};
use timerlift_common::{sink, telemetry};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let settings = Settings::load()?;
    settings
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    // Initialize tracing with the configured level
    telemetry::init_logging(&settings.observability.log_level)?;
    if let Some(port) = settings.observability.metrics_port {
        telemetry::init_metrics(port)?;
    }

    info!("Starting timer migration analyzer");
    info!(
        facts_path = %settings.intake.facts_path,
        output_path = %settings.report.output_path,
        concurrency = settings.engine.concurrency,
        "Configuration loaded"
    );

    // Load extracted timer facts
    let source = JsonFileSource::new(&settings.intake.facts_path);
    let units = source.load().await.map_err(|e| {
        error!(error = %e, "Failed to load timer facts");
        e
    })?;

    // Open the report sink
    let sink = sink::from_settings(&settings.report).await.map_err(|e| {
        error!(error = %e, "Failed to open report sink");
        e
    })?;

    // Classify every unit and write the reports
    let engine = AnalysisEngine::new(EngineConfig {
        concurrency: settings.engine.concurrency,
        job_group: settings.report.job_group.clone(),
    });
    let summary = engine.run(units, sink).await.map_err(|e| {
        error!(error = %e, "Analysis run failed");
        e
    })?;

    if summary.errors > 0 {
        warn!(errors = summary.errors, "Run finished with per-unit errors");
    }
    info!(
        run_id = %summary.run_id,
        total = summary.total,
        automatic = summary.automatic,
        partial_automatic = summary.partial_automatic,
        manual_required = summary.manual_required,
        "Analyzer finished"
    );

    Ok(())
}
