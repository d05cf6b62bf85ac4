// Analysis engine
//
// Walks a batch of analysis units through classify -> emit -> sink with a
// bounded number of units in flight. Units are independent; per-unit
// failures are counted and never abort the rest of the batch.

use crate::classify::classify;
use crate::errors::ReportError;
use crate::models::{AnalysisUnit, Report, RunSummary};
use crate::report::{self, DEFAULT_JOB_GROUP};
use crate::sink::ReportSink;
use crate::telemetry;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

/// Configuration for the analysis engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum number of units classified in flight
    pub concurrency: usize,
    /// Scheduler group stamped on generated job skeletons
    pub job_group: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            concurrency: 8,
            job_group: DEFAULT_JOB_GROUP.to_string(),
        }
    }
}

/// Stateless batch engine; one invocation per fact bundle
pub struct AnalysisEngine {
    config: EngineConfig,
}

impl AnalysisEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Classify every unit and deliver the reports to the sink in input
    /// order.
    ///
    /// Sink write failures and task failures are logged and counted in the
    /// summary. A `finalize` failure propagates, since it can lose already
    /// buffered reports.
    #[instrument(skip(self, units, sink), fields(unit_count = units.len()))]
    pub async fn run(
        &self,
        units: Vec<AnalysisUnit>,
        sink: Arc<dyn ReportSink>,
    ) -> Result<RunSummary, ReportError> {
        let run_id = Uuid::new_v4();
        let mut summary = RunSummary::new(run_id);
        info!(
            %run_id,
            concurrency = self.config.concurrency,
            "Starting analysis run"
        );

        let job_group = Arc::new(self.config.job_group.clone());
        let mut reports = stream::iter(units)
            .map(|unit| {
                let job_group = Arc::clone(&job_group);
                tokio::spawn(async move { analyze_unit(&unit, &job_group) })
            })
            .buffered(self.config.concurrency.max(1));

        while let Some(joined) = reports.next().await {
            match joined {
                Ok(report) => match sink.write(&report).await {
                    Ok(()) => summary.record(report.status),
                    Err(e) => {
                        error!(unit = %report.unit, error = %e, "Failed to write report");
                        summary.record_error();
                    }
                },
                Err(e) => {
                    error!(error = %e, "Classification task failed");
                    summary.record_error();
                }
            }
        }

        sink.finalize().await?;

        info!(
            %run_id,
            total = summary.total,
            automatic = summary.automatic,
            partial_automatic = summary.partial_automatic,
            manual_required = summary.manual_required,
            errors = summary.errors,
            "Analysis run complete"
        );
        Ok(summary)
    }
}

/// Classify one unit and render its report
fn analyze_unit(unit: &AnalysisUnit, job_group: &str) -> Report {
    let started = Instant::now();
    let verdict = classify(&unit.timer, unit.schedule.as_ref());
    let mut report = report::emit_with_group(&unit.name, &verdict, job_group);
    report::annotate(&mut report, &unit.timer);

    telemetry::record_verdict(report.status);
    telemetry::record_classification_duration(started.elapsed());
    debug!(unit = %report.unit, status = %report.status, "Unit classified");
    report
}
