// Report emission
//
// Renders a verdict into the per-unit migration report handed to sinks,
// and attaches the pipeline's advisory notes.

use crate::models::{JobSkeleton, MigrationStatus, Report, TimerFact, Verdict};
use chrono::Utc;
use std::fmt;
use tracing::warn;

/// Scheduler group assigned to generated jobs unless configured otherwise
pub const DEFAULT_JOB_GROUP: &str = "migrated-timers";

/// Render a verdict into a report using the default job group
pub fn emit(unit_name: &str, verdict: &Verdict) -> Report {
    emit_with_group(unit_name, verdict, DEFAULT_JOB_GROUP)
}

/// Render a verdict into a report.
///
/// Automatic and partial-automatic verdicts produce a job skeleton named
/// after the unit. Reasons are carried verbatim and in production order;
/// nothing is summarized or truncated. Inputs are never mutated.
pub fn emit_with_group(unit_name: &str, verdict: &Verdict, job_group: &str) -> Report {
    let job = match verdict {
        Verdict::Automatic { config } | Verdict::PartialAutomatic { config, .. } => {
            Some(JobSkeleton {
                name: unit_name.to_string(),
                group: job_group.to_string(),
                trigger: config.trigger.clone(),
                persistent: config.persistent,
                data_map: config.data_map.clone(),
            })
        }
        Verdict::ManualRequired { .. } => None,
    };

    Report {
        unit: unit_name.to_string(),
        status: verdict.status(),
        job,
        reasons: verdict.reasons().to_vec(),
        notes: Vec::new(),
        generated_at: Utc::now(),
    }
}

/// Attach advisory notes to a finished report: the creation-API mismatch
/// flag, and the extractor's free-form notes on reports headed for manual
/// review. Notes never change the status.
pub fn annotate(report: &mut Report, timer: &TimerFact) {
    if let Some(note) = timer.creation_api_mismatch() {
        warn!(unit = %report.unit, %note, "creation API facts disagree with recorded pattern");
        report.push_note(note);
    }
    if report.status == MigrationStatus::ManualRequired {
        if let Some(notes) = &timer.migration_notes {
            report.push_note(format!("extractor notes: {}", notes));
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} [{}]", self.unit, self.status)?;
        if let Some(job) = &self.job {
            writeln!(f, "  job: {}/{}", job.group, job.name)?;
            writeln!(f, "  trigger: {}", job.trigger)?;
            writeln!(f, "  persistent: {}", job.persistent)?;
            for (key, value) in &job.data_map {
                writeln!(f, "  data {}: {}", key, value)?;
            }
        }
        for reason in &self.reasons {
            writeln!(f, "  reason: {}", reason)?;
        }
        for note in &self.notes {
            writeln!(f, "  note: {}", note)?;
        }
        Ok(())
    }
}
