// Integration tests for the timer migration analyzer
// These tests drive the full pipeline: fact intake -> classification ->
// report delivery, using real files under a temporary directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use timerlift_common::{
    config::{ReportFormat, ReportSettings},
    engine::{AnalysisEngine, EngineConfig},
    errors::FactError,
    intake::{FactSource, JsonFileSource},
    models::{MigrationStatus, Report, TriggerSpec},
    sink,
};

/// Helper function to write a fact bundle to disk
async fn write_facts(dir: &TempDir, bundle: &serde_json::Value) -> PathBuf {
    let path = dir.path().join("facts.json");
    tokio::fs::write(&path, serde_json::to_vec_pretty(bundle).expect("serialize bundle"))
        .await
        .expect("write fact bundle");
    path
}

/// Helper function to read a JSON-lines report file back into memory
async fn read_reports(path: &Path) -> Vec<Report> {
    let raw = tokio::fs::read_to_string(path).await.expect("read report file");
    raw.lines()
        .map(|line| serde_json::from_str(line).expect("parse report line"))
        .collect()
}

/// Helper function building a fact bundle that exercises every verdict path
fn sample_bundle() -> serde_json::Value {
    serde_json::json!({
        "version": 1,
        "extractor": "timerlift-extract 0.3.1",
        "units": [
            {
                "name": "com.acme.billing.NightlyInvoiceJob",
                "timer": {
                    "timer_pattern": "calendar",
                    "timeout_method_count": 1,
                    "has_calendar_timer": true
                },
                "schedule": {
                    "hour": "2",
                    "timezone": "America/New_York"
                }
            },
            {
                "name": "com.acme.reporting.WeekdayDigest",
                "timer": {
                    "timer_pattern": "calendar",
                    "timeout_method_count": 1,
                    "has_calendar_timer": true
                },
                "schedule": {
                    "minute": "30",
                    "hour": "6",
                    "day_of_week": "Mon-Fri"
                }
            },
            {
                "name": "com.acme.archive.MonthEndSweep",
                "timer": {
                    "timer_pattern": "calendar",
                    "uses_timer_info": true,
                    "timeout_method_count": 1,
                    "has_calendar_timer": true
                },
                "schedule": {
                    "hour": "4",
                    "day_of_month": "1",
                    "timezone": "UTC"
                }
            },
            {
                "name": "com.acme.session.CleanupTimer",
                "timer": {
                    "timer_pattern": "interval",
                    "timeout_method_count": 1,
                    "has_interval_timer": true
                }
            },
            {
                "name": "com.acme.workflow.EscalationManager",
                "timer": {
                    "timer_pattern": "single",
                    "timeout_method_count": 1,
                    "has_single_timer": true,
                    "uses_timer_handle": true,
                    "timer_handle_escapes": true,
                    "migration_notes": "Escalation deadlines come from the workflow table"
                }
            },
            {
                "name": "com.acme.sync.PartnerFeedPoller",
                "timer": {
                    "timer_pattern": "mixed",
                    "timeout_method_count": 2,
                    "has_interval_timer": true,
                    "has_calendar_timer": true
                }
            },
            {
                "name": "com.acme.cache.RegionWarmup",
                "timer": {
                    "timer_pattern": "calendar",
                    "dynamic_timer_creation": true,
                    "timeout_method_count": 1,
                    "has_calendar_timer": true
                },
                "schedule": {
                    "raw_expression": "scheduleFor(region)"
                }
            }
        ]
    })
}

/// Helper function running one bundle through the engine into a sink
async fn run_pipeline(
    facts_path: &Path,
    report_settings: &ReportSettings,
    concurrency: usize,
) -> timerlift_common::models::RunSummary {
    let units = JsonFileSource::new(facts_path)
        .load()
        .await
        .expect("load fact bundle");
    let report_sink = sink::from_settings(report_settings)
        .await
        .expect("create report sink");
    let engine = AnalysisEngine::new(EngineConfig {
        concurrency,
        job_group: report_settings.job_group.clone(),
    });
    engine
        .run(units, Arc::clone(&report_sink))
        .await
        .expect("engine run")
}

#[cfg(test)]
mod integration_tests {
    use super::*;

    /// End-to-end flow: a mixed bundle goes in, one JSON-lines report per
    /// unit comes out, in input order, with the expected verdicts.
    #[tokio::test]
    async fn test_fact_bundle_to_jsonl_report_flow() {
        println!("=== Testing fact bundle to JSON-lines report flow ===");

        let dir = TempDir::new().expect("create temp dir");
        let facts_path = write_facts(&dir, &sample_bundle()).await;
        let output_path = dir.path().join("reports.jsonl");
        let settings = ReportSettings {
            format: ReportFormat::Json,
            output_path: output_path.to_string_lossy().into_owned(),
            job_group: "migrated-timers".to_string(),
        };

        let before = chrono::Utc::now();
        let summary = run_pipeline(&facts_path, &settings, 4).await;
        let after = chrono::Utc::now();

        assert_ne!(summary.run_id, uuid::Uuid::nil());
        assert_eq!(summary.total, 7);
        assert_eq!(summary.automatic, 3);
        assert_eq!(summary.partial_automatic, 1);
        assert_eq!(summary.manual_required, 3);
        assert_eq!(summary.errors, 0);

        let reports = read_reports(&output_path).await;
        assert_eq!(reports.len(), 7);

        // Input order is preserved regardless of concurrency
        let names: Vec<&str> = reports.iter().map(|r| r.unit.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "com.acme.billing.NightlyInvoiceJob",
                "com.acme.reporting.WeekdayDigest",
                "com.acme.archive.MonthEndSweep",
                "com.acme.session.CleanupTimer",
                "com.acme.workflow.EscalationManager",
                "com.acme.sync.PartnerFeedPoller",
                "com.acme.cache.RegionWarmup",
            ]
        );
        for report in &reports {
            assert!(report.generated_at >= before && report.generated_at <= after);
        }

        println!("--- Checking automatic verdicts ---");
        let nightly = &reports[0];
        assert_eq!(nightly.status, MigrationStatus::Automatic);
        assert!(nightly.reasons.is_empty());
        let job = nightly.job.as_ref().expect("automatic report carries a job");
        assert_eq!(job.name, "com.acme.billing.NightlyInvoiceJob");
        assert_eq!(job.group, "migrated-timers");
        assert!(job.persistent);
        assert!(job.data_map.is_empty());
        match &job.trigger {
            TriggerSpec::Cron {
                expression,
                timezone,
            } => {
                assert_eq!(expression, "0 0 2 * * ? *");
                assert_eq!(timezone, "America/New_York");
            }
            other => panic!("unexpected trigger: {:?}", other),
        }

        let digest = &reports[1];
        assert_eq!(digest.status, MigrationStatus::Automatic);
        match &digest.job.as_ref().expect("job").trigger {
            TriggerSpec::Cron {
                expression,
                timezone,
            } => {
                assert_eq!(expression, "0 30 6 ? * MON-FRI *");
                assert_eq!(timezone, "system");
            }
            other => panic!("unexpected trigger: {:?}", other),
        }

        let sweep = &reports[2];
        assert_eq!(sweep.status, MigrationStatus::Automatic);
        let sweep_job = sweep.job.as_ref().expect("job");
        match &sweep_job.trigger {
            TriggerSpec::Cron { expression, .. } => assert_eq!(expression, "0 0 4 1 * ? *"),
            other => panic!("unexpected trigger: {:?}", other),
        }
        assert!(sweep_job.data_map.contains_key("timer_info"));

        println!("--- Checking partial and manual verdicts ---");
        let cleanup = &reports[3];
        assert_eq!(cleanup.status, MigrationStatus::PartialAutomatic);
        let cleanup_job = cleanup.job.as_ref().expect("partial report carries a job");
        assert_eq!(cleanup_job.trigger, TriggerSpec::Tbd);
        assert_eq!(
            cleanup.reasons,
            vec!["manual Trigger configuration needed for programmatic timers"]
        );

        let escalation = &reports[4];
        assert_eq!(escalation.status, MigrationStatus::ManualRequired);
        assert!(escalation.job.is_none());
        assert_eq!(
            escalation.reasons,
            vec!["handle lifetime not provably local"]
        );
        assert_eq!(
            escalation.notes,
            vec!["extractor notes: Escalation deadlines come from the workflow table"]
        );

        let poller = &reports[5];
        assert_eq!(poller.status, MigrationStatus::ManualRequired);
        assert_eq!(
            poller.reasons,
            vec!["mixed timer creation patterns require manual job-trigger mapping"]
        );

        let warmup = &reports[6];
        assert_eq!(warmup.status, MigrationStatus::ManualRequired);
        assert_eq!(
            warmup.reasons,
            vec!["dynamic timer creation without static schedule"]
        );

        println!("=== JSON-lines flow verified ===");
    }

    /// The same run delivered through each configured output format.
    #[tokio::test]
    async fn test_report_sink_formats() {
        println!("=== Testing report sink formats ===");

        let dir = TempDir::new().expect("create temp dir");
        let facts_path = write_facts(&dir, &sample_bundle()).await;

        for (format, file_name) in [
            (ReportFormat::Json, "reports.jsonl"),
            (ReportFormat::Text, "reports.txt"),
            (ReportFormat::Csv, "reports.csv"),
        ] {
            let output_path = dir.path().join(file_name);
            let settings = ReportSettings {
                format,
                output_path: output_path.to_string_lossy().into_owned(),
                job_group: "migrated-timers".to_string(),
            };
            let summary = run_pipeline(&facts_path, &settings, 2).await;
            assert_eq!(summary.total, 7);
            assert_eq!(summary.errors, 0);

            let raw = tokio::fs::read_to_string(&output_path)
                .await
                .expect("read report output");
            match format {
                ReportFormat::Json => {
                    assert_eq!(raw.lines().count(), 7);
                }
                ReportFormat::Text => {
                    assert!(raw.contains("com.acme.billing.NightlyInvoiceJob [automatic]"));
                    assert!(raw.contains("  trigger: 0 0 2 * * ? * (America/New_York)"));
                    assert!(raw.contains("com.acme.sync.PartnerFeedPoller [manual_required]"));
                    assert!(raw.contains(
                        "  reason: mixed timer creation patterns require manual job-trigger mapping"
                    ));
                }
                ReportFormat::Csv => {
                    let mut lines = raw.lines();
                    assert_eq!(
                        lines.next(),
                        Some("unit,status,trigger,persistent,reasons,notes")
                    );
                    assert_eq!(lines.count(), 7);
                    assert!(raw.contains(
                        "com.acme.billing.NightlyInvoiceJob,automatic,0 0 2 * * ? * (America/New_York),true,,"
                    ));
                    assert!(raw
                        .contains("com.acme.session.CleanupTimer,partial_automatic,TBD,true,"));
                }
            }
            println!("--- {:?} output verified ---", format);
        }
    }

    /// Intake rejects bundles the engine must not touch: wrong versions,
    /// malformed unit names and duplicate unit names.
    #[tokio::test]
    async fn test_fact_validation_rejects_bad_bundles() {
        println!("=== Testing fact bundle validation ===");

        let dir = TempDir::new().expect("create temp dir");

        let unsupported = serde_json::json!({
            "version": 2,
            "units": [{"name": "com.acme.One", "timer": {}}]
        });
        let path = write_facts(&dir, &unsupported).await;
        let err = JsonFileSource::new(&path).load().await.unwrap_err();
        assert!(matches!(
            err,
            FactError::UnsupportedVersion {
                found: 2,
                expected: 1
            }
        ));

        let bad_name = serde_json::json!({
            "version": 1,
            "units": [{"name": "com/acme/Slashy", "timer": {}}]
        });
        let path = write_facts(&dir, &bad_name).await;
        let err = JsonFileSource::new(&path).load().await.unwrap_err();
        assert!(matches!(err, FactError::InvalidUnitName(name) if name == "com/acme/Slashy"));

        let duplicated = serde_json::json!({
            "version": 1,
            "units": [
                {"name": "com.acme.Twice", "timer": {}},
                {"name": "com.acme.Twice", "timer": {}}
            ]
        });
        let path = write_facts(&dir, &duplicated).await;
        let err = JsonFileSource::new(&path).load().await.unwrap_err();
        assert!(matches!(err, FactError::DuplicateUnitName(name) if name == "com.acme.Twice"));

        let err = JsonFileSource::new(dir.path().join("missing.json"))
            .load()
            .await
            .unwrap_err();
        assert!(matches!(err, FactError::Io(_)));

        println!("=== Validation rejections verified ===");
    }

    /// A wide bundle under high concurrency still produces reports in
    /// input order with accurate summary counts.
    #[tokio::test]
    async fn test_ordering_under_concurrency() {
        println!("=== Testing report ordering under concurrency ===");

        let mut units = Vec::new();
        for i in 0..40 {
            let name = format!("com.acme.batch.Worker{:02}", i);
            if i % 2 == 0 {
                units.push(serde_json::json!({
                    "name": name,
                    "timer": {
                        "timer_pattern": "calendar",
                        "timeout_method_count": 1,
                        "has_calendar_timer": true
                    },
                    "schedule": {"hour": format!("{}", i % 24)}
                }));
            } else {
                units.push(serde_json::json!({
                    "name": name,
                    "timer": {
                        "timer_pattern": "interval",
                        "timeout_method_count": 1,
                        "has_interval_timer": true
                    }
                }));
            }
        }
        let bundle = serde_json::json!({"version": 1, "units": units});

        let dir = TempDir::new().expect("create temp dir");
        let facts_path = write_facts(&dir, &bundle).await;
        let output_path = dir.path().join("reports.jsonl");
        let settings = ReportSettings {
            format: ReportFormat::Json,
            output_path: output_path.to_string_lossy().into_owned(),
            job_group: "migrated-timers".to_string(),
        };

        let summary = run_pipeline(&facts_path, &settings, 16).await;
        assert_eq!(summary.total, 40);
        assert_eq!(summary.automatic, 20);
        assert_eq!(summary.partial_automatic, 20);
        assert_eq!(summary.manual_required, 0);
        assert_eq!(summary.errors, 0);

        let reports = read_reports(&output_path).await;
        assert_eq!(reports.len(), 40);
        for (i, report) in reports.iter().enumerate() {
            assert_eq!(report.unit, format!("com.acme.batch.Worker{:02}", i));
            let expected = if i % 2 == 0 {
                MigrationStatus::Automatic
            } else {
                MigrationStatus::PartialAutomatic
            };
            assert_eq!(report.status, expected);
        }

        println!("=== Ordering verified across 40 units ===");
    }
}
