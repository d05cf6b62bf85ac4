// Migration decision table
//
// Combines escape analysis and schedule translation into exactly one
// verdict per unit. Rules run top to bottom and the first match wins; the
// ordering is load-bearing and mirrors the review workflow (structural
// blockers first, then schedule quality, then programmatic fallbacks).

use crate::errors::{ClassificationError, TranslationError};
use crate::escape::collect_escape_reasons;
use crate::models::{MigrationConfig, ScheduleFact, TimerFact, TimerPattern, TriggerSpec, Verdict};
use crate::translate::{self, CronExpression};
use std::collections::BTreeMap;
use tracing::warn;

pub const MIXED_PATTERN_REASON: &str =
    "mixed timer creation patterns require manual job-trigger mapping";
pub const DYNAMIC_CREATION_REASON: &str = "dynamic timer creation without static schedule";
pub const PROGRAMMATIC_TRIGGER_REASON: &str =
    "manual Trigger configuration needed for programmatic timers";
pub const UNCLASSIFIED_REASON: &str = "unclassified timer usage pattern";

/// Data-map key reminding migrators to carry the legacy timer payload
pub const DATA_MAP_TIMER_INFO: &str = "timer_info";
/// Data-map key echoing extractor-supplied notes
pub const DATA_MAP_NOTES: &str = "migration_notes";

/// Classify one unit's facts into a migration verdict.
///
/// Pure and total: every fact combination maps to exactly one verdict, and
/// the same facts always produce the same verdict.
pub fn classify(timer: &TimerFact, schedule: Option<&ScheduleFact>) -> Verdict {
    // Rule 1: mixed creation patterns have no single job-trigger mapping
    if timer.timer_pattern == TimerPattern::Mixed {
        return Verdict::ManualRequired {
            reasons: vec![MIXED_PATTERN_REASON.to_string()],
        };
    }

    // Rule 2: escaping handles or schedule objects
    let escape_reasons = collect_escape_reasons(timer);
    if !escape_reasons.is_empty() {
        return Verdict::ManualRequired {
            reasons: escape_reasons,
        };
    }

    // Translation runs at most once; rules 3 through 5 share the result
    let translation: Option<Result<CronExpression, TranslationError>> =
        schedule.map(translate::translate);

    // Rule 3: dynamic creation is only migratable off a resolvable schedule
    if timer.dynamic_timer_creation && !matches!(translation, Some(Ok(_))) {
        return Verdict::ManualRequired {
            reasons: vec![DYNAMIC_CREATION_REASON.to_string()],
        };
    }

    match translation {
        // Rule 4: translated schedule, generate the trigger
        Some(Ok(cron)) => {
            let trigger = TriggerSpec::Cron {
                expression: cron.to_cron_string(),
                timezone: cron.timezone,
            };
            Verdict::Automatic {
                config: build_config(timer, trigger),
            }
        }
        // Rule 5: schedule present but untranslatable; the translator's
        // message is the verbatim review reason
        Some(Err(error)) => {
            crate::telemetry::record_translation_failure(error.kind());
            Verdict::ManualRequired {
                reasons: vec![error.to_string()],
            }
        }
        None => {
            // Rule 6: a single timeout callback maps onto one job class,
            // only the trigger needs a human
            if timer.timeout_method_count <= 1 {
                Verdict::PartialAutomatic {
                    config: build_config(timer, TriggerSpec::Tbd),
                    reasons: vec![PROGRAMMATIC_TRIGGER_REASON.to_string()],
                }
            } else {
                // Rule 7: terminal fallback, logged for audit
                warn!(
                    error = %ClassificationError::UnclassifiedPattern,
                    timeout_method_count = timer.timeout_method_count,
                    "decision table fell through to manual review"
                );
                Verdict::ManualRequired {
                    reasons: vec![UNCLASSIFIED_REASON.to_string()],
                }
            }
        }
    }
}

/// Assemble the generated scheduler configuration.
///
/// Timers on the source platform persist across restarts unless declared
/// otherwise, so the persistence flag starts true and stays visible on every
/// skeleton for reviewers to override.
fn build_config(timer: &TimerFact, trigger: TriggerSpec) -> MigrationConfig {
    let mut data_map = BTreeMap::new();
    if timer.uses_timer_info {
        data_map.insert(
            DATA_MAP_TIMER_INFO.to_string(),
            "carry the legacy timer payload into the job data map".to_string(),
        );
    }
    if let Some(notes) = &timer.migration_notes {
        data_map.insert(DATA_MAP_NOTES.to_string(), notes.clone());
    }
    MigrationConfig {
        trigger,
        persistent: true,
        data_map,
    }
}
