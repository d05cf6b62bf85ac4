// Classify a few hand-written units and print their reports.
//
// Run with: cargo run -p timerlift-common --example classify_unit

use timerlift_common::classify::classify;
use timerlift_common::models::{ScheduleFact, TimerFact, TimerPattern};
use timerlift_common::report::{annotate, emit};

fn main() {
    // A calendar timer with a literal weekday schedule
    let timer = TimerFact {
        timer_pattern: TimerPattern::Calendar,
        has_calendar_timer: true,
        timeout_method_count: 1,
        ..TimerFact::default()
    };
    let schedule = ScheduleFact {
        minute: "30".to_string(),
        hour: "2".to_string(),
        day_of_week: "Mon-Fri".to_string(),
        timezone: "America/New_York".to_string(),
        ..ScheduleFact::default()
    };

    let verdict = classify(&timer, Some(&schedule));
    let mut report = emit("com.acme.billing.NightlyInvoiceJob", &verdict);
    annotate(&mut report, &timer);
    println!("{}", report);

    // A programmatic timer whose handle escapes its scope
    let timer = TimerFact {
        timer_pattern: TimerPattern::Single,
        has_single_timer: true,
        uses_timer_handle: true,
        timer_handle_escapes: true,
        timeout_method_count: 1,
        migration_notes: Some("handles are stored in the workflow state table".to_string()),
        ..TimerFact::default()
    };

    let verdict = classify(&timer, None);
    let mut report = emit("com.acme.workflow.EscalationManager", &verdict);
    annotate(&mut report, &timer);
    println!("{}", report);

    // An interval timer with no declared schedule
    let timer = TimerFact {
        timer_pattern: TimerPattern::Interval,
        has_interval_timer: true,
        timeout_method_count: 1,
        ..TimerFact::default()
    };

    let verdict = classify(&timer, None);
    let report = emit("com.acme.session.CleanupTimer", &verdict);
    println!("{}", report);
}
