// Escape analysis over timer usage facts
//
// Decides whether values handed out by the timer API (handles, schedule
// introspection results) stay local enough for an automated rewrite to
// reason about. The rules are independent; automation needs both to pass.

use crate::models::TimerFact;
use serde::{Deserialize, Serialize};

/// Reason attached when a stored or passed-around handle blocks automation
pub const HANDLE_ESCAPE_REASON: &str = "handle lifetime not provably local";

/// Reason attached when schedule introspection results outlive their scope
pub const SCHEDULE_ESCAPE_REASON: &str = "schedule object lifetime not provably local";

/// EscapeVerdict is the outcome of one escape rule
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EscapeVerdict {
    Safe,
    Unsafe { reason: String },
}

impl EscapeVerdict {
    pub fn is_safe(&self) -> bool {
        matches!(self, EscapeVerdict::Safe)
    }

    /// The blocking reason, when unsafe
    pub fn reason(&self) -> Option<&str> {
        match self {
            EscapeVerdict::Safe => None,
            EscapeVerdict::Unsafe { reason } => Some(reason),
        }
    }
}

/// Handle rule: holding a timer handle is fine as long as it neither escapes
/// its creating scope nor rides into timeout callbacks as a parameter.
/// A class that never touches handles is trivially safe.
pub fn analyze_handle_escape(fact: &TimerFact) -> EscapeVerdict {
    if !fact.uses_timer_handle {
        return EscapeVerdict::Safe;
    }
    if fact.timer_handle_escapes || fact.uses_timer_handle_param_in_timeout {
        return EscapeVerdict::Unsafe {
            reason: HANDLE_ESCAPE_REASON.to_string(),
        };
    }
    EscapeVerdict::Safe
}

/// Introspection rule: reading the schedule back is fine as long as the
/// result does not escape.
pub fn analyze_schedule_escape(fact: &TimerFact) -> EscapeVerdict {
    if fact.uses_timer_get_schedule && fact.timer_get_schedule_escapes {
        return EscapeVerdict::Unsafe {
            reason: SCHEDULE_ESCAPE_REASON.to_string(),
        };
    }
    EscapeVerdict::Safe
}

/// Run both rules and collect blocking reasons, handle rule first
pub fn collect_escape_reasons(fact: &TimerFact) -> Vec<String> {
    let mut reasons = Vec::new();
    for verdict in [analyze_handle_escape(fact), analyze_schedule_escape(fact)] {
        if let EscapeVerdict::Unsafe { reason } = verdict {
            reasons.push(reason);
        }
    }
    reasons
}
