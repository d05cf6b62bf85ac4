// Error types for the migration analysis pipeline

use thiserror::Error;

use crate::models::CalendarField;

/// Schedule-to-cron translation errors
///
/// Every variant's `Display` form is also the verbatim reason string
/// surfaced on manual-migration reports, so wording changes here are
/// visible to downstream consumers.
#[derive(Error, Debug)]
pub enum TranslationError {
    #[error("non-literal schedule expression: {raw}")]
    NonLiteralSchedule { raw: String },

    #[error("unsupported token '{value}' in field {field}")]
    UnsupportedToken { field: CalendarField, value: String },

    #[error("unknown timezone: {0}")]
    UnknownTimezone(String),

    #[error("day_of_month '{day_of_month}' and day_of_week '{day_of_week}' cannot both be restricted")]
    DayFieldConflict {
        day_of_month: String,
        day_of_week: String,
    },

    #[error("generated cron expression '{expression}' failed validation: {reason}")]
    InvalidCronOutput { expression: String, reason: String },
}

impl TranslationError {
    /// Stable label for failure metrics
    pub fn kind(&self) -> &'static str {
        match self {
            TranslationError::NonLiteralSchedule { .. } => "non_literal_schedule",
            TranslationError::UnsupportedToken { .. } => "unsupported_token",
            TranslationError::UnknownTimezone(_) => "unknown_timezone",
            TranslationError::DayFieldConflict { .. } => "day_field_conflict",
            TranslationError::InvalidCronOutput { .. } => "invalid_cron_output",
        }
    }
}

/// Classification errors
///
/// Classification itself is total; this exists for audit logging when the
/// decision table falls through to its terminal rule.
#[derive(Error, Debug)]
pub enum ClassificationError {
    #[error("unclassified timer usage pattern")]
    UnclassifiedPattern,
}

/// Fact intake errors
#[derive(Error, Debug)]
pub enum FactError {
    #[error("failed to read fact bundle: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid fact bundle JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("unsupported fact bundle version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("invalid unit name: {0}")]
    InvalidUnitName(String),

    #[error("duplicate unit name: {0}")]
    DuplicateUnitName(String),
}

/// Report sink errors
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to write csv record: {0}")]
    Csv(#[from] csv::Error),
}
