use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Timer Fact Models
// ============================================================================

/// TimerPattern represents the dominant timer creation style observed in a
/// class. Patterns are mutually exclusive; a class mixing styles is `Mixed`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimerPattern {
    Interval,
    Single,
    Calendar,
    Mixed,
    #[default]
    Unknown,
}

impl std::fmt::Display for TimerPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimerPattern::Interval => write!(f, "interval"),
            TimerPattern::Single => write!(f, "single"),
            TimerPattern::Calendar => write!(f, "calendar"),
            TimerPattern::Mixed => write!(f, "mixed"),
            TimerPattern::Unknown => write!(f, "unknown"),
        }
    }
}

/// TimerFact captures the extracted timer-usage facts for one class.
///
/// Facts are immutable observations produced by the upstream extractor; the
/// engine never mutates them. All fields default so extractors may omit what
/// they did not observe.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct TimerFact {
    pub timer_pattern: TimerPattern,
    pub uses_timer_info: bool,
    pub dynamic_timer_creation: bool,
    pub timeout_method_count: u32,
    pub uses_timer_handle: bool,
    pub timer_handle_escapes: bool,
    pub uses_timer_handle_param_in_timeout: bool,
    pub uses_timer_get_schedule: bool,
    pub timer_get_schedule_escapes: bool,
    pub has_single_timer: bool,
    pub has_interval_timer: bool,
    pub has_calendar_timer: bool,
    pub migration_notes: Option<String>,
}

impl TimerFact {
    /// Flag disagreement between the recorded pattern and the creation APIs
    /// the extractor saw. `timer_pattern` stays authoritative for
    /// classification; a mismatch only produces an advisory report note.
    pub fn creation_api_mismatch(&self) -> Option<String> {
        let conflict = match self.timer_pattern {
            TimerPattern::Interval => self.has_single_timer || self.has_calendar_timer,
            TimerPattern::Single => self.has_interval_timer || self.has_calendar_timer,
            TimerPattern::Calendar => self.has_single_timer || self.has_interval_timer,
            TimerPattern::Mixed | TimerPattern::Unknown => false,
        };
        if conflict {
            Some(format!(
                "recorded pattern '{}' disagrees with observed creation APIs (single={}, interval={}, calendar={})",
                self.timer_pattern,
                self.has_single_timer,
                self.has_interval_timer,
                self.has_calendar_timer
            ))
        } else {
            None
        }
    }
}

/// CalendarField identifies one field of a declared schedule
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CalendarField {
    Second,
    Minute,
    Hour,
    DayOfMonth,
    Month,
    DayOfWeek,
    Year,
}

impl CalendarField {
    /// All fields in schedule order
    pub const ALL: [CalendarField; 7] = [
        CalendarField::Second,
        CalendarField::Minute,
        CalendarField::Hour,
        CalendarField::DayOfMonth,
        CalendarField::Month,
        CalendarField::DayOfWeek,
        CalendarField::Year,
    ];
}

impl std::fmt::Display for CalendarField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CalendarField::Second => write!(f, "second"),
            CalendarField::Minute => write!(f, "minute"),
            CalendarField::Hour => write!(f, "hour"),
            CalendarField::DayOfMonth => write!(f, "day_of_month"),
            CalendarField::Month => write!(f, "month"),
            CalendarField::DayOfWeek => write!(f, "day_of_week"),
            CalendarField::Year => write!(f, "year"),
        }
    }
}

/// ScheduleFact captures one statically declared schedule.
///
/// Field defaults mirror the annotation defaults of the source platform:
/// second, minute and hour default to `"0"`, everything else to `"*"`. A
/// non-empty `raw_expression` marks a schedule whose fields could not be
/// statically resolved; its calendar fields must not be trusted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ScheduleFact {
    pub second: String,
    pub minute: String,
    pub hour: String,
    pub day_of_month: String,
    pub month: String,
    pub day_of_week: String,
    pub year: String,
    pub timezone: String,
    pub raw_expression: String,
}

impl Default for ScheduleFact {
    fn default() -> Self {
        Self {
            second: "0".to_string(),
            minute: "0".to_string(),
            hour: "0".to_string(),
            day_of_month: "*".to_string(),
            month: "*".to_string(),
            day_of_week: "*".to_string(),
            year: "*".to_string(),
            timezone: String::new(),
            raw_expression: String::new(),
        }
    }
}

impl ScheduleFact {
    /// True when every field value is a static literal
    pub fn is_literal(&self) -> bool {
        self.raw_expression.is_empty()
    }

    /// Access a field value by identity
    pub fn field(&self, field: CalendarField) -> &str {
        match field {
            CalendarField::Second => &self.second,
            CalendarField::Minute => &self.minute,
            CalendarField::Hour => &self.hour,
            CalendarField::DayOfMonth => &self.day_of_month,
            CalendarField::Month => &self.month,
            CalendarField::DayOfWeek => &self.day_of_week,
            CalendarField::Year => &self.year,
        }
    }
}

// ============================================================================
// Analysis Input Models
// ============================================================================

/// Bundle version this engine accepts from upstream extractors
pub const FACT_BUNDLE_VERSION: u32 = 1;

/// AnalysisUnit is one classification input: a class plus its optional
/// statically declared schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisUnit {
    pub name: String,
    pub timer: TimerFact,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<ScheduleFact>,
}

/// FactBundle is the versioned wire format produced by the fact extractor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactBundle {
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extractor: Option<String>,
    pub units: Vec<AnalysisUnit>,
}

impl FactBundle {
    pub fn new(units: Vec<AnalysisUnit>) -> Self {
        Self {
            version: FACT_BUNDLE_VERSION,
            extractor: None,
            units,
        }
    }
}

// ============================================================================
// Verdict Models
// ============================================================================

/// TriggerSpec describes the scheduler trigger generated for a migrated job
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TriggerSpec {
    Cron { expression: String, timezone: String },
    /// Placeholder for programmatic timers whose trigger a human must author
    Tbd,
}

impl std::fmt::Display for TriggerSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TriggerSpec::Cron {
                expression,
                timezone,
            } => write!(f, "{} ({})", expression, timezone),
            TriggerSpec::Tbd => write!(f, "TBD"),
        }
    }
}

/// MigrationConfig is the generated scheduler-configuration skeleton for a
/// unit that can be migrated without (or with partial) human involvement
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MigrationConfig {
    pub trigger: TriggerSpec,
    pub persistent: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data_map: BTreeMap<String, String>,
}

/// Verdict is the classification outcome for one analysis unit.
/// Exactly one verdict is produced per unit, as a pure function of its facts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Verdict {
    Automatic {
        config: MigrationConfig,
    },
    ManualRequired {
        reasons: Vec<String>,
    },
    PartialAutomatic {
        config: MigrationConfig,
        reasons: Vec<String>,
    },
}

impl Verdict {
    pub fn status(&self) -> MigrationStatus {
        match self {
            Verdict::Automatic { .. } => MigrationStatus::Automatic,
            Verdict::ManualRequired { .. } => MigrationStatus::ManualRequired,
            Verdict::PartialAutomatic { .. } => MigrationStatus::PartialAutomatic,
        }
    }

    pub fn reasons(&self) -> &[String] {
        match self {
            Verdict::Automatic { .. } => &[],
            Verdict::ManualRequired { reasons } => reasons,
            Verdict::PartialAutomatic { reasons, .. } => reasons,
        }
    }
}

// ============================================================================
// Report Models
// ============================================================================

/// MigrationStatus is the machine-readable status tag on a report
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MigrationStatus {
    Automatic,
    ManualRequired,
    PartialAutomatic,
}

impl std::fmt::Display for MigrationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MigrationStatus::Automatic => write!(f, "automatic"),
            MigrationStatus::ManualRequired => write!(f, "manual_required"),
            MigrationStatus::PartialAutomatic => write!(f, "partial_automatic"),
        }
    }
}

impl FromStr for MigrationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "automatic" => Ok(MigrationStatus::Automatic),
            "manual_required" => Ok(MigrationStatus::ManualRequired),
            "partial_automatic" => Ok(MigrationStatus::PartialAutomatic),
            _ => Err(format!("Invalid migration status: {}", s)),
        }
    }
}

impl TryFrom<String> for MigrationStatus {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_str(&s)
    }
}

/// JobSkeleton is the generated Job/Trigger definition attached to automatic
/// and partial-automatic reports
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JobSkeleton {
    pub name: String,
    pub group: String,
    pub trigger: TriggerSpec,
    pub persistent: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data_map: BTreeMap<String, String>,
}

/// Report is the per-unit migration report delivered to sinks.
///
/// `reasons` are verbatim, in production order; downstream tooling keys off
/// `status` and must never need to parse prose.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub unit: String,
    pub status: MigrationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job: Option<JobSkeleton>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

impl Report {
    /// Append an advisory note. Notes never affect the status.
    pub fn push_note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }
}

// ============================================================================
// Run Summary Models
// ============================================================================

/// RunSummary aggregates the outcome of one engine invocation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub total: usize,
    pub automatic: usize,
    pub partial_automatic: usize,
    pub manual_required: usize,
    pub errors: usize,
}

impl RunSummary {
    pub fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            total: 0,
            automatic: 0,
            partial_automatic: 0,
            manual_required: 0,
            errors: 0,
        }
    }

    /// Count one successfully reported unit
    pub fn record(&mut self, status: MigrationStatus) {
        self.total += 1;
        match status {
            MigrationStatus::Automatic => self.automatic += 1,
            MigrationStatus::PartialAutomatic => self.partial_automatic += 1,
            MigrationStatus::ManualRequired => self.manual_required += 1,
        }
    }

    /// Count one unit that failed to report
    pub fn record_error(&mut self) {
        self.total += 1;
        self.errors += 1;
    }
}
