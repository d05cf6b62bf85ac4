// Schedule-to-cron translation module
//
// Converts a statically declared schedule into the normalized seven-field
// cron form (seconds minutes hours day-of-month month day-of-week year)
// used by the target scheduler, or reports why no faithful translation
// exists.

use crate::errors::TranslationError;
use crate::models::{CalendarField, ScheduleFact};
use chrono_tz::Tz;
use cron::Schedule as CronSchedule;
use std::fmt;
use std::str::FromStr;

/// Timezone marker attached when the schedule declared none
pub const SYSTEM_TIMEZONE: &str = "system";

const MONTH_NAMES: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

// Source ordinals are 0-7 with 0 and 7 both Sunday; indexing modulo 7 makes
// the two spellings collapse to the same name.
const DOW_NAMES: [&str; 7] = ["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"];

/// CronExpression is a normalized seven-field cron expression plus the
/// timezone it evaluates in.
///
/// Day-of-week tokens are always emitted as three-letter names so the
/// expression reads the same under the source convention (0-based, Sunday
/// first) and the target convention (1-based, Sunday first).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronExpression {
    pub second: String,
    pub minute: String,
    pub hour: String,
    pub day_of_month: String,
    pub month: String,
    pub day_of_week: String,
    pub year: String,
    pub timezone: String,
}

impl CronExpression {
    /// Render the space-separated seven-field form
    pub fn to_cron_string(&self) -> String {
        format!(
            "{} {} {} {} {} {} {}",
            self.second,
            self.minute,
            self.hour,
            self.day_of_month,
            self.month,
            self.day_of_week,
            self.year
        )
    }
}

impl fmt::Display for CronExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_cron_string())
    }
}

/// Translate a literal schedule into a normalized cron expression.
///
/// Fails on runtime-computed schedules, tokens outside the field grammar,
/// schedules restricting both day fields, and unknown timezones. The
/// assembled expression is re-parsed as a final self-check before it is
/// returned.
pub fn translate(schedule: &ScheduleFact) -> Result<CronExpression, TranslationError> {
    if !schedule.is_literal() {
        return Err(TranslationError::NonLiteralSchedule {
            raw: schedule.raw_expression.clone(),
        });
    }

    let mut normalized = Vec::with_capacity(CalendarField::ALL.len());
    for field in CalendarField::ALL {
        normalized.push(normalize_field(field, schedule.field(field))?);
    }

    let mut day_of_month = normalized[3].clone();
    let mut day_of_week = normalized[5].clone();
    // The target trigger model cannot restrict both day fields at once; the
    // unrestricted one is written as '?'.
    match (day_of_month != "*", day_of_week != "*") {
        (true, true) => {
            return Err(TranslationError::DayFieldConflict {
                day_of_month,
                day_of_week,
            })
        }
        (false, true) => day_of_month = "?".to_string(),
        _ => day_of_week = "?".to_string(),
    }

    let expression = CronExpression {
        second: normalized[0].clone(),
        minute: normalized[1].clone(),
        hour: normalized[2].clone(),
        day_of_month,
        month: normalized[4].clone(),
        day_of_week,
        year: normalized[6].clone(),
        timezone: validate_timezone(&schedule.timezone)?,
    };

    verify_expression(&expression.to_cron_string())?;
    Ok(expression)
}

/// Validate one field value against the token grammar and return its
/// normalized form.
///
/// Grammar: `*`, a step `base/step` (base is `*`, a literal or a range), or
/// a comma-separated list of literals and ranges.
fn normalize_field(field: CalendarField, raw: &str) -> Result<String, TranslationError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(unsupported(field, raw));
    }
    if value == "*" {
        return Ok("*".to_string());
    }

    if let Some((base, step)) = value.split_once('/') {
        // Step semantics walk the field's ordinal space, and the source and
        // target disagree on day-of-week ordinals. No faithful rewrite.
        if field == CalendarField::DayOfWeek {
            return Err(unsupported(field, raw));
        }
        let step: u32 = step
            .trim()
            .parse()
            .ok()
            .filter(|s| *s >= 1)
            .ok_or_else(|| unsupported(field, raw))?;
        let base = base.trim();
        let base_text = if base == "*" {
            "*".to_string()
        } else {
            normalize_element(field, base).ok_or_else(|| unsupported(field, raw))?
        };
        return Ok(format!("{}/{}", base_text, step));
    }

    let mut parts = Vec::new();
    for element in value.split(',') {
        parts.push(normalize_element(field, element.trim()).ok_or_else(|| unsupported(field, raw))?);
    }
    Ok(parts.join(","))
}

fn unsupported(field: CalendarField, raw: &str) -> TranslationError {
    TranslationError::UnsupportedToken {
        field,
        value: raw.to_string(),
    }
}

/// Normalize a single literal or `a-b` range
fn normalize_element(field: CalendarField, element: &str) -> Option<String> {
    if let Some((from, to)) = element.split_once('-') {
        let from = parse_unit(field, from.trim())?;
        let to = parse_unit(field, to.trim())?;
        // Wrap-around ranges (27-3, FRI-SUN) have no single-range equivalent
        if range_ordinal(field, from.value) > range_ordinal(field, to.value) {
            return None;
        }
        Some(format!("{}-{}", from.text, to.text))
    } else {
        parse_unit(field, element).map(|unit| unit.text)
    }
}

struct Unit {
    value: u32,
    text: String,
}

/// Parse one literal token: a numeric value in the field's domain, or a
/// three-letter month/day name. Day-of-week numerics normalize to names.
fn parse_unit(field: CalendarField, token: &str) -> Option<Unit> {
    if token.is_empty() {
        return None;
    }

    if token.chars().all(|c| c.is_ascii_digit()) {
        let value: u32 = token.parse().ok()?;
        let (min, max) = numeric_domain(field);
        if value < min || value > max {
            return None;
        }
        let text = match field {
            CalendarField::DayOfWeek => DOW_NAMES[(value % 7) as usize].to_string(),
            _ => value.to_string(),
        };
        return Some(Unit { value, text });
    }

    let upper = token.to_ascii_uppercase();
    match field {
        CalendarField::Month => MONTH_NAMES
            .iter()
            .position(|name| *name == upper)
            .map(|index| Unit {
                value: index as u32 + 1,
                text: upper,
            }),
        CalendarField::DayOfWeek => DOW_NAMES
            .iter()
            .position(|name| *name == upper)
            .map(|index| Unit {
                value: index as u32,
                text: upper,
            }),
        _ => None,
    }
}

/// Ordinal used for range direction checks; folds the day-of-week alias
/// `7` onto Sunday
fn range_ordinal(field: CalendarField, value: u32) -> u32 {
    match field {
        CalendarField::DayOfWeek => value % 7,
        _ => value,
    }
}

fn numeric_domain(field: CalendarField) -> (u32, u32) {
    match field {
        CalendarField::Second | CalendarField::Minute => (0, 59),
        CalendarField::Hour => (0, 23),
        CalendarField::DayOfMonth => (1, 31),
        CalendarField::Month => (1, 12),
        CalendarField::DayOfWeek => (0, 7),
        CalendarField::Year => (1970, 2099),
    }
}

/// An empty timezone inherits the deployment default; anything else must be
/// a known IANA zone name.
fn validate_timezone(timezone: &str) -> Result<String, TranslationError> {
    let name = timezone.trim();
    if name.is_empty() {
        return Ok(SYSTEM_TIMEZONE.to_string());
    }
    Tz::from_str(name).map_err(|_| TranslationError::UnknownTimezone(name.to_string()))?;
    Ok(name.to_string())
}

/// Re-parse the assembled expression as a self-check
fn verify_expression(rendered: &str) -> Result<(), TranslationError> {
    CronSchedule::from_str(rendered).map_err(|e| TranslationError::InvalidCronOutput {
        expression: rendered.to_string(),
        reason: e.to_string(),
    })?;
    Ok(())
}
