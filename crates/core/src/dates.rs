//! Date and time values used by `date`, `time` and `dateTime` form items.
//!
//! Supports:
//! - Absolute values: `2024-01-15`, `14:30`, `2024-01-15T14:30:00`, RFC 3339
//! - Relative expressions: `today`, `now`, `today + 1d`, `now - 2h`, `today + 1M`
//! - Formatted expressions for templates: `{{today | %d.%m.%Y}}`

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Duration, Local, Months, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::sync::LazyLock;
use thiserror::Error;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M:%S";
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Errors raised while parsing or formatting date values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DateError {
    #[error("'{0}' is not a recognised date or time")]
    InvalidValue(String),

    #[error("invalid date expression: {0}")]
    InvalidExpression(String),

    #[error("invalid date format pattern: '{0}'")]
    InvalidPattern(String),

    #[error("date arithmetic out of range in '{0}'")]
    OutOfRange(String),
}

/// Which part of a timestamp a form item cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TemporalKind {
    Date,
    Time,
    DateTime,
}

impl TemporalKind {
    pub fn default_format(self) -> &'static str {
        match self {
            TemporalKind::Date => DATE_FORMAT,
            TemporalKind::Time => TIME_FORMAT,
            TemporalKind::DateTime => DATETIME_FORMAT,
        }
    }
}

/// Current local time, truncated to whole seconds.
pub fn now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.date().and_time(truncate_time(now.time()))
}

fn truncate_time(time: NaiveTime) -> NaiveTime {
    NaiveTime::from_num_seconds_from_midnight_opt(
        chrono::Timelike::num_seconds_from_midnight(&time),
        0,
    )
    .unwrap_or(time)
}

/// Parse a literal date/time value.
///
/// Accepts relative expressions first, then RFC 3339, then the naive formats
/// in decreasing precision. A bare time is anchored to today.
pub fn parse_value(text: &str) -> Result<NaiveDateTime, DateError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(DateError::InvalidValue(text.to_string()));
    }

    if is_relative_expr(text) {
        return evaluate_relative(text);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&Local).naive_local());
    }

    const DATETIME_FORMATS: &[&str] =
        &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Ok(dt);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(text, DATE_FORMAT) {
        return Ok(date.and_time(NaiveTime::MIN));
    }

    for fmt in ["%H:%M:%S", "%H:%M"] {
        if let Ok(time) = NaiveTime::parse_from_str(text, fmt) {
            return Ok(now().date().and_time(time));
        }
    }

    Err(DateError::InvalidValue(text.to_string()))
}

/// Convert Unix seconds (as produced by scripts) into a local timestamp.
pub fn from_unix_seconds(secs: f64) -> Result<NaiveDateTime, DateError> {
    if !secs.is_finite() {
        return Err(DateError::InvalidValue(secs.to_string()));
    }
    DateTime::from_timestamp(secs.trunc() as i64, 0)
        .map(|dt| dt.with_timezone(&Local).naive_local())
        .ok_or_else(|| DateError::OutOfRange(secs.to_string()))
}

/// Format with the kind's built-in format.
pub fn format_default(kind: TemporalKind, value: &NaiveDateTime) -> String {
    value.format(kind.default_format()).to_string()
}

/// Format with a user supplied strftime pattern.
///
/// Invalid patterns, and specifiers a naive timestamp cannot fill such as
/// `%z`, are reported instead of panicking inside `Display`.
pub fn format_pattern(value: &NaiveDateTime, pattern: &str) -> Result<String, DateError> {
    let items: Vec<Item<'_>> = StrftimeItems::new(pattern).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(DateError::InvalidPattern(pattern.to_string()));
    }
    let mut out = String::new();
    write!(out, "{}", value.format_with_items(items.iter()))
        .map_err(|_| DateError::InvalidPattern(pattern.to_string()))?;
    Ok(out)
}

static RELATIVE_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^(?i:(today|now|time|date))\s*(?:([+-])\s*(\d+)\s*([mhdwMyY]))?$").ok()
});

/// Check whether the text is a relative expression like `today + 2d`.
pub fn is_relative_expr(text: &str) -> bool {
    RELATIVE_RE.as_ref().is_some_and(|re| re.is_match(text.trim()))
}

/// Evaluate a relative expression to a timestamp.
pub fn evaluate_relative(text: &str) -> Result<NaiveDateTime, DateError> {
    let text = text.trim();
    let caps = RELATIVE_RE
        .as_ref()
        .and_then(|re| re.captures(text))
        .ok_or_else(|| DateError::InvalidExpression(text.to_string()))?;

    let base = match caps[1].to_lowercase().as_str() {
        "today" | "date" => now().date().and_time(NaiveTime::MIN),
        _ => now(),
    };

    let (Some(op), Some(amount), Some(unit)) = (caps.get(2), caps.get(3), caps.get(4))
    else {
        return Ok(base);
    };

    let amount: u32 = amount
        .as_str()
        .parse()
        .map_err(|_| DateError::InvalidExpression(text.to_string()))?;
    let forward = op.as_str() == "+";

    let shifted = match unit.as_str() {
        "M" => shift_months(base, amount, forward),
        "y" | "Y" => shift_months(base, amount.saturating_mul(12), forward),
        u => {
            let duration = match u {
                "m" => Duration::minutes(amount.into()),
                "h" => Duration::hours(amount.into()),
                "d" => Duration::days(amount.into()),
                _ => Duration::weeks(amount.into()),
            };
            if forward {
                base.checked_add_signed(duration)
            } else {
                base.checked_sub_signed(duration)
            }
        }
    };

    shifted.ok_or_else(|| DateError::OutOfRange(text.to_string()))
}

fn shift_months(base: NaiveDateTime, months: u32, forward: bool) -> Option<NaiveDateTime> {
    if forward {
        base.checked_add_months(Months::new(months))
    } else {
        base.checked_sub_months(Months::new(months))
    }
}

/// Check whether a `{{...}}` expression is a date expression, optionally
/// followed by `| format`.
pub fn is_date_expr(expr: &str) -> bool {
    let head = expr.split('|').next().unwrap_or(expr);
    is_relative_expr(head)
}

/// Evaluate a `{{...}}` date expression to text.
///
/// `today` renders as a date, `time` as `HH:MM`, `now` as a full timestamp,
/// unless a `| pattern` suffix is given.
pub fn evaluate_date_expr(expr: &str) -> Result<String, DateError> {
    let (head, pattern) = match expr.split_once('|') {
        Some((h, p)) => (h.trim(), Some(p.trim())),
        None => (expr.trim(), None),
    };

    let value = evaluate_relative(head)?;
    let base = head.to_lowercase();
    let pattern = pattern.unwrap_or(if base.starts_with("now") {
        DATETIME_FORMAT
    } else if base.starts_with("time") {
        "%H:%M"
    } else {
        DATE_FORMAT
    });
    format_pattern(&value, pattern)
}
