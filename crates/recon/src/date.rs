use chrono::{Datelike, NaiveDate};

use crate::config::CalendarConfig;

/// Weekday ideographs, Monday first.
const WEEKDAYS: [&str; 7] = ["一", "二", "三", "四", "五", "六", "日"];

/// Result of normalizing a draft date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefenseDate {
    /// Parsed and rendered in the configured calendar.
    Formatted(String),
    /// Not `YYYY-MM-DD`; the input text, untouched.
    PassedThrough(String),
}

impl DefenseDate {
    pub fn text(&self) -> &str {
        match self {
            Self::Formatted(s) | Self::PassedThrough(s) => s,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Self::Formatted(s) | Self::PassedThrough(s) => s,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::PassedThrough(_))
    }
}

/// `2026-06-20` → `民國115年6月20日(星期六)`. Unparsable input degrades to
/// itself; it never fails.
pub fn format_defense_date(raw: &str, calendar: &CalendarConfig) -> DefenseDate {
    match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
        Ok(date) => {
            let weekday = WEEKDAYS[date.weekday().num_days_from_monday() as usize];
            DefenseDate::Formatted(format!(
                "{}{}年{}月{}日(星期{})",
                calendar.era_label,
                date.year() - calendar.epoch_year,
                date.month(),
                date.day(),
                weekday,
            ))
        }
        Err(e) => {
            tracing::warn!(date = raw, error = %e, "date is not YYYY-MM-DD, passing through");
            DefenseDate::PassedThrough(raw.to_string())
        }
    }
}
