//! Quick date helpers for the contract term
//!
//! "Today" is always passed in, so callers decide which clock to trust.

use crate::ValidationError;
use chrono::{Days, NaiveDate};

const ISO_FORMAT: &str = "%Y-%m-%d";

/// Parse an ISO `YYYY-MM-DD` date
pub fn parse_iso_date(value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), ISO_FORMAT)
        .map_err(|_| ValidationError::InvalidDate(value.to_string()))
}

/// Format a date as ISO `YYYY-MM-DD`
pub fn format_iso_date(date: NaiveDate) -> String {
    date.format(ISO_FORMAT).to_string()
}

fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    let shifted = if days >= 0 {
        date.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
    };
    shifted.unwrap_or(date)
}

/// ISO date `days` after today
pub fn today_plus(today: NaiveDate, days: i64) -> String {
    format_iso_date(add_days(today, days))
}

/// ISO date `days` after `start`
///
/// An empty or unparsable start date counts from today instead.
pub fn start_plus(start: &str, today: NaiveDate, days: i64) -> String {
    let base = parse_iso_date(start).unwrap_or(today);
    format_iso_date(add_days(base, days))
}
