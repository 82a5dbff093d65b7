//! Calendar-day arithmetic used by the schedule passes.
//!
//! All dates are `NaiveDate`, which has no time-of-day and no time zone, so
//! every helper here gives the same answer regardless of host locale.

use chrono::{Days, NaiveDate};
use thiserror::Error;

/// ISO format used for dates stored as strings.
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Date arithmetic left the range `NaiveDate` can represent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("date out of range: {date} {days:+} days")]
pub struct DateError {
    pub date: NaiveDate,
    pub days: i64,
}

/// Add `days` calendar days (negative moves backwards).
pub fn add_days(date: NaiveDate, days: i64) -> Result<NaiveDate, DateError> {
    let shifted = if days >= 0 {
        date.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
    };
    shifted.ok_or(DateError { date, days })
}

/// Absolute number of whole days between two dates.
pub fn days_between(a: NaiveDate, b: NaiveDate) -> i64 {
    (b - a).num_days().abs()
}

/// Latest of the present dates, or `None` if there are none.
pub fn max_date<I>(dates: I) -> Option<NaiveDate>
where
    I: IntoIterator<Item = Option<NaiveDate>>,
{
    dates.into_iter().flatten().max()
}

/// Earliest of the present dates, or `None` if there are none.
pub fn min_date<I>(dates: I) -> Option<NaiveDate>
where
    I: IntoIterator<Item = Option<NaiveDate>>,
{
    dates.into_iter().flatten().min()
}

/// Parse a `YYYY-MM-DD` string. Blank or malformed input yields `None`.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, ISO_DATE_FORMAT).ok()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(ISO_DATE_FORMAT).to_string()
}
