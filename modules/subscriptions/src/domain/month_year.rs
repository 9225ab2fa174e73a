//! `MM-YYYY` month codec.
//!
//! Months are stored as `NaiveDate` pinned to the first day.

use chrono::{Datelike, NaiveDate};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MonthYearError {
    #[error("date string is empty")]
    Empty,
    #[error("expected MM-YYYY, got '{0}'")]
    InvalidFormat(String),
}

/// Parse `MM-YYYY` into the first day of that month.
///
/// The input must be exactly two month digits, a hyphen and four year digits.
pub fn parse_month_year(text: &str) -> Result<NaiveDate, MonthYearError> {
    if text.is_empty() {
        return Err(MonthYearError::Empty);
    }
    let invalid = || MonthYearError::InvalidFormat(text.to_string());

    let bytes = text.as_bytes();
    let shape_ok = bytes.len() == 7
        && bytes[2] == b'-'
        && bytes[..2].iter().all(u8::is_ascii_digit)
        && bytes[3..].iter().all(u8::is_ascii_digit);
    if !shape_ok {
        return Err(invalid());
    }

    let month: u32 = text[..2].parse().map_err(|_| invalid())?;
    let year: i32 = text[3..].parse().map_err(|_| invalid())?;
    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)
}

/// Render a date as `MM-YYYY`. The day is ignored.
pub fn format_month_year(date: NaiveDate) -> String {
    format!("{:02}-{:04}", date.month(), date.year())
}
