//! Formatting helpers for display: dates and phone links.
//!
//! Stored datetimes are UTC instants. They are shown as calendar dates in
//! UTC, in the day-month-year order used in Ireland.

use chrono::{DateTime, Utc};

/// Shown when an event has no usable date.
pub const DATE_TBC: &str = "Date to be confirmed";

/// `Saturday 14 June 2025`
pub fn long_date(dt: &DateTime<Utc>) -> String {
    dt.format("%A %-d %B %Y").to_string()
}

/// `14/06/2025`
pub fn short_date(dt: &DateTime<Utc>) -> String {
    dt.format("%d/%m/%Y").to_string()
}

/// [`long_date`], or [`DATE_TBC`] when absent.
pub fn long_date_or_tbc(dt: Option<&DateTime<Utc>>) -> String {
    dt.map(long_date).unwrap_or_else(|| DATE_TBC.to_string())
}

/// [`short_date`], or [`DATE_TBC`] when absent.
pub fn short_date_or_tbc(dt: Option<&DateTime<Utc>>) -> String {
    dt.map(short_date).unwrap_or_else(|| DATE_TBC.to_string())
}

/// Machine-readable value for `<time datetime=…>`.
pub fn iso_date(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d").to_string()
}

/// `tel:` link for a displayed phone number.
///
/// Drops the bracketed trunk zero of international numbers, so
/// `+353 (0)74 123 4567` dials `+353741234567`.
pub fn tel_href(phone: &str) -> String {
    let dialable: String = phone
        .replace("(0)", "")
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();
    format!("tel:{dialable}")
}
