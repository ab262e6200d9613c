//! Field parsing utilities for NEM12 records
//!
//! Pure helpers for the numeric and date fields of the format: decimal text
//! validation, `CCYYMMDD` date decoding and interval timestamp arithmetic.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::constants::{NEM12_DATE_LENGTH, SQL_TIMESTAMP_FORMAT};

/// Integers and plain decimals with an optional leading minus sign
static DECIMAL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+(\.\d+)?$").expect("decimal pattern is valid"));

/// Check whether a value is plain decimal text
///
/// Scientific notation and multiple decimal points are rejected. Magnitude is
/// not checked, so text beyond the range of [`Decimal`] is still valid here.
pub fn is_valid_decimal(value: &str) -> bool {
    DECIMAL_PATTERN.is_match(value)
}

/// Parse plain decimal text, `None` when it is not valid or does not fit a [`Decimal`]
pub fn parse_decimal(value: &str) -> Option<Decimal> {
    if is_valid_decimal(value) {
        Decimal::from_str(value).ok()
    } else {
        None
    }
}

/// Check whether a string is a real calendar date in `CCYYMMDD` form
pub fn is_valid_nem12_date(value: &str) -> bool {
    parse_nem12_date(value).is_some()
}

/// Decode a `CCYYMMDD` date field
///
/// The field is always 8 characters with no separators, e.g. `20030501` is
/// 1 May 2003. Returns `None` for malformed text or impossible dates.
pub fn parse_nem12_date(value: &str) -> Option<NaiveDate> {
    if value.len() != NEM12_DATE_LENGTH || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let year: i32 = value[0..4].parse().ok()?;
    let month: u32 = value[4..6].parse().ok()?;
    let day: u32 = value[6..8].parse().ok()?;

    NaiveDate::from_ymd_opt(year, month, day)
}

/// Timestamp for the interval at zero-based `index` of a day
///
/// The first interval of a day is the first interval after midnight, so index 0
/// ends at `interval_length` minutes past midnight and the last interval of the
/// day ends at midnight of the following day.
pub fn calculate_interval_timestamp(
    base_date: NaiveDate,
    interval_length: u32,
    index: usize,
) -> NaiveDateTime {
    let minutes_from_start = (index as i64 + 1) * interval_length as i64;
    base_date.and_time(chrono::NaiveTime::MIN) + Duration::minutes(minutes_from_start)
}

/// Format a timestamp as `YYYY-MM-DD HH:MM:SS` without a timezone suffix
pub fn format_timestamp(timestamp: &NaiveDateTime) -> String {
    timestamp.format(SQL_TIMESTAMP_FORMAT).to_string()
}
