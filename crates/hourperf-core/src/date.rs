//! Calendar-day resolution
//!
//! Date cells are either spreadsheet serial days (days since 1899-12-30, the
//! fraction being the time of day) or text in one of a handful of formats.
//! Every value resolves to a UTC calendar day, represented as the
//! millisecond timestamps of its first and last instant.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

pub const MS_PER_DAY: i64 = 86_400_000;

/// Offset from the first to the last millisecond of a day
pub const DAY_END_OFFSET_MS: i64 = MS_PER_DAY - 1;

/// 1970-01-01 counted from 0001-01-01 = day 1
const UNIX_EPOCH_DAYS_FROM_CE: i64 = 719_163;

/// 1899-12-30 counted from 0001-01-01 = day 1
const SERIAL_EPOCH_DAYS_FROM_CE: i64 = 693_594;

/// Date-only formats, tried in order; the first match wins
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%m/%d/%Y"];

/// Years a date cell may resolve to
const SUPPORTED_YEARS: std::ops::RangeInclusive<i32> = 1..=9999;

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// ISO-8601 shapes without an offset
const ISO_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Resolve a date cell to its calendar day
pub fn resolve_date(value: &str) -> Option<NaiveDate> {
    let text = value.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(serial) = text.parse::<f64>() {
        if let Some(day) = from_serial(serial) {
            return Some(day);
        }
    }
    parse_text_date(text)
}

/// Day of a spreadsheet serial number; the time-of-day fraction is floored away
pub fn from_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() {
        return None;
    }
    let days = serial.floor();
    if days.abs() > f64::from(i32::MAX) {
        return None;
    }
    let from_ce = SERIAL_EPOCH_DAYS_FROM_CE + days as i64;
    i32::try_from(from_ce)
        .ok()
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .filter(|day| SUPPORTED_YEARS.contains(&day.year()))
}

fn parse_text_date(text: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| parse_date(text, fmt))
        .or_else(|| parse_datetime(text, DATETIME_FORMAT))
        .or_else(|| parse_iso(text))
}

fn parse_date(text: &str, fmt: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, fmt)
        .ok()
        .filter(|_| has_four_digit_year(text, fmt))
}

fn parse_datetime(text: &str, fmt: &str) -> Option<NaiveDate> {
    NaiveDateTime::parse_from_str(text, fmt)
        .ok()
        .filter(|_| has_four_digit_year(text, fmt))
        .map(|dt| dt.date())
}

/// `%Y` in chrono takes any digit count; the year field must be exactly four digits
fn has_four_digit_year(text: &str, fmt: &str) -> bool {
    let digits = if fmt.starts_with("%Y") {
        text.bytes().take_while(u8::is_ascii_digit).count()
    } else {
        text.bytes().rev().take_while(u8::is_ascii_digit).count()
    };
    digits == 4
}

/// Generic ISO-8601; with an offset, the calendar date as written is kept
fn parse_iso(text: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    ISO_FORMATS.iter().find_map(|fmt| parse_datetime(text, fmt))
}

/// Midnight UTC of `date` in milliseconds since the Unix epoch
pub fn date_to_ms(date: NaiveDate) -> i64 {
    (i64::from(date.num_days_from_ce()) - UNIX_EPOCH_DAYS_FROM_CE) * MS_PER_DAY
}

/// Calendar day (UTC) containing the timestamp
pub fn ms_to_date(ms: i64) -> Option<NaiveDate> {
    let from_ce = ms.div_euclid(MS_PER_DAY) + UNIX_EPOCH_DAYS_FROM_CE;
    i32::try_from(from_ce)
        .ok()
        .and_then(NaiveDate::from_num_days_from_ce_opt)
}

/// First millisecond of the value's day, `None` when it does not resolve
pub fn day_start(value: &str) -> Option<i64> {
    resolve_date(value).map(date_to_ms)
}

/// Last millisecond of the value's day, `None` when it does not resolve
pub fn day_end(value: &str) -> Option<i64> {
    day_start(value).map(|ms| ms + DAY_END_OFFSET_MS)
}

/// Closed interval covering one calendar day
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayWindow {
    pub start_ms: i64,
    pub end_ms: i64,
}

impl DayWindow {
    pub fn for_day(day: NaiveDate) -> Self {
        Self::from_start_ms(date_to_ms(day))
    }

    pub fn from_start_ms(start_ms: i64) -> Self {
        Self {
            start_ms,
            end_ms: start_ms + DAY_END_OFFSET_MS,
        }
    }

    /// Window of a raw date value
    pub fn parse(value: &str) -> Option<Self> {
        day_start(value).map(Self::from_start_ms)
    }

    pub fn contains(&self, ms: i64) -> bool {
        (self.start_ms..=self.end_ms).contains(&ms)
    }

    pub fn day(&self) -> Option<NaiveDate> {
        ms_to_date(self.start_ms)
    }
}
