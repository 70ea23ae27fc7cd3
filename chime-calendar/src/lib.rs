//! Calendar arithmetic for 32-bit NTP-era timestamps.
//!
//! The rotation engine stamps everything in seconds since 1900-01-01 00:00 UTC
//! truncated to 32 bits, which wraps roughly every 136 years. This crate
//! unfolds such stamps onto the Unix timeline using a pivot instant, and
//! derives the civil quantities (dates, ISO weeks, unit boundaries) that
//! generation suffixes and validity windows are built from.

use chrono::{Datelike, Days, IsoWeek, NaiveDate, NaiveTime, TimeZone, Utc};
use thiserror::Error;

/// Seconds between the NTP epoch (1900-01-01) and the Unix epoch (1970-01-01).
pub const SECS_1900_TO_1970: i64 = 2_208_988_800;

/// Seconds in a civil day.
pub const SECS_PER_DAY: u32 = 86_400;

/// Seconds in a seven-day week.
pub const SECS_PER_WEEK: u32 = 7 * SECS_PER_DAY;

/// Length of one 32-bit NTP era.
const ERA_SECS: i64 = 1 << 32;

/// Errors from calendar conversions.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CalendarError {
    #[error("instant {0} (Unix seconds) is outside the supported calendar range")]
    OutOfRange(i64),
}

/// Unfold a truncated NTP-era stamp onto the Unix timeline.
///
/// Returns the unique Unix instant congruent to `stamp` (mod 2^32) within
/// the era-long window centered on `pivot`, i.e. `[pivot - 2^31, pivot + 2^31)`.
pub fn unfold(stamp: u32, pivot: i64) -> i64 {
    let base = pivot - ERA_SECS / 2;
    let congruent = i64::from(stamp) - SECS_1900_TO_1970;
    base + (congruent - base).rem_euclid(ERA_SECS)
}

/// Truncate a Unix instant to a 32-bit NTP-era stamp.
pub fn fold_unix(unix: i64) -> u32 {
    (unix + SECS_1900_TO_1970).rem_euclid(ERA_SECS) as u32
}

/// Civil date (proleptic Gregorian, UTC) containing the unfolded stamp.
pub fn civil_date(stamp: u32, pivot: i64) -> Result<NaiveDate, CalendarError> {
    date_of_unix(unfold(stamp, pivot))
}

/// ISO 8601 week (numbering year plus week index) containing the stamp.
///
/// Near year boundaries the ISO year can differ from the civil year; suffix
/// text for weekly generations must use the ISO year.
pub fn iso_week(stamp: u32, pivot: i64) -> Result<IsoWeek, CalendarError> {
    Ok(civil_date(stamp, pivot)?.iso_week())
}

/// NTP-era stamp of midnight UTC at the start of `date`.
pub fn date_start_ntp(date: NaiveDate) -> u32 {
    let unix = Utc
        .from_utc_datetime(&date.and_time(NaiveTime::MIN))
        .timestamp();
    fold_unix(unix)
}

/// Start stamps of the civil day containing the stamp and of the next day.
pub fn day_bounds(stamp: u32, pivot: i64) -> Result<(u32, u32), CalendarError> {
    let date = civil_date(stamp, pivot)?;
    let lo = date_start_ntp(date);
    Ok((lo, lo.wrapping_add(SECS_PER_DAY)))
}

/// Start stamps of the ISO week (Monday 00:00 UTC) containing the stamp and
/// of the following week.
pub fn week_bounds(stamp: u32, pivot: i64) -> Result<(u32, u32), CalendarError> {
    let unix = unfold(stamp, pivot);
    let date = date_of_unix(unix)?;
    let back = u64::from(date.weekday().num_days_from_monday());
    let monday = date
        .checked_sub_days(Days::new(back))
        .ok_or(CalendarError::OutOfRange(unix))?;
    let lo = date_start_ntp(monday);
    Ok((lo, lo.wrapping_add(SECS_PER_WEEK)))
}

/// Start stamps of the civil month containing the stamp and of the next month.
pub fn month_bounds(stamp: u32, pivot: i64) -> Result<(u32, u32), CalendarError> {
    let unix = unfold(stamp, pivot);
    let date = date_of_unix(unix)?;
    let first = date.with_day(1).ok_or(CalendarError::OutOfRange(unix))?;
    let next = if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
    }
    .ok_or(CalendarError::OutOfRange(unix))?;
    Ok((date_start_ntp(first), date_start_ntp(next)))
}

/// Start stamps of the civil year containing the stamp and of the next year.
pub fn year_bounds(stamp: u32, pivot: i64) -> Result<(u32, u32), CalendarError> {
    let unix = unfold(stamp, pivot);
    let date = date_of_unix(unix)?;
    let first =
        NaiveDate::from_ymd_opt(date.year(), 1, 1).ok_or(CalendarError::OutOfRange(unix))?;
    let next =
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1).ok_or(CalendarError::OutOfRange(unix))?;
    Ok((date_start_ntp(first), date_start_ntp(next)))
}

fn date_of_unix(unix: i64) -> Result<NaiveDate, CalendarError> {
    Utc.timestamp_opt(unix, 0)
        .single()
        .map(|dt| dt.date_naive())
        .ok_or(CalendarError::OutOfRange(unix))
}
