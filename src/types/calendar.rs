//! Proleptic Gregorian calendar arithmetic on PostgreSQL epoch offsets
//!
//! Years use astronomical numbering: year 0 is 1 BC, year -1 is 2 BC. The
//! conversions are total over `i64` day counts, so they cover every value the
//! wire can carry, unlike the chrono types which stop at year ±262143.

use chrono::{FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Timelike};

use crate::constants::temporal::{
    MICROS_PER_DAY, MICROS_PER_SECOND, REGULAR_MAX_YEAR, REGULAR_MIN_YEAR, UNIX_TO_PG_EPOCH_DAYS,
};
use crate::error::{Error, Result};

/// Days from 2000-01-01 to the given civil date
pub(crate) fn days_from_civil(year: i64, month: u32, day: u32) -> i64 {
    let year = if month <= 2 { year - 1 } else { year };
    let era = year.div_euclid(400);
    let yoe = year - era * 400;
    let month = month as i64;
    let mp = if month > 2 { month - 3 } else { month + 9 };
    let doy = (153 * mp + 2) / 5 + day as i64 - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468 - UNIX_TO_PG_EPOCH_DAYS
}

/// Civil date of the given day offset from 2000-01-01
pub(crate) fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + UNIX_TO_PG_EPOCH_DAYS + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = if mp < 10 { mp + 3 } else { mp - 9 } as u32;
    let year = yoe + era * 400;
    (if month <= 2 { year + 1 } else { year }, month, day)
}

/// Check that the fields name a real day of the proleptic Gregorian calendar
pub(crate) fn is_valid_ymd(year: i64, month: u32, day: u32) -> bool {
    if !(1..=12).contains(&month) || day == 0 {
        return false;
    }
    let leap = year.rem_euclid(4) == 0 && (year.rem_euclid(100) != 0 || year.rem_euclid(400) == 0);
    let days_in_month = match month {
        2 if leap => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    };
    day <= days_in_month
}

/// Split microseconds since the epoch into (days, microseconds of day)
#[inline]
pub(crate) fn split_micros(micros: i64) -> (i64, i64) {
    (micros.div_euclid(MICROS_PER_DAY), micros.rem_euclid(MICROS_PER_DAY))
}

fn in_regular_range(year: i64) -> bool {
    (REGULAR_MIN_YEAR as i64..=REGULAR_MAX_YEAR as i64).contains(&year)
}

/// Project a day offset onto the regular date type
pub(crate) fn naive_date_from_days(days: i64, target: &'static str) -> Result<NaiveDate> {
    let (year, month, day) = civil_from_days(days);
    if !in_regular_range(year) {
        return Err(Error::overflow(
            target,
            format!("year {} is outside {}..={}", year, REGULAR_MIN_YEAR, REGULAR_MAX_YEAR),
        ));
    }
    NaiveDate::from_ymd_opt(year as i32, month, day)
        .ok_or_else(|| Error::overflow(target, format!("{}-{}-{}", year, month, day)))
}

/// Day offset of a chrono date
pub(crate) fn days_from_naive_date(date: NaiveDate) -> i64 {
    use chrono::Datelike;
    days_from_civil(date.year() as i64, date.month(), date.day())
}

/// Time of day for microseconds since midnight (`0..MICROS_PER_DAY`)
pub(crate) fn naive_time_from_micros(micros: i64, target: &'static str) -> Result<NaiveTime> {
    if !(0..MICROS_PER_DAY).contains(&micros) {
        return Err(Error::overflow(
            target,
            format!("{} microseconds is not a time of day", micros),
        ));
    }
    let secs = (micros / MICROS_PER_SECOND) as u32;
    let nanos = (micros % MICROS_PER_SECOND) as u32 * 1000;
    NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos)
        .ok_or_else(|| Error::overflow(target, format!("{} microseconds", micros)))
}

/// Microseconds since midnight, truncating sub-microsecond precision
///
/// A leap second is folded into the last microsecond of its minute.
pub(crate) fn micros_from_naive_time(time: NaiveTime) -> i64 {
    let secs = time.num_seconds_from_midnight() as i64;
    let nanos = time.nanosecond().min(999_999_999) as i64;
    secs * MICROS_PER_SECOND + nanos / 1000
}

/// Microseconds since the epoch of a wall-clock date/time
pub(crate) fn micros_from_naive(date_time: NaiveDateTime) -> Result<i64> {
    days_from_naive_date(date_time.date())
        .checked_mul(MICROS_PER_DAY)
        .and_then(|m| m.checked_add(micros_from_naive_time(date_time.time())))
        .ok_or_else(|| Error::overflow("timestamp", format!("{} is out of range", date_time)))
}

/// Project microseconds since the epoch onto the regular date/time type
pub(crate) fn naive_from_micros(micros: i64, target: &'static str) -> Result<NaiveDateTime> {
    let (days, time_micros) = split_micros(micros);
    let date = naive_date_from_days(days, target)?;
    let time = naive_time_from_micros(time_micros, target)?;
    Ok(date.and_time(time))
}

/// Smallest value of the regular date type
pub(crate) fn regular_min_date() -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(REGULAR_MIN_YEAR, 1, 1)
        .ok_or_else(|| Error::overflow("NaiveDate", "regular minimum"))
}

/// Largest value of the regular date type
pub(crate) fn regular_max_date() -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(REGULAR_MAX_YEAR, 12, 31)
        .ok_or_else(|| Error::overflow("NaiveDate", "regular maximum"))
}

/// Smallest value of the regular date/time type
pub(crate) fn regular_min_date_time() -> Result<NaiveDateTime> {
    Ok(regular_min_date()?.and_time(NaiveTime::MIN))
}

/// Largest value of the regular date/time type
pub(crate) fn regular_max_date_time() -> Result<NaiveDateTime> {
    let time = NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999)
        .ok_or_else(|| Error::overflow("NaiveDateTime", "regular maximum"))?;
    Ok(regular_max_date()?.and_time(time))
}

/// The process-local UTC offset in effect now
pub(crate) fn current_local_offset() -> FixedOffset {
    Local::now().offset().fix()
}

/// The process-local UTC offset for a local wall-clock date/time
///
/// Falls back to the current offset when the wall-clock time does not exist
/// locally (e.g. inside a daylight-saving gap).
pub(crate) fn local_offset_at(date_time: &NaiveDateTime) -> FixedOffset {
    Local
        .offset_from_local_datetime(date_time)
        .earliest()
        .map(|offset| offset.fix())
        .unwrap_or_else(current_local_offset)
}
