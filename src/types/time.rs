//! PostgreSQL `time` and `timetz` encoding and decoding
//!
//! Binary formats:
//! - `time` (8 bytes): i64 big-endian microseconds since midnight, in
//!   `0..=86_400_000_000` (`24:00:00` is a valid value)
//! - `timetz` (12 bytes): the same microsecond count, then an i32 zone
//!   displacement in seconds **west** of UTC (the negation of the usual
//!   east-positive offset)

use std::fmt;

use chrono::{
    DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeDelta, TimeZone,
};

use super::calendar;
use crate::buffer::{ReadBuffer, WriteBuffer};
use crate::config::Config;
use crate::constants::temporal::{MICROS_PER_DAY, MICROS_PER_SECOND};
use crate::constants::width;
use crate::error::{Error, Result};
use crate::value::Value;

/// Microseconds of a time-of-day duration, `24:00:00` included
fn micros_of_day(delta: &TimeDelta, target: &'static str) -> Result<i64> {
    match delta.num_microseconds() {
        Some(m) if (0..=MICROS_PER_DAY).contains(&m) => Ok(m),
        _ => Err(Error::overflow(target, format!("{} is not a time of day", delta))),
    }
}

fn write_clock(f: &mut fmt::Formatter<'_>, micros: i64) -> fmt::Result {
    let secs = micros / MICROS_PER_SECOND;
    let fraction = micros % MICROS_PER_SECOND;
    write!(f, "{:02}:{:02}:{:02}", secs / 3600, secs / 60 % 60, secs % 60)?;
    if fraction != 0 {
        let digits = format!("{:06}", fraction);
        write!(f, ".{}", digits.trim_end_matches('0'))?;
    }
    Ok(())
}

/// A `timetz` value: local time of day plus a fixed UTC offset
///
/// Equality compares both fields, like the server's `=` operator; use
/// [`PgTimeTz::utc_micros`] to compare instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PgTimeTz {
    micros: i64,
    offset: FixedOffset,
}

impl PgTimeTz {
    /// Create a value from a time of day and its offset
    pub fn new(time: NaiveTime, offset: FixedOffset) -> Self {
        Self {
            micros: calendar::micros_from_naive_time(time),
            offset,
        }
    }

    /// Create a value from microseconds since midnight
    ///
    /// Accepts `0..=86_400_000_000`; the upper bound is `24:00:00`.
    pub fn from_micros(micros: i64, offset: FixedOffset) -> Result<Self> {
        if !(0..=MICROS_PER_DAY).contains(&micros) {
            return Err(Error::overflow(
                "timetz",
                format!("{} microseconds is not a time of day", micros),
            ));
        }
        Ok(Self { micros, offset })
    }

    /// Microseconds since local midnight
    pub fn micros(&self) -> i64 {
        self.micros
    }

    /// UTC offset (east-positive)
    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Local time of day; fails for `24:00:00`
    pub fn time(&self) -> Result<NaiveTime> {
        calendar::naive_time_from_micros(self.micros, "NaiveTime")
    }

    /// Microseconds since UTC midnight; may fall outside a single day
    pub fn utc_micros(&self) -> i64 {
        self.micros - self.offset.local_minus_utc() as i64 * MICROS_PER_SECOND
    }

    /// The same instant at another offset, wrapped into a single day
    ///
    /// `24:00:00` is kept when the offset does not change.
    pub fn at_offset(&self, offset: FixedOffset) -> Self {
        if offset == self.offset {
            return *self;
        }
        let shifted = self.utc_micros() + offset.local_minus_utc() as i64 * MICROS_PER_SECOND;
        Self {
            micros: shifted.rem_euclid(MICROS_PER_DAY),
            offset,
        }
    }

    /// The same instant at the process local offset in effect now
    ///
    /// This is the offset `timetz` writes use for inputs without one, so a
    /// local time written and read back comes out unchanged.
    pub fn at_local_offset(&self) -> Self {
        self.at_offset(calendar::current_local_offset())
    }

    /// Anchor on 0001-01-01 to obtain a zoned date/time
    pub fn to_date_time_offset(&self) -> Result<DateTime<FixedOffset>> {
        let anchor = NaiveDate::from_ymd_opt(1, 1, 1)
            .ok_or_else(|| Error::overflow("DateTime<FixedOffset>", "anchor date"))?;
        self.anchored_on(anchor, "DateTime<FixedOffset>")
    }

    /// Anchor on today's local date and render in the process local zone
    pub fn to_local(&self) -> Result<DateTime<Local>> {
        let today = Local::now().date_naive();
        self.anchored_on(today, "DateTime<Local>")
            .map(|dt| dt.with_timezone(&Local))
    }

    fn anchored_on(&self, date: NaiveDate, target: &'static str) -> Result<DateTime<FixedOffset>> {
        let local: NaiveDateTime = date
            .and_time(NaiveTime::MIN)
            .checked_add_signed(TimeDelta::microseconds(self.micros))
            .ok_or_else(|| Error::overflow(target, self.to_string()))?;
        self.offset
            .from_local_datetime(&local)
            .single()
            .ok_or_else(|| Error::overflow(target, self.to_string()))
    }
}

impl fmt::Display for PgTimeTz {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_clock(f, self.micros)?;
        let east = self.offset.local_minus_utc();
        let sign = if east < 0 { '-' } else { '+' };
        let east = east.unsigned_abs();
        write!(f, "{}{:02}", sign, east / 3600)?;
        if east % 3600 != 0 {
            write!(f, ":{:02}", east / 60 % 60)?;
            if east % 60 != 0 {
                write!(f, ":{:02}", east % 60)?;
            }
        }
        Ok(())
    }
}

/// Handler for `time without time zone`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeHandler;

impl TimeHandler {
    const TYPE_NAME: &'static str = "time";

    fn encode(&self, value: &Value) -> Result<i64> {
        match value {
            Value::Time(delta) => micros_of_day(delta, Self::TYPE_NAME),
            Value::NaiveTime(time) => Ok(calendar::micros_from_naive_time(*time)),
            Value::NaiveDateTime(dt) => Ok(calendar::micros_from_naive_time(dt.time())),
            other => Err(Error::conversion(other.type_name(), Self::TYPE_NAME)),
        }
    }

    /// Validate a value and return its encoded length
    pub fn validate_and_get_length(&self, value: &Value, _config: &Config) -> Result<usize> {
        self.encode(value)?;
        Ok(width::TIME)
    }

    /// Write a value
    pub fn write(&self, value: &Value, buf: &mut WriteBuffer, _config: &Config) -> Result<()> {
        let micros = self.encode(value)?;
        buf.write_i64_be(micros)
    }

    /// Read a value
    pub fn read(&self, buf: &mut ReadBuffer, len: usize) -> Result<Value> {
        super::check_fixed_length(buf, len, width::TIME, Self::TYPE_NAME)?;
        let micros = buf.read_i64_be()?;
        if !(0..=MICROS_PER_DAY).contains(&micros) {
            return Err(Error::invalid_format(
                Self::TYPE_NAME,
                format!("{} microseconds is not a time of day", micros),
            ));
        }
        Ok(Value::Time(TimeDelta::microseconds(micros)))
    }
}

/// Handler for `time with time zone`
///
/// Inputs without an offset take the process local offset; `DateTime<Utc>`
/// is converted to local time first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeTzHandler;

impl TimeTzHandler {
    const TYPE_NAME: &'static str = "timetz";

    fn encode(&self, value: &Value) -> Result<PgTimeTz> {
        match value {
            Value::TimeTz(timetz) => PgTimeTz::from_micros(timetz.micros, timetz.offset),
            Value::DateTimeFixed(dt) => Ok(PgTimeTz::new(dt.time(), *dt.offset())),
            Value::DateTimeLocal(dt) => Ok(PgTimeTz::new(dt.time(), dt.offset().fix())),
            Value::DateTimeUtc(dt) => {
                let local = dt.with_timezone(&Local);
                Ok(PgTimeTz::new(local.time(), local.offset().fix()))
            }
            Value::NaiveDateTime(dt) => Ok(PgTimeTz::new(dt.time(), calendar::local_offset_at(dt))),
            Value::NaiveTime(time) => Ok(PgTimeTz::new(*time, calendar::current_local_offset())),
            Value::Time(delta) => PgTimeTz::from_micros(
                micros_of_day(delta, Self::TYPE_NAME)?,
                calendar::current_local_offset(),
            ),
            other => Err(Error::conversion(other.type_name(), Self::TYPE_NAME)),
        }
    }

    /// Validate a value and return its encoded length
    pub fn validate_and_get_length(&self, value: &Value, _config: &Config) -> Result<usize> {
        self.encode(value)?;
        Ok(width::TIMETZ)
    }

    /// Write a value
    pub fn write(&self, value: &Value, buf: &mut WriteBuffer, _config: &Config) -> Result<()> {
        let timetz = self.encode(value)?;
        buf.write_i64_be(timetz.micros)?;
        buf.write_i32_be(-timetz.offset.local_minus_utc())
    }

    /// Read a value
    pub fn read(&self, buf: &mut ReadBuffer, len: usize) -> Result<Value> {
        super::check_fixed_length(buf, len, width::TIMETZ, Self::TYPE_NAME)?;
        let micros = buf.read_i64_be()?;
        let zone_west = buf.read_i32_be()?;

        let offset = zone_west
            .checked_neg()
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                Error::invalid_format(Self::TYPE_NAME, format!("invalid zone {}", zone_west))
            })?;
        let timetz = PgTimeTz::from_micros(micros, offset).map_err(|_| {
            Error::invalid_format(
                Self::TYPE_NAME,
                format!("{} microseconds is not a time of day", micros),
            )
        })?;
        Ok(Value::TimeTz(timetz))
    }
}
