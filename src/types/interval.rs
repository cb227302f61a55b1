//! PostgreSQL `interval` encoding and decoding
//!
//! Binary format (16 bytes):
//! - i64 big-endian microseconds
//! - i32 big-endian days
//! - i32 big-endian months
//!
//! The three fields are independent: a month is not a fixed number of days
//! and a day is not always 24 hours across a daylight-saving change, so they
//! are never collapsed on the wire.

use std::fmt;

use chrono::TimeDelta;

use crate::buffer::{ReadBuffer, WriteBuffer};
use crate::config::Config;
use crate::constants::temporal::{DAYS_PER_MONTH, MICROS_PER_DAY, MICROS_PER_SECOND};
use crate::constants::width;
use crate::error::{Error, Result};
use crate::value::Value;

const MICROS_PER_HOUR: i64 = 3600 * MICROS_PER_SECOND;

/// An `interval` value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PgInterval {
    /// Months (years are stored as 12 months)
    pub months: i32,
    /// Days
    pub days: i32,
    /// Microseconds
    pub microseconds: i64,
}

impl PgInterval {
    /// Create an interval from its three fields
    pub fn new(months: i32, days: i32, microseconds: i64) -> Self {
        Self {
            months,
            days,
            microseconds,
        }
    }

    /// Split a duration into whole days and a microsecond remainder
    ///
    /// Both parts carry the sign of the duration; months stay zero.
    pub fn from_duration(duration: TimeDelta) -> Result<Self> {
        let micros = duration
            .num_microseconds()
            .ok_or_else(|| Error::overflow("interval", format!("{} is too large", duration)))?;
        let days = i32::try_from(micros / MICROS_PER_DAY)
            .map_err(|_| Error::overflow("interval", format!("{} is too large", duration)))?;
        Ok(Self::new(0, days, micros % MICROS_PER_DAY))
    }

    /// Flatten into a single duration, taking a month as 30 days and a day
    /// as 24 hours
    ///
    /// This loses the calendar meaning of months and days.
    pub fn to_duration_lossy(&self) -> Result<TimeDelta> {
        let total = (self.months as i128 * DAYS_PER_MONTH as i128 + self.days as i128)
            * MICROS_PER_DAY as i128
            + self.microseconds as i128;
        i64::try_from(total)
            .map(TimeDelta::microseconds)
            .map_err(|_| Error::overflow("TimeDelta", format!("{} is too large", self)))
    }

    /// Move whole 24-hour periods from the time field into days
    pub fn justify_hours(&self) -> Result<Self> {
        let mut micros = self.microseconds;
        let whole_days = micros / MICROS_PER_DAY;
        micros -= whole_days * MICROS_PER_DAY;
        let mut days = i32::try_from(whole_days)
            .ok()
            .and_then(|d| self.days.checked_add(d))
            .ok_or_else(|| self.out_of_range())?;

        if days > 0 && micros < 0 {
            micros += MICROS_PER_DAY;
            days -= 1;
        } else if days < 0 && micros > 0 {
            micros -= MICROS_PER_DAY;
            days += 1;
        }
        Ok(Self::new(self.months, days, micros))
    }

    /// Move whole 30-day periods from the days field into months
    pub fn justify_days(&self) -> Result<Self> {
        let mut days = self.days;
        let whole_months = days / DAYS_PER_MONTH as i32;
        days -= whole_months * DAYS_PER_MONTH as i32;
        let mut months = self
            .months
            .checked_add(whole_months)
            .ok_or_else(|| self.out_of_range())?;

        if months > 0 && days < 0 {
            days += DAYS_PER_MONTH as i32;
            months -= 1;
        } else if months < 0 && days > 0 {
            days -= DAYS_PER_MONTH as i32;
            months += 1;
        }
        Ok(Self::new(months, days, self.microseconds))
    }

    /// Justify hours and days together so all fields share one sign
    pub fn justify_interval(&self) -> Result<Self> {
        let mut micros = self.microseconds;
        let whole_days = micros / MICROS_PER_DAY;
        micros -= whole_days * MICROS_PER_DAY;
        let mut days = i32::try_from(whole_days)
            .ok()
            .and_then(|d| self.days.checked_add(d))
            .ok_or_else(|| self.out_of_range())?;

        let whole_months = days / DAYS_PER_MONTH as i32;
        days -= whole_months * DAYS_PER_MONTH as i32;
        let mut months = self
            .months
            .checked_add(whole_months)
            .ok_or_else(|| self.out_of_range())?;

        if months > 0 && (days < 0 || (days == 0 && micros < 0)) {
            days += DAYS_PER_MONTH as i32;
            months -= 1;
        } else if months < 0 && (days > 0 || (days == 0 && micros > 0)) {
            days -= DAYS_PER_MONTH as i32;
            months += 1;
        }

        if days > 0 && micros < 0 {
            micros += MICROS_PER_DAY;
            days -= 1;
        } else if days < 0 && micros > 0 {
            micros -= MICROS_PER_DAY;
            days += 1;
        }
        Ok(Self::new(months, days, micros))
    }

    fn out_of_range(&self) -> Error {
        Error::overflow("interval", format!("justifying {} overflows", self))
    }
}

impl TryFrom<TimeDelta> for PgInterval {
    type Error = Error;

    fn try_from(duration: TimeDelta) -> Result<Self> {
        Self::from_duration(duration)
    }
}

/// Renders the server's `postgres` interval style, e.g.
/// `1 year 2 mons -3 days +04:05:06.5`
impl fmt::Display for PgInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut is_zero = true;
        let mut is_before = false;

        let parts = [
            (self.months / 12, "year"),
            (self.months % 12, "mon"),
            (self.days, "day"),
        ];
        for (value, unit) in parts {
            if value == 0 {
                continue;
            }
            write!(
                f,
                "{}{}{} {}{}",
                if is_zero { "" } else { " " },
                if is_before && value > 0 { "+" } else { "" },
                value,
                unit,
                if value != 1 { "s" } else { "" }
            )?;
            is_before = value < 0;
            is_zero = false;
        }

        let micros = self.microseconds;
        if is_zero || micros != 0 {
            let sign = if micros < 0 {
                "-"
            } else if is_before {
                "+"
            } else {
                ""
            };
            let abs = micros.unsigned_abs();
            let hours = abs / MICROS_PER_HOUR as u64;
            let minutes = abs / 60_000_000 % 60;
            let seconds = abs / MICROS_PER_SECOND as u64 % 60;
            let fraction = abs % MICROS_PER_SECOND as u64;
            write!(
                f,
                "{}{}{:02}:{:02}:{:02}",
                if is_zero { "" } else { " " },
                sign,
                hours,
                minutes,
                seconds
            )?;
            if fraction != 0 {
                let digits = format!("{:06}", fraction);
                write!(f, ".{}", digits.trim_end_matches('0'))?;
            }
        }
        Ok(())
    }
}

/// Handler for `interval`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntervalHandler;

impl IntervalHandler {
    const TYPE_NAME: &'static str = "interval";

    fn encode(&self, value: &Value) -> Result<PgInterval> {
        match value {
            Value::Interval(interval) => Ok(*interval),
            Value::Time(duration) => PgInterval::from_duration(*duration),
            other => Err(Error::conversion(other.type_name(), Self::TYPE_NAME)),
        }
    }

    /// Validate a value and return its encoded length
    pub fn validate_and_get_length(&self, value: &Value, _config: &Config) -> Result<usize> {
        self.encode(value)?;
        Ok(width::INTERVAL)
    }

    /// Write a value
    pub fn write(&self, value: &Value, buf: &mut WriteBuffer, _config: &Config) -> Result<()> {
        let interval = self.encode(value)?;
        buf.write_i64_be(interval.microseconds)?;
        buf.write_i32_be(interval.days)?;
        buf.write_i32_be(interval.months)
    }

    /// Read a value
    pub fn read(&self, buf: &mut ReadBuffer, len: usize) -> Result<Value> {
        super::check_fixed_length(buf, len, width::INTERVAL, Self::TYPE_NAME)?;
        let microseconds = buf.read_i64_be()?;
        let days = buf.read_i32_be()?;
        let months = buf.read_i32_be()?;
        Ok(Value::Interval(PgInterval::new(months, days, microseconds)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_field_order() {
        let value = Value::Interval(PgInterval::new(3, 2, 1));
        let mut buf = WriteBuffer::new();
        IntervalHandler.write(&value, &mut buf, &Config::default()).unwrap();
        assert_eq!(
            buf.as_slice(),
            &[0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0, 3]
        );
        let mut read = ReadBuffer::from_slice(buf.as_slice());
        assert_eq!(IntervalHandler.read(&mut read, 16).unwrap(), value);
    }

    #[test]
    fn test_from_duration_splits_days() {
        let duration = TimeDelta::days(3) + TimeDelta::hours(4);
        let interval = PgInterval::from_duration(duration).unwrap();
        assert_eq!(interval, PgInterval::new(0, 3, 4 * MICROS_PER_HOUR));

        let negative = PgInterval::from_duration(-duration).unwrap();
        assert_eq!(negative, PgInterval::new(0, -3, -4 * MICROS_PER_HOUR));
    }

    #[test]
    fn test_lossy_flattening() {
        let interval = PgInterval::new(1, 2, 3);
        let duration = interval.to_duration_lossy().unwrap();
        assert_eq!(duration, TimeDelta::days(32) + TimeDelta::microseconds(3));
    }

    #[test]
    fn test_justify_hours() {
        let interval = PgInterval::new(0, 0, 27 * MICROS_PER_HOUR);
        assert_eq!(
            interval.justify_hours().unwrap(),
            PgInterval::new(0, 1, 3 * MICROS_PER_HOUR)
        );
        // 1 day -1 hour becomes 23 hours
        let mixed = PgInterval::new(0, 1, -MICROS_PER_HOUR);
        assert_eq!(
            mixed.justify_hours().unwrap(),
            PgInterval::new(0, 0, 23 * MICROS_PER_HOUR)
        );
    }

    #[test]
    fn test_justify_days() {
        let interval = PgInterval::new(0, 35, 0);
        assert_eq!(interval.justify_days().unwrap(), PgInterval::new(1, 5, 0));
        let mixed = PgInterval::new(1, -5, 0);
        assert_eq!(mixed.justify_days().unwrap(), PgInterval::new(0, 25, 0));
    }

    #[test]
    fn test_justify_interval() {
        // 1 mon -1 hour becomes 29 days 23:00:00
        let interval = PgInterval::new(1, 0, -MICROS_PER_HOUR);
        assert_eq!(
            interval.justify_interval().unwrap(),
            PgInterval::new(0, 29, 23 * MICROS_PER_HOUR)
        );
    }

    #[test]
    fn test_justify_overflow() {
        let interval = PgInterval::new(i32::MAX, 30, 0);
        assert!(interval.justify_days().unwrap_err().is_overflow());
    }

    #[test]
    fn test_display() {
        assert_eq!(PgInterval::default().to_string(), "00:00:00");
        assert_eq!(
            PgInterval::new(14, 3, 4 * MICROS_PER_HOUR + 5 * 60_000_000 + 6_500_000).to_string(),
            "1 year 2 mons 3 days 04:05:06.5"
        );
        assert_eq!(
            PgInterval::new(0, -1, 2 * MICROS_PER_HOUR).to_string(),
            "-1 days +02:00:00"
        );
        assert_eq!(PgInterval::new(1, 1, 0).to_string(), "1 mon 1 day");
    }

    #[test]
    fn test_duration_input() {
        let value = Value::Time(TimeDelta::hours(30));
        let mut buf = WriteBuffer::new();
        IntervalHandler.write(&value, &mut buf, &Config::default()).unwrap();
        let mut read = ReadBuffer::from_slice(buf.as_slice());
        assert_eq!(
            IntervalHandler.read(&mut read, 16).unwrap(),
            Value::Interval(PgInterval::new(0, 1, 6 * MICROS_PER_HOUR))
        );
    }
}
