//! PostgreSQL `timestamp` and `timestamptz` encoding and decoding
//!
//! Binary format (8 bytes, both types):
//! - i64 big-endian microseconds relative to 2000-01-01 00:00:00
//! - `i64::MAX` is `infinity`, `i64::MIN` is `-infinity`
//!
//! For `timestamp` the count describes wall-clock fields with no zone. For
//! `timestamptz` it is always a UTC instant; zoned inputs are normalized
//! before writing.

use std::fmt;

use chrono::{DateTime, Local, NaiveDateTime, NaiveTime, Utc};

use super::calendar;
use super::date::PgDate;
use crate::buffer::{ReadBuffer, WriteBuffer};
use crate::config::Config;
use crate::constants::temporal::{MICROS_PER_DAY, TIMESTAMP_NEG_INFINITY, TIMESTAMP_POS_INFINITY};
use crate::constants::width;
use crate::error::{Error, Result};
use crate::value::Value;

/// A `timestamp`/`timestamptz` value that can express everything the wire can
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PgTimestamp {
    /// `-infinity`
    NegativeInfinity,
    /// Microseconds since 2000-01-01 00:00:00
    Finite(i64),
    /// `infinity`
    Infinity,
}

impl PgTimestamp {
    /// The PostgreSQL epoch, 2000-01-01 00:00:00
    pub const EPOCH: PgTimestamp = PgTimestamp::Finite(0);

    /// Create a timestamp from astronomical date fields and a time of day
    ///
    /// Year 0 is 1 BC and year -5 is 6 BC.
    pub fn from_ymd_hms_micro(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
        microsecond: u32,
    ) -> Result<Self> {
        let date = PgDate::from_ymd(year, month, day)?;
        let time = NaiveTime::from_hms_micro_opt(hour, minute, second, microsecond)
            .ok_or_else(|| Error::conversion("hour/minute/second", "timestamp"))?;
        Self::from_date_and_time(date, time)
    }

    /// Combine a finite date with a time of day
    pub fn from_date_and_time(date: PgDate, time: NaiveTime) -> Result<Self> {
        let days = date
            .days()
            .ok_or_else(|| Error::conversion("infinite date", "timestamp"))?;
        (days as i64)
            .checked_mul(MICROS_PER_DAY)
            .and_then(|m| m.checked_add(calendar::micros_from_naive_time(time)))
            .filter(|m| *m != TIMESTAMP_POS_INFINITY && *m != TIMESTAMP_NEG_INFINITY)
            .map(PgTimestamp::Finite)
            .ok_or_else(|| Error::overflow("timestamp", format!("{} is out of range", date)))
    }

    /// Create a timestamp from the wall-clock fields of a chrono value
    pub fn from_naive(date_time: NaiveDateTime) -> Result<Self> {
        calendar::micros_from_naive(date_time).map(PgTimestamp::Finite)
    }

    /// Check if this is a finite timestamp
    pub fn is_finite(&self) -> bool {
        matches!(self, PgTimestamp::Finite(_))
    }

    /// Check if this is `infinity` or `-infinity`
    pub fn is_infinite(&self) -> bool {
        !self.is_finite()
    }

    /// Microseconds since 2000-01-01 00:00:00 for finite timestamps
    pub fn micros(&self) -> Option<i64> {
        match self {
            PgTimestamp::Finite(m) => Some(*m),
            _ => None,
        }
    }

    /// Date part; infinities carry over
    pub fn date(&self) -> PgDate {
        match self {
            PgTimestamp::Infinity => PgDate::Infinity,
            PgTimestamp::NegativeInfinity => PgDate::NegativeInfinity,
            // |i64::MAX| / MICROS_PER_DAY fits comfortably in i32
            PgTimestamp::Finite(m) => PgDate::Finite(calendar::split_micros(*m).0 as i32),
        }
    }

    /// Time-of-day part for finite timestamps
    pub fn time(&self) -> Option<NaiveTime> {
        let (_, micros) = calendar::split_micros(self.micros()?);
        calendar::naive_time_from_micros(micros, "NaiveTime").ok()
    }

    /// Check if this is a finite timestamp before 1 AD
    pub fn is_bc(&self) -> bool {
        self.date().is_bc()
    }

    /// Project onto the regular wall-clock type
    ///
    /// Fails with an overflow error outside years 1..=9999. Infinities fail
    /// too unless `config.convert_infinity_datetime` is set, in which case
    /// they map to the regular maximum/minimum.
    pub fn to_naive(&self, config: &Config) -> Result<NaiveDateTime> {
        match self {
            PgTimestamp::Finite(m) => calendar::naive_from_micros(*m, "NaiveDateTime"),
            PgTimestamp::Infinity if config.convert_infinity_datetime => {
                calendar::regular_max_date_time()
            }
            PgTimestamp::NegativeInfinity if config.convert_infinity_datetime => {
                calendar::regular_min_date_time()
            }
            _ => Err(Error::overflow(
                "NaiveDateTime",
                format!("{} is not representable", self),
            )),
        }
    }

    /// Project onto a UTC instant, treating the count as UTC
    pub fn to_utc(&self, config: &Config) -> Result<DateTime<Utc>> {
        self.to_naive(config).map(|naive| naive.and_utc())
    }

    /// Project onto the process-local zone, treating the count as UTC
    pub fn to_local(&self, config: &Config) -> Result<DateTime<Local>> {
        self.to_utc(config).map(|utc| utc.with_timezone(&Local))
    }
}

impl fmt::Display for PgTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PgTimestamp::Infinity => write!(f, "infinity"),
            PgTimestamp::NegativeInfinity => write!(f, "-infinity"),
            PgTimestamp::Finite(m) => {
                let (days, micros) = calendar::split_micros(*m);
                let (year, month, day) = calendar::civil_from_days(days);
                let secs = micros / 1_000_000;
                let fraction = micros % 1_000_000;
                write!(
                    f,
                    "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                    if year <= 0 { 1 - year } else { year },
                    month,
                    day,
                    secs / 3600,
                    secs / 60 % 60,
                    secs % 60
                )?;
                if fraction != 0 {
                    let digits = format!("{:06}", fraction);
                    write!(f, ".{}", digits.trim_end_matches('0'))?;
                }
                if year <= 0 {
                    write!(f, " BC")?;
                }
                Ok(())
            }
        }
    }
}

/// Map the regular extremes onto the sentinels when the policy asks for it
fn regular_extreme_sentinel(naive: &NaiveDateTime, config: &Config) -> Result<Option<i64>> {
    if !config.convert_infinity_datetime {
        return Ok(None);
    }
    if *naive == calendar::regular_max_date_time()? {
        return Ok(Some(TIMESTAMP_POS_INFINITY));
    }
    if *naive == calendar::regular_min_date_time()? {
        return Ok(Some(TIMESTAMP_NEG_INFINITY));
    }
    Ok(None)
}

fn encode_pg_timestamp(ts: PgTimestamp, type_name: &'static str) -> Result<i64> {
    match ts {
        PgTimestamp::Infinity => Ok(TIMESTAMP_POS_INFINITY),
        PgTimestamp::NegativeInfinity => Ok(TIMESTAMP_NEG_INFINITY),
        PgTimestamp::Finite(m) if m == TIMESTAMP_POS_INFINITY || m == TIMESTAMP_NEG_INFINITY => Err(
            Error::overflow(type_name, "finite microsecond count collides with an infinity sentinel"),
        ),
        PgTimestamp::Finite(m) => Ok(m),
    }
}

fn encode_naive(naive: &NaiveDateTime, config: &Config) -> Result<i64> {
    match regular_extreme_sentinel(naive, config)? {
        Some(sentinel) => Ok(sentinel),
        None => calendar::micros_from_naive(*naive),
    }
}

fn decode(buf: &mut ReadBuffer) -> Result<PgTimestamp> {
    Ok(match buf.read_i64_be()? {
        TIMESTAMP_POS_INFINITY => PgTimestamp::Infinity,
        TIMESTAMP_NEG_INFINITY => PgTimestamp::NegativeInfinity,
        micros => PgTimestamp::Finite(micros),
    })
}

/// Handler for `timestamp without time zone`
///
/// Zoned inputs keep their wall-clock fields; the offset is discarded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimestampHandler;

impl TimestampHandler {
    const TYPE_NAME: &'static str = "timestamp";

    fn encode(&self, value: &Value, config: &Config) -> Result<i64> {
        match value {
            Value::Timestamp(ts) | Value::TimestampTz(ts) => encode_pg_timestamp(*ts, Self::TYPE_NAME),
            Value::NaiveDateTime(naive) => encode_naive(naive, config),
            Value::NaiveDate(date) => encode_naive(&date.and_time(NaiveTime::MIN), config),
            Value::Date(date) => match date {
                PgDate::Infinity => Ok(TIMESTAMP_POS_INFINITY),
                PgDate::NegativeInfinity => Ok(TIMESTAMP_NEG_INFINITY),
                PgDate::Finite(_) => {
                    let ts = PgTimestamp::from_date_and_time(*date, NaiveTime::MIN)?;
                    encode_pg_timestamp(ts, Self::TYPE_NAME)
                }
            },
            Value::DateTimeUtc(dt) => encode_naive(&dt.naive_local(), config),
            Value::DateTimeLocal(dt) => encode_naive(&dt.naive_local(), config),
            Value::DateTimeFixed(dt) => encode_naive(&dt.naive_local(), config),
            other => Err(Error::conversion(other.type_name(), Self::TYPE_NAME)),
        }
    }

    /// Validate a value and return its encoded length
    pub fn validate_and_get_length(&self, value: &Value, config: &Config) -> Result<usize> {
        self.encode(value, config)?;
        Ok(width::TIMESTAMP)
    }

    /// Write a value
    pub fn write(&self, value: &Value, buf: &mut WriteBuffer, config: &Config) -> Result<()> {
        let micros = self.encode(value, config)?;
        buf.write_i64_be(micros)
    }

    /// Read a value
    pub fn read(&self, buf: &mut ReadBuffer, len: usize) -> Result<Value> {
        super::check_fixed_length(buf, len, width::TIMESTAMP, Self::TYPE_NAME)?;
        decode(buf).map(Value::Timestamp)
    }
}

/// Handler for `timestamp with time zone`
///
/// Every zoned input is written as its UTC instant. Inputs without a zone
/// (`NaiveDateTime`, `PgTimestamp`) are taken to be UTC already.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimestampTzHandler;

impl TimestampTzHandler {
    const TYPE_NAME: &'static str = "timestamptz";

    fn encode(&self, value: &Value, config: &Config) -> Result<i64> {
        match value {
            Value::Timestamp(ts) | Value::TimestampTz(ts) => encode_pg_timestamp(*ts, Self::TYPE_NAME),
            Value::NaiveDateTime(naive) => encode_naive(naive, config),
            Value::DateTimeUtc(dt) => encode_naive(&dt.naive_utc(), config),
            Value::DateTimeLocal(dt) => encode_naive(&dt.naive_utc(), config),
            Value::DateTimeFixed(dt) => encode_naive(&dt.naive_utc(), config),
            other => Err(Error::conversion(other.type_name(), Self::TYPE_NAME)),
        }
    }

    /// Validate a value and return its encoded length
    pub fn validate_and_get_length(&self, value: &Value, config: &Config) -> Result<usize> {
        self.encode(value, config)?;
        Ok(width::TIMESTAMPTZ)
    }

    /// Write a value
    pub fn write(&self, value: &Value, buf: &mut WriteBuffer, config: &Config) -> Result<()> {
        let micros = self.encode(value, config)?;
        buf.write_i64_be(micros)
    }

    /// Read a value
    pub fn read(&self, buf: &mut ReadBuffer, len: usize) -> Result<Value> {
        super::check_fixed_length(buf, len, width::TIMESTAMPTZ, Self::TYPE_NAME)?;
        decode(buf).map(Value::TimestampTz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDate, TimeZone};

    fn naive(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32, ms: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_milli_opt(h, mi, s, ms)
            .unwrap()
    }

    fn write_then_read(handler_tz: bool, value: Value, config: &Config) -> Value {
        let mut buf = WriteBuffer::new();
        let len = if handler_tz {
            let len = TimestampTzHandler.validate_and_get_length(&value, config).unwrap();
            TimestampTzHandler.write(&value, &mut buf, config).unwrap();
            len
        } else {
            let len = TimestampHandler.validate_and_get_length(&value, config).unwrap();
            TimestampHandler.write(&value, &mut buf, config).unwrap();
            len
        };
        assert_eq!(buf.len(), len);
        let mut read = ReadBuffer::from_slice(buf.as_slice());
        if handler_tz {
            TimestampTzHandler.read(&mut read, len).unwrap()
        } else {
            TimestampHandler.read(&mut read, len).unwrap()
        }
    }

    #[test]
    fn test_epoch_encodes_as_zero() {
        let mut buf = WriteBuffer::new();
        let value = Value::NaiveDateTime(naive(2000, 1, 1, 0, 0, 0, 0));
        TimestampHandler.write(&value, &mut buf, &Config::default()).unwrap();
        assert_eq!(buf.as_slice(), &[0u8; 8]);
    }

    #[test]
    fn test_wall_clock_roundtrip() {
        let config = Config::default();
        for dt in [
            naive(1998, 4, 12, 13, 26, 38, 0),
            naive(2015, 1, 27, 8, 45, 12, 345),
            naive(2013, 7, 25, 0, 0, 0, 0),
        ] {
            let read = write_then_read(false, Value::NaiveDateTime(dt), &config);
            match read {
                Value::Timestamp(ts) => assert_eq!(ts.to_naive(&config).unwrap(), dt),
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    #[test]
    fn test_zoned_input_keeps_wall_clock() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let wall = naive(2015, 1, 27, 8, 45, 12, 345);
        let zoned = offset.from_local_datetime(&wall).unwrap();
        let read = write_then_read(false, Value::DateTimeFixed(zoned), &Config::default());
        assert_eq!(read, Value::Timestamp(PgTimestamp::from_naive(wall).unwrap()));
    }

    #[test]
    fn test_timestamptz_normalizes_to_utc() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let wall = naive(2015, 1, 27, 10, 45, 12, 345);
        let zoned = offset.from_local_datetime(&wall).unwrap();
        let read = write_then_read(true, Value::DateTimeFixed(zoned), &Config::default());
        let expected = PgTimestamp::from_naive(naive(2015, 1, 27, 8, 45, 12, 345)).unwrap();
        assert_eq!(read, Value::TimestampTz(expected));
    }

    #[test]
    fn test_bc_timestamp() {
        let ts = PgTimestamp::from_ymd_hms_micro(-5, 3, 3, 1, 0, 0, 0).unwrap();
        assert!(ts.is_bc());
        assert_eq!(ts.to_string(), "0006-03-03 01:00:00 BC");
        let read = write_then_read(false, Value::Timestamp(ts), &Config::default());
        assert_eq!(read, Value::Timestamp(ts));
        assert!(ts.to_naive(&Config::default()).unwrap_err().is_overflow());
    }

    #[test]
    fn test_date_and_time_parts() {
        let ts = PgTimestamp::from_ymd_hms_micro(1999, 12, 31, 23, 59, 59, 250_000).unwrap();
        assert_eq!(ts.date(), PgDate::from_ymd(1999, 12, 31).unwrap());
        assert_eq!(
            ts.time(),
            NaiveTime::from_hms_micro_opt(23, 59, 59, 250_000)
        );
        assert_eq!(ts.to_string(), "1999-12-31 23:59:59.25");
    }

    #[test]
    fn test_infinity_policy() {
        let strict = Config::default();
        let clamping = Config::new().convert_infinity_datetime(true);
        assert!(PgTimestamp::Infinity.to_naive(&strict).unwrap_err().is_overflow());
        assert_eq!(
            PgTimestamp::Infinity.to_naive(&clamping).unwrap(),
            NaiveDate::from_ymd_opt(9999, 12, 31)
                .unwrap()
                .and_hms_micro_opt(23, 59, 59, 999_999)
                .unwrap()
        );
        assert_eq!(
            PgTimestamp::NegativeInfinity.to_naive(&clamping).unwrap(),
            naive(1, 1, 1, 0, 0, 0, 0)
        );
    }

    #[test]
    fn test_regular_max_written_as_infinity() {
        let clamping = Config::new().convert_infinity_datetime(true);
        let max = NaiveDate::from_ymd_opt(9999, 12, 31)
            .unwrap()
            .and_hms_micro_opt(23, 59, 59, 999_999)
            .unwrap();
        let read = write_then_read(false, Value::NaiveDateTime(max), &clamping);
        assert_eq!(read, Value::Timestamp(PgTimestamp::Infinity));
    }

    #[test]
    fn test_timestamptz_rejects_plain_date() {
        let value = Value::NaiveDate(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        let err = TimestampTzHandler
            .validate_and_get_length(&value, &Config::default())
            .unwrap_err();
        assert!(err.is_conversion_error());
    }

    #[test]
    fn test_date_value_widens_to_midnight() {
        let date = PgDate::from_ymd(2013, 7, 25).unwrap();
        let read = write_then_read(false, Value::Date(date), &Config::default());
        assert_eq!(
            read,
            Value::Timestamp(PgTimestamp::from_naive(naive(2013, 7, 25, 0, 0, 0, 0)).unwrap())
        );
    }
}
