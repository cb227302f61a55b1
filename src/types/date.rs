//! PostgreSQL `date` encoding and decoding
//!
//! Binary format (4 bytes):
//! - i32 big-endian day count relative to 2000-01-01
//! - `i32::MAX` is `infinity`, `i32::MIN` is `-infinity`
//!
//! `PgDate` is the lossless representation (infinities, BC years, years past
//! 9999). `chrono::NaiveDate` is the regular representation, limited to years
//! 1..=9999.

use std::fmt;

use chrono::NaiveDate;

use super::calendar;
use crate::buffer::{ReadBuffer, WriteBuffer};
use crate::config::Config;
use crate::constants::temporal::{DATE_NEG_INFINITY, DATE_POS_INFINITY};
use crate::constants::width;
use crate::error::{Error, Result};
use crate::value::Value;

/// A `date` value that can express everything the wire can
///
/// Ordering follows the server: `-infinity` sorts before every finite date
/// and `infinity` after.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PgDate {
    /// `-infinity`
    NegativeInfinity,
    /// Days since 2000-01-01
    Finite(i32),
    /// `infinity`
    Infinity,
}

impl PgDate {
    /// The PostgreSQL epoch, 2000-01-01
    pub const EPOCH: PgDate = PgDate::Finite(0);

    /// Create a date from astronomical year, month and day
    ///
    /// Year 0 is 1 BC and year -5 is 6 BC.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self> {
        if !calendar::is_valid_ymd(year as i64, month, day) {
            return Err(Error::conversion("year/month/day", "date"));
        }
        let days = calendar::days_from_civil(year as i64, month, day);
        match i32::try_from(days) {
            Ok(d) if d != DATE_POS_INFINITY && d != DATE_NEG_INFINITY => Ok(PgDate::Finite(d)),
            _ => Err(Error::overflow("date", format!("year {} is out of range", year))),
        }
    }

    /// Check if this is a finite date
    pub fn is_finite(&self) -> bool {
        matches!(self, PgDate::Finite(_))
    }

    /// Check if this is `infinity` or `-infinity`
    pub fn is_infinite(&self) -> bool {
        !self.is_finite()
    }

    /// Days since 2000-01-01 for finite dates
    pub fn days(&self) -> Option<i32> {
        match self {
            PgDate::Finite(d) => Some(*d),
            _ => None,
        }
    }

    /// Astronomical year, month and day for finite dates
    pub fn ymd(&self) -> Option<(i32, u32, u32)> {
        let days = self.days()?;
        let (y, m, d) = calendar::civil_from_days(days as i64);
        Some((y as i32, m, d))
    }

    /// Astronomical year (0 = 1 BC)
    pub fn year(&self) -> Option<i32> {
        self.ymd().map(|(y, _, _)| y)
    }

    /// Month (1-12)
    pub fn month(&self) -> Option<u32> {
        self.ymd().map(|(_, m, _)| m)
    }

    /// Day of month (1-31)
    pub fn day(&self) -> Option<u32> {
        self.ymd().map(|(_, _, d)| d)
    }

    /// Check if this is a finite date before 1 AD
    pub fn is_bc(&self) -> bool {
        self.year().is_some_and(|y| y <= 0)
    }

    /// Year counted within its era (1 BC is 1, 1 AD is 1)
    pub fn era_year(&self) -> Option<u32> {
        self.year()
            .map(|y| if y <= 0 { (1 - y) as u32 } else { y as u32 })
    }

    /// Project onto the regular date type
    ///
    /// Fails with an overflow error outside years 1..=9999. Infinities fail
    /// too unless `config.convert_infinity_datetime` is set, in which case
    /// they map to the regular maximum/minimum.
    pub fn to_naive_date(&self, config: &Config) -> Result<NaiveDate> {
        match self {
            PgDate::Finite(days) => calendar::naive_date_from_days(*days as i64, "NaiveDate"),
            PgDate::Infinity if config.convert_infinity_datetime => calendar::regular_max_date(),
            PgDate::NegativeInfinity if config.convert_infinity_datetime => {
                calendar::regular_min_date()
            }
            _ => Err(Error::overflow("NaiveDate", format!("{} is not representable", self))),
        }
    }
}

impl From<NaiveDate> for PgDate {
    fn from(date: NaiveDate) -> Self {
        // chrono years stop well short of the i32 day range
        PgDate::Finite(calendar::days_from_naive_date(date) as i32)
    }
}

impl fmt::Display for PgDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PgDate::Infinity => write!(f, "infinity"),
            PgDate::NegativeInfinity => write!(f, "-infinity"),
            PgDate::Finite(days) => {
                let (year, month, day) = calendar::civil_from_days(*days as i64);
                if year <= 0 {
                    write!(f, "{:04}-{:02}-{:02} BC", 1 - year, month, day)
                } else {
                    write!(f, "{:04}-{:02}-{:02}", year, month, day)
                }
            }
        }
    }
}

/// Handler for `date`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateHandler;

impl DateHandler {
    const TYPE_NAME: &'static str = "date";

    /// Wire integer for a host value
    fn encode(&self, value: &Value, config: &Config) -> Result<i32> {
        let date = match value {
            Value::Date(date) => *date,
            Value::NaiveDate(date) => {
                if config.convert_infinity_datetime {
                    if *date == calendar::regular_max_date()? {
                        return Ok(DATE_POS_INFINITY);
                    }
                    if *date == calendar::regular_min_date()? {
                        return Ok(DATE_NEG_INFINITY);
                    }
                }
                PgDate::from(*date)
            }
            Value::NaiveDateTime(date_time) => {
                if config.convert_infinity_datetime {
                    if *date_time == calendar::regular_max_date_time()? {
                        return Ok(DATE_POS_INFINITY);
                    }
                    if *date_time == calendar::regular_min_date_time()? {
                        return Ok(DATE_NEG_INFINITY);
                    }
                }
                PgDate::from(date_time.date())
            }
            Value::Timestamp(ts) => ts.date(),
            other => return Err(Error::conversion(other.type_name(), Self::TYPE_NAME)),
        };

        match date {
            PgDate::Infinity => Ok(DATE_POS_INFINITY),
            PgDate::NegativeInfinity => Ok(DATE_NEG_INFINITY),
            PgDate::Finite(d) if d == DATE_POS_INFINITY || d == DATE_NEG_INFINITY => Err(
                Error::overflow(Self::TYPE_NAME, "finite day count collides with an infinity sentinel"),
            ),
            PgDate::Finite(d) => Ok(d),
        }
    }

    /// Validate a value and return its encoded length
    pub fn validate_and_get_length(&self, value: &Value, config: &Config) -> Result<usize> {
        self.encode(value, config)?;
        Ok(width::DATE)
    }

    /// Write a value
    pub fn write(&self, value: &Value, buf: &mut WriteBuffer, config: &Config) -> Result<()> {
        let days = self.encode(value, config)?;
        buf.write_i32_be(days)
    }

    /// Read a value
    pub fn read(&self, buf: &mut ReadBuffer, len: usize) -> Result<Value> {
        super::check_fixed_length(buf, len, width::DATE, Self::TYPE_NAME)?;
        let date = match buf.read_i32_be()? {
            DATE_POS_INFINITY => PgDate::Infinity,
            DATE_NEG_INFINITY => PgDate::NegativeInfinity,
            days => PgDate::Finite(days),
        };
        Ok(Value::Date(date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(value: Value, config: &Config) -> Value {
        let handler = DateHandler;
        let mut buf = WriteBuffer::new();
        let len = handler.validate_and_get_length(&value, config).unwrap();
        handler.write(&value, &mut buf, config).unwrap();
        assert_eq!(buf.len(), len);
        let mut read = ReadBuffer::from_slice(buf.as_slice());
        handler.read(&mut read, len).unwrap()
    }

    #[test]
    fn test_encode_known_date() {
        let value = Value::NaiveDate(NaiveDate::from_ymd_opt(2002, 3, 4).unwrap());
        let mut buf = WriteBuffer::new();
        DateHandler.write(&value, &mut buf, &Config::default()).unwrap();
        assert_eq!(buf.as_slice(), &793i32.to_be_bytes());
    }

    #[test]
    fn test_infinity_sentinels() {
        let mut buf = WriteBuffer::new();
        let config = Config::default();
        DateHandler
            .write(&Value::Date(PgDate::Infinity), &mut buf, &config)
            .unwrap();
        DateHandler
            .write(&Value::Date(PgDate::NegativeInfinity), &mut buf, &config)
            .unwrap();
        assert_eq!(buf.as_slice(), &[0x7f, 0xff, 0xff, 0xff, 0x80, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_bc_date_fields() {
        let date = PgDate::from_ymd(-5, 3, 3).unwrap();
        assert_eq!(date.ymd(), Some((-5, 3, 3)));
        assert!(date.is_bc());
        assert_eq!(date.era_year(), Some(6));
        assert_eq!(date.to_string(), "0006-03-03 BC");
    }

    #[test]
    fn test_bc_date_roundtrip() {
        let date = PgDate::from_ymd(-5, 3, 3).unwrap();
        let config = Config::default();
        let read = roundtrip(Value::Date(date), &config);
        assert_eq!(read, Value::Date(date));
        assert!(date.to_naive_date(&config).unwrap_err().is_overflow());
    }

    #[test]
    fn test_year_zero() {
        let date = PgDate::from_ymd(0, 2, 29).unwrap();
        assert_eq!(date.era_year(), Some(1));
        assert_eq!(date.to_string(), "0001-02-29 BC");
    }

    #[test]
    fn test_invalid_fields() {
        assert!(PgDate::from_ymd(2001, 2, 29).unwrap_err().is_conversion_error());
    }

    #[test]
    fn test_ordering() {
        let finite = PgDate::from_ymd(2024, 1, 1).unwrap();
        assert!(PgDate::NegativeInfinity < finite);
        assert!(finite < PgDate::Infinity);
        assert!(PgDate::from_ymd(-5, 1, 1).unwrap() < PgDate::EPOCH);
    }

    #[test]
    fn test_infinity_to_naive_date() {
        let strict = Config::default();
        let clamping = Config::new().convert_infinity_datetime(true);
        assert!(PgDate::Infinity.to_naive_date(&strict).unwrap_err().is_overflow());
        assert_eq!(
            PgDate::Infinity.to_naive_date(&clamping).unwrap(),
            NaiveDate::from_ymd_opt(9999, 12, 31).unwrap()
        );
        assert_eq!(
            PgDate::NegativeInfinity.to_naive_date(&clamping).unwrap(),
            NaiveDate::from_ymd_opt(1, 1, 1).unwrap()
        );
    }

    #[test]
    fn test_finite_out_of_range_ignores_policy() {
        let clamping = Config::new().convert_infinity_datetime(true);
        let date = PgDate::from_ymd(10000, 1, 1).unwrap();
        assert!(date.to_naive_date(&clamping).unwrap_err().is_overflow());
    }

    #[test]
    fn test_regular_extremes_written_as_infinity() {
        let clamping = Config::new().convert_infinity_datetime(true);
        let max = Value::NaiveDate(NaiveDate::from_ymd_opt(9999, 12, 31).unwrap());
        let min = Value::NaiveDate(NaiveDate::from_ymd_opt(1, 1, 1).unwrap());
        assert_eq!(roundtrip(max.clone(), &clamping), Value::Date(PgDate::Infinity));
        assert_eq!(roundtrip(min, &clamping), Value::Date(PgDate::NegativeInfinity));
        // Without the policy the maximum stays finite
        assert_eq!(
            roundtrip(max, &Config::default()),
            Value::Date(PgDate::from_ymd(9999, 12, 31).unwrap())
        );
    }

    #[test]
    fn test_sentinel_collision_rejected() {
        let value = Value::Date(PgDate::Finite(i32::MAX));
        let err = DateHandler
            .validate_and_get_length(&value, &Config::default())
            .unwrap_err();
        assert!(err.is_overflow());
    }

    #[test]
    fn test_wrong_host_type() {
        let err = DateHandler
            .validate_and_get_length(&Value::Int32(1), &Config::default())
            .unwrap_err();
        assert!(err.is_conversion_error());
    }

    #[test]
    fn test_wrong_declared_length() {
        let mut buf = ReadBuffer::from_slice(&[0, 0, 0, 0, 0, 0, 0, 0]);
        let err = DateHandler.read(&mut buf, 8).unwrap_err();
        assert!(err.is_format_error());
        // Declared bytes are skipped so the next field stays aligned
        assert_eq!(buf.remaining(), 0);
    }
}
