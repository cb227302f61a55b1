//! Host-side values exchanged with the type handlers
//!
//! A [`Value`] is what a handler decodes from the wire (always the
//! lossless provider variant, e.g. [`Value::Date`]) and what callers hand to a
//! handler for writing (any variant the target type accepts, e.g.
//! [`Value::NaiveDate`]).
//!
//! Reading a decoded value as a concrete Rust type goes through
//! [`FromValue`], which spells out every conversion that is offered:
//!
//! ```rust
//! use pg_typecodec::{Config, PgDate, Value};
//! use chrono::NaiveDate;
//!
//! let value = Value::Date(PgDate::from_ymd(2002, 3, 4).unwrap());
//! let date: NaiveDate = value.get(&Config::default()).unwrap();
//! assert_eq!(date, NaiveDate::from_ymd_opt(2002, 3, 4).unwrap());
//!
//! // Narrowing is never offered
//! assert!(Value::Int32(1).get::<i16>(&Config::default()).is_err());
//! ```

use std::fmt;

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};

use crate::config::Config;
use crate::constants::ProviderType;
use crate::error::{Error, Result};
use crate::types::{calendar, PgDate, PgInterval, PgTimeTz, PgTimestamp};

/// A value read from or written to a PostgreSQL field
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL
    Null,
    /// Internal `"char"` byte
    InternalChar(u8),
    /// A character to be written as `"char"` (must be at most U+00FF)
    Char(char),
    /// `bool`
    Boolean(bool),
    /// `int2`
    Int16(i16),
    /// `int4`
    Int32(i32),
    /// `int8`
    Int64(i64),
    /// `date`, including infinities and BC years
    Date(PgDate),
    /// Regular date (years 1..=9999)
    NaiveDate(NaiveDate),
    /// `time` as a duration since midnight (`24:00:00` allowed); also
    /// accepted as an `interval` input
    Time(TimeDelta),
    /// Regular time of day
    NaiveTime(NaiveTime),
    /// `timetz`
    TimeTz(PgTimeTz),
    /// `timestamp` (wall clock, no zone)
    Timestamp(PgTimestamp),
    /// `timestamptz` (UTC instant)
    TimestampTz(PgTimestamp),
    /// Regular wall-clock date/time
    NaiveDateTime(NaiveDateTime),
    /// Regular instant in UTC
    DateTimeUtc(DateTime<Utc>),
    /// Regular instant in the process local zone
    DateTimeLocal(DateTime<Local>),
    /// Regular instant with a fixed offset
    DateTimeFixed(DateTime<FixedOffset>),
    /// `interval`
    Interval(PgInterval),
}

impl Value {
    /// Check if this value is NULL
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Name of the host type carried, for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::InternalChar(_) => "u8",
            Value::Char(_) => "char",
            Value::Boolean(_) => "bool",
            Value::Int16(_) => "i16",
            Value::Int32(_) => "i32",
            Value::Int64(_) => "i64",
            Value::Date(_) => "PgDate",
            Value::NaiveDate(_) => "NaiveDate",
            Value::Time(_) => "TimeDelta",
            Value::NaiveTime(_) => "NaiveTime",
            Value::TimeTz(_) => "PgTimeTz",
            Value::Timestamp(_) => "PgTimestamp",
            Value::TimestampTz(_) => "PgTimestamp (UTC)",
            Value::NaiveDateTime(_) => "NaiveDateTime",
            Value::DateTimeUtc(_) => "DateTime<Utc>",
            Value::DateTimeLocal(_) => "DateTime<Local>",
            Value::DateTimeFixed(_) => "DateTime<FixedOffset>",
            Value::Interval(_) => "PgInterval",
        }
    }

    /// The wire type a host value maps to when none is given explicitly
    ///
    /// `None` for NULL, which has no type of its own.
    pub fn provider_type(&self) -> Option<ProviderType> {
        let pt = match self {
            Value::Null => return None,
            Value::InternalChar(_) | Value::Char(_) => ProviderType::InternalChar,
            Value::Boolean(_) => ProviderType::Boolean,
            Value::Int16(_) => ProviderType::Smallint,
            Value::Int32(_) => ProviderType::Integer,
            Value::Int64(_) => ProviderType::Bigint,
            Value::Date(_) | Value::NaiveDate(_) => ProviderType::Date,
            Value::Time(_) | Value::NaiveTime(_) => ProviderType::Time,
            Value::TimeTz(_) => ProviderType::TimeTz,
            Value::Timestamp(_) | Value::NaiveDateTime(_) => ProviderType::Timestamp,
            Value::TimestampTz(_)
            | Value::DateTimeUtc(_)
            | Value::DateTimeLocal(_)
            | Value::DateTimeFixed(_) => ProviderType::TimestampTz,
            Value::Interval(_) => ProviderType::Interval,
        };
        Some(pt)
    }

    /// Convert to a concrete Rust type
    pub fn get<T: FromValue>(&self, config: &Config) -> Result<T> {
        T::from_value(self, config)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::InternalChar(b) => write!(f, "{}", *b as char),
            Value::Char(c) => write!(f, "{}", c),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Int16(i) => write!(f, "{}", i),
            Value::Int32(i) => write!(f, "{}", i),
            Value::Int64(i) => write!(f, "{}", i),
            Value::Date(d) => write!(f, "{}", d),
            Value::NaiveDate(d) => write!(f, "{}", d),
            Value::Time(t) => write!(f, "{}", t),
            Value::NaiveTime(t) => write!(f, "{}", t),
            Value::TimeTz(t) => write!(f, "{}", t),
            Value::Timestamp(ts) => write!(f, "{}", ts),
            Value::TimestampTz(ts) => write!(f, "{}+00", ts),
            Value::NaiveDateTime(dt) => write!(f, "{}", dt),
            Value::DateTimeUtc(dt) => write!(f, "{}", dt),
            Value::DateTimeLocal(dt) => write!(f, "{}", dt),
            Value::DateTimeFixed(dt) => write!(f, "{}", dt),
            Value::Interval(i) => write!(f, "{}", i),
        }
    }
}

macro_rules! impl_from_for_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

impl_from_for_value! {
    u8 => InternalChar,
    char => Char,
    bool => Boolean,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    PgDate => Date,
    NaiveDate => NaiveDate,
    TimeDelta => Time,
    NaiveTime => NaiveTime,
    PgTimeTz => TimeTz,
    PgTimestamp => Timestamp,
    NaiveDateTime => NaiveDateTime,
    DateTime<Utc> => DateTimeUtc,
    DateTime<Local> => DateTimeLocal,
    DateTime<FixedOffset> => DateTimeFixed,
    PgInterval => Interval,
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Value::Null,
        }
    }
}

/// Conversion from a decoded [`Value`] to a Rust type
///
/// Each implementation lists the variants it accepts; anything else is a
/// conversion error and NULL is [`Error::UnexpectedNull`]. Integer widening
/// follows the source's signedness and narrowing is never offered. Date/time
/// projections onto chrono types fail with an overflow error outside years
/// 1..=9999, and on infinities unless `config.convert_infinity_datetime`.
pub trait FromValue: Sized {
    /// Convert a value
    fn from_value(value: &Value, config: &Config) -> Result<Self>;
}

fn mismatch(value: &Value, to: &'static str) -> Error {
    match value {
        Value::Null => Error::UnexpectedNull,
        other => Error::conversion(other.type_name(), to),
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value, config: &Config) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other, config).map(Some),
        }
    }
}

impl FromValue for Value {
    fn from_value(value: &Value, _config: &Config) -> Result<Self> {
        Ok(value.clone())
    }
}

impl FromValue for bool {
    fn from_value(value: &Value, _config: &Config) -> Result<Self> {
        match value {
            Value::Boolean(b) => Ok(*b),
            other => Err(mismatch(other, "bool")),
        }
    }
}

impl FromValue for u8 {
    fn from_value(value: &Value, _config: &Config) -> Result<Self> {
        match value {
            Value::InternalChar(b) => Ok(*b),
            other => Err(mismatch(other, "u8")),
        }
    }
}

impl FromValue for char {
    fn from_value(value: &Value, _config: &Config) -> Result<Self> {
        match value {
            Value::InternalChar(b) => Ok(*b as char),
            Value::Char(c) => Ok(*c),
            other => Err(mismatch(other, "char")),
        }
    }
}

impl FromValue for i16 {
    fn from_value(value: &Value, _config: &Config) -> Result<Self> {
        match value {
            Value::InternalChar(b) => Ok(*b as i16),
            Value::Int16(v) => Ok(*v),
            other => Err(mismatch(other, "i16")),
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value, _config: &Config) -> Result<Self> {
        match value {
            Value::InternalChar(b) => Ok(*b as i32),
            Value::Int16(v) => Ok(*v as i32),
            Value::Int32(v) => Ok(*v),
            other => Err(mismatch(other, "i32")),
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value, _config: &Config) -> Result<Self> {
        match value {
            Value::InternalChar(b) => Ok(*b as i64),
            Value::Int16(v) => Ok(*v as i64),
            Value::Int32(v) => Ok(*v as i64),
            Value::Int64(v) => Ok(*v),
            other => Err(mismatch(other, "i64")),
        }
    }
}

impl FromValue for PgDate {
    fn from_value(value: &Value, _config: &Config) -> Result<Self> {
        match value {
            Value::Date(d) => Ok(*d),
            Value::NaiveDate(d) => Ok(PgDate::from(*d)),
            other => Err(mismatch(other, "PgDate")),
        }
    }
}

impl FromValue for NaiveDate {
    fn from_value(value: &Value, config: &Config) -> Result<Self> {
        match value {
            Value::Date(d) => d.to_naive_date(config),
            Value::NaiveDate(d) => Ok(*d),
            other => Err(mismatch(other, "NaiveDate")),
        }
    }
}

impl FromValue for PgTimestamp {
    fn from_value(value: &Value, _config: &Config) -> Result<Self> {
        match value {
            Value::Timestamp(ts) | Value::TimestampTz(ts) => Ok(*ts),
            Value::NaiveDateTime(dt) => PgTimestamp::from_naive(*dt),
            other => Err(mismatch(other, "PgTimestamp")),
        }
    }
}

/// Wall-clock projection; a `timestamptz` yields its UTC wall clock
impl FromValue for NaiveDateTime {
    fn from_value(value: &Value, config: &Config) -> Result<Self> {
        match value {
            Value::Timestamp(ts) | Value::TimestampTz(ts) => ts.to_naive(config),
            Value::Date(d) => Ok(d.to_naive_date(config)?.and_time(NaiveTime::MIN)),
            Value::NaiveDateTime(dt) => Ok(*dt),
            other => Err(mismatch(other, "NaiveDateTime")),
        }
    }
}

impl FromValue for DateTime<Utc> {
    fn from_value(value: &Value, config: &Config) -> Result<Self> {
        match value {
            Value::TimestampTz(ts) => ts.to_utc(config),
            Value::DateTimeUtc(dt) => Ok(*dt),
            other => Err(mismatch(other, "DateTime<Utc>")),
        }
    }
}

impl FromValue for DateTime<Local> {
    fn from_value(value: &Value, config: &Config) -> Result<Self> {
        match value {
            Value::TimestampTz(ts) => ts.to_local(config),
            Value::TimeTz(t) => t.to_local(),
            Value::DateTimeLocal(dt) => Ok(*dt),
            other => Err(mismatch(other, "DateTime<Local>")),
        }
    }
}

impl FromValue for DateTime<FixedOffset> {
    fn from_value(value: &Value, config: &Config) -> Result<Self> {
        match value {
            Value::TimestampTz(ts) => ts.to_utc(config).map(|dt| dt.fixed_offset()),
            Value::TimeTz(t) => t.to_date_time_offset(),
            Value::DateTimeFixed(dt) => Ok(*dt),
            other => Err(mismatch(other, "DateTime<FixedOffset>")),
        }
    }
}

/// A `time` value as-is, the local time of day of a `timetz`, or the lossy
/// flattening of an `interval`
impl FromValue for TimeDelta {
    fn from_value(value: &Value, _config: &Config) -> Result<Self> {
        match value {
            Value::Time(d) => Ok(*d),
            Value::TimeTz(t) => Ok(TimeDelta::microseconds(t.at_local_offset().micros())),
            Value::Interval(i) => i.to_duration_lossy(),
            other => Err(mismatch(other, "TimeDelta")),
        }
    }
}

impl FromValue for NaiveTime {
    fn from_value(value: &Value, _config: &Config) -> Result<Self> {
        match value {
            Value::Time(d) => {
                let micros = d
                    .num_microseconds()
                    .ok_or_else(|| Error::overflow("NaiveTime", d.to_string()))?;
                calendar::naive_time_from_micros(micros, "NaiveTime")
            }
            Value::TimeTz(t) => t.at_local_offset().time(),
            Value::NaiveTime(t) => Ok(*t),
            other => Err(mismatch(other, "NaiveTime")),
        }
    }
}

impl FromValue for PgTimeTz {
    fn from_value(value: &Value, _config: &Config) -> Result<Self> {
        match value {
            Value::TimeTz(t) => Ok(*t),
            other => Err(mismatch(other, "PgTimeTz")),
        }
    }
}

impl FromValue for PgInterval {
    fn from_value(value: &Value, _config: &Config) -> Result<Self> {
        match value {
            Value::Interval(i) => Ok(*i),
            other => Err(mismatch(other, "PgInterval")),
        }
    }
}
