//! PostgreSQL binary type handlers
//!
//! Each wire type family has a zero-sized handler with the same three
//! operations: `validate_and_get_length`, `write` and `read`. The
//! [`TypeHandler`] enum closes over the set so the registry can store and
//! dispatch handlers by value.

pub(crate) mod calendar;
mod date;
mod interval;
mod scalar;
mod time;
mod timestamp;

pub use date::{DateHandler, PgDate};
pub use interval::{IntervalHandler, PgInterval};
pub use scalar::{BoolHandler, InternalCharHandler, Int2Handler, Int4Handler, Int8Handler};
pub use time::{PgTimeTz, TimeHandler, TimeTzHandler};
pub use timestamp::{PgTimestamp, TimestampHandler, TimestampTzHandler};

use crate::buffer::{ReadBuffer, WriteBuffer};
use crate::config::Config;
use crate::constants::{DbType, ProviderType};
use crate::error::{Error, Result};
use crate::field::{FieldDescriptor, FormatCode};
use crate::value::Value;

/// Check a declared field length against a fixed wire width
///
/// On mismatch the declared bytes are skipped so the cursor stays aligned
/// on the next field, and a format error is returned.
pub(crate) fn check_fixed_length(
    buf: &mut ReadBuffer,
    len: usize,
    expected: usize,
    type_name: &'static str,
) -> Result<()> {
    if len == expected {
        return Ok(());
    }
    if let Ok(bytes) = buf.peek_bytes(len) {
        tracing::debug!(
            type_name,
            expected,
            actual = len,
            bytes = %hex::encode(bytes),
            "Field length does not match fixed width"
        );
    }
    buf.skip(len)?;
    Err(Error::InvalidFieldLength {
        type_name,
        expected,
        actual: len,
    })
}

/// A built-in type handler
///
/// Handlers are stateless; the enum is `Copy` and shared freely between
/// threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeHandler {
    /// `"char"`
    InternalChar(InternalCharHandler),
    /// `bool`
    Bool(BoolHandler),
    /// `int2`
    Int2(Int2Handler),
    /// `int4`
    Int4(Int4Handler),
    /// `int8`
    Int8(Int8Handler),
    /// `date`
    Date(DateHandler),
    /// `time`
    Time(TimeHandler),
    /// `timetz`
    TimeTz(TimeTzHandler),
    /// `timestamp`
    Timestamp(TimestampHandler),
    /// `timestamptz`
    TimestampTz(TimestampTzHandler),
    /// `interval`
    Interval(IntervalHandler),
}

macro_rules! dispatch {
    ($self:expr, $h:ident => $body:expr) => {
        match $self {
            TypeHandler::InternalChar($h) => $body,
            TypeHandler::Bool($h) => $body,
            TypeHandler::Int2($h) => $body,
            TypeHandler::Int4($h) => $body,
            TypeHandler::Int8($h) => $body,
            TypeHandler::Date($h) => $body,
            TypeHandler::Time($h) => $body,
            TypeHandler::TimeTz($h) => $body,
            TypeHandler::Timestamp($h) => $body,
            TypeHandler::TimestampTz($h) => $body,
            TypeHandler::Interval($h) => $body,
        }
    };
}

impl TypeHandler {
    /// The handler for a provider type
    pub fn for_provider_type(provider_type: ProviderType) -> Self {
        match provider_type {
            ProviderType::InternalChar => TypeHandler::InternalChar(InternalCharHandler),
            ProviderType::Boolean => TypeHandler::Bool(BoolHandler),
            ProviderType::Smallint => TypeHandler::Int2(Int2Handler),
            ProviderType::Integer => TypeHandler::Int4(Int4Handler),
            ProviderType::Bigint => TypeHandler::Int8(Int8Handler),
            ProviderType::Date => TypeHandler::Date(DateHandler),
            ProviderType::Time => TypeHandler::Time(TimeHandler),
            ProviderType::TimeTz => TypeHandler::TimeTz(TimeTzHandler),
            ProviderType::Timestamp => TypeHandler::Timestamp(TimestampHandler),
            ProviderType::TimestampTz => TypeHandler::TimestampTz(TimestampTzHandler),
            ProviderType::Interval => TypeHandler::Interval(IntervalHandler),
        }
    }

    /// The provider type this handler advertises
    pub fn provider_type(&self) -> ProviderType {
        match self {
            TypeHandler::InternalChar(_) => ProviderType::InternalChar,
            TypeHandler::Bool(_) => ProviderType::Boolean,
            TypeHandler::Int2(_) => ProviderType::Smallint,
            TypeHandler::Int4(_) => ProviderType::Integer,
            TypeHandler::Int8(_) => ProviderType::Bigint,
            TypeHandler::Date(_) => ProviderType::Date,
            TypeHandler::Time(_) => ProviderType::Time,
            TypeHandler::TimeTz(_) => ProviderType::TimeTz,
            TypeHandler::Timestamp(_) => ProviderType::Timestamp,
            TypeHandler::TimestampTz(_) => ProviderType::TimestampTz,
            TypeHandler::Interval(_) => ProviderType::Interval,
        }
    }

    /// The legacy DbType this handler advertises, if any
    pub fn db_type(&self) -> Option<DbType> {
        self.provider_type().db_type()
    }

    /// The `pg_type.typname` this handler binds to
    pub fn type_name(&self) -> &'static str {
        self.provider_type().type_name()
    }

    /// Validate a host value and return the number of bytes `write` will emit
    pub fn validate_and_get_length(&self, value: &Value, config: &Config) -> Result<usize> {
        dispatch!(self, h => h.validate_and_get_length(value, config))
    }

    /// Write a previously validated host value
    pub fn write(&self, value: &Value, buf: &mut WriteBuffer, config: &Config) -> Result<()> {
        dispatch!(self, h => h.write(value, buf, config))
    }

    /// Read one field of `len` bytes
    ///
    /// All built-in handlers decode the binary format only.
    pub fn read(&self, buf: &mut ReadBuffer, len: usize, field: &FieldDescriptor) -> Result<Value> {
        if field.format != FormatCode::Binary {
            return Err(Error::UnsupportedFormat {
                type_name: self.type_name(),
                format: field.format,
            });
        }
        dispatch!(self, h => h.read(buf, len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_advertises_its_provider_type() {
        for pt in ProviderType::ALL {
            assert_eq!(TypeHandler::for_provider_type(pt).provider_type(), pt);
        }
    }

    #[test]
    fn test_text_format_rejected() {
        let handler = TypeHandler::for_provider_type(ProviderType::Date);
        let field = FieldDescriptor::for_provider_type(ProviderType::Date)
            .with_format(FormatCode::Text);
        let mut buf = ReadBuffer::from_slice(b"2002-03-04");
        let err = handler.read(&mut buf, 10, &field).unwrap_err();
        assert!(err.is_unsupported_type());
    }

    #[test]
    fn test_check_fixed_length_skips_declared_bytes() {
        let mut buf = ReadBuffer::from_slice(&[1, 2, 3, 4, 5]);
        let err = check_fixed_length(&mut buf, 3, 4, "date").unwrap_err();
        assert!(err.is_format_error());
        assert_eq!(buf.remaining(), 2);
        assert!(check_fixed_length(&mut buf, 2, 2, "int2").is_ok());
        assert_eq!(buf.remaining(), 2);
    }

    #[test]
    fn test_fixed_lengths() {
        use chrono::NaiveDate;

        let config = Config::default();
        let date = Value::NaiveDate(NaiveDate::from_ymd_opt(2020, 2, 29).unwrap());
        let cases = [
            (ProviderType::Date, date.clone(), 4),
            (ProviderType::Timestamp, date, 8),
            (ProviderType::Smallint, Value::Int16(7), 2),
            (ProviderType::Interval, Value::Interval(PgInterval::default()), 16),
        ];
        for (pt, value, expected) in cases {
            let handler = TypeHandler::for_provider_type(pt);
            assert_eq!(handler.validate_and_get_length(&value, &config).unwrap(), expected);
            let mut buf = WriteBuffer::new();
            handler.write(&value, &mut buf, &config).unwrap();
            assert_eq!(buf.len(), expected);
        }
    }
}
