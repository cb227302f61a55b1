//! Fixed-width scalar types: `"char"`, `bool`, `int2`, `int4`, `int8`
//!
//! All are big-endian and signed except `"char"`, which is a single unsigned
//! byte. Writes accept any integer host value that fits the target width.

use crate::buffer::{ReadBuffer, WriteBuffer};
use crate::config::Config;
use crate::constants::width;
use crate::error::{Error, Result};
use crate::value::Value;

/// Integer view of a host value, if it has one
fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::InternalChar(b) => Some(*b as i64),
        Value::Int16(v) => Some(*v as i64),
        Value::Int32(v) => Some(*v as i64),
        Value::Int64(v) => Some(*v),
        _ => None,
    }
}

fn narrow<T: TryFrom<i64>>(value: &Value, type_name: &'static str) -> Result<T> {
    let wide = as_integer(value).ok_or_else(|| Error::conversion(value.type_name(), type_name))?;
    T::try_from(wide).map_err(|_| {
        Error::overflow(type_name, format!("{} does not fit in {}", wide, type_name))
    })
}

/// Handler for the single-byte internal `"char"` type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InternalCharHandler;

impl InternalCharHandler {
    const TYPE_NAME: &'static str = "char";

    fn encode(&self, value: &Value) -> Result<u8> {
        match value {
            Value::Char(c) => u8::try_from(*c).map_err(|_| {
                Error::overflow(Self::TYPE_NAME, format!("{:?} is above U+00FF", c))
            }),
            _ => narrow::<u8>(value, Self::TYPE_NAME),
        }
    }

    /// Validate a value and return its encoded length
    pub fn validate_and_get_length(&self, value: &Value, _config: &Config) -> Result<usize> {
        self.encode(value)?;
        Ok(width::CHAR)
    }

    /// Write a value
    pub fn write(&self, value: &Value, buf: &mut WriteBuffer, _config: &Config) -> Result<()> {
        let byte = self.encode(value)?;
        buf.write_u8(byte)
    }

    /// Read a value
    pub fn read(&self, buf: &mut ReadBuffer, len: usize) -> Result<Value> {
        super::check_fixed_length(buf, len, width::CHAR, Self::TYPE_NAME)?;
        Ok(Value::InternalChar(buf.read_u8()?))
    }
}

/// Handler for `bool`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoolHandler;

impl BoolHandler {
    const TYPE_NAME: &'static str = "bool";

    fn encode(&self, value: &Value) -> Result<bool> {
        match value {
            Value::Boolean(b) => Ok(*b),
            other => Err(Error::conversion(other.type_name(), Self::TYPE_NAME)),
        }
    }

    /// Validate a value and return its encoded length
    pub fn validate_and_get_length(&self, value: &Value, _config: &Config) -> Result<usize> {
        self.encode(value)?;
        Ok(width::BOOL)
    }

    /// Write a value
    pub fn write(&self, value: &Value, buf: &mut WriteBuffer, _config: &Config) -> Result<()> {
        let b = self.encode(value)?;
        buf.write_u8(b as u8)
    }

    /// Read a value
    pub fn read(&self, buf: &mut ReadBuffer, len: usize) -> Result<Value> {
        super::check_fixed_length(buf, len, width::BOOL, Self::TYPE_NAME)?;
        match buf.read_u8()? {
            0 => Ok(Value::Boolean(false)),
            1 => Ok(Value::Boolean(true)),
            other => Err(Error::invalid_format(
                Self::TYPE_NAME,
                format!("unexpected byte 0x{:02x}", other),
            )),
        }
    }
}

/// Handler for `int2`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Int2Handler;

impl Int2Handler {
    const TYPE_NAME: &'static str = "int2";

    /// Validate a value and return its encoded length
    pub fn validate_and_get_length(&self, value: &Value, _config: &Config) -> Result<usize> {
        narrow::<i16>(value, Self::TYPE_NAME)?;
        Ok(width::INT2)
    }

    /// Write a value
    pub fn write(&self, value: &Value, buf: &mut WriteBuffer, _config: &Config) -> Result<()> {
        buf.write_i16_be(narrow(value, Self::TYPE_NAME)?)
    }

    /// Read a value
    pub fn read(&self, buf: &mut ReadBuffer, len: usize) -> Result<Value> {
        super::check_fixed_length(buf, len, width::INT2, Self::TYPE_NAME)?;
        Ok(Value::Int16(buf.read_i16_be()?))
    }
}

/// Handler for `int4`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Int4Handler;

impl Int4Handler {
    const TYPE_NAME: &'static str = "int4";

    /// Validate a value and return its encoded length
    pub fn validate_and_get_length(&self, value: &Value, _config: &Config) -> Result<usize> {
        narrow::<i32>(value, Self::TYPE_NAME)?;
        Ok(width::INT4)
    }

    /// Write a value
    pub fn write(&self, value: &Value, buf: &mut WriteBuffer, _config: &Config) -> Result<()> {
        buf.write_i32_be(narrow(value, Self::TYPE_NAME)?)
    }

    /// Read a value
    pub fn read(&self, buf: &mut ReadBuffer, len: usize) -> Result<Value> {
        super::check_fixed_length(buf, len, width::INT4, Self::TYPE_NAME)?;
        Ok(Value::Int32(buf.read_i32_be()?))
    }
}

/// Handler for `int8`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Int8Handler;

impl Int8Handler {
    const TYPE_NAME: &'static str = "int8";

    /// Validate a value and return its encoded length
    pub fn validate_and_get_length(&self, value: &Value, _config: &Config) -> Result<usize> {
        narrow::<i64>(value, Self::TYPE_NAME)?;
        Ok(width::INT8)
    }

    /// Write a value
    pub fn write(&self, value: &Value, buf: &mut WriteBuffer, _config: &Config) -> Result<()> {
        buf.write_i64_be(narrow(value, Self::TYPE_NAME)?)
    }

    /// Read a value
    pub fn read(&self, buf: &mut ReadBuffer, len: usize) -> Result<Value> {
        super::check_fixed_length(buf, len, width::INT8, Self::TYPE_NAME)?;
        Ok(Value::Int64(buf.read_i64_be()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_char_from_char() {
        let mut buf = WriteBuffer::new();
        let config = Config::default();
        InternalCharHandler.write(&Value::Char('a'), &mut buf, &config).unwrap();
        InternalCharHandler.write(&Value::Char('\u{ff}'), &mut buf, &config).unwrap();
        assert_eq!(buf.as_slice(), &[b'a', 0xff]);

        let err = InternalCharHandler
            .validate_and_get_length(&Value::Char('\u{100}'), &config)
            .unwrap_err();
        assert!(err.is_overflow());
    }

    #[test]
    fn test_internal_char_from_integer() {
        let config = Config::default();
        assert_eq!(
            InternalCharHandler
                .validate_and_get_length(&Value::Int32(255), &config)
                .unwrap(),
            1
        );
        assert!(InternalCharHandler
            .validate_and_get_length(&Value::Int32(256), &config)
            .unwrap_err()
            .is_overflow());
        assert!(InternalCharHandler
            .validate_and_get_length(&Value::Int16(-1), &config)
            .unwrap_err()
            .is_overflow());
        assert!(InternalCharHandler
            .validate_and_get_length(&Value::Boolean(true), &config)
            .unwrap_err()
            .is_conversion_error());
    }

    #[test]
    fn test_internal_char_read_is_unsigned() {
        let mut buf = ReadBuffer::from_slice(&[0xe9]);
        assert_eq!(
            InternalCharHandler.read(&mut buf, 1).unwrap(),
            Value::InternalChar(0xe9)
        );
    }

    #[test]
    fn test_bool() {
        let mut buf = WriteBuffer::new();
        BoolHandler
            .write(&Value::Boolean(true), &mut buf, &Config::default())
            .unwrap();
        assert_eq!(buf.as_slice(), &[1]);

        let mut read = ReadBuffer::from_slice(&[0, 2]);
        assert_eq!(BoolHandler.read(&mut read, 1).unwrap(), Value::Boolean(false));
        assert!(BoolHandler.read(&mut read, 1).unwrap_err().is_format_error());
    }

    #[test]
    fn test_integers_accept_narrower_values() {
        let mut buf = WriteBuffer::new();
        let config = Config::default();
        Int8Handler.write(&Value::Int16(-2), &mut buf, &config).unwrap();
        assert_eq!(buf.as_slice(), &(-2i64).to_be_bytes());
    }

    #[test]
    fn test_integers_reject_out_of_range() {
        let config = Config::default();
        let err = Int2Handler
            .validate_and_get_length(&Value::Int32(40_000), &config)
            .unwrap_err();
        assert!(err.is_overflow());
        assert_eq!(
            Int2Handler
                .validate_and_get_length(&Value::Int64(-32_768), &config)
                .unwrap(),
            2
        );
    }

    #[test]
    fn test_integer_read() {
        let mut buf = ReadBuffer::from_slice(&[0xff, 0xfe, 0x00, 0x00, 0x01, 0x00]);
        assert_eq!(Int2Handler.read(&mut buf, 2).unwrap(), Value::Int16(-2));
        assert_eq!(Int4Handler.read(&mut buf, 4).unwrap(), Value::Int32(256));
    }
}
