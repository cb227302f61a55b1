//! Error types for the type-marshaling layer
//!
//! Errors fall into five families: framing (the message can no longer be
//! trusted), format (the bytes of one field are malformed), overflow (a value
//! lies outside the target representation), unsupported type, and conversion
//! (a host value has the wrong shape for the target wire type).

use thiserror::Error;

use crate::constants::{DbType, ProviderType};
use crate::field::FormatCode;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for type marshaling
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Error {
    // =========================================================================
    // Buffer / Framing Errors
    // =========================================================================
    /// Buffer underflow - not enough data to read
    #[error("buffer underflow: need {needed} bytes but only {available} available")]
    BufferUnderflow { needed: usize, available: usize },

    /// Buffer overflow - not enough space to write
    #[error("buffer overflow: need {needed} bytes but only {available} available")]
    BufferOverflow { needed: usize, available: usize },

    /// A handler did not consume exactly the declared field length
    #[error("framing violation: field declared {declared} bytes but {consumed} were consumed")]
    FramingViolation { declared: usize, consumed: usize },

    /// A handler wrote a different byte count than it validated
    #[error("length mismatch: validated {validated} bytes but wrote {written}")]
    LengthMismatch { validated: usize, written: usize },

    // =========================================================================
    // Format Errors
    // =========================================================================
    /// Declared field length does not match the fixed wire width
    #[error("invalid length for {type_name}: expected {expected} bytes, got {actual}")]
    InvalidFieldLength {
        type_name: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Field bytes do not form a valid value of the wire type
    #[error("invalid {type_name} value: {message}")]
    InvalidFormat {
        type_name: &'static str,
        message: String,
    },

    /// Format code on the wire is neither text nor binary
    #[error("invalid format code: {0}")]
    InvalidFormatCode(i16),

    // =========================================================================
    // Overflow Errors
    // =========================================================================
    /// Value lies outside the target representation's domain
    #[error("value out of range for {target}: {message}")]
    Overflow { target: &'static str, message: String },

    // =========================================================================
    // Unsupported Type Errors
    // =========================================================================
    /// No handler registered for the wire type OID
    #[error("unsupported type OID: {0}")]
    UnsupportedType(u32),

    /// No handler registered for the provider type
    #[error("unsupported provider type: {0:?}")]
    UnsupportedProviderType(ProviderType),

    /// No built-in type has this `pg_type.typname`
    #[error("unsupported type name: {0}")]
    UnsupportedTypeName(String),

    /// The legacy DbType does not resolve to a single handler
    #[error("unsupported DbType: {0:?}")]
    UnsupportedDbType(DbType),

    /// The handler cannot decode the field's format code
    #[error("unsupported format {format:?} for {type_name}")]
    UnsupportedFormat {
        type_name: &'static str,
        format: FormatCode,
    },

    /// No provider type can be inferred for the host value
    #[error("cannot infer a wire type for {0} value")]
    UnsupportedValue(&'static str),

    // =========================================================================
    // Conversion Errors
    // =========================================================================
    /// Host value has an unsupported shape for the wire type
    #[error("cannot convert {from} to {to}")]
    Conversion { from: &'static str, to: &'static str },

    /// NULL value encountered where not expected
    #[error("unexpected NULL value")]
    UnexpectedNull,

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid configuration option
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Create an overflow error for the given target type
    pub fn overflow(target: &'static str, message: impl Into<String>) -> Self {
        Error::Overflow {
            target,
            message: message.into(),
        }
    }

    /// Create a format error for the given wire type
    pub fn invalid_format(type_name: &'static str, message: impl Into<String>) -> Self {
        Error::InvalidFormat {
            type_name,
            message: message.into(),
        }
    }

    /// Create a conversion error
    pub fn conversion(from: &'static str, to: &'static str) -> Self {
        Error::Conversion { from, to }
    }

    /// Check if this is a per-field format error
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidFieldLength { .. }
                | Error::InvalidFormat { .. }
                | Error::InvalidFormatCode(_)
        )
    }

    /// Check if this is an overflow error
    pub fn is_overflow(&self) -> bool {
        matches!(self, Error::Overflow { .. })
    }

    /// Check if no handler could be found (recoverable by the caller)
    pub fn is_unsupported_type(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedType(_)
                | Error::UnsupportedProviderType(_)
                | Error::UnsupportedTypeName(_)
                | Error::UnsupportedDbType(_)
                | Error::UnsupportedFormat { .. }
                | Error::UnsupportedValue(_)
        )
    }

    /// Check if a host value had the wrong shape
    pub fn is_conversion_error(&self) -> bool {
        matches!(self, Error::Conversion { .. })
    }

    /// Check if message framing can no longer be trusted
    ///
    /// The owning connection must discard the rest of the message.
    pub fn is_fatal_to_message(&self) -> bool {
        matches!(
            self,
            Error::BufferUnderflow { .. }
                | Error::BufferOverflow { .. }
                | Error::FramingViolation { .. }
                | Error::LengthMismatch { .. }
        )
    }
}
