//! Per-column and per-parameter field metadata

use crate::constants::ProviderType;

/// Format code for parameter and result values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i16)]
pub enum FormatCode {
    /// Text format (0)
    Text = 0,
    /// Binary format (1)
    #[default]
    Binary = 1,
}

impl TryFrom<i16> for FormatCode {
    type Error = crate::error::Error;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(FormatCode::Text),
            1 => Ok(FormatCode::Binary),
            _ => Err(crate::error::Error::InvalidFormatCode(value)),
        }
    }
}

/// Metadata describing one result column or bound parameter
///
/// Taken from a RowDescription field or from the parameter's bind metadata.
/// Lives only for the duration of one read or write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Wire type OID
    pub type_oid: u32,
    /// `pg_type.typlen` (-1 for variable length)
    pub type_size: i16,
    /// Type modifier (`atttypmod`), -1 if none
    pub type_modifier: i32,
    /// Encoding of the value
    pub format: FormatCode,
}

impl FieldDescriptor {
    /// Create a binary-format descriptor for the given OID
    pub fn new(type_oid: u32) -> Self {
        Self {
            type_oid,
            type_size: -1,
            type_modifier: -1,
            format: FormatCode::Binary,
        }
    }

    /// Create a binary-format descriptor for a built-in provider type
    pub fn for_provider_type(provider_type: ProviderType) -> Self {
        Self::new(provider_type.default_oid())
    }

    /// Set the declared type size
    pub fn with_type_size(mut self, type_size: i16) -> Self {
        self.type_size = type_size;
        self
    }

    /// Set the format code
    pub fn with_format(mut self, format: FormatCode) -> Self {
        self.format = format;
        self
    }

    /// Check if the type has a variable length
    pub fn is_variable_length(&self) -> bool {
        self.type_size < 0
    }
}
