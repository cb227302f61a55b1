//! Wire protocol constants
//!
//! Type OIDs, provider type enumerations and the fixed temporal encoding
//! constants used by the PostgreSQL binary format.

// =============================================================================
// Type OIDs
// =============================================================================

/// Well-known OIDs of the built-in types (from `pg_type.dat`)
#[allow(missing_docs)]
pub mod oid {
    pub const BOOL: u32 = 16;
    pub const CHAR: u32 = 18;
    pub const INT8: u32 = 20;
    pub const INT2: u32 = 21;
    pub const INT4: u32 = 23;
    pub const DATE: u32 = 1082;
    pub const TIME: u32 = 1083;
    pub const TIMESTAMP: u32 = 1114;
    pub const TIMESTAMPTZ: u32 = 1184;
    pub const INTERVAL: u32 = 1186;
    pub const TIMETZ: u32 = 1266;
}

// =============================================================================
// Temporal Encoding
// =============================================================================

/// Constants of the binary date/time encoding
///
/// Dates count days and timestamps count microseconds from the PostgreSQL
/// epoch, 2000-01-01 00:00:00.
pub mod temporal {
    /// Days between 1970-01-01 and 2000-01-01
    pub const UNIX_TO_PG_EPOCH_DAYS: i64 = 10_957;

    /// Microseconds per second
    pub const MICROS_PER_SECOND: i64 = 1_000_000;

    /// Microseconds per day
    pub const MICROS_PER_DAY: i64 = 86_400 * MICROS_PER_SECOND;

    /// Days per month used by lossy interval flattening and justification
    pub const DAYS_PER_MONTH: i64 = 30;

    /// Wire value of `date 'infinity'`
    pub const DATE_POS_INFINITY: i32 = i32::MAX;

    /// Wire value of `date '-infinity'`
    pub const DATE_NEG_INFINITY: i32 = i32::MIN;

    /// Wire value of `timestamp 'infinity'`
    pub const TIMESTAMP_POS_INFINITY: i64 = i64::MAX;

    /// Wire value of `timestamp '-infinity'`
    pub const TIMESTAMP_NEG_INFINITY: i64 = i64::MIN;

    /// First year representable by the regular host types
    pub const REGULAR_MIN_YEAR: i32 = 1;

    /// Last year representable by the regular host types
    pub const REGULAR_MAX_YEAR: i32 = 9999;
}

/// Fixed binary widths of each wire type
#[allow(missing_docs)]
pub mod width {
    pub const BOOL: usize = 1;
    pub const CHAR: usize = 1;
    pub const INT2: usize = 2;
    pub const INT4: usize = 4;
    pub const INT8: usize = 8;
    pub const DATE: usize = 4;
    pub const TIME: usize = 8;
    pub const TIMETZ: usize = 12;
    pub const TIMESTAMP: usize = 8;
    pub const TIMESTAMPTZ: usize = 8;
    pub const INTERVAL: usize = 16;
}

// =============================================================================
// Provider Types
// =============================================================================

/// Wire type identity, independent of any host type system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderType {
    /// Single-byte internal `"char"`
    InternalChar,
    /// `bool`
    Boolean,
    /// `int2`
    Smallint,
    /// `int4`
    Integer,
    /// `int8`
    Bigint,
    /// `date`
    Date,
    /// `time without time zone`
    Time,
    /// `time with time zone`
    TimeTz,
    /// `timestamp without time zone`
    Timestamp,
    /// `timestamp with time zone`
    TimestampTz,
    /// `interval`
    Interval,
}

impl ProviderType {
    /// All provider types with a built-in handler
    pub const ALL: [ProviderType; 11] = [
        ProviderType::InternalChar,
        ProviderType::Boolean,
        ProviderType::Smallint,
        ProviderType::Integer,
        ProviderType::Bigint,
        ProviderType::Date,
        ProviderType::Time,
        ProviderType::TimeTz,
        ProviderType::Timestamp,
        ProviderType::TimestampTz,
        ProviderType::Interval,
    ];

    /// The `pg_type.typname` of this type
    pub fn type_name(&self) -> &'static str {
        match self {
            ProviderType::InternalChar => "char",
            ProviderType::Boolean => "bool",
            ProviderType::Smallint => "int2",
            ProviderType::Integer => "int4",
            ProviderType::Bigint => "int8",
            ProviderType::Date => "date",
            ProviderType::Time => "time",
            ProviderType::TimeTz => "timetz",
            ProviderType::Timestamp => "timestamp",
            ProviderType::TimestampTz => "timestamptz",
            ProviderType::Interval => "interval",
        }
    }

    /// The well-known OID of this type
    pub fn default_oid(&self) -> u32 {
        match self {
            ProviderType::InternalChar => oid::CHAR,
            ProviderType::Boolean => oid::BOOL,
            ProviderType::Smallint => oid::INT2,
            ProviderType::Integer => oid::INT4,
            ProviderType::Bigint => oid::INT8,
            ProviderType::Date => oid::DATE,
            ProviderType::Time => oid::TIME,
            ProviderType::TimeTz => oid::TIMETZ,
            ProviderType::Timestamp => oid::TIMESTAMP,
            ProviderType::TimestampTz => oid::TIMESTAMPTZ,
            ProviderType::Interval => oid::INTERVAL,
        }
    }

    /// The legacy DbType this provider type maps to, if any
    pub fn db_type(&self) -> Option<DbType> {
        match self {
            ProviderType::InternalChar => None,
            ProviderType::Boolean => Some(DbType::Boolean),
            ProviderType::Smallint => Some(DbType::Int16),
            ProviderType::Integer => Some(DbType::Int32),
            ProviderType::Bigint => Some(DbType::Int64),
            ProviderType::Date => Some(DbType::Date),
            ProviderType::Time => Some(DbType::Time),
            ProviderType::TimeTz => Some(DbType::Object),
            ProviderType::Timestamp => Some(DbType::DateTime),
            ProviderType::TimestampTz => Some(DbType::DateTimeOffset),
            ProviderType::Interval => Some(DbType::Object),
        }
    }
}

impl TryFrom<&str> for ProviderType {
    type Error = crate::error::Error;

    /// Resolve a `pg_type.typname`, accepting the SQL-standard spellings too
    fn try_from(name: &str) -> Result<Self, Self::Error> {
        match name {
            "char" | "\"char\"" => Ok(ProviderType::InternalChar),
            "bool" | "boolean" => Ok(ProviderType::Boolean),
            "int2" | "smallint" => Ok(ProviderType::Smallint),
            "int4" | "integer" => Ok(ProviderType::Integer),
            "int8" | "bigint" => Ok(ProviderType::Bigint),
            "date" => Ok(ProviderType::Date),
            "time" | "time without time zone" => Ok(ProviderType::Time),
            "timetz" | "time with time zone" => Ok(ProviderType::TimeTz),
            "timestamp" | "timestamp without time zone" => Ok(ProviderType::Timestamp),
            "timestamptz" | "timestamp with time zone" => Ok(ProviderType::TimestampTz),
            "interval" => Ok(ProviderType::Interval),
            _ => Err(crate::error::Error::UnsupportedTypeName(name.to_string())),
        }
    }
}

// =============================================================================
// Legacy DbType
// =============================================================================

/// Coarse, framework-level type classification
///
/// Several provider types may collapse onto one DbType; `Object` in
/// particular never identifies a single handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum DbType {
    Byte,
    Boolean,
    Int16,
    Int32,
    Int64,
    Date,
    Time,
    DateTime,
    DateTime2,
    DateTimeOffset,
    Object,
}
