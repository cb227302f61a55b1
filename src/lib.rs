#![warn(missing_docs)]

//! # pg-typecodec
//!
//! Binary type marshaling for the PostgreSQL wire protocol.
//!
//! This crate converts between the binary encodings PostgreSQL uses for
//! field values (in `DataRow` and `Bind` messages) and Rust values. It does
//! no I/O: the caller owns the message buffers and the connection.
//!
//! ## Features
//!
//! - **Temporal types** - `date`, `time`, `timetz`, `timestamp`,
//!   `timestamptz` and `interval`, bit-exact with the server
//! - **Lossless provider types** - [`PgDate`], [`PgTimestamp`],
//!   [`PgTimeTz`] and [`PgInterval`] carry infinities, BC years and years
//!   past 9999
//! - **Regular types** - fallible projections onto `chrono` types
//! - **Scalars** - `"char"`, `bool`, `int2`, `int4`, `int8` with widening
//!   reads
//! - **Framing checks** - every read consumes exactly its declared length and
//!   every write emits exactly its validated length
//!
//! ## Quick Start
//!
//! ```rust
//! use pg_typecodec::{Config, FieldDescriptor, ProviderType, TypeRegistry, Value};
//! use pg_typecodec::buffer::{ReadBuffer, WriteBuffer};
//! use chrono::NaiveDate;
//!
//! # fn main() -> pg_typecodec::Result<()> {
//! let config: Config = "Host=localhost;ConvertInfinityDateTime=true".parse()?;
//! let registry = TypeRegistry::with_builtin_oids(config);
//!
//! // Bind a parameter
//! let date = NaiveDate::from_ymd_opt(2002, 3, 4).unwrap();
//! let mut out = WriteBuffer::new();
//! registry.write_param(&Value::from(date), ProviderType::Date, &mut out)?;
//! assert_eq!(out.as_slice(), &[0, 0, 0, 4, 0, 0, 3, 25]);
//!
//! // Read it back as a result column
//! let mut input = ReadBuffer::from_slice(out.as_slice());
//! let len = input.read_i32_be()?;
//! let field = FieldDescriptor::for_provider_type(ProviderType::Date);
//! let read: NaiveDate = registry.read_as(&mut input, len, &field)?;
//! assert_eq!(read, date);
//! # Ok(())
//! # }
//! ```
//!
//! ## Infinity and BC dates
//!
//! ```rust
//! use pg_typecodec::{Config, PgDate, Value};
//! use chrono::NaiveDate;
//!
//! let infinity = Value::Date(PgDate::Infinity);
//!
//! // By default infinity has no regular representation
//! assert!(infinity.get::<NaiveDate>(&Config::default()).is_err());
//!
//! // With ConvertInfinityDateTime it maps to the regular maximum
//! let clamping = Config::new().convert_infinity_datetime(true);
//! assert_eq!(
//!     infinity.get::<NaiveDate>(&clamping).unwrap(),
//!     NaiveDate::from_ymd_opt(9999, 12, 31).unwrap()
//! );
//!
//! // Year -5 is 6 BC
//! assert_eq!(PgDate::from_ymd(-5, 3, 3).unwrap().to_string(), "0006-03-03 BC");
//! ```

pub mod buffer;
pub mod config;
pub mod constants;
pub mod error;
pub mod field;
pub mod registry;
pub mod types;
pub mod value;

pub use config::Config;
pub use constants::{DbType, ProviderType};
pub use error::{Error, Result};
pub use field::{FieldDescriptor, FormatCode};
pub use registry::{CatalogEntry, TypeRegistry};
pub use types::{PgDate, PgInterval, PgTimeTz, PgTimestamp, TypeHandler};
pub use value::{FromValue, Value};
