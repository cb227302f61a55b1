//! Type registry: binds wire type OIDs to handlers for one connection
//!
//! The registry is built once from the server's `pg_type` catalog when a
//! connection opens and is read-only afterwards. It owns the connection's
//! [`Config`] and passes it to every handler call, and it enforces message
//! framing around each handler:
//!
//! - a read gets a sub-cursor of exactly the declared length and must consume
//!   all of it
//! - a write is prefixed with the validated length and must emit exactly that
//!   many bytes
//!
//! ```rust
//! use pg_typecodec::{Config, FieldDescriptor, ProviderType, TypeRegistry, Value};
//! use pg_typecodec::buffer::{ReadBuffer, WriteBuffer};
//!
//! let registry = TypeRegistry::with_builtin_oids(Config::default());
//!
//! let mut out = WriteBuffer::new();
//! registry.write_param(&Value::Int32(42), ProviderType::Integer, &mut out).unwrap();
//!
//! let mut input = ReadBuffer::from_slice(out.as_slice());
//! let len = input.read_i32_be().unwrap();
//! let field = FieldDescriptor::for_provider_type(ProviderType::Integer);
//! let n: i64 = registry.read_as(&mut input, len, &field).unwrap();
//! assert_eq!(n, 42);
//! ```

use indexmap::IndexMap;

use crate::buffer::{ReadBuffer, WriteBuffer};
use crate::config::Config;
use crate::constants::{DbType, ProviderType};
use crate::error::{Error, Result};
use crate::field::FieldDescriptor;
use crate::types::TypeHandler;
use crate::value::{FromValue, Value};

/// One row of the server's type catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// `pg_type.oid`
    pub oid: u32,
    /// `pg_type.typname`
    pub name: String,
}

impl CatalogEntry {
    /// Create a catalog entry
    pub fn new(oid: u32, name: impl Into<String>) -> Self {
        Self {
            oid,
            name: name.into(),
        }
    }
}

/// Handler lookup tables for one connection
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    /// Conversion settings handed to every handler
    config: Config,
    /// Handlers in catalog order
    by_oid: IndexMap<u32, TypeHandler>,
    /// OID each provider type was bound to
    by_provider: IndexMap<ProviderType, u32>,
}

impl TypeRegistry {
    /// Build a registry from the server's type catalog
    ///
    /// Every catalog entry whose name is a built-in type gets that type's
    /// handler. Other entries are skipped. If a provider type appears more
    /// than once, the first OID wins for provider-type lookups.
    pub fn build(catalog: &[CatalogEntry], config: Config) -> Self {
        let mut by_oid = IndexMap::new();
        let mut by_provider = IndexMap::new();

        for entry in catalog {
            let provider_type = match ProviderType::try_from(entry.name.as_str()) {
                Ok(pt) => pt,
                Err(_) => {
                    tracing::trace!(oid = entry.oid, name = %entry.name, "No handler for catalog type");
                    continue;
                }
            };
            by_oid.insert(entry.oid, TypeHandler::for_provider_type(provider_type));
            by_provider.entry(provider_type).or_insert(entry.oid);
        }

        tracing::debug!(
            catalog_size = catalog.len(),
            bound = by_oid.len(),
            convert_infinity_datetime = config.convert_infinity_datetime,
            "Built type registry"
        );

        Self {
            config,
            by_oid,
            by_provider,
        }
    }

    /// Build a registry using the well-known OIDs of the built-in types
    pub fn with_builtin_oids(config: Config) -> Self {
        let catalog: Vec<CatalogEntry> = ProviderType::ALL
            .iter()
            .map(|pt| CatalogEntry::new(pt.default_oid(), pt.type_name()))
            .collect();
        Self::build(&catalog, config)
    }

    /// The connection's conversion settings
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of bound OIDs
    pub fn len(&self) -> usize {
        self.by_oid.len()
    }

    /// Check if no OID is bound
    pub fn is_empty(&self) -> bool {
        self.by_oid.is_empty()
    }

    /// Iterate over bound OIDs and their handlers in catalog order
    pub fn iter(&self) -> impl Iterator<Item = (u32, TypeHandler)> + '_ {
        self.by_oid.iter().map(|(oid, handler)| (*oid, *handler))
    }

    /// Look up the handler for a wire type OID
    pub fn handler_for_oid(&self, oid: u32) -> Result<TypeHandler> {
        self.by_oid.get(&oid).copied().ok_or_else(|| {
            tracing::debug!(oid, "No handler for type OID");
            Error::UnsupportedType(oid)
        })
    }

    /// The OID a provider type is bound to on this connection
    pub fn oid_for_provider_type(&self, provider_type: ProviderType) -> Result<u32> {
        self.by_provider.get(&provider_type).copied().ok_or_else(|| {
            tracing::debug!(?provider_type, "Provider type not in catalog");
            Error::UnsupportedProviderType(provider_type)
        })
    }

    /// Look up the handler for a provider type
    pub fn handler_for_provider_type(&self, provider_type: ProviderType) -> Result<TypeHandler> {
        self.oid_for_provider_type(provider_type)
            .and_then(|oid| self.handler_for_oid(oid))
    }

    /// Look up the handler for a legacy DbType
    ///
    /// `DateTime2` is an alias of `DateTime` (`timestamp`). `Object` and
    /// DbTypes without a built-in type never resolve.
    pub fn handler_for_db_type(&self, db_type: DbType) -> Result<TypeHandler> {
        let provider_type = match db_type {
            DbType::DateTime2 => Some(ProviderType::Timestamp),
            DbType::Object => None,
            other => ProviderType::ALL
                .into_iter()
                .find(|pt| pt.db_type() == Some(other)),
        };
        provider_type
            .and_then(|pt| self.handler_for_provider_type(pt).ok())
            .ok_or_else(|| {
                tracing::debug!(?db_type, "No handler for DbType");
                Error::UnsupportedDbType(db_type)
            })
    }

    /// Look up the handler for the natural wire type of a host value
    pub fn handler_for_value(&self, value: &Value) -> Result<TypeHandler> {
        let provider_type = value
            .provider_type()
            .ok_or_else(|| Error::UnsupportedValue(value.type_name()))?;
        self.handler_for_provider_type(provider_type)
    }

    /// Read one field whose length prefix has already been consumed
    ///
    /// A negative `len` is SQL NULL. The declared bytes are always consumed
    /// from `buf`, even when decoding fails, unless `buf` is shorter than
    /// `len`.
    pub fn read_field(
        &self,
        buf: &mut ReadBuffer,
        len: i32,
        field: &FieldDescriptor,
    ) -> Result<Value> {
        let Ok(len) = usize::try_from(len) else {
            return Ok(Value::Null);
        };

        let mut field_buf = buf.split_to(len)?;
        let handler = self.handler_for_oid(field.type_oid)?;

        let value = handler
            .read(&mut field_buf, len, field)
            .map_err(|e| match e {
                Error::BufferUnderflow { needed, available } => {
                    let consumed = len - available + needed;
                    tracing::warn!(
                        type_name = handler.type_name(),
                        declared = len,
                        consumed,
                        "Handler read past the end of its field"
                    );
                    Error::FramingViolation {
                        declared: len,
                        consumed,
                    }
                }
                other => other,
            })?;

        if field_buf.remaining() != 0 {
            let consumed = field_buf.position();
            tracing::warn!(
                type_name = handler.type_name(),
                declared = len,
                consumed,
                leftover = %hex::encode(field_buf.remaining_bytes()),
                "Handler did not consume its whole field"
            );
            return Err(Error::FramingViolation {
                declared: len,
                consumed,
            });
        }

        Ok(value)
    }

    /// Read one field and convert it to a Rust type
    pub fn read_as<T: FromValue>(
        &self,
        buf: &mut ReadBuffer,
        len: i32,
        field: &FieldDescriptor,
    ) -> Result<T> {
        let value = self.read_field(buf, len, field)?;
        T::from_value(&value, &self.config)
    }

    /// Write a length-prefixed parameter value for the given wire type
    ///
    /// NULL is written as length -1 with no value bytes.
    pub fn write_param(
        &self,
        value: &Value,
        provider_type: ProviderType,
        buf: &mut WriteBuffer,
    ) -> Result<()> {
        if value.is_null() {
            return buf.write_i32_be(-1);
        }
        let handler = self.handler_for_provider_type(provider_type)?;
        self.write_with(handler, value, buf)
    }

    /// Write a length-prefixed parameter value, inferring its wire type
    pub fn write_value(&self, value: &Value, buf: &mut WriteBuffer) -> Result<()> {
        if value.is_null() {
            return buf.write_i32_be(-1);
        }
        let handler = self.handler_for_value(value)?;
        self.write_with(handler, value, buf)
    }

    /// Length prefix and value bytes are written together or not at all
    fn write_with(&self, handler: TypeHandler, value: &Value, buf: &mut WriteBuffer) -> Result<()> {
        let validated = handler.validate_and_get_length(value, &self.config)?;
        let prefix = i32::try_from(validated).map_err(|_| {
            Error::overflow("length prefix", format!("{} bytes", validated))
        })?;

        let start = buf.len();
        let result = self.write_prefixed(handler, value, prefix, validated, buf);
        if result.is_err() {
            buf.truncate(start);
        }
        result
    }

    fn write_prefixed(
        &self,
        handler: TypeHandler,
        value: &Value,
        prefix: i32,
        validated: usize,
        buf: &mut WriteBuffer,
    ) -> Result<()> {
        buf.write_i32_be(prefix)?;
        let start = buf.len();
        handler.write(value, buf, &self.config)?;
        let written = buf.len() - start;

        if written != validated {
            tracing::warn!(
                type_name = handler.type_name(),
                validated,
                written,
                "Handler wrote a different length than it validated"
            );
            return Err(Error::LengthMismatch { validated, written });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::oid;

    #[test]
    fn test_registry_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TypeRegistry>();
        assert_send_sync::<TypeHandler>();
    }

    #[test]
    fn test_builtin_oids() {
        let registry = TypeRegistry::with_builtin_oids(Config::default());
        assert_eq!(registry.len(), ProviderType::ALL.len());
        assert_eq!(
            registry.handler_for_oid(oid::DATE).unwrap().provider_type(),
            ProviderType::Date
        );
        assert!(matches!(
            registry.handler_for_oid(705),
            Err(Error::UnsupportedType(705))
        ));
    }

    #[test]
    fn test_build_skips_unknown_catalog_types() {
        let catalog = [
            CatalogEntry::new(25, "text"),
            CatalogEntry::new(oid::INT4, "int4"),
        ];
        let registry = TypeRegistry::build(&catalog, Config::default());
        assert_eq!(registry.len(), 1);
        assert!(registry.handler_for_oid(25).unwrap_err().is_unsupported_type());
        assert!(registry
            .handler_for_provider_type(ProviderType::Date)
            .unwrap_err()
            .is_unsupported_type());
    }

    #[test]
    fn test_db_type_lookup() {
        let registry = TypeRegistry::with_builtin_oids(Config::default());
        let ts = registry.handler_for_db_type(DbType::DateTime).unwrap();
        let ts2 = registry.handler_for_db_type(DbType::DateTime2).unwrap();
        assert_eq!(ts, ts2);
        assert_eq!(ts.provider_type(), ProviderType::Timestamp);
        assert_eq!(
            registry
                .handler_for_db_type(DbType::DateTimeOffset)
                .unwrap()
                .provider_type(),
            ProviderType::TimestampTz
        );
        assert!(matches!(
            registry.handler_for_db_type(DbType::Object),
            Err(Error::UnsupportedDbType(DbType::Object))
        ));
        assert!(registry.handler_for_db_type(DbType::Byte).is_err());
    }

    #[test]
    fn test_null_field() {
        let registry = TypeRegistry::with_builtin_oids(Config::default());
        let mut buf = ReadBuffer::from_slice(&[]);
        let field = FieldDescriptor::new(oid::DATE);
        assert_eq!(registry.read_field(&mut buf, -1, &field).unwrap(), Value::Null);
        let n: Option<i32> = registry
            .read_as(&mut buf, -1, &FieldDescriptor::new(oid::INT4))
            .unwrap();
        assert_eq!(n, None);
    }

    #[test]
    fn test_write_null_param() {
        let registry = TypeRegistry::with_builtin_oids(Config::default());
        let mut buf = WriteBuffer::new();
        registry
            .write_param(&Value::Null, ProviderType::Date, &mut buf)
            .unwrap();
        assert_eq!(buf.as_slice(), &(-1i32).to_be_bytes());
    }

    #[test]
    fn test_failed_write_leaves_no_prefix() {
        let registry = TypeRegistry::with_builtin_oids(Config::default());
        let mut buf = WriteBuffer::with_max_capacity(16, 6);
        buf.write_u8(0x50).unwrap();

        let ts = chrono::NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let err = registry
            .write_param(&Value::NaiveDateTime(ts), ProviderType::Timestamp, &mut buf)
            .unwrap_err();
        assert!(matches!(err, Error::BufferOverflow { needed: 8, .. }));
        assert_eq!(buf.as_slice(), &[0x50]);

        // A value that fits still goes through afterwards
        registry
            .write_param(&Value::Boolean(true), ProviderType::Boolean, &mut buf)
            .unwrap();
        assert_eq!(buf.as_slice(), &[0x50, 0, 0, 0, 1, 1]);
    }

    #[test]
    fn test_unsupported_oid_keeps_framing() {
        let registry = TypeRegistry::with_builtin_oids(Config::default());
        let mut buf = ReadBuffer::from_slice(&[1, 2, 3, 0, 0, 0, 7]);
        let err = registry
            .read_field(&mut buf, 3, &FieldDescriptor::new(25))
            .unwrap_err();
        assert!(err.is_unsupported_type());
        let n: i32 = registry
            .read_as(&mut buf, 4, &FieldDescriptor::new(oid::INT4))
            .unwrap();
        assert_eq!(n, 7);
    }
}
