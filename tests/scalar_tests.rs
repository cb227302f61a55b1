//! Integration tests for the scalar handlers and integer width fan-out

use pg_typecodec::buffer::{ReadBuffer, WriteBuffer};
use pg_typecodec::constants::oid;
use pg_typecodec::{Config, FieldDescriptor, ProviderType, TypeRegistry, Value};

fn registry() -> TypeRegistry {
    TypeRegistry::with_builtin_oids(Config::default())
}

fn field_bytes(bytes: &[u8]) -> (ReadBuffer, i32) {
    (ReadBuffer::from_slice(bytes), bytes.len() as i32)
}

#[test]
fn test_internal_char_fan_out_is_zero_extended() {
    let registry = registry();
    let field = FieldDescriptor::new(oid::CHAR);

    for byte in [0u8, 1, 0x7f, 0x80, 0xe9, 0xff] {
        let (mut buf, len) = field_bytes(&[byte]);
        let as_u8: u8 = registry.read_as(&mut buf, len, &field).unwrap();
        let (mut buf, len) = field_bytes(&[byte]);
        let as_i16: i16 = registry.read_as(&mut buf, len, &field).unwrap();
        let (mut buf, len) = field_bytes(&[byte]);
        let as_i32: i32 = registry.read_as(&mut buf, len, &field).unwrap();
        let (mut buf, len) = field_bytes(&[byte]);
        let as_i64: i64 = registry.read_as(&mut buf, len, &field).unwrap();
        let (mut buf, len) = field_bytes(&[byte]);
        let as_char: char = registry.read_as(&mut buf, len, &field).unwrap();

        assert_eq!(as_u8 as i64, as_i64);
        assert_eq!(as_i16 as i64, as_i64);
        assert_eq!(as_i32 as i64, as_i64);
        assert_eq!(as_i64, byte as i64);
        assert!(as_i64 >= 0, "sign flip for 0x{:02x}", byte);
        assert_eq!(as_char as u32, byte as u32);
    }
}

#[test]
fn test_internal_char_write() {
    let registry = registry();
    let mut out = WriteBuffer::new();
    registry
        .write_param(&Value::Char('r'), ProviderType::InternalChar, &mut out)
        .unwrap();
    registry
        .write_param(&Value::Int64(200), ProviderType::InternalChar, &mut out)
        .unwrap();
    assert_eq!(out.as_slice(), &[0, 0, 0, 1, b'r', 0, 0, 0, 1, 200]);

    let err = registry
        .write_param(&Value::Int32(300), ProviderType::InternalChar, &mut out)
        .unwrap_err();
    assert!(err.is_overflow());
}

#[test]
fn test_internal_char_wrong_length() {
    let registry = registry();
    let (mut buf, len) = field_bytes(&[b'a', b'b']);
    let err = registry
        .read_field(&mut buf, len, &FieldDescriptor::new(oid::CHAR))
        .unwrap_err();
    assert!(err.is_format_error());
    assert_eq!(buf.remaining(), 0);
}

#[test]
fn test_signed_widening_agrees() {
    let registry = registry();

    let (mut buf, len) = field_bytes(&(-12_345i16).to_be_bytes());
    let v32: i32 = registry.read_as(&mut buf, len, &FieldDescriptor::new(oid::INT2)).unwrap();
    let (mut buf, len) = field_bytes(&(-12_345i16).to_be_bytes());
    let v64: i64 = registry.read_as(&mut buf, len, &FieldDescriptor::new(oid::INT2)).unwrap();
    assert_eq!(v32, -12_345);
    assert_eq!(v64, -12_345);

    let (mut buf, len) = field_bytes(&i32::MIN.to_be_bytes());
    let v64: i64 = registry.read_as(&mut buf, len, &FieldDescriptor::new(oid::INT4)).unwrap();
    assert_eq!(v64, i32::MIN as i64);
}

#[test]
fn test_narrowing_reads_rejected() {
    let registry = registry();

    let (mut buf, len) = field_bytes(&1i32.to_be_bytes());
    let err = registry
        .read_as::<i16>(&mut buf, len, &FieldDescriptor::new(oid::INT4))
        .unwrap_err();
    assert!(err.is_conversion_error());
    // The field was still consumed
    assert_eq!(buf.remaining(), 0);

    let (mut buf, len) = field_bytes(&1i64.to_be_bytes());
    assert!(registry
        .read_as::<i32>(&mut buf, len, &FieldDescriptor::new(oid::INT8))
        .unwrap_err()
        .is_conversion_error());
}

#[test]
fn test_integer_write_range_checks() {
    let registry = registry();
    let mut out = WriteBuffer::new();
    registry
        .write_param(&Value::Int64(i32::MAX as i64), ProviderType::Integer, &mut out)
        .unwrap();
    let err = registry
        .write_param(&Value::Int64(i32::MAX as i64 + 1), ProviderType::Integer, &mut out)
        .unwrap_err();
    assert!(err.is_overflow());
    assert_eq!(out.len(), 8);
}

#[test]
fn test_bool_roundtrip() {
    let registry = registry();
    for b in [true, false] {
        let mut out = WriteBuffer::new();
        registry
            .write_param(&Value::Boolean(b), ProviderType::Boolean, &mut out)
            .unwrap();
        let mut input = ReadBuffer::from_slice(out.as_slice());
        let len = input.read_i32_be().unwrap();
        let read: bool = registry
            .read_as(&mut input, len, &FieldDescriptor::new(oid::BOOL))
            .unwrap();
        assert_eq!(read, b);
    }
}

#[test]
fn test_integer_roundtrip_extremes() {
    let registry = registry();
    let cases = [
        (Value::Int16(i16::MIN), ProviderType::Smallint, oid::INT2),
        (Value::Int16(i16::MAX), ProviderType::Smallint, oid::INT2),
        (Value::Int32(i32::MIN), ProviderType::Integer, oid::INT4),
        (Value::Int64(i64::MAX), ProviderType::Bigint, oid::INT8),
        (Value::Int64(i64::MIN), ProviderType::Bigint, oid::INT8),
    ];
    for (value, pt, type_oid) in cases {
        let mut out = WriteBuffer::new();
        registry.write_param(&value, pt, &mut out).unwrap();
        let mut input = ReadBuffer::from_slice(out.as_slice());
        let len = input.read_i32_be().unwrap();
        let read = registry
            .read_field(&mut input, len, &FieldDescriptor::new(type_oid))
            .unwrap();
        assert_eq!(read, value);
    }
}
