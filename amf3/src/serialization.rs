//! Module contains functionality for serializing values into
//! bytes based on the AMF3 specification
//! (https://www.adobe.com/content/dam/acom/en/devnet/pdf/amf-file-format-spec.pdf)

use crate::markers;
use crate::references::{InlineOnly, ReferenceTable};
use crate::u29::write_u29;
use crate::{Amf3Value, MAX_INTEGER, MIN_INTEGER};
use byteorder::{BigEndian, ByteOrder};
use indexmap::IndexMap;
use std::time::{SystemTime, UNIX_EPOCH};

/// Serializes a value into an amf3 encoded vector of bytes
pub fn serialize(value: &Amf3Value) -> Vec<u8> {
    let mut references = InlineOnly;
    serialize_with_references(value, &mut references)
}

/// Serializes each value in order into a single amf3 encoded vector of bytes
pub fn serialize_all(values: &[Amf3Value]) -> Vec<u8> {
    let mut references = InlineOnly;
    let mut bytes = vec![];
    for value in values {
        serialize_value(value, &mut bytes, &mut references);
    }

    bytes
}

/// Serializes a value, writing back references for anything the table has already seen
pub fn serialize_with_references<T: ReferenceTable>(
    value: &Amf3Value,
    references: &mut T,
) -> Vec<u8> {
    let mut bytes = vec![];
    serialize_value(value, &mut bytes, references);
    bytes
}

fn serialize_value<T: ReferenceTable>(value: &Amf3Value, bytes: &mut Vec<u8>, references: &mut T) {
    match *value {
        Amf3Value::Null => serialize_null(bytes),
        Amf3Value::Boolean(val) => serialize_bool(val, bytes),
        Amf3Value::Integer(val) => serialize_integer(val, bytes),
        Amf3Value::Double(val) => serialize_double(val, bytes),
        Amf3Value::Utf8String(ref val) => serialize_string(val, bytes, references),
        Amf3Value::Date(val) => serialize_date(value, val, bytes, references),
        Amf3Value::Array(ref val) => serialize_array(value, val, bytes, references),
        Amf3Value::Object(ref val) => serialize_object(val, bytes, references),
        Amf3Value::ByteArray(ref val) => serialize_byte_array(value, val, bytes, references),
    }
}

fn serialize_null(bytes: &mut Vec<u8>) {
    bytes.push(markers::NULL_MARKER);
}

fn serialize_bool(value: bool, bytes: &mut Vec<u8>) {
    if value {
        bytes.push(markers::TRUE_MARKER);
    } else {
        bytes.push(markers::FALSE_MARKER);
    }
}

fn serialize_integer(value: i32, bytes: &mut Vec<u8>) {
    if value < MIN_INTEGER || value > MAX_INTEGER {
        serialize_double(f64::from(value), bytes);
        return;
    }

    bytes.push(markers::INTEGER_MARKER);
    write_u29(value as u32, bytes);
}

fn serialize_double(value: f64, bytes: &mut Vec<u8>) {
    bytes.push(markers::DOUBLE_MARKER);
    write_f64(value, bytes);
}

fn serialize_string<T: ReferenceTable>(value: &str, bytes: &mut Vec<u8>, references: &mut T) {
    // Empty strings are written as a lone empty string marker, without the string marker
    if value.is_empty() {
        bytes.push(markers::UTF_8_EMPTY_MARKER);
        return;
    }

    bytes.push(markers::STRING_MARKER);
    write_string_body(value, bytes, references);
}

fn serialize_date<T: ReferenceTable>(
    value: &Amf3Value,
    time: SystemTime,
    bytes: &mut Vec<u8>,
    references: &mut T,
) {
    if write_complex_reference(value, markers::DATE_MARKER, bytes, references) {
        return;
    }

    bytes.push(markers::DATE_MARKER);
    write_u29(1, bytes);
    write_f64(millis_since_epoch(time), bytes);

    references.record_complex(value);
}

fn serialize_array<T: ReferenceTable>(
    value: &Amf3Value,
    array: &[Amf3Value],
    bytes: &mut Vec<u8>,
    references: &mut T,
) {
    if write_complex_reference(value, markers::ARRAY_MARKER, bytes, references) {
        return;
    }

    bytes.push(markers::ARRAY_MARKER);
    write_u29(((array.len() as u32) << 1) | 1, bytes);

    // No associative values
    bytes.push(markers::UTF_8_EMPTY_MARKER);

    for element in array {
        serialize_value(element, bytes, references);
    }

    references.record_complex(value);
}

fn serialize_object<T: ReferenceTable>(
    properties: &IndexMap<String, Amf3Value>,
    bytes: &mut Vec<u8>,
    references: &mut T,
) {
    bytes.push(markers::OBJECT_MARKER);
    bytes.push(markers::DYNAMIC_OBJECT_MARKER);

    // Anonymous class name
    bytes.push(markers::UTF_8_EMPTY_MARKER);

    for (name, value) in properties {
        write_string_body(name, bytes, references);
        serialize_value(value, bytes, references);
    }

    bytes.push(markers::UTF_8_EMPTY_MARKER);
}

fn serialize_byte_array<T: ReferenceTable>(
    value: &Amf3Value,
    data: &[u8],
    bytes: &mut Vec<u8>,
    references: &mut T,
) {
    if write_complex_reference(value, markers::BYTE_ARRAY_MARKER, bytes, references) {
        return;
    }

    bytes.push(markers::BYTE_ARRAY_MARKER);
    write_u29(((data.len() as u32) << 1) | 1, bytes);
    bytes.extend_from_slice(data);

    references.record_complex(value);
}

/// Writes the length prefixed string (or its reference) without any marker
fn write_string_body<T: ReferenceTable>(value: &str, bytes: &mut Vec<u8>, references: &mut T) {
    if !value.is_empty() {
        if let Some(index) = references.string_index(value) {
            write_u29(index << 1, bytes);
            return;
        }
    }

    write_u29(((value.len() as u32) << 1) | 1, bytes);
    bytes.extend_from_slice(value.as_bytes());

    if !value.is_empty() {
        references.record_string(value);
    }
}

fn write_complex_reference<T: ReferenceTable>(
    value: &Amf3Value,
    marker: u8,
    bytes: &mut Vec<u8>,
    references: &mut T,
) -> bool {
    match references.complex_index(value) {
        Some(index) => {
            bytes.push(marker);
            write_u29(index << 1, bytes);
            true
        }

        None => false,
    }
}

fn write_f64(value: f64, bytes: &mut Vec<u8>) {
    let mut buffer = [0_u8; 8];
    BigEndian::write_f64(&mut buffer, value);
    bytes.extend_from_slice(&buffer);
}

/// Whole milliseconds since the unix epoch, truncated toward zero
fn millis_since_epoch(time: SystemTime) -> f64 {
    let millis = match time.duration_since(UNIX_EPOCH) {
        Ok(elapsed) => (elapsed.as_nanos() / 1_000_000) as i128,
        Err(err) => -((err.duration().as_nanos() / 1_000_000) as i128),
    };

    millis as f64
}
