//! This crate provides functionality for serializing and deserializing data
//! based on the Adobe AMF3 encoding specification located at
//! <https://www.adobe.com/content/dam/acom/en/devnet/pdf/amf-file-format-spec.pdf>
//!
//! Only the inline forms are produced by default: strings, dates, arrays and byte arrays are
//! never replaced by back references unless a [`ReferenceTable`] that tracks them is supplied.
//! Objects must be anonymous dynamic objects, and the vector, dictionary and xml types are not
//! supported.
//!
//! # Examples
//! ```
//! use std::io::Cursor;
//! use indexmap::IndexMap;
//! use rml_amf3::{Amf3Value, serialize, deserialize};
//!
//! // Put some data into the Amf3Value types
//! let mut properties = IndexMap::new();
//! properties.insert("app".to_string(), Amf3Value::Integer(99));
//! properties.insert("second".to_string(), Amf3Value::Utf8String("test".to_string()));
//! properties.insert("ratio".to_string(), Amf3Value::Double(0.5));
//!
//! let input = Amf3Value::Array(vec![
//!     Amf3Value::Boolean(true),
//!     Amf3Value::Object(properties),
//! ]);
//!
//! // Serialize the value into a vector of bytes
//! let serialized_data = serialize(&input);
//!
//! // Deserialize the vector of bytes back into an Amf3Value
//! let mut serialized_cursor = Cursor::new(serialized_data);
//! let result = deserialize(&mut serialized_cursor).unwrap();
//!
//! assert_eq!(input, result);
//! ```

mod deserialization;
mod errors;
mod references;
mod serialization;
pub mod u29;

pub use deserialization::{
    deserialize, deserialize_all, deserialize_with_references, Amf3Deserializer,
    DEFAULT_MAX_DEPTH,
};
pub use errors::Amf3DeserializationError;
pub use references::{InlineOnly, ReferenceTable};
pub use serialization::{serialize, serialize_all, serialize_with_references};

use bytes::Bytes;
use indexmap::IndexMap;
use std::time::SystemTime;

/// Smallest integer that can be sent with the AMF3 integer type
pub const MIN_INTEGER: i32 = -(1 << 28);

/// Largest integer that can be sent with the AMF3 integer type
pub const MAX_INTEGER: i32 = (1 << 28) - 1;

/// An Enum representing the different supported types of Amf3 values
#[derive(PartialEq, Debug, Clone)]
pub enum Amf3Value {
    Null,
    Boolean(bool),

    /// Integers outside of `MIN_INTEGER..=MAX_INTEGER` are serialized as doubles
    Integer(i32),
    Double(f64),
    Utf8String(String),

    /// Sent over the wire with millisecond precision
    Date(SystemTime),

    /// Only the dense portion of an AMF3 array is represented
    Array(Vec<Amf3Value>),

    /// An anonymous dynamic object.  Properties are serialized in insertion order.
    Object(IndexMap<String, Amf3Value>),
    ByteArray(Bytes),
}

impl Amf3Value {
    pub fn get_integer(self) -> Option<i32> {
        match self {
            Amf3Value::Integer(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the numeric value of either an integer or a double
    pub fn get_number(self) -> Option<f64> {
        match self {
            Amf3Value::Integer(value) => Some(f64::from(value)),
            Amf3Value::Double(value) => Some(value),
            _ => None,
        }
    }

    pub fn get_boolean(self) -> Option<bool> {
        match self {
            Amf3Value::Boolean(value) => Some(value),
            _ => None,
        }
    }

    pub fn get_string(self) -> Option<String> {
        match self {
            Amf3Value::Utf8String(value) => Some(value),
            _ => None,
        }
    }

    pub fn get_date(self) -> Option<SystemTime> {
        match self {
            Amf3Value::Date(value) => Some(value),
            _ => None,
        }
    }

    pub fn get_array(self) -> Option<Vec<Amf3Value>> {
        match self {
            Amf3Value::Array(values) => Some(values),
            _ => None,
        }
    }

    pub fn get_object_properties(self) -> Option<IndexMap<String, Amf3Value>> {
        match self {
            Amf3Value::Object(properties) => Some(properties),
            _ => None,
        }
    }

    pub fn get_byte_array(self) -> Option<Bytes> {
        match self {
            Amf3Value::ByteArray(bytes) => Some(bytes),
            _ => None,
        }
    }
}

impl From<bool> for Amf3Value {
    fn from(value: bool) -> Self {
        Amf3Value::Boolean(value)
    }
}

impl From<i32> for Amf3Value {
    fn from(value: i32) -> Self {
        Amf3Value::Integer(value)
    }
}

impl From<f64> for Amf3Value {
    fn from(value: f64) -> Self {
        Amf3Value::Double(value)
    }
}

impl From<&str> for Amf3Value {
    fn from(value: &str) -> Self {
        Amf3Value::Utf8String(value.to_string())
    }
}

impl From<String> for Amf3Value {
    fn from(value: String) -> Self {
        Amf3Value::Utf8String(value)
    }
}

impl From<SystemTime> for Amf3Value {
    fn from(value: SystemTime) -> Self {
        Amf3Value::Date(value)
    }
}

impl From<Bytes> for Amf3Value {
    fn from(value: Bytes) -> Self {
        Amf3Value::ByteArray(value)
    }
}

impl From<Vec<Amf3Value>> for Amf3Value {
    fn from(values: Vec<Amf3Value>) -> Self {
        Amf3Value::Array(values)
    }
}

impl From<IndexMap<String, Amf3Value>> for Amf3Value {
    fn from(properties: IndexMap<String, Amf3Value>) -> Self {
        Amf3Value::Object(properties)
    }
}

impl<T: Into<Amf3Value>> From<Option<T>> for Amf3Value {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => value.into(),
            None => Amf3Value::Null,
        }
    }
}

mod markers {
    pub const NULL_MARKER: u8 = 0x01;
    pub const FALSE_MARKER: u8 = 0x02;
    pub const TRUE_MARKER: u8 = 0x03;
    pub const INTEGER_MARKER: u8 = 0x04;
    pub const DOUBLE_MARKER: u8 = 0x05;
    pub const STRING_MARKER: u8 = 0x06;
    pub const DATE_MARKER: u8 = 0x08;
    pub const ARRAY_MARKER: u8 = 0x09;
    pub const OBJECT_MARKER: u8 = 0x0a;
    pub const DYNAMIC_OBJECT_MARKER: u8 = 0x0b;
    pub const BYTE_ARRAY_MARKER: u8 = 0x0c;

    /// An inline string of length zero, which also terminates property lists
    pub const UTF_8_EMPTY_MARKER: u8 = 0x01;
}
