//! This module contains functionality to deserialize values from bytes
//! that were encoded via the AMF3 specification
//! (https://www.adobe.com/content/dam/acom/en/devnet/pdf/amf-file-format-spec.pdf)

use crate::errors::Amf3DeserializationError;
use crate::markers;
use crate::references::{InlineOnly, ReferenceTable};
use crate::u29::read_u29;
use crate::Amf3Value;
use byteorder::{BigEndian, ReadBytesExt};
use bytes::Bytes;
use indexmap::IndexMap;
use std::io::{self, BufRead, Read};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, trace};

/// How many arrays and objects may be nested inside each other before deserialization is
/// aborted
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Reads exactly one AMF3 value from the byte stream.  Any bytes after the value are left
/// unread.
pub fn deserialize<R: BufRead>(bytes: &mut R) -> Result<Amf3Value, Amf3DeserializationError> {
    let mut references = InlineOnly;
    Amf3Deserializer::new(bytes, &mut references).read_value()
}

/// Reads AMF3 values one after another until the byte stream is exhausted
pub fn deserialize_all<R: BufRead>(
    bytes: &mut R,
) -> Result<Vec<Amf3Value>, Amf3DeserializationError> {
    let mut references = InlineOnly;
    Amf3Deserializer::new(bytes, &mut references).read_all()
}

/// Reads exactly one AMF3 value, resolving back references through the provided table
pub fn deserialize_with_references<R: BufRead, T: ReferenceTable>(
    bytes: &mut R,
    references: &mut T,
) -> Result<Amf3Value, Amf3DeserializationError> {
    Amf3Deserializer::new(bytes, references).read_value()
}

/// Decodes AMF3 values from a byte stream.  Each value is decoded all or nothing; an error
/// leaves the stream positioned somewhere inside the failed value.
pub struct Amf3Deserializer<'a, R, T> {
    bytes: &'a mut R,
    references: &'a mut T,
    max_depth: usize,
    depth: usize,
}

impl<'a, R: BufRead, T: ReferenceTable> Amf3Deserializer<'a, R, T> {
    pub fn new(bytes: &'a mut R, references: &'a mut T) -> Self {
        Amf3Deserializer {
            bytes,
            references,
            max_depth: DEFAULT_MAX_DEPTH,
            depth: 0,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Reads values until the byte stream has no more data
    pub fn read_all(&mut self) -> Result<Vec<Amf3Value>, Amf3DeserializationError> {
        let mut results = vec![];
        while !self.bytes.fill_buf()?.is_empty() {
            results.push(self.read_value()?);
        }

        Ok(results)
    }

    pub fn read_value(&mut self) -> Result<Amf3Value, Amf3DeserializationError> {
        let marker = self.bytes.read_u8()?;

        match marker {
            markers::NULL_MARKER => Ok(Amf3Value::Null),
            markers::FALSE_MARKER => Ok(Amf3Value::Boolean(false)),
            markers::TRUE_MARKER => Ok(Amf3Value::Boolean(true)),
            markers::INTEGER_MARKER => self.parse_integer(),
            markers::DOUBLE_MARKER => self.parse_double(),
            markers::STRING_MARKER => self.parse_string(),
            markers::DATE_MARKER => self.parse_date(),
            markers::ARRAY_MARKER => self.parse_array(),
            markers::OBJECT_MARKER => self.parse_object(),
            markers::BYTE_ARRAY_MARKER => self.parse_byte_array(),
            _ => {
                debug!(marker, "Unknown AMF3 marker encountered");
                Err(Amf3DeserializationError::UnknownMarker { marker })
            }
        }
    }

    fn parse_integer(&mut self) -> Result<Amf3Value, Amf3DeserializationError> {
        let (value, _) = read_u29(self.bytes)?;
        Ok(Amf3Value::Integer(sign_extend(value)))
    }

    fn parse_double(&mut self) -> Result<Amf3Value, Amf3DeserializationError> {
        let number = self.bytes.read_f64::<BigEndian>()?;
        Ok(Amf3Value::Double(number))
    }

    fn parse_string(&mut self) -> Result<Amf3Value, Amf3DeserializationError> {
        let value = self.read_string_body()?;
        Ok(Amf3Value::Utf8String(value))
    }

    fn parse_date(&mut self) -> Result<Amf3Value, Amf3DeserializationError> {
        let (header, _) = read_u29(self.bytes)?;
        if let Some(value) = self.referenced_complex(header) {
            return Ok(value);
        }

        let millis = self.bytes.read_f64::<BigEndian>()?;
        let value = Amf3Value::Date(time_from_millis(millis)?);

        self.references.record_complex(&value);
        Ok(value)
    }

    fn parse_array(&mut self) -> Result<Amf3Value, Amf3DeserializationError> {
        let (header, _) = read_u29(self.bytes)?;
        if let Some(value) = self.referenced_complex(header) {
            return Ok(value);
        }

        let dense_count = header >> 1;
        trace!(dense_count, "Reading AMF3 array");

        let value = self.nested(|deserializer| deserializer.read_array_elements(dense_count))?;
        self.references.record_complex(&value);
        Ok(value)
    }

    fn read_array_elements(
        &mut self,
        dense_count: u32,
    ) -> Result<Amf3Value, Amf3DeserializationError> {
        let mut values = Vec::new();

        // One more element than the dense count is read unless the first byte is the empty
        // associative portion, which takes the place of that extra element.
        for index in 0..=dense_count {
            if index == 0 && self.skip_empty_associative_portion()? {
                continue;
            }

            values.push(self.read_value()?);
        }

        Ok(Amf3Value::Array(values))
    }

    fn skip_empty_associative_portion(&mut self) -> Result<bool, Amf3DeserializationError> {
        let next = self.bytes.fill_buf()?.first().copied();

        match next {
            Some(markers::UTF_8_EMPTY_MARKER) => {
                self.bytes.consume(1);
                Ok(true)
            }

            Some(_) => Ok(false),
            None => Err(io::Error::from(io::ErrorKind::UnexpectedEof).into()),
        }
    }

    fn parse_object(&mut self) -> Result<Amf3Value, Amf3DeserializationError> {
        let marker = self.bytes.read_u8()?;
        if marker != markers::DYNAMIC_OBJECT_MARKER {
            debug!(marker, "AMF3 object did not start with the dynamic object marker");
            return Err(Amf3DeserializationError::MissingDynamicMarker { marker });
        }

        let (traits, _) = read_u29(self.bytes)?;
        if traits & 0x03 != 1 {
            debug!(traits, "AMF3 object traits are not for a dynamic object");
            return Err(Amf3DeserializationError::UnsupportedTraits { traits });
        }

        self.nested(|deserializer| deserializer.read_object_properties())
    }

    fn read_object_properties(&mut self) -> Result<Amf3Value, Amf3DeserializationError> {
        let mut properties = IndexMap::new();

        loop {
            let name = self.read_string_body()?;
            if name.is_empty() {
                break;
            }

            let value = self.read_value()?;
            properties.insert(name, value);
        }

        Ok(Amf3Value::Object(properties))
    }

    fn parse_byte_array(&mut self) -> Result<Amf3Value, Amf3DeserializationError> {
        let (header, _) = read_u29(self.bytes)?;
        if let Some(value) = self.referenced_complex(header) {
            return Ok(value);
        }

        let buffer = self.read_exact_bytes(header >> 1)?;
        let value = Amf3Value::ByteArray(Bytes::from(buffer));

        self.references.record_complex(&value);
        Ok(value)
    }

    /// Reads a length prefixed string without a marker, as used by string values and by
    /// object property names
    fn read_string_body(&mut self) -> Result<String, Amf3DeserializationError> {
        let (header, _) = read_u29(self.bytes)?;
        if header & 1 == 0 {
            if let Some(value) = self.references.string_at(header >> 1) {
                return Ok(value);
            }
        }

        let length = header >> 1;
        if length == 0 {
            return Ok(String::new());
        }

        let buffer = self.read_exact_bytes(length)?;
        let value = String::from_utf8(buffer)?;

        self.references.record_string(&value);
        Ok(value)
    }

    fn read_exact_bytes(&mut self, length: u32) -> Result<Vec<u8>, Amf3DeserializationError> {
        // Lengths come from the wire, so the buffer grows with the data actually present
        // rather than being allocated up front.
        let mut buffer = Vec::new();
        (&mut *self.bytes)
            .take(u64::from(length))
            .read_to_end(&mut buffer)?;

        if buffer.len() < length as usize {
            return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
        }

        Ok(buffer)
    }

    fn referenced_complex(&self, header: u32) -> Option<Amf3Value> {
        if header & 1 == 0 {
            self.references.complex_at(header >> 1)
        } else {
            None
        }
    }

    fn nested<F>(&mut self, parse: F) -> Result<Amf3Value, Amf3DeserializationError>
    where
        F: FnOnce(&mut Self) -> Result<Amf3Value, Amf3DeserializationError>,
    {
        if self.depth >= self.max_depth {
            debug!(limit = self.max_depth, "AMF3 values nested too deeply");
            return Err(Amf3DeserializationError::NestingTooDeep {
                limit: self.max_depth,
            });
        }

        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;

        result
    }
}

/// Bit 28 is the sign bit of a 29-bit two's complement integer
fn sign_extend(value: u32) -> i32 {
    if value & 0x1000_0000 != 0 {
        (value | 0xE000_0000) as i32
    } else {
        value as i32
    }
}

fn time_from_millis(millis: f64) -> Result<SystemTime, Amf3DeserializationError> {
    // `as` saturates, so anything outside i64 has to be rejected before the cast
    if !millis.is_finite() || millis >= i64::MAX as f64 || millis < i64::MIN as f64 {
        debug!(millis, "AMF3 date is not a representable millisecond count");
        return Err(Amf3DeserializationError::DateOutOfRange { millis });
    }

    let whole_millis = millis as i64;
    let offset = Duration::from_millis(whole_millis.unsigned_abs());

    let time = if whole_millis >= 0 {
        UNIX_EPOCH.checked_add(offset)
    } else {
        UNIX_EPOCH.checked_sub(offset)
    };

    time.ok_or(Amf3DeserializationError::DateOutOfRange { millis })
}
