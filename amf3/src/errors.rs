use std::{io, string};
use thiserror::Error;

/// An enumeration defining all the possible errors that could occur while deserializing
/// AMF3 encoded bytes.
#[derive(Debug, Error)]
pub enum Amf3DeserializationError {
    /// The marker byte at the start of a value does not correspond to a type this crate can
    /// decode.  Reserved markers (vectors, dictionaries, xml) land here as well.
    #[error("Encountered unknown marker 0x{marker:02x}")]
    UnknownMarker { marker: u8 },

    /// Objects must begin with the dynamic object marker (0x0b)
    #[error("Expected dynamic object marker 0x0b but found 0x{marker:02x}")]
    MissingDynamicMarker { marker: u8 },

    /// The object traits describe a typed, sealed or externalizable object.  Only anonymous
    /// dynamic objects are supported.
    #[error("Object traits 0x{traits:x} do not describe a dynamic object")]
    UnsupportedTraits { traits: u32 },

    /// The date's millisecond value cannot be represented as a system time
    #[error("Date value of {millis} milliseconds since epoch is out of range")]
    DateOutOfRange { millis: f64 },

    /// Arrays and objects were nested deeper than the deserializer allows
    #[error("Values were nested more than {limit} levels deep")]
    NestingTooDeep { limit: usize },

    #[error("String contained invalid utf-8: {0}")]
    FromUtf8Error(#[from] string::FromUtf8Error),

    /// An I/O error occurred while reading the input buffer.  Truncated input surfaces as
    /// `io::ErrorKind::UnexpectedEof`.
    #[error("{0}")]
    Io(#[from] io::Error),
}
