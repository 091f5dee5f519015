//! AMF3 allows strings and complex values that were already sent to be replaced by an index
//! into a table of previously seen values.  The serializer and deserializer consult a
//! `ReferenceTable` whenever they reach a header that could carry such an index.

use crate::Amf3Value;

/// Lookup and bookkeeping for AMF3 back references.
///
/// Every method has a default that declines to resolve or record anything, which makes every
/// string and complex value travel inline.  Dates, arrays and byte arrays share the complex
/// value table; objects are always written inline.
///
/// Arrays are recorded after their elements rather than before them, so the complex value
/// indices a tracking table hands out do not line up with those of other AMF3 producers.
pub trait ReferenceTable {
    /// Index of a string previously recorded while serializing
    fn string_index(&self, _value: &str) -> Option<u32> {
        None
    }

    /// String previously recorded at `index` while deserializing
    fn string_at(&self, _index: u32) -> Option<String> {
        None
    }

    /// Called after a non-empty string was read or written inline
    fn record_string(&mut self, _value: &str) {}

    /// Index of a complex value previously recorded while serializing
    fn complex_index(&self, _value: &Amf3Value) -> Option<u32> {
        None
    }

    /// Complex value previously recorded at `index` while deserializing
    fn complex_at(&self, _index: u32) -> Option<Amf3Value> {
        None
    }

    /// Called after a date, array or byte array was read or written inline
    fn record_complex(&mut self, _value: &Amf3Value) {}
}

/// Reference table that never produces references, so every value is encoded inline and every
/// reference flag on the wire is read as if it marked an inline value.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineOnly;

impl ReferenceTable for InlineOnly {}
