//! Variable length unsigned 29-bit integers (U29), used by AMF3 for integer values and for
//! every length, reference index and flag header.
//!
//! The first three bytes each carry 7 bits of payload with the high bit marking that another
//! byte follows.  A fourth byte, if reached, carries a full 8 bits and always ends the value,
//! so a U29 never spans more than 4 bytes.

use crate::errors::Amf3DeserializationError;
use byteorder::ReadBytesExt;
use std::io::Read;

/// Largest value representable in a U29
pub const U29_MAX: u32 = 0x1FFF_FFFF;

/// Reads a U29 from the byte stream, returning the value along with how many bytes it occupied
pub fn read_u29<R: Read>(bytes: &mut R) -> Result<(u32, usize), Amf3DeserializationError> {
    let mut value: u32 = 0;
    let mut consumed = 0;

    while consumed < 3 {
        let byte = bytes.read_u8()?;
        consumed += 1;

        value = (value << 7) | u32::from(byte & 0x7F);
        if byte & 0x80 == 0 {
            return Ok((value, consumed));
        }
    }

    let byte = bytes.read_u8()?;
    value = (value << 8) | u32::from(byte);

    Ok((value, 4))
}

/// Appends the U29 encoding of `value` to the byte buffer.  Bits above the 29th are discarded.
pub fn write_u29(value: u32, bytes: &mut Vec<u8>) {
    let value = value & U29_MAX;

    if value <= 0x7F {
        bytes.push(value as u8);
    } else if value <= 0x3FFF {
        bytes.push(((value >> 7) | 0x80) as u8);
        bytes.push((value & 0x7F) as u8);
    } else if value <= 0x1F_FFFF {
        bytes.push(((value >> 14) | 0x80) as u8);
        bytes.push((((value >> 7) & 0x7F) | 0x80) as u8);
        bytes.push((value & 0x7F) as u8);
    } else {
        bytes.push(((value >> 22) | 0x80) as u8);
        bytes.push((((value >> 15) & 0x7F) | 0x80) as u8);
        bytes.push((((value >> 8) & 0x7F) | 0x80) as u8);
        bytes.push((value & 0xFF) as u8);
    }
}
