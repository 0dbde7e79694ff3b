//! Binary value-exchange format
//!
//! A value is a one-byte [`WireTag`] followed by a tag-specific payload. All
//! multi-byte integers are fixed-width little-endian. There is no envelope:
//! the length of the buffer handed over by the evaluator is the only bound.
//!
//! | Tag  | Payload                                                    |
//! |------|------------------------------------------------------------|
//! | 0x00 | none                                                       |
//! | 0x01 | 1 byte, zero is false                                      |
//! | 0x02 | i64                                                        |
//! | 0x03 | f64                                                        |
//! | 0x04 | u32 length, UTF-8 bytes                                    |
//! | 0x05 | u32 count, values                                          |
//! | 0x06 | u32 count, then per field: u32 length, key bytes, value    |
//! | 0x07 | u32 length, tag bytes, has-arg byte, optional value        |

mod decoder;
mod encoder;

pub use decoder::{decode, decode_with, DecodeOptions, Decoder, TrailingBytes};
pub use encoder::{encode, encode_into, encode_number, Encoder};

/// Width of every length and count field
pub const LEN_WIDTH: usize = 4;

/// Width of the `Int` and `Float` payloads
pub const NUM_WIDTH: usize = 8;

/// One-byte discriminator preceding every encoded value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireTag {
    Null = 0x00,
    Bool = 0x01,
    Int = 0x02,
    Float = 0x03,
    Str = 0x04,
    Array = 0x05,
    Record = 0x06,
    Enum = 0x07,
}

impl WireTag {
    pub fn from_byte(byte: u8) -> Option<Self> {
        Some(match byte {
            0x00 => WireTag::Null,
            0x01 => WireTag::Bool,
            0x02 => WireTag::Int,
            0x03 => WireTag::Float,
            0x04 => WireTag::Str,
            0x05 => WireTag::Array,
            0x06 => WireTag::Record,
            0x07 => WireTag::Enum,
            _ => return None,
        })
    }

    pub fn as_byte(self) -> u8 {
        self as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_bytes_round_trip() {
        for byte in 0x00..=0x07u8 {
            let tag = WireTag::from_byte(byte).unwrap();
            assert_eq!(tag.as_byte(), byte);
        }
        assert_eq!(WireTag::from_byte(0x08), None);
        assert_eq!(WireTag::from_byte(0xff), None);
    }
}
