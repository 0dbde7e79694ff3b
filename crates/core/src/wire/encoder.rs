//! Reference encoder for the wire format
//!
//! The evaluator owns encoding in production; this is the contract it has to
//! meet, and what fixtures and the test harness are built with.

use super::WireTag;
use crate::errors::{Error, ProtocolViolation, Result};
use crate::value::Value;

/// Streaming encoder over an owned byte buffer
#[derive(Debug, Default)]
pub struct Encoder {
    buf: Vec<u8>,
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue writing at the end of an existing buffer
    pub fn with_buffer(buf: Vec<u8>) -> Self {
        Self { buf }
    }

    pub fn value(&mut self, value: &Value) -> Result<&mut Self> {
        match value {
            Value::Null => self.tag(WireTag::Null),
            Value::Bool(b) => {
                self.tag(WireTag::Bool);
                self.buf.push(u8::from(*b));
            }
            Value::Int(i) => {
                self.tag(WireTag::Int);
                self.buf.extend_from_slice(&i.to_le_bytes());
            }
            Value::Float(f) => {
                self.tag(WireTag::Float);
                self.buf.extend_from_slice(&f.to_le_bytes());
            }
            Value::Str(s) => {
                self.tag(WireTag::Str);
                self.bytes("string", s.as_bytes())?;
            }
            Value::Array(items) => {
                self.tag(WireTag::Array);
                self.len("array", items.len())?;
                for item in items {
                    self.value(item)?;
                }
            }
            Value::Record(fields) => {
                self.tag(WireTag::Record);
                self.len("record", fields.len())?;
                for (key, field) in fields {
                    self.bytes("record key", key.as_bytes())?;
                    self.value(field)?;
                }
            }
            Value::Enum { tag, arg } => {
                self.tag(WireTag::Enum);
                self.bytes("enum tag", tag.as_bytes())?;
                match arg {
                    None => self.buf.push(0),
                    Some(arg) => {
                        self.buf.push(1);
                        self.value(arg)?;
                    }
                }
            }
        }
        Ok(self)
    }

    /// Write a number from a language with a single numeric type, committing
    /// it to `Int` when it is whole and fits, `Float` otherwise
    pub fn number(&mut self, n: f64) -> &mut Self {
        match Value::number(n) {
            Value::Int(i) => {
                self.tag(WireTag::Int);
                self.buf.extend_from_slice(&i.to_le_bytes());
            }
            _ => {
                self.tag(WireTag::Float);
                self.buf.extend_from_slice(&n.to_le_bytes());
            }
        }
        self
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }

    fn tag(&mut self, tag: WireTag) {
        self.buf.push(tag.as_byte());
    }

    fn len(&mut self, what: &'static str, len: usize) -> Result<()> {
        let len32 = u32::try_from(len).map_err(|_| {
            Error::protocol(self.buf.len(), ProtocolViolation::LengthOverflow { what, len })
        })?;
        self.buf.extend_from_slice(&len32.to_le_bytes());
        Ok(())
    }

    fn bytes(&mut self, what: &'static str, bytes: &[u8]) -> Result<()> {
        self.len(what, bytes.len())?;
        self.buf.extend_from_slice(bytes);
        Ok(())
    }
}

/// Encode a value into a fresh buffer
pub fn encode(value: &Value) -> Result<Vec<u8>> {
    let mut encoder = Encoder::new();
    encoder.value(value)?;
    Ok(encoder.finish())
}

/// Append the encoding of a value to `buf`
pub fn encode_into(value: &Value, buf: &mut Vec<u8>) -> Result<()> {
    let mut encoder = Encoder::with_buffer(std::mem::take(buf));
    let result = encoder.value(value).map(|_| ());
    *buf = encoder.finish();
    result
}

/// Encode a single number with int/float bucketing applied
pub fn encode_number(n: f64) -> Vec<u8> {
    let mut encoder = Encoder::new();
    encoder.number(n);
    encoder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(42.0, WireTag::Int)]
    #[case(-42.0, WireTag::Int)]
    #[case(0.0, WireTag::Int)]
    #[case(1e12, WireTag::Int)]
    #[case(42.5, WireTag::Float)]
    #[case(-2.718, WireTag::Float)]
    #[case(9.3e18, WireTag::Float)]
    #[case(f64::INFINITY, WireTag::Float)]
    #[case(f64::NAN, WireTag::Float)]
    fn test_number_bucketing(#[case] n: f64, #[case] expected: WireTag) {
        let bytes = encode_number(n);
        assert_eq!(bytes.len(), 9);
        assert_eq!(bytes[0], expected.as_byte());
    }

    #[test]
    fn test_whole_numbers_encode_identically() {
        let from_int = encode_number(42.0);
        let from_whole_float = encode_number(42.0_f64.floor());
        assert_eq!(from_int, from_whole_float);
        assert_eq!(i64::from_le_bytes(from_int[1..9].try_into().unwrap()), 42);
    }

    #[test]
    fn test_fractional_payload_is_preserved() {
        let bytes = encode_number(42.5);
        assert_eq!(f64::from_le_bytes(bytes[1..9].try_into().unwrap()), 42.5);
    }

    #[test]
    fn test_enum_layout() {
        let bytes = encode(&Value::variant("Some", Value::Int(42))).unwrap();
        assert_eq!(bytes[0], WireTag::Enum.as_byte());
        assert_eq!(u32::from_le_bytes(bytes[1..5].try_into().unwrap()), 4);
        assert_eq!(&bytes[5..9], b"Some");
        assert_eq!(bytes[9], 1);
        assert_eq!(bytes[10], WireTag::Int.as_byte());
        assert_eq!(bytes.len(), 19);

        let bytes = encode(&Value::tag("Foo")).unwrap();
        assert_eq!(bytes, [0x07, 3, 0, 0, 0, b'F', b'o', b'o', 0]);
    }

    #[test]
    fn test_record_layout() {
        let bytes = encode(&Value::record([("x", Value::Bool(true))])).unwrap();
        assert_eq!(bytes, [0x06, 1, 0, 0, 0, 1, 0, 0, 0, b'x', 0x01, 1]);
    }

    #[test]
    fn test_encode_into_appends() {
        let mut buf = vec![0xaa];
        encode_into(&Value::Null, &mut buf).unwrap();
        assert_eq!(buf, [0xaa, 0x00]);
    }
}
