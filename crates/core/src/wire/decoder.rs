//! Recursive-descent reader turning a wire buffer into a [`Value`]

use super::{WireTag, LEN_WIDTH};
use crate::constants::DEFAULT_MAX_DEPTH;
use crate::errors::{Error, ProtocolViolation, Result};
use crate::value::{Record, Value};
use serde::{Deserialize, Serialize};

/// What to do with bytes left over after the root value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrailingBytes {
    /// Fail with a protocol error
    #[default]
    Reject,
    /// Log a warning and return the decoded value
    Warn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Maximum number of nested arrays, records and enum payloads
    pub max_depth: usize,
    pub trailing_bytes: TrailingBytes,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            trailing_bytes: TrailingBytes::default(),
        }
    }
}

/// Single-pass cursor over an encoded buffer
///
/// Reads left to right from offset 0 and never backtracks. Strings are copied
/// out, so the returned tree does not borrow from `bytes`.
pub struct Decoder<'a> {
    bytes: &'a [u8],
    pos: usize,
    depth: usize,
    options: DecodeOptions,
}

impl<'a> Decoder<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self::with_options(bytes, DecodeOptions::default())
    }

    pub fn with_options(bytes: &'a [u8], options: DecodeOptions) -> Self {
        Self {
            bytes,
            pos: 0,
            depth: 0,
            options,
        }
    }

    /// Current byte offset
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    /// Read one complete value starting at the current offset
    pub fn read_value(&mut self) -> Result<Value> {
        let tag_offset = self.pos;
        let byte = self.read_u8()?;
        let tag = WireTag::from_byte(byte)
            .ok_or_else(|| Error::protocol(tag_offset, ProtocolViolation::UnknownTag(byte)))?;

        match tag {
            WireTag::Null => Ok(Value::Null),
            WireTag::Bool => Ok(Value::Bool(self.read_u8()? != 0)),
            WireTag::Int => Ok(Value::Int(i64::from_le_bytes(self.read_array()?))),
            WireTag::Float => Ok(Value::Float(f64::from_le_bytes(self.read_array()?))),
            WireTag::Str => Ok(Value::Str(self.read_string("string")?)),
            WireTag::Array => self.nested(Self::read_array_items),
            WireTag::Record => self.nested(Self::read_record_fields),
            WireTag::Enum => self.nested(Self::read_enum),
        }
    }

    /// Check that the whole buffer was consumed
    pub fn finish(self) -> Result<()> {
        let left = self.remaining();
        if left == 0 {
            return Ok(());
        }
        match self.options.trailing_bytes {
            TrailingBytes::Reject => Err(Error::protocol(
                self.pos,
                ProtocolViolation::TrailingBytes(left),
            )),
            TrailingBytes::Warn => {
                tracing::warn!(
                    offset = self.pos,
                    trailing = left,
                    "ignoring trailing bytes after decoded value"
                );
                Ok(())
            }
        }
    }

    fn nested(&mut self, read: fn(&mut Self) -> Result<Value>) -> Result<Value> {
        if self.depth >= self.options.max_depth {
            return Err(Error::protocol(
                self.pos,
                ProtocolViolation::DepthExceeded(self.options.max_depth),
            ));
        }
        self.depth += 1;
        let value = read(self);
        self.depth -= 1;
        value
    }

    fn read_array_items(&mut self) -> Result<Value> {
        let count = self.read_len()?;
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            items.push(self.read_value()?);
        }
        Ok(Value::Array(items))
    }

    fn read_record_fields(&mut self) -> Result<Value> {
        let count = self.read_len()?;
        let mut fields = Record::with_capacity(count);
        for _ in 0..count {
            let key_offset = self.pos;
            let key = self.read_string("record key")?;
            let value = self.read_value()?;
            if fields.contains_key(&key) {
                return Err(Error::protocol(
                    key_offset,
                    ProtocolViolation::DuplicateKey(key),
                ));
            }
            fields.insert(key, value);
        }
        Ok(Value::Record(fields))
    }

    fn read_enum(&mut self) -> Result<Value> {
        let tag = self.read_string("enum tag")?;
        let arg = match self.read_u8()? {
            0 => None,
            _ => Some(Box::new(self.read_value()?)),
        };
        Ok(Value::Enum { tag, arg })
    }

    fn read_string(&mut self, what: &'static str) -> Result<String> {
        let len = self.read_len()?;
        let start = self.pos;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| Error::protocol(start, ProtocolViolation::InvalidUtf8(what)))
    }

    /// Read a u32 length or count, rejecting values larger than what is left.
    /// Every element or field takes at least one byte, so the bound also caps
    /// preallocation for containers.
    fn read_len(&mut self) -> Result<usize> {
        let offset = self.pos;
        let declared = u32::from_le_bytes(self.read_array::<LEN_WIDTH>()?);
        let remaining = self.remaining();
        if declared as u64 > remaining as u64 {
            return Err(Error::protocol(
                offset,
                ProtocolViolation::LengthOverrun {
                    declared: u64::from(declared),
                    remaining,
                },
            ));
        }
        Ok(declared as usize)
    }

    fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(Error::protocol(
                self.pos,
                ProtocolViolation::Truncated {
                    needed: n,
                    remaining,
                },
            ));
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }
}

/// Decode a complete buffer with default options
pub fn decode(bytes: &[u8]) -> Result<Value> {
    decode_with(bytes, DecodeOptions::default())
}

/// Decode a complete buffer, applying `options`
pub fn decode_with(bytes: &[u8], options: DecodeOptions) -> Result<Value> {
    let mut decoder = Decoder::with_options(bytes, options);
    let value = decoder.read_value()?;
    decoder.finish()?;
    Ok(value)
}
