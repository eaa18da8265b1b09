//! Primitive encoders shared by the header, index, and bin payload codecs.
//!
//! Integers that are usually small (counts, coordinates, offset deltas) are written as
//! unsigned LEB128 varints: seven payload bits per byte, with the high bit set on every
//! byte except the last. Signed 32-bit values are written as their two's-complement
//! `u32` bit pattern. Strings are a varint byte length followed by UTF-8 bytes.

use std::io::{Read, Write};

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{ReadError, Result};

/// Maximum number of bytes in a varint encoding a `u64`
pub const MAX_VARINT_BYTES: usize = 10;

/// Writes an unsigned LEB128 varint
pub fn write_varint<W: Write>(writer: &mut W, mut value: u64) -> std::io::Result<()> {
    while value >= 0x80 {
        writer.write_all(&[((value & 0x7F) | 0x80) as u8])?;
        value >>= 7;
    }
    writer.write_all(&[value as u8])
}

/// Writes a signed 32-bit integer as the varint of its bit pattern
#[allow(clippy::cast_sign_loss)]
pub fn write_i32<W: Write>(writer: &mut W, value: i32) -> std::io::Result<()> {
    write_varint(writer, u64::from(value as u32))
}

/// Writes a length-prefixed UTF-8 string
pub fn write_string<W: Write>(writer: &mut W, value: &str) -> std::io::Result<()> {
    write_varint(writer, value.len() as u64)?;
    writer.write_all(value.as_bytes())
}

/// Reads an unsigned LEB128 varint from a stream
pub fn read_varint<R: Read>(reader: &mut R) -> Result<u64> {
    let mut value = 0u64;
    let mut byte = [0u8; 1];
    for i in 0..MAX_VARINT_BYTES {
        reader.read_exact(&mut byte)?;
        value |= u64::from(byte[0] & 0x7F) << (7 * i);
        if byte[0] & 0x80 == 0 {
            return Ok(value);
        }
    }
    Err(ReadError::InvalidVarint.into())
}

/// Reads a length-prefixed UTF-8 string from a stream
pub fn read_string<R: Read>(reader: &mut R) -> Result<String> {
    let len = usize::try_from(read_varint(reader)?).map_err(|_| ReadError::InvalidVarint)?;
    let mut buffer = vec![0u8; len];
    reader.read_exact(&mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Cursor over an in-memory bin payload
///
/// Bin payloads are decompressed as a whole into a scratch buffer and then decoded
/// field by field; every accessor reports truncation as
/// [`ReadError::UnexpectedEndOfBlock`] rather than panicking.
pub struct SliceReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}
impl<'a> SliceReader<'a> {
    #[must_use]
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Number of bytes not yet consumed
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    /// Current position within the payload
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(ReadError::UnexpectedEndOfBlock(self.pos).into());
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(LittleEndian::read_u16(self.take(2)?))
    }

    pub fn read_varint(&mut self) -> Result<u64> {
        let mut value = 0u64;
        for i in 0..MAX_VARINT_BYTES {
            let byte = self.read_u8()?;
            value |= u64::from(byte & 0x7F) << (7 * i);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(ReadError::InvalidVarint.into())
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::try_from(self.read_varint()?).map_err(|_| ReadError::InvalidVarint)?)
    }

    pub fn read_usize(&mut self) -> Result<usize> {
        Ok(usize::try_from(self.read_varint()?).map_err(|_| ReadError::InvalidVarint)?)
    }

    #[allow(clippy::cast_possible_wrap)]
    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(self.read_u32()? as i32)
    }

    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_usize()?;
        let bytes = self.take(len)?;
        Ok(std::str::from_utf8(bytes)?.to_owned())
    }

    /// Reads a collection count, bounding the pre-allocation by the bytes left
    pub fn read_count(&mut self) -> Result<usize> {
        let count = self.read_usize()?;
        if count > self.remaining() {
            // every entry occupies at least one byte
            return Err(ReadError::UnexpectedEndOfBlock(self.pos).into());
        }
        Ok(count)
    }
}
