//! Length-prefixed compressed blocks
//!
//! One compressed unit on disk is laid out as:
//!
//! ```text
//! ┌────────────────────────┬──────────────────────┬──────────────────┐
//! │ uncompressed size (u32)│ compressed size (u32)│ compressed bytes │
//! └────────────────────────┴──────────────────────┴──────────────────┘
//! ```
//!
//! Both sizes are little endian. Readers and writers keep a [`BlockBuffers`] so the
//! scratch memory for compressing and decompressing is reused across bins.

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::codec::BlockCodec;
use crate::error::{ReadError, Result, WriteError};

/// Size of the block preamble in bytes
pub const SIZE_BLOCK_PREAMBLE: u64 = 8;

/// Scratch capacity kept between blocks; larger buffers are shrunk on release
pub const RETAINED_CAPACITY: usize = 4 * 1024 * 1024;

/// Reusable buffers for compressing and decompressing blocks
#[derive(Debug, Default, Clone)]
pub struct BlockBuffers {
    /// Compressed buffer
    zbuf: Vec<u8>,
    /// Uncompressed buffer
    ubuf: Vec<u8>,
}
impl BlockBuffers {
    /// Compresses `payload` and writes it as one block
    ///
    /// Returns the number of bytes written, including the 8-byte preamble.
    pub fn write_block<W: Write, C: BlockCodec>(
        &mut self,
        writer: &mut W,
        codec: &C,
        payload: &[u8],
    ) -> Result<u64> {
        let ulen =
            u32::try_from(payload.len()).map_err(|_| WriteError::BlockTooLarge(payload.len()))?;

        self.zbuf.resize(codec.compressed_buffer_bound(payload.len()), 0);
        let clen = codec.compress(payload, &mut self.zbuf)?;

        writer.write_u32::<LittleEndian>(ulen)?;
        writer.write_u32::<LittleEndian>(clen as u32)?;
        writer.write_all(&self.zbuf[..clen])?;

        Ok(SIZE_BLOCK_PREAMBLE + clen as u64)
    }

    /// Reads one block and returns its decompressed payload
    ///
    /// The returned slice borrows the internal buffer and is valid until the next call.
    pub fn read_block<R: Read, C: BlockCodec>(
        &mut self,
        reader: &mut R,
        codec: &C,
    ) -> Result<&[u8]> {
        let ulen = reader.read_u32::<LittleEndian>()? as usize;
        let clen = reader.read_u32::<LittleEndian>()? as usize;

        self.zbuf.resize(clen, 0);
        reader.read_exact(&mut self.zbuf)?;

        let declared = codec.decompressed_len(&self.zbuf)?;
        if declared != ulen {
            return Err(ReadError::DecompressedSizeMismatch {
                expected: ulen,
                found: declared,
            }
            .into());
        }

        self.ubuf.resize(ulen, 0);
        let found = codec.decompress(&self.zbuf, &mut self.ubuf)?;
        if found != ulen {
            return Err(ReadError::DecompressedSizeMismatch {
                expected: ulen,
                found,
            }
            .into());
        }
        Ok(&self.ubuf)
    }

    /// Returns oversized scratch memory to the allocator
    pub fn release(&mut self) {
        for buffer in [&mut self.zbuf, &mut self.ubuf] {
            buffer.clear();
            if buffer.capacity() > RETAINED_CAPACITY {
                buffer.shrink_to(RETAINED_CAPACITY);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::ZstdCodec;
    use crate::Error;
    use std::io::Cursor;

    #[test]
    fn test_block_round_trip() -> crate::Result<()> {
        let codec = ZstdCodec::default();
        let mut buffers = BlockBuffers::default();
        let mut file = Vec::new();

        let first = b"ENSG00000223972\tDDX11L1".repeat(20);
        let second: Vec<u8> = Vec::new();
        let n1 = buffers.write_block(&mut file, &codec, &first)?;
        let n2 = buffers.write_block(&mut file, &codec, &second)?;
        assert_eq!(file.len() as u64, n1 + n2);

        let mut cursor = Cursor::new(file);
        assert_eq!(buffers.read_block(&mut cursor, &codec)?, first.as_slice());
        assert!(buffers.read_block(&mut cursor, &codec)?.is_empty());
        buffers.release();
        Ok(())
    }

    #[test]
    fn test_declared_size_mismatch() -> crate::Result<()> {
        let codec = ZstdCodec::default();
        let mut buffers = BlockBuffers::default();
        let mut file = Vec::new();
        buffers.write_block(&mut file, &codec, &[9u8; 100])?;

        // declare more bytes than the frame holds
        file[0..4].copy_from_slice(&200u32.to_le_bytes());
        let result = buffers.read_block(&mut Cursor::new(file), &codec);
        assert!(matches!(
            result,
            Err(Error::ReadError(ReadError::DecompressedSizeMismatch {
                expected: 200,
                found: 100
            }))
        ));
        Ok(())
    }

    #[test]
    fn test_declared_size_too_small() -> crate::Result<()> {
        let codec = ZstdCodec::default();
        let mut buffers = BlockBuffers::default();
        let mut file = Vec::new();
        buffers.write_block(&mut file, &codec, &[9u8; 100])?;

        file[0..4].copy_from_slice(&10u32.to_le_bytes());
        let result = buffers.read_block(&mut Cursor::new(file), &codec);
        assert!(matches!(
            result,
            Err(Error::ReadError(ReadError::DecompressedSizeMismatch {
                expected: 10,
                found: 100
            }))
        ));
        Ok(())
    }

    #[test]
    fn test_oversized_declaration_not_allocated() -> crate::Result<()> {
        let codec = ZstdCodec::default();
        let mut buffers = BlockBuffers::default();
        let mut file = Vec::new();
        buffers.write_block(&mut file, &codec, &[9u8; 100])?;

        file[0..4].copy_from_slice(&u32::MAX.to_le_bytes());
        let result = buffers.read_block(&mut Cursor::new(file), &codec);
        assert!(matches!(
            result,
            Err(Error::ReadError(ReadError::DecompressedSizeMismatch { found: 100, .. }))
        ));
        assert!(buffers.ubuf.capacity() < 1024);
        Ok(())
    }

    #[test]
    fn test_truncated_block() -> crate::Result<()> {
        let codec = ZstdCodec::default();
        let mut buffers = BlockBuffers::default();
        let mut file = Vec::new();
        buffers.write_block(&mut file, &codec, &[1u8; 64])?;
        file.truncate(file.len() - 2);
        assert!(buffers.read_block(&mut Cursor::new(file), &codec).is_err());
        Ok(())
    }
}
