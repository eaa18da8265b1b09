//! # Block codec
//!
//! Every bin of a cache file is compressed independently. The codec contract is kept
//! deliberately small so that readers and writers can size their scratch buffers up
//! front:
//!
//! * [`BlockCodec::compressed_buffer_bound`] gives the worst-case compressed size for an
//!   input length.
//! * [`BlockCodec::compress`] refuses to run with a destination smaller than that bound
//!   and reports [`CodecError::BufferTooSmall`] instead of truncating.
//! * [`BlockCodec::decompressed_len`] reads the size a compressed frame declares, so
//!   callers can check it before allocating.
//! * [`BlockCodec::decompress`] writes into a caller-provided buffer and returns the
//!   number of bytes produced. A buffer smaller than the declared size is reported as
//!   [`CodecError::BufferTooSmall`].
//!
//! Codec values are owned by each reader and writer, so there is no process-wide
//! compressor state.

use auto_impl::auto_impl;

use crate::error::{CodecError, Result};

/// Default ZSTD compression level for cache bins
pub const DEFAULT_COMPRESSION_LEVEL: i32 = 3;

/// Compression algorithm used for cache bins
#[auto_impl(&, &mut, Box, Arc)]
pub trait BlockCodec {
    /// Compresses `src` into `dst`, returning the compressed length
    fn compress(&self, src: &[u8], dst: &mut [u8]) -> Result<usize>;

    /// Decompressed size declared by the frame header of `src`
    fn decompressed_len(&self, src: &[u8]) -> Result<usize>;

    /// Decompresses `src` into `dst`, returning the decompressed length
    fn decompress(&self, src: &[u8], dst: &mut [u8]) -> Result<usize>;

    /// Upper bound of the compressed size of `src_len` input bytes
    fn compressed_buffer_bound(&self, src_len: usize) -> usize;
}

/// ZSTD block codec
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZstdCodec {
    level: i32,
}
impl Default for ZstdCodec {
    fn default() -> Self {
        Self::new(DEFAULT_COMPRESSION_LEVEL)
    }
}
impl ZstdCodec {
    #[must_use]
    pub fn new(level: i32) -> Self {
        Self { level }
    }

    #[must_use]
    pub fn level(&self) -> i32 {
        self.level
    }
}
impl BlockCodec for ZstdCodec {
    fn compress(&self, src: &[u8], dst: &mut [u8]) -> Result<usize> {
        let required = self.compressed_buffer_bound(src.len());
        if dst.len() < required {
            return Err(CodecError::BufferTooSmall {
                required,
                available: dst.len(),
            }
            .into());
        }
        Ok(zstd::bulk::compress_to_buffer(src, dst, self.level).map_err(CodecError::Compression)?)
    }

    fn decompressed_len(&self, src: &[u8]) -> Result<usize> {
        match zstd::zstd_safe::get_frame_content_size(src) {
            Ok(Some(size)) => Ok(size as usize),
            Ok(None) | Err(_) => Err(CodecError::MissingContentSize.into()),
        }
    }

    fn decompress(&self, src: &[u8], dst: &mut [u8]) -> Result<usize> {
        let required = self.decompressed_len(src)?;
        if dst.len() < required {
            return Err(CodecError::BufferTooSmall {
                required,
                available: dst.len(),
            }
            .into());
        }
        Ok(zstd::bulk::decompress_to_buffer(src, dst).map_err(CodecError::Decompression)?)
    }

    fn compressed_buffer_bound(&self, src_len: usize) -> usize {
        zstd::zstd_safe::compress_bound(src_len)
    }
}
