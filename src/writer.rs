//! Writer for cache data files
//!
//! The writer produces the data file and its [`CacheIndex`] in one linear pass. Every
//! chromosome with data is written as its reference index and bin count followed by one
//! compressed block per bin; the stream offsets of each chromosome and bin are recorded
//! in an index builder as they are written.
//!
//! # Example
//!
//! ```rust,no_run
//! use nirvana_cache::{CacheHeader, CacheWriterBuilder, ReferenceCache};
//! use std::fs::File;
//!
//! let caches: Vec<Option<ReferenceCache>> = vec![None; 25];
//!
//! let mut writer = CacheWriterBuilder::default()
//!     .header(CacheHeader::default())
//!     .compression_level(9)
//!     .build(File::create("cache.ndb").unwrap())
//!     .unwrap();
//! writer.write(&caches).unwrap();
//!
//! let (_file, index) = writer.finish().unwrap();
//! index.save_to_path("cache.ndb.idx").unwrap();
//! ```

use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};
use log::{debug, info};

use crate::block::BlockBuffers;
use crate::codec::{ZstdCodec, DEFAULT_COMPRESSION_LEVEL};
use crate::error::{Result, WriteError};
use crate::header::CacheHeader;
use crate::index::{CacheIndex, CacheIndexBuilder};
use crate::record::ReferenceCache;
use crate::utils::write_varint;

#[derive(Default)]
pub struct CacheWriterBuilder {
    header: Option<CacheHeader>,
    compression_level: Option<i32>,
    file_pair_id: Option<i32>,
}
impl CacheWriterBuilder {
    #[must_use]
    pub fn header(mut self, header: CacheHeader) -> Self {
        self.header = Some(header);
        self
    }

    #[must_use]
    pub fn compression_level(mut self, level: i32) -> Self {
        self.compression_level = Some(level);
        self
    }

    /// Fixes the file pair id instead of drawing a random one
    #[must_use]
    pub fn file_pair_id(mut self, file_pair_id: i32) -> Self {
        self.file_pair_id = Some(file_pair_id);
        self
    }

    /// Writes the header to `inner` and returns the writer
    pub fn build<W: Write>(self, inner: W) -> Result<CacheWriter<W>> {
        let mut header = self.header.unwrap_or_default();
        header.file_pair_id = self.file_pair_id.unwrap_or_else(rand::random);
        CacheWriter::new(
            inner,
            header,
            ZstdCodec::new(self.compression_level.unwrap_or(DEFAULT_COMPRESSION_LEVEL)),
        )
    }
}

pub struct CacheWriter<W: Write> {
    /// Inner writer
    inner: W,

    /// Header of the file, carrying the file pair id
    header: CacheHeader,

    codec: ZstdCodec,

    /// Scratch buffers for block compression
    buffers: BlockBuffers,

    /// Reusable buffer for uncompressed bin payloads and small fields
    payload: Vec<u8>,

    /// Offsets recorded while writing
    index: CacheIndexBuilder,

    /// Number of bytes written to `inner`
    pos: u64,

    written: bool,
}
impl<W: Write> CacheWriter<W> {
    pub fn new(mut inner: W, header: CacheHeader, codec: ZstdCodec) -> Result<Self> {
        let mut bytes = Vec::new();
        header.write_bytes(&mut bytes)?;
        inner.write_all(&bytes)?;
        info!(
            "Writing cache data file (file pair id {}, zstd level {})",
            header.file_pair_id,
            codec.level()
        );
        Ok(Self {
            inner,
            header,
            codec,
            buffers: BlockBuffers::default(),
            payload: Vec::new(),
            index: CacheIndexBuilder::new(),
            pos: bytes.len() as u64,
            written: false,
        })
    }

    #[must_use]
    pub fn header(&self) -> &CacheHeader {
        &self.header
    }

    #[must_use]
    pub fn file_pair_id(&self) -> i32 {
        self.header.file_pair_id
    }

    /// Checks that every cache sits in its own slot and holds only its own features
    fn validate(caches: &[Option<ReferenceCache>]) -> Result<()> {
        if caches.len() > usize::from(u16::MAX) + 1 {
            return Err(WriteError::TooManyReferences(caches.len()).into());
        }
        for (slot, cache) in caches.iter().enumerate() {
            let Some(cache) = cache else { continue };
            if usize::from(cache.ref_index) != slot {
                return Err(WriteError::MisplacedReference {
                    slot,
                    found: cache.ref_index,
                }
                .into());
            }
            let mismatch = |found: u16, id: &str| WriteError::ChromosomeMismatch {
                expected: cache.ref_index,
                found,
                id: id.to_string(),
            };
            if let Some(transcript) = cache
                .transcripts()
                .find(|transcript| transcript.ref_index != cache.ref_index)
            {
                return Err(mismatch(transcript.ref_index, &transcript.id).into());
            }
            if let Some(region) = cache
                .regulatory_regions()
                .find(|region| region.ref_index != cache.ref_index)
            {
                return Err(mismatch(region.ref_index, &region.id).into());
            }
        }
        Ok(())
    }

    /// Writes the small fields staged in `payload`
    fn flush_payload(&mut self) -> Result<()> {
        self.inner.write_all(&self.payload)?;
        self.pos += self.payload.len() as u64;
        self.payload.clear();
        Ok(())
    }

    /// Writes the caches of all chromosome slots
    ///
    /// A `None` slot consumes no space in the data file. Each slot's cache must carry the
    /// slot's reference index, and its bins must be in strictly increasing bin order.
    ///
    /// # Errors
    ///
    /// * `WriteError::AlreadyWritten` - if the writer already wrote its caches
    /// * `WriteError::MisplacedReference` - if a cache sits in the wrong slot
    /// * `WriteError::ChromosomeMismatch` - if a feature belongs to another chromosome
    /// * `IndexError::UnorderedBin` - if the bins of a chromosome are out of order
    pub fn write(&mut self, caches: &[Option<ReferenceCache>]) -> Result<()> {
        if self.written {
            return Err(WriteError::AlreadyWritten.into());
        }
        Self::validate(caches)?;
        self.written = true;

        let present = caches.iter().flatten().count();
        self.payload.clear();
        write_varint(&mut self.payload, caches.len() as u64)?;
        write_varint(&mut self.payload, present as u64)?;
        self.flush_payload()?;

        for cache in caches.iter().flatten() {
            let base = self.pos;
            self.index.add_reference(cache.ref_index, base)?;
            self.payload.write_u16::<LittleEndian>(cache.ref_index)?;
            write_varint(&mut self.payload, cache.bins.len() as u64)?;
            self.flush_payload()?;

            for bin in &cache.bins {
                self.index.add(cache.ref_index, bin.bin, self.pos)?;
                bin.encode(&mut self.payload)?;
                self.pos +=
                    self.buffers
                        .write_block(&mut self.inner, &self.codec, &self.payload)?;
                self.payload.clear();
            }
            debug!(
                "Wrote reference {} ({} bins, {} bytes)",
                cache.ref_index,
                cache.bins.len(),
                self.pos - base
            );
        }

        self.buffers.release();
        Ok(())
    }

    /// Finishes the data file and returns the inner writer with the matching index
    ///
    /// A writer that never wrote any caches produces a data file with zero slots.
    pub fn finish(mut self) -> Result<(W, CacheIndex)> {
        if !self.written {
            self.write(&[])?;
        }
        self.inner.flush()?;
        let index = self.index.finish(self.header.file_pair_id);
        info!(
            "Finished cache data file: {} references, {} bytes (file pair id {})",
            index.references().len(),
            self.pos,
            index.file_pair_id()
        );
        Ok((self.inner, index))
    }
}
