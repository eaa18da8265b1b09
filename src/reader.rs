//! Reader for cache data files
//!
//! The reader validates the header on construction and supports two access modes:
//!
//! * **Full scan**: [`CacheReader::get_reference_caches`] decodes every chromosome in file
//!   order, starting right after the header.
//! * **Targeted access**: position the reader with [`CacheReader::set_position`] using an
//!   offset from the companion [`CacheIndex`], then decode one chromosome with
//!   [`CacheReader::get_reference_cache`] or one bin with [`CacheReader::get_cache_bin`].
//!   The `read_*` helpers combine both steps and return `None` for absent data.
//!
//! A reader owns its stream position; concurrent readers need their own handles.

use std::fs::File;
use std::io::{Cursor, Read, Seek, SeekFrom};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
use log::{debug, info};
use memmap2::Mmap;

use crate::block::BlockBuffers;
use crate::codec::ZstdCodec;
use crate::error::{IndexError, ReadError, Result};
use crate::header::CacheHeader;
use crate::index::CacheIndex;
use crate::record::{CacheBin, GeneSymbols, ReferenceCache};
use crate::utils::read_varint;

/// Number of chromosome slots addressable by a `u16` reference index
const MAX_REFERENCE_SLOTS: u64 = 1 << 16;

pub struct CacheReader<R: Read + Seek> {
    inner: R,
    header: CacheHeader,
    symbols: GeneSymbols,
    codec: ZstdCodec,
    buffers: BlockBuffers,
}
impl<R: Read + Seek> CacheReader<R> {
    /// Reads and validates the header of the stream
    ///
    /// The stream is left positioned at the start of the chromosome data.
    pub fn new(mut inner: R, symbols: GeneSymbols) -> Result<Self> {
        let header = CacheHeader::from_reader(&mut inner)?;
        info!(
            "Opened cache data file: {} {} (data v{}, file pair id {})",
            header.source.name, header.source.version, header.data_version, header.file_pair_id
        );
        Ok(Self {
            inner,
            header,
            symbols,
            codec: ZstdCodec::default(),
            buffers: BlockBuffers::default(),
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

    #[must_use]
    pub fn symbols(&self) -> &GeneSymbols {
        &self.symbols
    }

    /// Moves the stream to an absolute offset taken from the index
    pub fn set_position(&mut self, offset: u64) -> Result<()> {
        self.inner.seek(SeekFrom::Start(offset))?;
        Ok(())
    }

    /// Decodes every chromosome slot
    ///
    /// The reader must be positioned right after the header, as it is after construction.
    /// Slots without data are `None`.
    pub fn get_reference_caches(&mut self) -> Result<Vec<Option<ReferenceCache>>> {
        let num_slots = read_varint(&mut self.inner)?;
        let num_present = read_varint(&mut self.inner)?;
        if num_slots > MAX_REFERENCE_SLOTS {
            return Err(ReadError::TooManyReferences(num_slots).into());
        }
        if num_present > num_slots {
            return Err(ReadError::PresentExceedsSlots {
                present: num_present,
                slots: num_slots,
            }
            .into());
        }

        let mut caches: Vec<Option<ReferenceCache>> = (0..num_slots).map(|_| None).collect();
        let mut previous: Option<u16> = None;
        for _ in 0..num_present {
            let ref_index = self.inner.read_u16::<LittleEndian>()?;
            // chromosomes are stored in strictly ascending order
            if let Some(previous) = previous.filter(|&p| ref_index <= p) {
                return Err(ReadError::UnexpectedReference {
                    expected: previous.saturating_add(1),
                    found: ref_index,
                }
                .into());
            }
            previous = Some(ref_index);
            let len = caches.len();
            let Some(slot) = caches.get_mut(usize::from(ref_index)) else {
                return Err(ReadError::BinTableIndex {
                    table: "reference slot",
                    index: usize::from(ref_index),
                    len,
                }
                .into());
            };
            *slot = Some(self.read_bins(ref_index)?);
        }
        self.buffers.release();
        Ok(caches)
    }

    /// Decodes the chromosome whose record starts at the current position
    ///
    /// # Errors
    ///
    /// * `ReadError::UnexpectedReference` - if the record belongs to another chromosome
    pub fn get_reference_cache(&mut self, ref_index: u16) -> Result<ReferenceCache> {
        let found = self.inner.read_u16::<LittleEndian>()?;
        if found != ref_index {
            return Err(ReadError::UnexpectedReference {
                expected: ref_index,
                found,
            }
            .into());
        }
        let cache = self.read_bins(ref_index)?;
        self.buffers.release();
        Ok(cache)
    }

    /// Decodes the bin whose block starts at the current position
    pub fn get_cache_bin(&mut self, ref_index: u16) -> Result<CacheBin> {
        let payload = self.buffers.read_block(&mut self.inner, &self.codec)?;
        CacheBin::decode(payload, ref_index, &self.symbols)
    }

    fn read_bins(&mut self, ref_index: u16) -> Result<ReferenceCache> {
        let num_bins = read_varint(&mut self.inner)?;
        let mut bins = Vec::new();
        for _ in 0..num_bins {
            bins.push(self.get_cache_bin(ref_index)?);
        }
        debug!("Read reference {} ({} bins)", ref_index, bins.len());
        Ok(ReferenceCache::new(ref_index, bins))
    }

    fn check_index(&self, index: &CacheIndex) -> Result<()> {
        if index.file_pair_id() != self.file_pair_id() {
            return Err(IndexError::FilePairIdMismatch {
                data: self.file_pair_id(),
                index: index.file_pair_id(),
            }
            .into());
        }
        Ok(())
    }

    /// Seeks to and decodes one chromosome, or returns `None` if it has no data
    pub fn read_reference_cache(
        &mut self,
        index: &CacheIndex,
        ref_index: u16,
    ) -> Result<Option<ReferenceCache>> {
        self.check_index(index)?;
        let Some(position) = index.reference_position(ref_index) else {
            return Ok(None);
        };
        self.set_position(position)?;
        self.get_reference_cache(ref_index).map(Some)
    }

    /// Seeks to and decodes one bin, or returns `None` if it was never written
    pub fn read_cache_bin(
        &mut self,
        index: &CacheIndex,
        ref_index: u16,
        bin: u32,
    ) -> Result<Option<CacheBin>> {
        self.check_index(index)?;
        let Some(position) = index.bin_position(ref_index, bin) else {
            return Ok(None);
        };
        self.set_position(position)?;
        self.get_cache_bin(ref_index).map(Some)
    }

    /// Decodes every written bin of a chromosome within `first..=last`
    ///
    /// Bins of a chromosome are stored back to back, so the range is read with a single seek.
    pub fn read_cache_bins(
        &mut self,
        index: &CacheIndex,
        ref_index: u16,
        first: u32,
        last: u32,
    ) -> Result<Vec<CacheBin>> {
        self.check_index(index)?;
        let Some(reference) = index.index_reference(ref_index) else {
            return Ok(Vec::new());
        };
        let positions = reference.bin_positions(first, last);
        let Some(start) = positions.first() else {
            return Ok(Vec::new());
        };
        self.set_position(start.offset)?;
        let bins = positions
            .iter()
            .map(|_| self.get_cache_bin(ref_index))
            .collect::<Result<Vec<_>>>()?;
        self.buffers.release();
        Ok(bins)
    }

    /// Returns the underlying stream
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl CacheReader<Cursor<Mmap>> {
    /// Memory-maps the data file at `path` and validates its header
    pub fn from_path<P: AsRef<Path>>(path: P, symbols: GeneSymbols) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ReadError::MissingFile(path.to_path_buf()).into());
        }

        // Verify input file is a file before attempting to map
        let file = File::open(path)?;
        if !file.metadata()?.is_file() {
            return Err(ReadError::IncompatibleFile.into());
        }

        // Safety: the file is open and won't be modified while mapped
        let mmap = unsafe { Mmap::map(&file)? };
        Self::new(Cursor::new(mmap), symbols)
    }
}
