//! # Cache index
//!
//! The companion index of a cache data file maps chromosomes and bins to byte offsets,
//! so a reader can seek straight to one chromosome or one bin without decoding anything
//! before it.
//!
//! ## Format
//!
//! ```text
//! file pair id   i32
//! references     varint
//! per reference:
//!     ref index      u16
//!     base offset    varint
//!     bins           varint
//!     per bin:       bin delta varint, offset delta varint
//! ```
//!
//! Bin numbers and offsets are delta-encoded within a chromosome: the first bin number
//! is relative to zero and the first offset is relative to the chromosome's base offset.
//! Bins are sparse. A bin that was never written has no entry, and lookups for it return
//! `None`.

mod builder;

pub use builder::CacheIndexBuilder;

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{IndexError, ReadError, Result};
use crate::utils::{read_varint, write_varint};

/// Offset of one written bin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BinPosition {
    /// Bin number within the chromosome
    pub bin: u32,
    /// Absolute offset of the bin's block in the data file
    pub offset: u64,
}

/// Index of one chromosome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexReference {
    ref_index: u16,
    position: u64,
    bins: Vec<BinPosition>,
}
impl IndexReference {
    #[must_use]
    pub fn ref_index(&self) -> u16 {
        self.ref_index
    }

    /// Offset of the chromosome's record in the data file
    #[must_use]
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Written bins in ascending bin order
    #[must_use]
    pub fn bins(&self) -> &[BinPosition] {
        &self.bins
    }

    #[must_use]
    pub fn num_bins(&self) -> usize {
        self.bins.len()
    }

    /// Highest slot of the bin list, i.e. the number of written bins minus one
    ///
    /// Returns `None` for a chromosome without bins.
    #[must_use]
    pub fn max_bin(&self) -> Option<usize> {
        self.bins.len().checked_sub(1)
    }

    /// Returns the `i`-th written bin
    #[must_use]
    pub fn slot(&self, i: usize) -> Option<BinPosition> {
        self.bins.get(i).copied()
    }

    /// Offset of exactly `bin`, or `None` if that bin was never written
    #[must_use]
    pub fn bin_position(&self, bin: u32) -> Option<u64> {
        self.bins
            .binary_search_by_key(&bin, |position| position.bin)
            .ok()
            .map(|i| self.bins[i].offset)
    }

    /// Written bins within `first..=last`
    #[must_use]
    pub fn bin_positions(&self, first: u32, last: u32) -> &[BinPosition] {
        let lower = self.bins.partition_point(|position| position.bin < first);
        let upper = self.bins.partition_point(|position| position.bin <= last);
        if lower >= upper {
            return &[];
        }
        &self.bins[lower..upper]
    }

    fn write_bytes<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u16::<LittleEndian>(self.ref_index)?;
        write_varint(writer, self.position)?;
        write_varint(writer, self.bins.len() as u64)?;

        let mut bin = 0;
        let mut offset = self.position;
        for position in &self.bins {
            write_varint(writer, u64::from(position.bin - bin))?;
            write_varint(writer, position.offset - offset)?;
            bin = position.bin;
            offset = position.offset;
        }
        Ok(())
    }
}

/// Immutable index of a cache data file
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CacheIndex {
    file_pair_id: i32,
    references: Vec<IndexReference>,
}
impl CacheIndex {
    /// Token shared with the data file this index describes
    #[must_use]
    pub fn file_pair_id(&self) -> i32 {
        self.file_pair_id
    }

    /// Indexed chromosomes in ascending order
    #[must_use]
    pub fn references(&self) -> &[IndexReference] {
        &self.references
    }

    /// Returns the index of a chromosome, or `None` if it has no data
    #[must_use]
    pub fn index_reference(&self, ref_index: u16) -> Option<&IndexReference> {
        self.references
            .binary_search_by_key(&ref_index, |reference| reference.ref_index)
            .ok()
            .map(|i| &self.references[i])
    }

    /// Base offset of a chromosome, or `None` if it has no data
    #[must_use]
    pub fn reference_position(&self, ref_index: u16) -> Option<u64> {
        self.index_reference(ref_index)
            .map(IndexReference::position)
    }

    /// Offset of one bin, or `None` if the chromosome or the exact bin was never written
    #[must_use]
    pub fn bin_position(&self, ref_index: u16, bin: u32) -> Option<u64> {
        self.index_reference(ref_index)
            .and_then(|reference| reference.bin_position(bin))
    }

    /// Serializes the index
    pub fn write_bytes<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_i32::<LittleEndian>(self.file_pair_id)?;
        write_varint(writer, self.references.len() as u64)?;
        self.references
            .iter()
            .try_for_each(|reference| reference.write_bytes(writer))
    }

    /// Deserializes an index without checking its file pair id
    pub fn from_reader<R: Read>(reader: &mut R) -> Result<Self> {
        let file_pair_id = reader.read_i32::<LittleEndian>()?;
        Self::read_references(reader, file_pair_id)
    }

    /// Deserializes an index that must belong to the data file stamped with `file_pair_id`
    ///
    /// The id is compared before anything else is decoded.
    ///
    /// # Errors
    ///
    /// * `IndexError::FilePairIdMismatch` - if the index was written for another data file
    pub fn from_reader_checked<R: Read>(reader: &mut R, file_pair_id: i32) -> Result<Self> {
        let found = reader.read_i32::<LittleEndian>()?;
        if found != file_pair_id {
            return Err(IndexError::FilePairIdMismatch {
                data: file_pair_id,
                index: found,
            }
            .into());
        }
        Self::read_references(reader, found)
    }

    fn read_references<R: Read>(reader: &mut R, file_pair_id: i32) -> Result<Self> {
        let num_refs = read_varint(reader)?;

        // decoding through the builder re-validates the ordering of the file
        let mut builder = CacheIndexBuilder::new();
        for _ in 0..num_refs {
            let ref_index = reader.read_u16::<LittleEndian>()?;
            let position = read_varint(reader)?;
            builder.add_reference(ref_index, position)?;

            let num_bins = read_varint(reader)?;
            let mut bin = 0u32;
            let mut offset = position;
            for _ in 0..num_bins {
                let bin_delta =
                    u32::try_from(read_varint(reader)?).map_err(|_| ReadError::InvalidVarint)?;
                bin = bin.checked_add(bin_delta).ok_or(ReadError::InvalidVarint)?;
                offset = offset
                    .checked_add(read_varint(reader)?)
                    .ok_or(ReadError::InvalidVarint)?;
                builder.add(ref_index, bin, offset)?;
            }
        }
        let index = builder.finish(file_pair_id);
        log::debug!(
            "Read cache index with {} references (file pair id {})",
            index.references.len(),
            file_pair_id
        );
        Ok(index)
    }

    /// Saves the index to a file
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = File::create(path).map(BufWriter::new)?;
        self.write_bytes(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Reads the index file at `path`, which must carry `file_pair_id`
    ///
    /// # Errors
    ///
    /// * `ReadError::MissingFile` - if the path does not exist
    /// * `IndexError::FilePairIdMismatch` - if the index belongs to another data file
    pub fn from_path<P: AsRef<Path>>(path: P, file_pair_id: i32) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ReadError::MissingFile(path.to_path_buf()).into());
        }
        let mut reader = File::open(path).map(BufReader::new)?;
        Self::from_reader_checked(&mut reader, file_pair_id)
    }
}
