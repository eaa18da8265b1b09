//! # nirvana-cache
//!
//! A chromosome-interval-indexed binary cache for genome annotation features.
//!
//! Transcripts, genes, and regulatory regions are grouped per chromosome into sparse
//! genomic windows ("bins"). Every bin is compressed on its own, so a companion index can
//! point a reader at any chromosome or bin without decoding the rest of the file.
//! Decoded features are loaded into per-chromosome interval arrays that answer overlap
//! queries in `O(log n + k)`.
//!
//! A cache is a pair of files sharing a random file pair id:
//!
//! * the **data file**: header, then per chromosome a sequence of compressed bins
//! * the **index file**: per chromosome the base offset and the offset of every bin
//!
//! ## Example
//!
//! ```rust
//! use std::io::Cursor;
//! use nirvana_cache::{
//!     CacheBin, CacheReader, CacheWriterBuilder, GeneSymbols, ReferenceCache,
//!     RegulatoryRegion, RegulatoryRegionType,
//! };
//!
//! let mut bin = CacheBin::new(7);
//! bin.regulatory_regions.push(RegulatoryRegion {
//!     ref_index: 1,
//!     start: 7_689_500,
//!     end: 7_691_000,
//!     id: "ENSR00000088966".to_string(),
//!     region_type: RegulatoryRegionType::Promoter,
//! });
//! let caches = vec![None, Some(ReferenceCache::new(1, vec![bin]))];
//!
//! let mut writer = CacheWriterBuilder::default().build(Vec::new()).unwrap();
//! writer.write(&caches).unwrap();
//! let (bytes, index) = writer.finish().unwrap();
//!
//! let mut reader = CacheReader::new(Cursor::new(bytes), GeneSymbols::new()).unwrap();
//! let bin = reader.read_cache_bin(&index, 1, 7).unwrap().unwrap();
//! assert_eq!(bin.regulatory_regions[0].id, "ENSR00000088966");
//! assert!(reader.read_cache_bin(&index, 1, 8).unwrap().is_none());
//! ```

pub mod block;
pub mod codec;
pub mod error;
pub mod header;
pub mod index;
pub mod interval;
pub mod pair;
pub mod reader;
pub mod record;
pub mod utils;
pub mod writer;

pub use codec::{BlockCodec, ZstdCodec};
pub use error::{Error, Result};
pub use header::{CacheHeader, DataSourceVersion, GenomeAssembly};
pub use index::{BinPosition, CacheIndex, CacheIndexBuilder, IndexReference};
pub use interval::{Interval, IntervalArray, IntervalForest};
pub use pair::{index_path, open_cache_pair, write_cache_pair};
pub use reader::CacheReader;
pub use record::{
    regulatory_region_forest, transcript_forest, AminoAcidEdit, BioType, CacheBin, CodingRegion,
    Gene, GeneSymbols, ReferenceCache, RegulatoryRegion, RegulatoryRegionType, Source,
    Transcript, TranscriptRegion, TranscriptRegionType, TranslationalSlip,
};
pub use writer::{CacheWriter, CacheWriterBuilder};
