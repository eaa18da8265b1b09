use std::path::PathBuf;

/// Custom Result type for cache operations, wrapping the custom [`Error`] type
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the cache library, encompassing all possible error cases
/// that can occur while building or reading a cache file pair.
#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub enum Error {
    /// Errors related to cache header processing
    HeaderError(#[from] HeaderError),
    /// Errors that occur during read operations
    ReadError(#[from] ReadError),
    /// Errors that occur during write operations
    WriteError(#[from] WriteError),
    /// Errors related to the companion index file
    IndexError(#[from] IndexError),
    /// Errors raised by the block codec
    CodecError(#[from] CodecError),
    /// Errors raised while building interval arrays
    IntervalError(#[from] IntervalError),
    /// Standard I/O errors from the Rust standard library
    IoError(#[from] std::io::Error),
    /// UTF-8 encoding/decoding errors
    Utf8Error(#[from] std::str::Utf8Error),
    /// UTF-8 errors raised while taking ownership of decoded strings
    FromUtf8Error(#[from] std::string::FromUtf8Error),
    /// Generic errors that can occur in any part of the system
    AnyhowError(#[from] anyhow::Error),
}

/// Errors specific to processing and validating cache headers
#[derive(thiserror::Error, Debug)]
pub enum HeaderError {
    /// The identifier string does not name a cache file
    ///
    /// # Arguments
    /// * `String` - The identifier that was found
    #[error("Invalid cache identifier: {0:?}")]
    InvalidIdentifier(String),

    /// The schema version in the header is not supported
    ///
    /// # Fields
    /// * `found` - The schema version stored in the file
    /// * `supported` - The schema version understood by this reader
    #[error("The cache reader supports schema v{supported}, but found v{found}")]
    UnsupportedSchemaVersion { found: u16, supported: u16 },

    /// The guard integer following the file pair id is wrong
    ///
    /// # Arguments
    /// * `u32` - The guard integer that was found
    #[error("Invalid guard integer: {0}")]
    InvalidGuard(u32),

    /// The genome assembly byte does not map to a known assembly
    #[error("Invalid genome assembly code: {0}")]
    InvalidAssembly(u8),
}

/// Errors that can occur while reading cache data
#[derive(thiserror::Error, Debug)]
pub enum ReadError {
    /// A file of the cache pair does not exist on disk
    #[error("Cache file not found: {}", .0.display())]
    MissingFile(PathBuf),

    /// The file being read is not a regular file (e.g., it might be a directory or special file)
    #[error("File is not regular")]
    IncompatibleFile,

    /// A decompressed block did not have the size its block header declared
    #[error("Decompressed block has {found} bytes, but its header declared {expected}")]
    DecompressedSizeMismatch { expected: usize, found: usize },

    /// A bin payload ended before all of its fields were decoded
    #[error("Unexpected end of block payload at byte {0}")]
    UnexpectedEndOfBlock(usize),

    /// A variable-length integer was longer than its target type allows
    #[error("Malformed variable-length integer")]
    InvalidVarint,

    /// The chromosome found at a seek target differs from the requested one
    #[error("Expected reference {expected} at the current position, but found {found}")]
    UnexpectedReference { expected: u16, found: u16 },

    /// A transcript referenced an entry outside of its bin's lookup tables
    ///
    /// # Fields
    /// * `table` - Name of the table that was indexed
    /// * `index` - The requested index
    /// * `len` - The length of the table
    #[error("Index {index} is out of range for the {table} table ({len} entries)")]
    BinTableIndex {
        table: &'static str,
        index: usize,
        len: usize,
    },

    /// A gene refers to an HGNC id that the gene-symbol table does not contain
    #[error("Unknown HGNC id: {0}")]
    UnknownHgncId(u32),

    /// An enumeration byte does not map to a known value
    #[error("Invalid {0} code: {1}")]
    InvalidCode(&'static str, u16),

    /// A line of the gene symbol table could not be parsed
    #[error("Malformed gene symbol entry on line {0}")]
    MalformedSymbolEntry(usize),

    /// The data file declares more chromosome slots than a reference index can address
    #[error("Data file declares {0} reference slots")]
    TooManyReferences(u64),

    /// The data file declares more chromosomes with data than it has slots
    #[error("Data file declares {present} chromosomes with data but only {slots} slots")]
    PresentExceedsSlots { present: u64, slots: u64 },
}

/// Errors that can occur while writing cache data
#[derive(thiserror::Error, Debug)]
pub enum WriteError {
    /// A cache array was handed to a writer that already wrote one
    #[error("The reference caches have already been written")]
    AlreadyWritten,

    /// A transcript points at a gene, region, or sequence missing from its bin's tables
    ///
    /// # Arguments
    /// * `&'static str` - Name of the table
    /// * `String` - Identifier of the offending transcript
    #[error("Transcript {1} references an entry missing from the {0} table")]
    MissingBinEntry(&'static str, String),

    /// A reference cache is stored in a slot that does not match its chromosome index
    #[error("Reference cache for chromosome {found} was placed in slot {slot}")]
    MisplacedReference { slot: usize, found: u16 },

    /// The number of chromosome slots exceeds the 16-bit reference index space
    #[error("Too many reference slots: {0}")]
    TooManyReferences(usize),

    /// A feature is stored in the cache of another chromosome
    #[error("Feature {id} on reference {found} was stored in the cache of reference {expected}")]
    ChromosomeMismatch {
        expected: u16,
        found: u16,
        id: String,
    },

    /// A gene carries the HGNC id 0, which the format reserves for "no id"
    #[error("Gene {0} has the reserved HGNC id 0")]
    ReservedHgncId(String),

    /// A bin payload is larger than a 32-bit block header can describe
    #[error("Bin payload of {0} bytes exceeds the maximum block size")]
    BlockTooLarge(usize),
}

/// Errors related to the companion index file
#[derive(thiserror::Error, Debug)]
pub enum IndexError {
    /// The data file and index file were not written as a pair
    #[error("Mismatched cache pair: data file id {data} does not match index file id {index}")]
    FilePairIdMismatch { data: i32, index: i32 },

    /// A chromosome was fed to the index builder out of order
    #[error("Reference {found} was indexed after reference {previous}")]
    UnorderedReference { previous: u16, found: u16 },

    /// A bin or offset was fed to the index builder out of order
    #[error("Bin {bin} at offset {offset} on reference {reference} is not after the previous bin")]
    UnorderedBin {
        reference: u16,
        bin: u32,
        offset: u64,
    },

    /// A bin was fed for a chromosome whose base offset was never recorded
    #[error("Bin recorded for reference {0} before its base offset")]
    MissingReference(u16),
}

/// Errors raised by the block codec
#[derive(thiserror::Error, Debug)]
pub enum CodecError {
    /// The destination buffer cannot hold the worst-case output
    #[error("Destination buffer too small: {available} bytes available, {required} required")]
    BufferTooSmall { required: usize, available: usize },

    /// The underlying compressor rejected the input
    #[error("Compression failed: {0}")]
    Compression(std::io::Error),

    /// A compressed frame does not declare its decompressed size
    #[error("Compressed frame does not declare its content size")]
    MissingContentSize,

    /// The underlying decompressor rejected the input
    #[error("Decompression failed: {0}")]
    Decompression(std::io::Error),
}

/// Errors raised while building interval arrays
#[derive(thiserror::Error, Debug)]
pub enum IntervalError {
    /// Input intervals are not sorted by (begin, end)
    #[error("Intervals are not sorted at index {index}")]
    Unsorted { index: usize },

    /// An interval ends before it begins
    #[error("Interval [{begin}, {end}] ends before it begins")]
    Inverted { begin: i32, end: i32 },

    /// An interval was assigned to a chromosome outside of the forest
    #[error("Reference index {ref_index} is outside of the {num_refs} forest slots")]
    ReferenceOutOfRange { ref_index: u16, num_refs: usize },
}
