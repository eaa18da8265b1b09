//! Header module for cache data files
//!
//! The header carries the metadata that must be validated before any data is decoded:
//! the format identifier and schema version, the data version and provenance of the
//! annotation source, the genome assembly, and the file pair id that binds the data
//! file to its companion index.
//!
//! ```text
//! identifier      string   "NirvanaCache"
//! schema version  u16
//! data version    u16
//! data source     name, description, version (strings), release ticks (i64)
//! assembly        u8
//! file pair id    i32
//! guard           u32
//! ```

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{HeaderError, Result};
use crate::utils::{read_string, read_varint, write_string};

/// Identifier string at the start of every cache data file
pub const CACHE_IDENTIFIER: &str = "NirvanaCache";

/// Current schema version of the cache format
///
/// This should be incremented when making backwards-incompatible changes to the format.
pub const SCHEMA_VERSION: u16 = 1;

/// Guard integer written after the file pair id
pub const GUARD_INT: u32 = 4_041_327_495;

/// Longest identifier a reader will accept before declaring the file foreign
const MAX_IDENTIFIER_LEN: u64 = 64;

/// Genome assembly of the annotated reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum GenomeAssembly {
    GRCh37 = 0,
    GRCh38 = 1,
    Hg19 = 2,
    Rcrs = 3,
    SarsCov2 = 4,
    #[default]
    Unknown = 255,
}
impl TryFrom<u8> for GenomeAssembly {
    type Error = HeaderError;

    fn try_from(code: u8) -> std::result::Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::GRCh37),
            1 => Ok(Self::GRCh38),
            2 => Ok(Self::Hg19),
            3 => Ok(Self::Rcrs),
            4 => Ok(Self::SarsCov2),
            255 => Ok(Self::Unknown),
            _ => Err(HeaderError::InvalidAssembly(code)),
        }
    }
}

/// Provenance of the annotation source a cache was built from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DataSourceVersion {
    pub name: String,
    pub description: String,
    pub version: String,
    /// Release date in .NET-style ticks (100 ns since 0001-01-01)
    pub release_ticks: i64,
}
impl DataSourceVersion {
    #[must_use]
    pub fn new(name: &str, description: &str, version: &str, release_ticks: i64) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            version: version.to_string(),
            release_ticks,
        }
    }

    pub fn write_bytes<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_string(writer, &self.name)?;
        write_string(writer, &self.description)?;
        write_string(writer, &self.version)?;
        writer.write_i64::<LittleEndian>(self.release_ticks)?;
        Ok(())
    }

    pub fn from_reader<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(Self {
            name: read_string(reader)?,
            description: read_string(reader)?,
            version: read_string(reader)?,
            release_ticks: reader.read_i64::<LittleEndian>()?,
        })
    }
}

/// Header structure for cache data files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheHeader {
    /// Format identifier, always [`CACHE_IDENTIFIER`]
    pub identifier: String,

    /// Version of the binary layout
    pub schema_version: u16,

    /// Version of the annotation content
    pub data_version: u16,

    /// Provenance of the annotation source
    pub source: DataSourceVersion,

    /// Genome assembly of the annotated reference
    pub assembly: GenomeAssembly,

    /// Token shared with the companion index file
    ///
    /// Assigned by the writer when the file is created.
    pub file_pair_id: i32,
}
impl Default for CacheHeader {
    fn default() -> Self {
        Self::new(0, DataSourceVersion::default(), GenomeAssembly::default())
    }
}
impl CacheHeader {
    #[must_use]
    pub fn new(data_version: u16, source: DataSourceVersion, assembly: GenomeAssembly) -> Self {
        Self {
            identifier: CACHE_IDENTIFIER.to_string(),
            schema_version: SCHEMA_VERSION,
            data_version,
            source,
            assembly,
            file_pair_id: 0,
        }
    }

    /// Writes the header to a writer
    pub fn write_bytes<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_string(writer, &self.identifier)?;
        writer.write_u16::<LittleEndian>(self.schema_version)?;
        writer.write_u16::<LittleEndian>(self.data_version)?;
        self.source.write_bytes(writer)?;
        writer.write_u8(self.assembly as u8)?;
        writer.write_i32::<LittleEndian>(self.file_pair_id)?;
        writer.write_u32::<LittleEndian>(GUARD_INT)?;
        Ok(())
    }

    /// Reads and validates a header
    ///
    /// # Errors
    ///
    /// * `HeaderError::InvalidIdentifier` - if the file is not a cache file
    /// * `HeaderError::UnsupportedSchemaVersion` - if the schema version is not supported
    /// * `HeaderError::InvalidAssembly` - if the assembly byte is unknown
    /// * `HeaderError::InvalidGuard` - if the guard integer is wrong
    pub fn from_reader<R: Read>(reader: &mut R) -> Result<Self> {
        let identifier = {
            let len = read_varint(reader)?;
            if len > MAX_IDENTIFIER_LEN {
                return Err(HeaderError::InvalidIdentifier(format!("<{len} bytes>")).into());
            }
            let mut buffer = vec![0u8; len as usize];
            reader.read_exact(&mut buffer)?;
            String::from_utf8_lossy(&buffer).into_owned()
        };
        if identifier != CACHE_IDENTIFIER {
            return Err(HeaderError::InvalidIdentifier(identifier).into());
        }

        let schema_version = reader.read_u16::<LittleEndian>()?;
        if schema_version != SCHEMA_VERSION {
            return Err(HeaderError::UnsupportedSchemaVersion {
                found: schema_version,
                supported: SCHEMA_VERSION,
            }
            .into());
        }

        let data_version = reader.read_u16::<LittleEndian>()?;
        let source = DataSourceVersion::from_reader(reader)?;
        let assembly = GenomeAssembly::try_from(reader.read_u8()?)?;
        let file_pair_id = reader.read_i32::<LittleEndian>()?;

        let guard = reader.read_u32::<LittleEndian>()?;
        if guard != GUARD_INT {
            return Err(HeaderError::InvalidGuard(guard).into());
        }

        Ok(Self {
            identifier,
            schema_version,
            data_version,
            source,
            assembly,
            file_pair_id,
        })
    }
}
