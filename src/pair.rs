//! On-disk cache file pairs
//!
//! A cache is stored as a data file and an index file next to it, named by appending
//! [`INDEX_EXTENSION`] to the data file path. Both carry the same file pair id.

use std::fs::File;
use std::io::{BufWriter, Cursor, Write};
use std::path::{Path, PathBuf};

use log::info;
use memmap2::Mmap;

use crate::error::{ReadError, Result};
use crate::index::CacheIndex;
use crate::reader::CacheReader;
use crate::record::{GeneSymbols, ReferenceCache};
use crate::writer::CacheWriterBuilder;

/// Extension appended to a data file path to name its index
pub const INDEX_EXTENSION: &str = "idx";

/// Path of the index file belonging to `data_path`
#[must_use]
pub fn index_path<P: AsRef<Path>>(data_path: P) -> PathBuf {
    let mut path = data_path.as_ref().as_os_str().to_owned();
    path.push(".");
    path.push(INDEX_EXTENSION);
    PathBuf::from(path)
}

/// Writes `caches` to `data_path` and the matching index next to it
///
/// Returns the index that was saved.
pub fn write_cache_pair<P: AsRef<Path>>(
    data_path: P,
    builder: CacheWriterBuilder,
    caches: &[Option<ReferenceCache>],
) -> Result<CacheIndex> {
    let data_path = data_path.as_ref();
    let handle = File::create(data_path).map(BufWriter::new)?;
    let mut writer = builder.build(handle)?;
    writer.write(caches)?;
    let (mut handle, index) = writer.finish()?;
    handle.flush()?;

    let index_path = index_path(data_path);
    index.save_to_path(&index_path)?;
    info!(
        "Wrote cache pair {} / {}",
        data_path.display(),
        index_path.display()
    );
    Ok(index)
}

/// Opens a data file and its index, checking that they were written together
///
/// The header is validated and the file pair ids are compared before any chromosome
/// data is decoded.
///
/// # Errors
///
/// * `ReadError::MissingFile` - if either file does not exist
/// * `IndexError::FilePairIdMismatch` - if the files belong to different pairs
pub fn open_cache_pair<P: AsRef<Path>>(
    data_path: P,
    symbols: GeneSymbols,
) -> Result<(CacheReader<Cursor<Mmap>>, CacheIndex)> {
    let data_path = data_path.as_ref();
    let index_path = index_path(data_path);
    for path in [data_path, index_path.as_path()] {
        if !path.exists() {
            return Err(ReadError::MissingFile(path.to_path_buf()).into());
        }
    }

    let reader = CacheReader::from_path(data_path, symbols)?;
    let index = CacheIndex::from_path(&index_path, reader.file_pair_id())?;
    Ok((reader, index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IndexError;
    use crate::record::fixtures::{sample_caches, symbols};
    use crate::Error;

    #[test]
    fn test_index_path() {
        assert_eq!(
            index_path("/data/Cache/GRCh38/Both.ndb"),
            PathBuf::from("/data/Cache/GRCh38/Both.ndb.idx")
        );
    }

    #[test]
    fn test_pair_round_trip() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let data_path = dir.path().join("Both.ndb");
        let caches = sample_caches();
        let written = write_cache_pair(&data_path, CacheWriterBuilder::default(), &caches)?;

        let (mut reader, index) = open_cache_pair(&data_path, symbols())?;
        assert_eq!(index, written);
        assert_eq!(reader.file_pair_id(), index.file_pair_id());
        assert_eq!(reader.read_reference_cache(&index, 17)?, caches[17]);

        let (mut reader, _) = open_cache_pair(&data_path, symbols())?;
        assert_eq!(reader.get_reference_caches()?, caches);
        Ok(())
    }

    #[test]
    fn test_mismatched_pair() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let first = dir.path().join("first.ndb");
        let second = dir.path().join("second.ndb");
        let caches = sample_caches();
        write_cache_pair(&first, CacheWriterBuilder::default().file_pair_id(123), &caches)?;
        write_cache_pair(&second, CacheWriterBuilder::default().file_pair_id(124), &caches)?;

        // pair the first data file with the second index
        std::fs::copy(index_path(&second), index_path(&first))?;
        let result = open_cache_pair(&first, symbols());
        assert!(matches!(
            result,
            Err(Error::IndexError(IndexError::FilePairIdMismatch {
                data: 123,
                index: 124
            }))
        ));
        Ok(())
    }

    #[test]
    fn test_missing_index() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let data_path = dir.path().join("Both.ndb");
        write_cache_pair(&data_path, CacheWriterBuilder::default(), &sample_caches())?;
        std::fs::remove_file(index_path(&data_path))?;

        let result = open_cache_pair(&data_path, symbols());
        assert!(matches!(
            result,
            Err(Error::ReadError(ReadError::MissingFile(ref path))) if path == &index_path(&data_path)
        ));
        Ok(())
    }
}
