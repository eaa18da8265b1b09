use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use byteorder::WriteBytesExt;

use crate::error::{ReadError, Result, WriteError};
use crate::utils::{write_i32, write_string, write_varint, SliceReader};

const FLAG_REVERSE_STRAND: u8 = 0x1;

/// A gene referenced by the transcripts of a bin
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Gene {
    pub start: i32,
    pub end: i32,
    /// Stable gene identifier (e.g. an Ensembl or Entrez id)
    pub id: String,
    /// Numeric HGNC id, when the gene has one
    pub hgnc_id: Option<u32>,
    pub symbol: String,
    pub on_reverse_strand: bool,
}
impl Gene {
    /// Encodes the gene
    ///
    /// Genes with an HGNC id do not store their symbol; it is restored from the
    /// [`GeneSymbols`] table handed to the reader. The id 0 marks an inline symbol and
    /// cannot be used as an HGNC id.
    pub(crate) fn encode(&self, buffer: &mut Vec<u8>) -> Result<()> {
        write_i32(buffer, self.start)?;
        write_i32(buffer, self.end)?;
        write_string(buffer, &self.id)?;
        match self.hgnc_id {
            Some(0) => return Err(WriteError::ReservedHgncId(self.id.clone()).into()),
            Some(hgnc_id) => write_varint(buffer, u64::from(hgnc_id))?,
            None => {
                write_varint(buffer, 0)?;
                write_string(buffer, &self.symbol)?;
            }
        }
        let flags = if self.on_reverse_strand {
            FLAG_REVERSE_STRAND
        } else {
            0
        };
        buffer.write_u8(flags)?;
        Ok(())
    }

    pub(crate) fn decode(reader: &mut SliceReader, symbols: &GeneSymbols) -> Result<Self> {
        let start = reader.read_i32()?;
        let end = reader.read_i32()?;
        let id = reader.read_string()?;
        let (hgnc_id, symbol) = match reader.read_u32()? {
            0 => (None, reader.read_string()?),
            hgnc_id => {
                let symbol = symbols
                    .get(hgnc_id)
                    .ok_or(ReadError::UnknownHgncId(hgnc_id))?;
                (Some(hgnc_id), symbol.to_string())
            }
        };
        let flags = reader.read_u8()?;
        Ok(Self {
            start,
            end,
            id,
            hgnc_id,
            symbol,
            on_reverse_strand: flags & FLAG_REVERSE_STRAND != 0,
        })
    }
}

/// Mapping from HGNC id to gene symbol
///
/// The table is loaded once and handed to every reader; bins only store the numeric id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneSymbols(HashMap<u32, String>);
impl GeneSymbols {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, hgnc_id: u32) -> Option<&str> {
        self.0.get(&hgnc_id).map(String::as_str)
    }

    pub fn insert(&mut self, hgnc_id: u32, symbol: impl Into<String>) -> Option<String> {
        self.0.insert(hgnc_id, symbol.into())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parses a tab-separated `hgnc_id<TAB>symbol` table
    ///
    /// Blank lines and lines starting with `#` are skipped.
    ///
    /// # Errors
    ///
    /// * `ReadError::MalformedSymbolEntry` - with the 1-based line number of a bad line
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut symbols = Self::new();
        for (line_index, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim_end();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let malformed = || ReadError::MalformedSymbolEntry(line_index + 1);
            let (hgnc_id, symbol) = line.split_once('\t').ok_or_else(malformed)?;
            let hgnc_id: u32 = hgnc_id.trim().parse().map_err(|_| malformed())?;
            if hgnc_id == 0 || symbol.is_empty() {
                return Err(malformed().into());
            }
            symbols.insert(hgnc_id, symbol);
        }
        Ok(symbols)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ReadError::MissingFile(path.to_path_buf()).into());
        }
        let reader = File::open(path).map(BufReader::new)?;
        Self::from_reader(reader)
    }
}
impl<S: Into<String>> FromIterator<(u32, S)> for GeneSymbols {
    fn from_iter<I: IntoIterator<Item = (u32, S)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(hgnc_id, symbol)| (hgnc_id, symbol.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::io::Cursor;

    fn brca1() -> Gene {
        Gene {
            start: 43_044_295,
            end: 43_125_483,
            id: "ENSG00000012048".to_string(),
            hgnc_id: Some(1100),
            symbol: "BRCA1".to_string(),
            on_reverse_strand: true,
        }
    }

    #[test]
    fn test_symbol_resolved_from_table() -> crate::Result<()> {
        let symbols: GeneSymbols = [(1100, "BRCA1")].into_iter().collect();
        let mut buffer = Vec::new();
        brca1().encode(&mut buffer)?;
        assert!(!buffer.windows(5).any(|w| w == b"BRCA1"));

        let gene = Gene::decode(&mut SliceReader::new(&buffer), &symbols)?;
        assert_eq!(gene, brca1());
        Ok(())
    }

    #[test]
    fn test_symbol_stored_inline() -> crate::Result<()> {
        let gene = Gene {
            hgnc_id: None,
            symbol: "LOC100288069".to_string(),
            on_reverse_strand: false,
            ..brca1()
        };
        let mut buffer = Vec::new();
        gene.encode(&mut buffer)?;
        let observed = Gene::decode(&mut SliceReader::new(&buffer), &GeneSymbols::new())?;
        assert_eq!(observed, gene);
        Ok(())
    }

    #[test]
    fn test_reserved_hgnc_id() {
        let gene = Gene {
            hgnc_id: Some(0),
            ..brca1()
        };
        let mut buffer = Vec::new();
        let result = gene.encode(&mut buffer);
        assert!(matches!(
            result,
            Err(Error::WriteError(WriteError::ReservedHgncId(ref id))) if id == "ENSG00000012048"
        ));
    }

    #[test]
    fn test_unknown_hgnc_id() -> crate::Result<()> {
        let mut buffer = Vec::new();
        brca1().encode(&mut buffer)?;
        let result = Gene::decode(&mut SliceReader::new(&buffer), &GeneSymbols::new());
        assert!(matches!(
            result,
            Err(Error::ReadError(ReadError::UnknownHgncId(1100)))
        ));
        Ok(())
    }

    #[test]
    fn test_symbol_table_parsing() -> crate::Result<()> {
        let table = "# hgnc_id\tsymbol\n1100\tBRCA1\n\n11998\tTP53\r\n";
        let symbols = GeneSymbols::from_reader(Cursor::new(table))?;
        assert_eq!(symbols.len(), 2);
        assert_eq!(symbols.get(1100), Some("BRCA1"));
        assert_eq!(symbols.get(11998), Some("TP53"));
        assert_eq!(symbols.get(7), None);
        Ok(())
    }

    #[test]
    fn test_malformed_symbol_table() {
        let result = GeneSymbols::from_reader(Cursor::new("1100\tBRCA1\nTP53\n"));
        assert!(matches!(
            result,
            Err(Error::ReadError(ReadError::MalformedSymbolEntry(2)))
        ));
        let result = GeneSymbols::from_reader(Cursor::new("HGNC:1100\tBRCA1\n"));
        assert!(matches!(
            result,
            Err(Error::ReadError(ReadError::MalformedSymbolEntry(1)))
        ));
    }
}
