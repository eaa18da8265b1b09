use std::collections::HashMap;
use std::hash::Hash;

use super::transcript::BinTables;
use super::{Gene, GeneSymbols, RegulatoryRegion, Transcript, TranscriptRegion};
use crate::error::Result;
use crate::interval::{Interval, IntervalForest};
use crate::utils::{write_string, write_varint, SliceReader};

/// Features of one genomic window
///
/// Empty collections stand for absent ones; both encode to a zero count.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CacheBin {
    /// Bin number within the chromosome
    pub bin: u32,
    /// First bin holding a transcript that reaches into this bin
    pub earliest_transcript_bin: u32,
    /// First bin holding a regulatory region that reaches into this bin
    pub earliest_regulatory_region_bin: u32,
    pub genes: Vec<Gene>,
    pub transcript_regions: Vec<TranscriptRegion>,
    pub cdna_seqs: Vec<String>,
    pub protein_seqs: Vec<String>,
    pub transcripts: Vec<Transcript>,
    pub regulatory_regions: Vec<RegulatoryRegion>,
}

/// Maps each entry to its first position in `items`
fn positions<T: Hash + Eq>(items: &[T]) -> HashMap<&T, usize> {
    let mut map = HashMap::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        map.entry(item).or_insert(i);
    }
    map
}

fn string_positions(items: &[String]) -> HashMap<&str, usize> {
    let mut map = HashMap::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        map.entry(item.as_str()).or_insert(i);
    }
    map
}

impl CacheBin {
    #[must_use]
    pub fn new(bin: u32) -> Self {
        Self {
            bin,
            earliest_transcript_bin: bin,
            earliest_regulatory_region_bin: bin,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transcripts.is_empty() && self.regulatory_regions.is_empty() && self.genes.is_empty()
    }

    /// Serializes the bin into an uncompressed payload
    ///
    /// # Errors
    ///
    /// * `WriteError::MissingBinEntry` - if a transcript refers to a gene, region, or
    ///   sequence absent from this bin's tables
    pub fn encode(&self, buffer: &mut Vec<u8>) -> Result<()> {
        write_varint(buffer, u64::from(self.bin))?;
        write_varint(buffer, u64::from(self.earliest_transcript_bin))?;
        write_varint(buffer, u64::from(self.earliest_regulatory_region_bin))?;

        write_varint(buffer, self.genes.len() as u64)?;
        for gene in &self.genes {
            gene.encode(buffer)?;
        }
        write_varint(buffer, self.transcript_regions.len() as u64)?;
        for region in &self.transcript_regions {
            region.encode(buffer)?;
        }
        for table in [&self.cdna_seqs, &self.protein_seqs] {
            write_varint(buffer, table.len() as u64)?;
            for seq in table {
                write_string(buffer, seq)?;
            }
        }

        let tables = BinTables {
            genes: positions(&self.genes),
            transcript_regions: positions(&self.transcript_regions),
            cdna_seqs: string_positions(&self.cdna_seqs),
            protein_seqs: string_positions(&self.protein_seqs),
        };
        write_varint(buffer, self.transcripts.len() as u64)?;
        for transcript in &self.transcripts {
            transcript.encode(buffer, &tables)?;
        }

        write_varint(buffer, self.regulatory_regions.len() as u64)?;
        for region in &self.regulatory_regions {
            region.encode(buffer)?;
        }
        Ok(())
    }

    /// Deserializes a payload written by [`CacheBin::encode`]
    ///
    /// Genes stored with an HGNC id have their symbol restored from `symbols`.
    pub fn decode(payload: &[u8], ref_index: u16, symbols: &GeneSymbols) -> Result<Self> {
        let mut reader = SliceReader::new(payload);
        let bin = reader.read_u32()?;
        let earliest_transcript_bin = reader.read_u32()?;
        let earliest_regulatory_region_bin = reader.read_u32()?;

        let genes = read_table(&mut reader, |r| Gene::decode(r, symbols))?;
        let transcript_regions = read_table(&mut reader, TranscriptRegion::decode)?;
        let cdna_seqs = read_table(&mut reader, SliceReader::read_string)?;
        let protein_seqs = read_table(&mut reader, SliceReader::read_string)?;
        let transcripts = read_table(&mut reader, |r| {
            Transcript::decode(
                r,
                ref_index,
                &genes,
                &transcript_regions,
                &cdna_seqs,
                &protein_seqs,
            )
        })?;
        let regulatory_regions =
            read_table(&mut reader, |r| RegulatoryRegion::decode(r, ref_index))?;

        Ok(Self {
            bin,
            earliest_transcript_bin,
            earliest_regulatory_region_bin,
            genes,
            transcript_regions,
            cdna_seqs,
            protein_seqs,
            transcripts,
            regulatory_regions,
        })
    }
}

fn read_table<'a, T, F>(reader: &mut SliceReader<'a>, mut decode: F) -> Result<Vec<T>>
where
    F: FnMut(&mut SliceReader<'a>) -> Result<T>,
{
    let n = reader.read_count()?;
    let mut items = Vec::with_capacity(n);
    for _ in 0..n {
        items.push(decode(reader)?);
    }
    Ok(items)
}

/// All bins of one chromosome, in ascending bin order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceCache {
    pub ref_index: u16,
    pub bins: Vec<CacheBin>,
}
impl ReferenceCache {
    #[must_use]
    pub fn new(ref_index: u16, bins: Vec<CacheBin>) -> Self {
        Self { ref_index, bins }
    }

    pub fn transcripts(&self) -> impl Iterator<Item = &Transcript> {
        self.bins.iter().flat_map(|bin| bin.transcripts.iter())
    }

    pub fn regulatory_regions(&self) -> impl Iterator<Item = &RegulatoryRegion> {
        self.bins.iter().flat_map(|bin| bin.regulatory_regions.iter())
    }
}

/// Builds a per-chromosome interval forest over the transcripts of decoded caches
///
/// The forest has one slot per cache slot; chromosomes without a cache have no array.
pub fn transcript_forest(
    caches: &[Option<ReferenceCache>],
) -> Result<IntervalForest<&Transcript>> {
    IntervalForest::from_intervals(
        caches.len(),
        caches.iter().flatten().flat_map(|cache| {
            cache.transcripts().map(move |transcript| {
                (
                    cache.ref_index,
                    Interval::new(transcript.start, transcript.end, transcript),
                )
            })
        }),
    )
}

/// Builds a per-chromosome interval forest over the regulatory regions of decoded caches
pub fn regulatory_region_forest(
    caches: &[Option<ReferenceCache>],
) -> Result<IntervalForest<&RegulatoryRegion>> {
    IntervalForest::from_intervals(
        caches.len(),
        caches.iter().flatten().flat_map(|cache| {
            cache.regulatory_regions().map(move |region| {
                (
                    cache.ref_index,
                    Interval::new(region.start, region.end, region),
                )
            })
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ReadError, WriteError};
    use crate::record::fixtures::{sample_caches, symbols, tp53_bin};
    use crate::Error;

    #[test]
    fn test_bin_round_trip() -> crate::Result<()> {
        let bin = tp53_bin();
        let mut buffer = Vec::new();
        bin.encode(&mut buffer)?;
        let observed = CacheBin::decode(&buffer, 17, &symbols())?;
        assert_eq!(observed, bin);
        Ok(())
    }

    #[test]
    fn test_shared_gene_written_once() -> crate::Result<()> {
        let bin = tp53_bin();
        assert_eq!(bin.genes.len(), 1);
        assert!(bin.transcripts.len() > 1);

        let mut buffer = Vec::new();
        bin.encode(&mut buffer)?;
        let gene_id = bin.genes[0].id.as_bytes();
        let occurrences = buffer.windows(gene_id.len()).filter(|w| *w == gene_id).count();
        assert_eq!(occurrences, 1);
        Ok(())
    }

    #[test]
    fn test_empty_bin() -> crate::Result<()> {
        let bin = CacheBin::new(12);
        assert!(bin.is_empty());
        let mut buffer = Vec::new();
        bin.encode(&mut buffer)?;
        assert_eq!(buffer, vec![12, 12, 12, 0, 0, 0, 0, 0, 0]);
        assert_eq!(CacheBin::decode(&buffer, 0, &GeneSymbols::new())?, bin);
        Ok(())
    }

    #[test]
    fn test_transcript_outside_bin_tables() {
        let mut bin = tp53_bin();
        bin.cdna_seqs.clear();
        let result = bin.encode(&mut Vec::new());
        assert!(matches!(
            result,
            Err(Error::WriteError(WriteError::MissingBinEntry("cDNA sequence", _)))
        ));

        let mut bin = tp53_bin();
        bin.genes[0].symbol = "P53".to_string();
        let result = bin.encode(&mut Vec::new());
        assert!(matches!(
            result,
            Err(Error::WriteError(WriteError::MissingBinEntry("gene", _)))
        ));
    }

    #[test]
    fn test_reserved_hgnc_id_not_written() {
        let mut bin = CacheBin::new(7);
        let mut gene = tp53_bin().genes[0].clone();
        gene.hgnc_id = Some(0);
        bin.genes.push(gene);
        assert!(matches!(
            bin.encode(&mut Vec::new()),
            Err(Error::WriteError(WriteError::ReservedHgncId(_)))
        ));
    }

    #[test]
    fn test_truncated_payload() -> crate::Result<()> {
        let mut buffer = Vec::new();
        tp53_bin().encode(&mut buffer)?;
        buffer.truncate(buffer.len() / 2);
        let result = CacheBin::decode(&buffer, 17, &symbols());
        assert!(matches!(
            result,
            Err(Error::ReadError(ReadError::UnexpectedEndOfBlock(_)))
        ));
        Ok(())
    }

    #[test]
    fn test_forests() -> crate::Result<()> {
        let caches = sample_caches();
        let transcripts = transcript_forest(&caches)?;
        assert_eq!(transcripts.num_refs(), caches.len());

        let ids: Vec<&str> = transcripts
            .overlapping_values(17, 7_676_000, 7_676_000)
            .into_iter()
            .map(|transcript| transcript.id.as_str())
            .collect();
        assert_eq!(ids, vec!["ENST00000269305.9", "NM_000546.6"]);
        assert!(transcripts.overlapping_values(0, 1, i32::MAX).is_empty());

        let regions = regulatory_region_forest(&caches)?;
        assert!(regions.overlaps_any(17, 7_690_000, 7_690_100));
        assert!(!regions.overlaps_any(17, 1, 100));
        Ok(())
    }
}
