use std::collections::HashMap;

use byteorder::{LittleEndian, WriteBytesExt};

use super::Gene;
use crate::error::{ReadError, Result, WriteError};
use crate::utils::{write_i32, write_string, write_varint, SliceReader};

const FLAG_CODING_REGION: u16 = 0x400;
const FLAG_CANONICAL: u16 = 0x800;

const FLAG_AMINO_ACID_EDITS: u8 = 0x1;
const FLAG_SLIP: u8 = 0x2;

code_enum! {
    /// Transcript biotype, stored in the low byte of the transcript flags
    pub enum BioType ("biotype") {
        Unknown = 0,
        ProteinCoding = 1,
        NonsenseMediatedDecay = 2,
        NonStopDecay = 3,
        RetainedIntron = 4,
        ProcessedTranscript = 5,
        LncRna = 6,
        MiRna = 7,
        MiscRna = 8,
        SnRna = 9,
        SnoRna = 10,
        RRna = 11,
        TRna = 12,
        ScaRna = 13,
        Pseudogene = 14,
        ProcessedPseudogene = 15,
        UnprocessedPseudogene = 16,
        IgCGene = 17,
        IgVGene = 18,
        TrCGene = 19,
        TrVGene = 20,
        MRna = 21,
        Other = 22,
    }
}

code_enum! {
    /// Annotation source of a transcript (two bits of the transcript flags)
    pub enum Source ("source") {
        None = 0,
        RefSeq = 1,
        Ensembl = 2,
        BothRefSeqAndEnsembl = 3,
    }
}

code_enum! {
    pub enum TranscriptRegionType ("transcript region type") {
        Exon = 0,
        Intron = 1,
        Gap = 2,
    }
}

/// Exon, intron, or alignment gap of a transcript, with its cDNA coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TranscriptRegion {
    pub region_type: TranscriptRegionType,
    /// Exon or intron number
    pub id: u16,
    pub start: i32,
    pub end: i32,
    pub cdna_start: i32,
    pub cdna_end: i32,
}
impl TranscriptRegion {
    pub(crate) fn encode(&self, buffer: &mut Vec<u8>) -> Result<()> {
        buffer.write_u8(self.region_type as u8)?;
        buffer.write_u16::<LittleEndian>(self.id)?;
        write_i32(buffer, self.start)?;
        write_i32(buffer, self.end)?;
        write_i32(buffer, self.cdna_start)?;
        write_i32(buffer, self.cdna_end)?;
        Ok(())
    }

    pub(crate) fn decode(reader: &mut SliceReader) -> Result<Self> {
        Ok(Self {
            region_type: TranscriptRegionType::try_from(reader.read_u8()?)?,
            id: reader.read_u16()?,
            start: reader.read_i32()?,
            end: reader.read_i32()?,
            cdna_start: reader.read_i32()?,
            cdna_end: reader.read_i32()?,
        })
    }
}

/// Amino acid replacing the one encoded by the codon at `position`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AminoAcidEdit {
    pub position: i32,
    pub amino_acid: u8,
}

/// Ribosomal frameshift
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TranslationalSlip {
    pub position: i32,
    pub length: i32,
}

/// Coding part of a transcript
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CodingRegion {
    pub start: i32,
    pub end: i32,
    pub cdna_start: i32,
    pub cdna_end: i32,
    pub protein_id: String,
    pub protein_seq: String,
    /// cDNA bases inserted before an incomplete first codon
    pub cds_padding: u8,
    /// CDS position of the first aligned coding base
    pub cds_offset: u16,
    pub protein_offset: u16,
    pub amino_acid_edits: Option<Vec<AminoAcidEdit>>,
    pub slip: Option<TranslationalSlip>,
}
impl CodingRegion {
    fn encode(&self, buffer: &mut Vec<u8>, protein_index: usize) -> Result<()> {
        write_i32(buffer, self.start)?;
        write_i32(buffer, self.end)?;
        write_i32(buffer, self.cdna_start)?;
        write_i32(buffer, self.cdna_end)?;
        write_string(buffer, &self.protein_id)?;
        write_varint(buffer, protein_index as u64)?;
        buffer.write_u8(self.cds_padding)?;
        buffer.write_u16::<LittleEndian>(self.cds_offset)?;
        buffer.write_u16::<LittleEndian>(self.protein_offset)?;

        let mut flags = 0;
        if self.amino_acid_edits.is_some() {
            flags |= FLAG_AMINO_ACID_EDITS;
        }
        if self.slip.is_some() {
            flags |= FLAG_SLIP;
        }
        buffer.write_u8(flags)?;

        if let Some(edits) = &self.amino_acid_edits {
            write_varint(buffer, edits.len() as u64)?;
            for edit in edits {
                write_i32(buffer, edit.position)?;
                buffer.write_u8(edit.amino_acid)?;
            }
        }
        if let Some(slip) = &self.slip {
            write_i32(buffer, slip.position)?;
            write_i32(buffer, slip.length)?;
        }
        Ok(())
    }

    fn decode(reader: &mut SliceReader, protein_seqs: &[String]) -> Result<Self> {
        let start = reader.read_i32()?;
        let end = reader.read_i32()?;
        let cdna_start = reader.read_i32()?;
        let cdna_end = reader.read_i32()?;
        let protein_id = reader.read_string()?;
        let protein_seq = table_entry(protein_seqs, "protein sequence", reader.read_usize()?)?;
        let cds_padding = reader.read_u8()?;
        let cds_offset = reader.read_u16()?;
        let protein_offset = reader.read_u16()?;
        let flags = reader.read_u8()?;

        let amino_acid_edits = if flags & FLAG_AMINO_ACID_EDITS != 0 {
            let n = reader.read_count()?;
            let mut edits = Vec::with_capacity(n);
            for _ in 0..n {
                edits.push(AminoAcidEdit {
                    position: reader.read_i32()?,
                    amino_acid: reader.read_u8()?,
                });
            }
            Some(edits)
        } else {
            None
        };
        let slip = if flags & FLAG_SLIP != 0 {
            Some(TranslationalSlip {
                position: reader.read_i32()?,
                length: reader.read_i32()?,
            })
        } else {
            None
        };

        Ok(Self {
            start,
            end,
            cdna_start,
            cdna_end,
            protein_id,
            protein_seq,
            cds_padding,
            cds_offset,
            protein_offset,
            amino_acid_edits,
            slip,
        })
    }
}

/// A transcript with its gene, regions, and sequences held by value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Transcript {
    pub ref_index: u16,
    pub start: i32,
    pub end: i32,
    pub id: String,
    pub biotype: BioType,
    pub is_canonical: bool,
    pub source: Source,
    pub gene: Gene,
    pub transcript_regions: Vec<TranscriptRegion>,
    pub cdna_seq: String,
    pub coding_region: Option<CodingRegion>,
}

/// Positions of a bin's shared entries, used to replace values by table indices
pub(crate) struct BinTables<'a> {
    pub genes: HashMap<&'a Gene, usize>,
    pub transcript_regions: HashMap<&'a TranscriptRegion, usize>,
    pub cdna_seqs: HashMap<&'a str, usize>,
    pub protein_seqs: HashMap<&'a str, usize>,
}

impl Transcript {
    fn flags(&self) -> u16 {
        // bits 0-7 biotype, bits 8-9 source, then coding region and canonical
        let mut flags = (u16::from(self.source as u8) << 8) | u16::from(self.biotype as u8);
        if self.coding_region.is_some() {
            flags |= FLAG_CODING_REGION;
        }
        if self.is_canonical {
            flags |= FLAG_CANONICAL;
        }
        flags
    }

    pub(crate) fn encode(&self, buffer: &mut Vec<u8>, tables: &BinTables) -> Result<()> {
        let missing = |table: &'static str| WriteError::MissingBinEntry(table, self.id.clone());

        write_i32(buffer, self.start)?;
        write_i32(buffer, self.end)?;
        write_string(buffer, &self.id)?;

        let gene_index = tables.genes.get(&self.gene).ok_or_else(|| missing("gene"))?;
        write_varint(buffer, *gene_index as u64)?;
        buffer.write_u16::<LittleEndian>(self.flags())?;

        write_varint(buffer, self.transcript_regions.len() as u64)?;
        for region in &self.transcript_regions {
            let region_index = tables
                .transcript_regions
                .get(region)
                .ok_or_else(|| missing("transcript region"))?;
            write_varint(buffer, *region_index as u64)?;
        }

        if let Some(coding_region) = &self.coding_region {
            let protein_index = tables
                .protein_seqs
                .get(coding_region.protein_seq.as_str())
                .ok_or_else(|| missing("protein sequence"))?;
            coding_region.encode(buffer, *protein_index)?;
        }

        let cdna_index = tables
            .cdna_seqs
            .get(self.cdna_seq.as_str())
            .ok_or_else(|| missing("cDNA sequence"))?;
        write_varint(buffer, *cdna_index as u64)?;
        Ok(())
    }

    pub(crate) fn decode(
        reader: &mut SliceReader,
        ref_index: u16,
        genes: &[Gene],
        transcript_regions: &[TranscriptRegion],
        cdna_seqs: &[String],
        protein_seqs: &[String],
    ) -> Result<Self> {
        let start = reader.read_i32()?;
        let end = reader.read_i32()?;
        let id = reader.read_string()?;
        let gene = table_entry(genes, "gene", reader.read_usize()?)?;

        let flags = reader.read_u16()?;
        let biotype = BioType::try_from((flags & 0xFF) as u8)?;
        let source = Source::try_from(((flags >> 8) & 0x3) as u8)?;

        let n_regions = reader.read_count()?;
        let mut regions = Vec::with_capacity(n_regions);
        for _ in 0..n_regions {
            regions.push(table_entry(
                transcript_regions,
                "transcript region",
                reader.read_usize()?,
            )?);
        }

        let coding_region = if flags & FLAG_CODING_REGION != 0 {
            Some(CodingRegion::decode(reader, protein_seqs)?)
        } else {
            None
        };
        let cdna_seq = table_entry(cdna_seqs, "cDNA sequence", reader.read_usize()?)?;

        Ok(Self {
            ref_index,
            start,
            end,
            id,
            biotype,
            is_canonical: flags & FLAG_CANONICAL != 0,
            source,
            gene,
            transcript_regions: regions,
            cdna_seq,
            coding_region,
        })
    }
}

fn table_entry<T: Clone>(table: &[T], name: &'static str, index: usize) -> Result<T> {
    table.get(index).cloned().ok_or_else(|| {
        ReadError::BinTableIndex {
            table: name,
            index,
            len: table.len(),
        }
        .into()
    })
}
