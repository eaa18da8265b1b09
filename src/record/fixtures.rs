//! Small annotation caches shared by the unit tests

use super::{
    AminoAcidEdit, BioType, CacheBin, CodingRegion, Gene, GeneSymbols, ReferenceCache,
    RegulatoryRegion, RegulatoryRegionType, Source, Transcript, TranscriptRegion,
    TranscriptRegionType,
};

pub(crate) fn symbols() -> GeneSymbols {
    [(1100, "BRCA1"), (11998, "TP53")].into_iter().collect()
}

fn region(region_type: TranscriptRegionType, id: u16, coords: [i32; 4]) -> TranscriptRegion {
    TranscriptRegion {
        region_type,
        id,
        start: coords[0],
        end: coords[1],
        cdna_start: coords[2],
        cdna_end: coords[3],
    }
}

/// Bin 7 of chromosome 17 with three TP53 transcripts sharing one gene
pub(crate) fn tp53_bin() -> CacheBin {
    let gene = Gene {
        start: 7_661_779,
        end: 7_687_538,
        id: "ENSG00000141510".to_string(),
        hgnc_id: Some(11998),
        symbol: "TP53".to_string(),
        on_reverse_strand: true,
    };
    let exon_2 = region(TranscriptRegionType::Exon, 2, [7_676_521, 7_676_594, 163, 236]);
    let intron_1 = region(TranscriptRegionType::Intron, 1, [7_676_595, 7_687_376, 162, 163]);
    let exon_1 = region(TranscriptRegionType::Exon, 1, [7_687_377, 7_687_538, 1, 162]);
    let cdna = "GATGGGATTGGGGTTTTCCCCTCCCATGTGCTCAAGACTGGCGCTAAAAGTTTTGAGCTTCTCAAAAGTC".to_string();
    let retained = "CTCTTCCTCAGCAGCCAGACTGCCTTCCGGGTCACTGCCATGGAGGAGCCGCAGTCAGATCCTAG".to_string();
    let protein = "MEEPQSDPSVEPPLSQETFSDLWKLLPENNVLSPLPSQAMDDLMLSPDDIEQWFTEDPGP".to_string();

    let coding_region = CodingRegion {
        start: 7_669_609,
        end: 7_676_594,
        cdna_start: 203,
        cdna_end: 1_384,
        protein_id: "ENSP00000269305.4".to_string(),
        protein_seq: protein.clone(),
        cds_padding: 0,
        cds_offset: 0,
        protein_offset: 0,
        amino_acid_edits: None,
        slip: None,
    };
    let transcripts = vec![
        Transcript {
            ref_index: 17,
            start: 7_661_779,
            end: 7_687_538,
            id: "ENST00000269305.9".to_string(),
            biotype: BioType::ProteinCoding,
            is_canonical: true,
            source: Source::Ensembl,
            gene: gene.clone(),
            transcript_regions: vec![exon_2, intron_1, exon_1],
            cdna_seq: cdna.clone(),
            coding_region: Some(coding_region.clone()),
        },
        Transcript {
            ref_index: 17,
            start: 7_668_421,
            end: 7_687_490,
            id: "NM_000546.6".to_string(),
            biotype: BioType::MRna,
            is_canonical: true,
            source: Source::RefSeq,
            gene: gene.clone(),
            transcript_regions: vec![exon_2, intron_1],
            cdna_seq: cdna.clone(),
            coding_region: Some(CodingRegion {
                protein_id: "NP_000537.3".to_string(),
                amino_acid_edits: Some(vec![AminoAcidEdit {
                    position: 72,
                    amino_acid: b'R',
                }]),
                ..coding_region
            }),
        },
        Transcript {
            ref_index: 17,
            start: 7_686_000,
            end: 7_687_400,
            id: "ENST00000604348.1".to_string(),
            biotype: BioType::RetainedIntron,
            is_canonical: false,
            source: Source::Ensembl,
            gene: gene.clone(),
            transcript_regions: vec![exon_1],
            cdna_seq: retained.clone(),
            coding_region: None,
        },
    ];

    CacheBin {
        bin: 7,
        earliest_transcript_bin: 7,
        earliest_regulatory_region_bin: 7,
        genes: vec![gene],
        transcript_regions: vec![exon_2, intron_1, exon_1],
        cdna_seqs: vec![cdna, retained],
        protein_seqs: vec![protein],
        transcripts,
        regulatory_regions: Vec::new(),
    }
}

fn chr1_cache() -> ReferenceCache {
    let gene = Gene {
        start: 14_404,
        end: 29_570,
        id: "653635".to_string(),
        hgnc_id: None,
        symbol: "WASH7P".to_string(),
        on_reverse_strand: true,
    };
    let exon = region(TranscriptRegionType::Exon, 1, [14_404, 14_501, 1, 98]);
    let cdna = "ACTTGCGTGGAACTGCAGGAGCCGCCCGGCTTCCACACCTCCGCAACCACGGAGCGGA".to_string();
    let first = CacheBin {
        genes: vec![gene.clone()],
        transcript_regions: vec![exon],
        cdna_seqs: vec![cdna.clone()],
        transcripts: vec![Transcript {
            ref_index: 1,
            start: 14_404,
            end: 29_570,
            id: "NR_024540.1".to_string(),
            biotype: BioType::MiscRna,
            is_canonical: true,
            source: Source::RefSeq,
            gene,
            transcript_regions: vec![exon],
            cdna_seq: cdna,
            coding_region: None,
        }],
        ..CacheBin::new(3)
    };
    let second = CacheBin {
        earliest_transcript_bin: 3,
        ..CacheBin::new(9)
    };
    ReferenceCache::new(1, vec![first, second])
}

fn chr17_cache() -> ReferenceCache {
    let regulatory = CacheBin {
        earliest_transcript_bin: 7,
        regulatory_regions: vec![RegulatoryRegion {
            ref_index: 17,
            start: 7_689_500,
            end: 7_691_000,
            id: "ENSR00000088966".to_string(),
            region_type: RegulatoryRegionType::Promoter,
        }],
        ..CacheBin::new(8)
    };
    ReferenceCache::new(17, vec![tp53_bin(), regulatory])
}

/// Eighteen chromosome slots with data on chromosomes 1 and 17 only
pub(crate) fn sample_caches() -> Vec<Option<ReferenceCache>> {
    let mut caches: Vec<Option<ReferenceCache>> = (0..18).map(|_| None).collect();
    caches[1] = Some(chr1_cache());
    caches[17] = Some(chr17_cache());
    caches
}
