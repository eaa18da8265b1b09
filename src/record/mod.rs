//! Feature records stored in cache bins
//!
//! A [`CacheBin`] owns the features of one genomic window. Transcripts hold their gene,
//! transcript regions, and sequences by value; on disk those are replaced by indices into
//! per-bin tables, so a gene shared by several transcripts of a bin is written once.

/// Declares a fieldless enum stored as a single code on disk
///
/// Decoding an unknown code fails with [`ReadError::InvalidCode`](crate::error::ReadError::InvalidCode).
macro_rules! code_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident ($label:literal) {
            $($(#[$vmeta:meta])* $variant:ident = $code:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        $vis enum $name {
            $($(#[$vmeta])* $variant = $code,)+
        }
        impl TryFrom<u8> for $name {
            type Error = $crate::error::ReadError;

            fn try_from(code: u8) -> std::result::Result<Self, Self::Error> {
                match code {
                    $($code => Ok(Self::$variant),)+
                    _ => Err($crate::error::ReadError::InvalidCode($label, u16::from(code))),
                }
            }
        }
    };
}

mod bin;
mod gene;
mod regulatory;
mod transcript;

pub use bin::{regulatory_region_forest, transcript_forest, CacheBin, ReferenceCache};
pub use gene::{Gene, GeneSymbols};
pub use regulatory::{RegulatoryRegion, RegulatoryRegionType};
pub use transcript::{
    AminoAcidEdit, BioType, CodingRegion, Source, Transcript, TranscriptRegion,
    TranscriptRegionType, TranslationalSlip,
};

#[cfg(test)]
pub(crate) mod fixtures;
