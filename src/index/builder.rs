use super::{BinPosition, CacheIndex, IndexReference};
use crate::error::{IndexError, Result};

/// Accumulates bin positions while a cache data file is written
///
/// References must be added in ascending chromosome order, and within a chromosome the
/// bins must be added with strictly increasing bin numbers and offsets. Both properties
/// are what make the delta encoding of the index file valid, so the builder rejects
/// any feed that violates them.
#[derive(Debug, Clone, Default)]
pub struct CacheIndexBuilder {
    references: Vec<IndexReference>,
}
impl CacheIndexBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the base offset of a chromosome
    ///
    /// # Errors
    ///
    /// * `IndexError::UnorderedReference` - if `ref_index` is not above the previous reference
    pub fn add_reference(&mut self, ref_index: u16, position: u64) -> Result<()> {
        if let Some(previous) = self.references.last() {
            if previous.ref_index >= ref_index {
                return Err(IndexError::UnorderedReference {
                    previous: previous.ref_index,
                    found: ref_index,
                }
                .into());
            }
        }
        self.references.push(IndexReference {
            ref_index,
            position,
            bins: Vec::new(),
        });
        Ok(())
    }

    /// Records the offset of one bin of the most recently added chromosome
    ///
    /// # Errors
    ///
    /// * `IndexError::MissingReference` - if `ref_index` is not the current chromosome
    /// * `IndexError::UnorderedReference` - if `ref_index` belongs to an earlier chromosome
    /// * `IndexError::UnorderedBin` - if the bin or offset does not increase
    pub fn add(&mut self, ref_index: u16, bin: u32, offset: u64) -> Result<()> {
        let Some(current) = self.references.last_mut() else {
            return Err(IndexError::MissingReference(ref_index).into());
        };
        if current.ref_index > ref_index {
            return Err(IndexError::UnorderedReference {
                previous: current.ref_index,
                found: ref_index,
            }
            .into());
        }
        if current.ref_index != ref_index {
            return Err(IndexError::MissingReference(ref_index).into());
        }

        let in_order = match current.bins.last() {
            Some(previous) => previous.bin < bin && previous.offset < offset,
            None => current.position <= offset,
        };
        if !in_order {
            return Err(IndexError::UnorderedBin {
                reference: ref_index,
                bin,
                offset,
            }
            .into());
        }

        current.bins.push(BinPosition { bin, offset });
        Ok(())
    }

    /// Number of chromosomes recorded so far
    #[must_use]
    pub fn num_references(&self) -> usize {
        self.references.len()
    }

    /// Finalizes the builder into an immutable index stamped with `file_pair_id`
    #[must_use]
    pub fn finish(self, file_pair_id: i32) -> CacheIndex {
        CacheIndex {
            file_pair_id,
            references: self.references,
        }
    }
}
