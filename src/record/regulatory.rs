use byteorder::WriteBytesExt;

use crate::error::Result;
use crate::utils::{write_i32, write_string, SliceReader};

code_enum! {
    pub enum RegulatoryRegionType ("regulatory region type") {
        Promoter = 0,
        Enhancer = 1,
        PromoterFlankingRegion = 2,
        CtcfBindingSite = 3,
        TfBindingSite = 4,
        OpenChromatinRegion = 5,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegulatoryRegion {
    pub ref_index: u16,
    pub start: i32,
    pub end: i32,
    pub id: String,
    pub region_type: RegulatoryRegionType,
}
impl RegulatoryRegion {
    pub(crate) fn encode(&self, buffer: &mut Vec<u8>) -> Result<()> {
        write_i32(buffer, self.start)?;
        write_i32(buffer, self.end)?;
        write_string(buffer, &self.id)?;
        buffer.write_u8(self.region_type as u8)?;
        Ok(())
    }

    pub(crate) fn decode(reader: &mut SliceReader, ref_index: u16) -> Result<Self> {
        Ok(Self {
            ref_index,
            start: reader.read_i32()?,
            end: reader.read_i32()?,
            id: reader.read_string()?,
            region_type: RegulatoryRegionType::try_from(reader.read_u8()?)?,
        })
    }
}
