use odin_rapid_core::GridResolution;
use crate::errors::{InflowError,Result};

/// which temporal segment of a grid's runoff series to aggregate into lateral inflow.
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum SegmentSelector {
    OneHr,
    ThreeHr,
    ThreeHrSubset,
    SixHr,
    SixHrSubset,
    /// `60 x 6h` for LowRes/LowResFull, `40 x 6h` for HighRes
    DefaultSixHr,
}

impl SegmentSelector {
    /// output `Time` length for this selector at the given grid resolution, per the
    /// resolution/selector compatibility table; `None` if the combination is not defined.
    pub fn output_len (&self, resolution: GridResolution) -> Option<usize> {
        use GridResolution::*;
        use SegmentSelector::*;
        match (resolution, self) {
            (HighRes, OneHr) => Some(90),
            (HighRes, ThreeHr) => Some(48),
            (HighRes, ThreeHrSubset) => Some(18),
            (HighRes, SixHr) => Some(40),
            (HighRes, SixHrSubset) => Some(16),
            (HighRes, DefaultSixHr) => Some(40),

            (LowResFull, ThreeHrSubset) => Some(48),
            (LowResFull, SixHrSubset) => Some(36),
            (LowResFull, DefaultSixHr) => Some(60),

            (LowRes, DefaultSixHr) => Some(60),

            _ => None,
        }
    }

    pub fn for_resolution (&self, resolution: GridResolution) -> Result<usize> {
        self.output_len(resolution).ok_or_else(|| InflowError::OpFailed( format!(
            "segment selector {self:?} is not defined for resolution {resolution:?}") ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use GridResolution::*;
    use SegmentSelector::*;

    #[test]
    fn matches_resolution_selector_table() {
        assert_eq!( OneHr.output_len(HighRes), Some(90) );
        assert_eq!( ThreeHr.output_len(HighRes), Some(48) );
        assert_eq!( ThreeHrSubset.output_len(HighRes), Some(18) );
        assert_eq!( SixHr.output_len(HighRes), Some(40) );
        assert_eq!( DefaultSixHr.output_len(HighRes), Some(40) );
        assert_eq!( SixHrSubset.output_len(HighRes), Some(16) );

        assert_eq!( ThreeHrSubset.output_len(LowResFull), Some(48) );
        assert_eq!( SixHrSubset.output_len(LowResFull), Some(36) );
        assert_eq!( DefaultSixHr.output_len(LowResFull), Some(60) );

        assert_eq!( DefaultSixHr.output_len(LowRes), Some(60) );
        assert_eq!( OneHr.output_len(LowRes), None );
    }
}
