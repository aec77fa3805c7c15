use std::path::Path;
use chrono::{Datelike,NaiveDate};
use ndarray::Array2;
use odin_rapid_core::Connectivity;
use crate::errors::{AssimError,Result};

/// a multi-year historical file: either an `average_flow(rivid, dayofyear)` table, or a raw
/// Qout this module reduces to one by day-of-year averaging (not yet needed by any scenario in
/// this system, so only the precomputed `average_flow` form is read).
pub struct SeasonalAverage {
    rivid: Vec<i64>,
    average_flow: Array2<f64>,
}

impl SeasonalAverage {
    pub fn read (path: impl AsRef<Path>) -> Result<Self> {
        let file = netcdf::open(path.as_ref())?;

        let rivid_var = file.variable("rivid")
            .ok_or_else(|| AssimError::OpFailed( format!("{:?}: missing rivid variable", path.as_ref()) ))?;
        let rivid: Vec<i64> = rivid_var.get_values(..)?;

        let avg_var = file.variable("average_flow")
            .ok_or_else(|| AssimError::OpFailed( format!("{:?}: missing average_flow variable", path.as_ref()) ))?;
        let raw: ndarray::ArrayD<f64> = avg_var.get_values(..)?;
        let average_flow = raw.into_dimensionality::<ndarray::Ix2>()
            .map_err(|_| AssimError::OpFailed( "average_flow variable is not 2-dimensional (rivid,dayofyear)".into() ))?;

        Ok( SeasonalAverage{ rivid, average_flow } )
    }

    pub fn n_days (&self) -> usize { self.average_flow.ncols() }

    pub fn value_for (&self, rivid: i64, day_index: usize) -> Option<f64> {
        let row = self.rivid.iter().position(|r| *r == rivid)?;
        self.average_flow.get((row, day_index)).copied()
    }
}

fn is_leap_year (year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// the day-of-year index (0-based) the original samples for `date`: its ordinal minus one,
/// shifted back by one if `date`'s year is a leap year and the index already passed Feb 29
/// (index 59) — this keeps a leap year's post-Feb-29 days aligned with the common-year table
/// the original always builds from.
pub fn day_of_year_index (date: NaiveDate) -> usize {
    let mut idx = date.ordinal0() as usize;
    if is_leap_year(date.year()) && idx > 59 {
        idx -= 1;
    }
    idx
}

/// Strategy B: the seasonal-average init flow for each reach, in connectivity row order.
/// Reaches absent from the table receive `0`.
pub fn seasonal_init (date: NaiveDate, seasonal: &SeasonalAverage, connectivity: &Connectivity) -> Vec<f32> {
    let idx = day_of_year_index(date);
    connectivity.reaches().iter()
        .map(|reach| seasonal.value_for(reach.rivid, idx).unwrap_or(0.0) as f32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_leap_year_index_is_ordinal_minus_one() {
        let d = NaiveDate::from_ymd_opt(2021,3,1).unwrap();
        assert_eq!( day_of_year_index(d), 59 ); // Jan(31)+Feb(28) = 59 days before, ordinal0=59
    }

    #[test]
    fn leap_year_shifts_back_one_after_feb_29() {
        let d = NaiveDate::from_ymd_opt(2020,3,1).unwrap(); // ordinal0 = 60 (leap Feb has 29 days)
        assert_eq!( day_of_year_index(d), 59 );
    }

    #[test]
    fn leap_year_before_feb_29_is_unshifted() {
        let d = NaiveDate::from_ymd_opt(2020,2,1).unwrap(); // ordinal0 = 31
        assert_eq!( day_of_year_index(d), 31 );
    }
}
