use std::path::Path;
use ndarray::{Array1,Array2};
use odin_rapid_core::{GridResolution,WeightTable};
use crate::errors::{InflowError,Result};
use crate::grid::GridForecast;
use crate::segment::SegmentSelector;

const CLAMP_FLOOR: f64 = 1e-5;

/// raw-index boundaries (inclusive) of the hourly / three-hourly / six-hourly native regions of
/// a grid's cumulative time axis. Adjacent regions share their boundary point, matching the way
/// the upstream forecast resamples its own cadence mid-series.
struct Regions {
    hourly: Option<(usize,usize)>,
    three_hourly: Option<(usize,usize)>,
    six_hourly: (usize,usize),
}

fn regions_for (resolution: GridResolution) -> Regions {
    match resolution {
        GridResolution::HighRes => Regions {
            hourly: Some((0,90)),
            three_hourly: Some((90,108)),
            six_hourly: (108,124),
        },
        GridResolution::LowResFull => Regions {
            hourly: None,
            three_hourly: Some((0,48)),
            six_hourly: (48,84),
        },
        GridResolution::LowRes => Regions {
            hourly: None,
            three_hourly: None,
            six_hourly: (0,60),
        },
    }
}

fn downsample (series: &[f64], bounds: (usize,usize), stride: usize) -> Vec<f64> {
    let (lo,hi) = bounds;
    (lo..=hi).step_by(stride).map(|i| series[i]).collect()
}

fn native (series: &[f64], bounds: (usize,usize)) -> Vec<f64> {
    series[bounds.0..=bounds.1].to_vec()
}

fn diffs (points: &[f64]) -> Vec<f64> {
    points.windows(2).map(|w| w[1] - w[0]).collect()
}

/// select and compose the cumulative-runoff points for `selector` at `resolution`, then convert
/// to incremental (per-segment-timestep) values.
fn segment_increments (cum: &[f64], resolution: GridResolution, selector: SegmentSelector) -> Result<Vec<f64>> {
    let r = regions_for(resolution);

    let points: Vec<f64> = match (resolution, selector) {
        (GridResolution::HighRes, SegmentSelector::OneHr) => {
            native(cum, r.hourly.unwrap())
        }
        (GridResolution::HighRes, SegmentSelector::ThreeHr) => {
            let mut pts = downsample(cum, r.hourly.unwrap(), 3);
            pts.extend_from_slice( &native(cum, r.three_hourly.unwrap())[1..] );
            pts
        }
        (GridResolution::HighRes, SegmentSelector::ThreeHrSubset) => {
            native(cum, r.three_hourly.unwrap())
        }
        (GridResolution::HighRes, SegmentSelector::SixHr) | (GridResolution::HighRes, SegmentSelector::DefaultSixHr) => {
            let mut pts = downsample(cum, r.hourly.unwrap(), 6);
            pts.extend_from_slice( &downsample(cum, r.three_hourly.unwrap(), 2)[1..] );
            pts.extend_from_slice( &native(cum, r.six_hourly)[1..] );
            pts
        }
        (GridResolution::HighRes, SegmentSelector::SixHrSubset) => {
            native(cum, r.six_hourly)
        }

        (GridResolution::LowResFull, SegmentSelector::ThreeHrSubset) => {
            native(cum, r.three_hourly.unwrap())
        }
        (GridResolution::LowResFull, SegmentSelector::SixHrSubset) => {
            native(cum, r.six_hourly)
        }
        (GridResolution::LowResFull, SegmentSelector::DefaultSixHr) => {
            let mut pts = downsample(cum, r.three_hourly.unwrap(), 2);
            pts.extend_from_slice( &native(cum, r.six_hourly)[1..] );
            pts
        }

        (GridResolution::LowRes, SegmentSelector::DefaultSixHr) => {
            native(cum, r.six_hourly)
        }

        _ => return Err( InflowError::OpFailed( format!(
            "segment selector {selector:?} is not defined for resolution {resolution:?}") ) ),
    };

    let expected = selector.for_resolution(resolution)?;
    let out = diffs(&points);
    if out.len() != expected {
        return Err( InflowError::OpFailed( format!(
            "segment composition produced {} increments, expected {expected}", out.len()) ) )
    }

    Ok(out)
}

/// convert a gridded runoff forecast into per-reach lateral inflow, following the precomputed
/// area-weight table. Returns `(rivid, m3_riv)` pairs in weight-table group order.
pub fn build_inflow (
    grid: &GridForecast,
    weights: &WeightTable,
    selector: SegmentSelector,
) -> Result<(Vec<i64>, Array2<f64>)> {
    let slab = grid.read_runoff_slab()?;
    let out_len = selector.for_resolution(grid.resolution)?;

    let mut rivids = Vec::with_capacity(weights.n_reaches());
    let mut m3_riv = Array2::<f64>::zeros((weights.n_reaches(), out_len));

    for (row, group) in weights.groups.iter().enumerate() {
        rivids.push(group.stream_id);
        let mut sum = Array1::<f64>::zeros(out_len);

        for cell in &group.cells {
            let raw: Vec<f64> = (0..grid.time_len)
                .map(|t| {
                    let v = slab[[t, cell.lat_index, cell.lon_index]];
                    if v.abs() < CLAMP_FLOOR { 0.0 } else { v }
                })
                .collect();

            let incr = segment_increments(&raw, grid.resolution, selector)?;
            for (i,v) in incr.into_iter().enumerate() {
                sum[i] += v * cell.area_sqm;
            }
        }

        sum.mapv_inplace(|v| v.max(0.0)); // clamp negative increments (step 5)
        m3_riv.row_mut(row).assign(&sum);
    }

    Ok((rivids, m3_riv))
}

/// write an InflowSeries NetCDF with dimensions `(Time, rivid)` and variable `m3_riv`
pub fn write_inflow_series (path: impl AsRef<Path>, rivids: &[i64], m3_riv: &Array2<f64>) -> Result<()> {
    let n_rivid = rivids.len();
    let n_time = m3_riv.ncols();

    let mut file = netcdf::create(path)?;
    file.add_dimension("rivid", n_rivid)?;
    file.add_dimension("Time", n_time)?;

    let mut rivid_var = file.add_variable::<i64>("rivid", &["rivid"])?;
    rivid_var.put_values(rivids, ..)?;

    let mut m3_var = file.add_variable::<f64>("m3_riv", &["Time","rivid"])?;
    let transposed = m3_riv.t().as_standard_layout().to_owned();
    m3_var.put_values(transposed.as_slice().unwrap(), ..)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cumulative_ramp (n: usize) -> Vec<f64> {
        (0..n).map(|t| t as f64).collect()
    }

    #[test]
    fn one_hr_segment_has_90_unit_increments() {
        let cum = cumulative_ramp(125);
        let incr = segment_increments(&cum, GridResolution::HighRes, SegmentSelector::OneHr).unwrap();
        assert_eq!( incr.len(), 90);
        assert!( incr.iter().all(|&v| (v - 1.0).abs() < 1e-9) );
    }

    #[test]
    fn three_hr_segment_concatenates_downsampled_and_native() {
        let cum = cumulative_ramp(125);
        let incr = segment_increments(&cum, GridResolution::HighRes, SegmentSelector::ThreeHr).unwrap();
        assert_eq!( incr.len(), 48);
        assert!( incr.iter().all(|&v| (v - 3.0).abs() < 1e-9) );
    }

    #[test]
    fn six_hr_segment_has_40_six_hour_increments() {
        let cum = cumulative_ramp(125);
        let incr = segment_increments(&cum, GridResolution::HighRes, SegmentSelector::SixHr).unwrap();
        assert_eq!( incr.len(), 40);
        assert!( incr.iter().all(|&v| (v - 6.0).abs() < 1e-9) );
    }

    #[test]
    fn low_res_full_default_has_60_increments() {
        let cum = cumulative_ramp(85);
        let incr = segment_increments(&cum, GridResolution::LowResFull, SegmentSelector::DefaultSixHr).unwrap();
        assert_eq!( incr.len(), 60);
    }

    #[test]
    fn low_res_default_has_60_increments() {
        let cum = cumulative_ramp(61);
        let incr = segment_increments(&cum, GridResolution::LowRes, SegmentSelector::DefaultSixHr).unwrap();
        assert_eq!( incr.len(), 60);
        assert!( incr.iter().all(|&v| (v - 1.0).abs() < 1e-9) );
    }

    #[test]
    fn negative_increments_are_clamped_to_zero() {
        // a cumulative series that dips (upstream rounding artifact)
        let cum: Vec<f64> = vec![0.0,1.0,0.5].into_iter().chain((3..61).map(|t| t as f64)).collect();
        let incr = segment_increments(&cum, GridResolution::LowRes, SegmentSelector::DefaultSixHr).unwrap();
        // step 5 clamping happens in build_inflow, not segment_increments; verify the raw dip is visible here
        assert!( incr[1] < 0.0 );
    }
}
