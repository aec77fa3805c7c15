use ndarray::{Array2,concatenate,Axis};
use odin_rapid_core::{Cycle,QoutFile,ReachLocation,write_cf_qout};
use crate::errors::{MemberError,Result};
use crate::locations::LocationLookup;

/// one segment's contribution to the merged series: its Qout and the cadence (hours) at which
/// it was routed, used to place its samples on the absolute time axis.
pub struct MergeSegment {
    pub qout: QoutFile,
    pub dt_hours: i64,
}

/// concatenate segment Qouts along time (native order: finest cadence first), producing the
/// canonical CF time axis (seconds since 1970-01-01 UTC, strictly monotonic, step `k` of a
/// segment sampled `base_hour + k*dt_hours` after the cycle start). Lat/lon/z are attached
/// separately by [`write_merged`].
pub fn merge_segments (cycle: &Cycle, segments: &[MergeSegment]) -> Result<(Vec<i64>,Vec<i64>,Array2<f32>)> {
    let rivid = segments.first()
        .ok_or_else(|| MemberError::op_failed_static("no segments to merge"))?
        .qout.rivid.clone();

    for seg in segments {
        if seg.qout.rivid != rivid {
            return Err( MemberError::op_failed_static("segment Qouts disagree on rivid order") )
        }
    }

    let cycle_start = cycle.date.and_hms_opt(cycle.hour as u32, 0, 0)
        .ok_or_else(|| MemberError::op_failed_static("invalid cycle hour"))?
        .and_utc()
        .timestamp();

    let mut time = Vec::new();
    let mut base_hour: i64 = 0;
    let mut views = Vec::with_capacity(segments.len());

    for seg in segments {
        let n = seg.qout.n_time();
        for k in 1..=n as i64 {
            time.push( cycle_start + (base_hour + k*seg.dt_hours) * 3600 );
        }
        base_hour += n as i64 * seg.dt_hours;
        views.push(seg.qout.qout.view());
    }

    let merged = concatenate(Axis(1), &views)
        .map_err(|e| MemberError::op_failed( format!("time-axis concatenation failed: {e}") ))?;

    for w in time.windows(2) {
        if w[1] <= w[0] {
            return Err( MemberError::op_failed_static("merged time axis is not strictly increasing") )
        }
    }

    Ok((rivid, time, merged))
}

/// write the merged series as the canonical CF-compliant Qout.
pub fn write_merged (path: impl AsRef<std::path::Path>, rivid: &[i64], time: &[i64], qout: &Array2<f32>, locations: &LocationLookup) -> Result<()> {
    let locs: Vec<ReachLocation> = rivid.iter().map(|r| locations.get(*r)).collect();
    write_cf_qout(path, rivid, time, qout, &locs)?;
    Ok(())
}

impl MemberError {
    fn op_failed_static (msg: &'static str) -> Self { MemberError::OpFailed(msg.to_string()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;
    use chrono::NaiveDate;

    fn qout (rivid: Vec<i64>, n_time: usize, val: f32) -> QoutFile {
        let n_riv = rivid.len();
        QoutFile { rivid, time: vec![0; n_time], qout: Array2::from_elem((n_riv,n_time), val), is_cf: false }
    }

    #[test]
    fn concatenates_segments_with_monotonic_time() {
        let cycle = Cycle::new( NaiveDate::from_ymd_opt(2020,1,1).unwrap(), 0).unwrap();
        let segs = vec![
            MergeSegment{ qout: qout(vec![1,2], 3, 1.0), dt_hours: 1 }, // hours 1,2,3
            MergeSegment{ qout: qout(vec![1,2], 2, 3.0), dt_hours: 3 },   // hours 6,9 (base carried from 3)
        ];
        let (rivid, time, merged) = merge_segments(&cycle, &segs).unwrap();
        assert_eq!( rivid, vec![1,2] );
        assert_eq!( time.len(), 5 );
        assert_eq!( merged.ncols(), 5 );
        for w in time.windows(2) { assert!( w[1] > w[0] ); }
    }

    #[test]
    fn rejects_mismatched_rivid_sets() {
        let cycle = Cycle::new( NaiveDate::from_ymd_opt(2020,1,1).unwrap(), 0).unwrap();
        let segs = vec![
            MergeSegment{ qout: qout(vec![1,2], 2, 1.0), dt_hours: 1 },
            MergeSegment{ qout: qout(vec![1,3], 2, 1.0), dt_hours: 3 },
        ];
        assert!( merge_segments(&cycle, &segs).is_err() );
    }
}
