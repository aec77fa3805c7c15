use std::collections::BTreeMap;
use chrono::{DateTime,NaiveDate,Utc};
use ndarray::Array2;
use odin_rapid_core::QoutFile;
use crate::errors::{WarnError,Result};

/// daily-peak ensemble statistics for one cycle × region: `mean`, `std`, `max`, and
/// `std_upper = min(mean+std, max)`, per reach per calendar day, matching
/// `generate_ecmwf_warning_points`'s `resample('D').max()` → `mean`/`std`/`max` across the
/// `ensemble` dimension.
pub struct DailyPeaks {
    pub dates: Vec<NaiveDate>,
    pub rivid: Vec<i64>,
    pub mean: Array2<f32>,
    pub std: Array2<f32>,
    pub max: Array2<f32>,
    pub std_upper: Array2<f32>,
}

fn day_of (epoch_seconds: i64) -> NaiveDate {
    DateTime::<Utc>::from_timestamp(epoch_seconds, 0)
        .expect("valid CF timestamp")
        .date_naive()
}

/// groups of contiguous time-axis indices sharing a calendar day, in ascending date order.
fn day_groups (time: &[i64]) -> Vec<(NaiveDate, std::ops::Range<usize>)> {
    let mut groups: Vec<(NaiveDate, std::ops::Range<usize>)> = Vec::new();
    for (i, &t) in time.iter().enumerate() {
        let d = day_of(t);
        match groups.last_mut() {
            Some((last_d, range)) if *last_d == d => range.end = i + 1,
            _ => groups.push((d, i..i+1)),
        }
    }
    groups
}

/// per-member daily maxima: `(rivid, day)` where `day` indexes the member's own date sequence.
struct MemberDailyMax {
    dates: Vec<NaiveDate>,
    values: Array2<f32>, // (rivid, day)
}

fn member_daily_max (qout: &QoutFile) -> MemberDailyMax {
    let groups = day_groups(&qout.time);
    let n_riv = qout.n_rivid();
    let mut values = Array2::<f32>::zeros((n_riv, groups.len()));

    for (row, _) in qout.rivid.iter().enumerate() {
        for (col, (_, range)) in groups.iter().enumerate() {
            let m = qout.qout.row(row).slice(ndarray::s![range.clone()])
                .iter().cloned().fold(f32::MIN, f32::max);
            values[[row,col]] = m;
        }
    }

    MemberDailyMax{ dates: groups.into_iter().map(|(d,_)| d).collect(), values }
}

/// compute ensemble daily-peak statistics across all members. Members must agree on rivid order
/// (the canonical CF Qout layout already guarantees this within one cycle × region).
pub fn daily_peak_stats (members: &[QoutFile]) -> Result<DailyPeaks> {
    let first = members.first().ok_or_else(|| WarnError::OpFailed("no member Qouts to analyze".into()))?;
    let rivid = first.rivid.clone();
    for m in members {
        if m.rivid != rivid {
            return Err( WarnError::OpFailed("member Qouts disagree on rivid order".into()) )
        }
    }

    let per_member: Vec<MemberDailyMax> = members.iter().map(member_daily_max).collect();

    let mut dates: Vec<NaiveDate> = per_member.iter().flat_map(|m| m.dates.iter().copied()).collect();
    dates.sort_unstable();
    dates.dedup();

    let n_riv = rivid.len();
    let n_days = dates.len();
    let mut mean = Array2::<f32>::zeros((n_riv, n_days));
    let mut std = Array2::<f32>::zeros((n_riv, n_days));
    let mut max = Array2::<f32>::zeros((n_riv, n_days));
    let mut std_upper = Array2::<f32>::zeros((n_riv, n_days));

    // index each member's days by date for lookup
    let member_day_index: Vec<BTreeMap<NaiveDate,usize>> = per_member.iter()
        .map(|m| m.dates.iter().enumerate().map(|(i,d)| (*d,i)).collect())
        .collect();

    for row in 0..n_riv {
        for (col, date) in dates.iter().enumerate() {
            let samples: Vec<f32> = per_member.iter().zip(member_day_index.iter())
                .filter_map(|(m, idx)| idx.get(date).map(|&day_idx| m.values[[row,day_idx]]))
                .collect();

            if samples.is_empty() {
                continue;
            }

            let n = samples.len() as f32;
            let m = samples.iter().sum::<f32>() / n;
            let variance = samples.iter().map(|v| (v-m)*(v-m)).sum::<f32>() / n;
            let s = variance.sqrt();
            let mx = samples.iter().cloned().fold(f32::MIN, f32::max);

            mean[[row,col]] = m;
            std[[row,col]] = s;
            max[[row,col]] = mx;
            std_upper[[row,col]] = (m + s).min(mx);
        }
    }

    Ok( DailyPeaks{ dates, rivid, mean, std, max, std_upper } )
}
