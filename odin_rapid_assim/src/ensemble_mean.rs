use odin_rapid_core::{Connectivity,EnsembleMember,QoutFile};
use tracing::warn;

/// one ensemble member's routed discharge, paired with the member index the sample-index rule
/// needs (the rule is keyed on whether this is the high-resolution member, not on any other
/// per-file property).
pub struct MemberQout {
    pub member: EnsembleMember,
    pub qout: QoutFile,
}

/// the time index Strategy A samples from a member's Qout, taken from
/// `compute_init_flows_from_past_forecast`: raw (non-CF) kernel output always samples index 1;
/// CF output samples index 12 for the high-resolution member's full 125-length series (and 4 for
/// any other member's full 85-length series), falling back to index 2 otherwise.
pub fn sample_index (member: EnsembleMember, time_length: usize, is_cf: bool) -> usize {
    if !is_cf {
        return 1;
    }
    if member.is_high_res() {
        if time_length == 125 { 12 } else { 2 }
    } else if time_length == 85 {
        4
    } else {
        2
    }
}

/// Strategy A: average each reach's discharge at its member-dependent sample index across all
/// members, in connectivity row order. A member missing the reach, or whose sample index falls
/// outside its time axis, contributes `0` to the sum but still counts toward the divisor — the
/// same behavior as the original's zero-initialized prediction array.
pub fn ensemble_mean (members: &[MemberQout], connectivity: &Connectivity) -> Vec<f32> {
    let n = members.len().max(1) as f32;

    connectivity.reaches().iter().map(|reach| {
        let sum: f32 = members.iter().map(|mq| {
            let idx = sample_index(mq.member, mq.qout.n_time(), mq.qout.is_cf);
            if idx >= mq.qout.n_time() {
                warn!("member {} sample index {idx} out of range for a {}-length series", mq.member, mq.qout.n_time());
                return 0.0;
            }
            mq.qout.qout_at(reach.rivid, idx).unwrap_or(0.0)
        }).sum();
        sum / n
    }).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn member_qout (member_index: u32, rivid: Vec<i64>, n_time: usize, is_cf: bool, fill: f32) -> MemberQout {
        let n_riv = rivid.len();
        MemberQout {
            member: EnsembleMember::new(member_index).unwrap(),
            qout: QoutFile { rivid, time: vec![0; n_time], qout: Array2::from_elem((n_riv,n_time), fill), is_cf },
        }
    }

    fn connectivity_with (rivids: &[i64]) -> Connectivity {
        let csv: String = rivids.iter().map(|r| format!("{r},0,0\n")).collect();
        let mut path = std::env::temp_dir();
        path.push( format!("odin_rapid_assim_ens_mean_test_{}.csv", std::process::id()) );
        std::fs::write(&path, csv).unwrap();
        let conn = Connectivity::read_csv(&path).unwrap();
        std::fs::remove_file(&path).ok();
        conn
    }

    #[test]
    fn high_res_125_samples_index_12() {
        assert_eq!( sample_index( EnsembleMember::new(52).unwrap(), 125, true), 12);
        assert_eq!( sample_index( EnsembleMember::new(52).unwrap(), 85, true), 2);
        assert_eq!( sample_index( EnsembleMember::new(1).unwrap(), 85, true), 4);
        assert_eq!( sample_index( EnsembleMember::new(1).unwrap(), 125, true), 2);
        assert_eq!( sample_index( EnsembleMember::new(1).unwrap(), 61, false), 1);
    }

    #[test]
    fn averages_across_members_with_absent_reach_as_zero() {
        let conn = connectivity_with(&[10,20]);
        let members = vec![
            member_qout(1, vec![10,20], 85, true, 4.0), // index4 -> value 4.0
            member_qout(2, vec![10], 85, true, 6.0),    // reach 20 absent -> contributes 0
        ];
        let means = ensemble_mean(&members, &conn);
        assert_eq!( means, vec![5.0, 2.0] ); // reach10: (4+6)/2=5; reach20: (4+0)/2=2
    }
}
