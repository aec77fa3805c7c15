use std::path::Path;
use odin_rapid_core::{Connectivity,QoutFile};
use crate::errors::Result;

/// write a scratch Qinit file from a segment's terminal discharge state, one value per line in
/// connectivity row order (not sorted by rivid) — the same ordering rule spec.md's QinitFile
/// invariant applies to the persistent per-cycle Qinit. Reaches absent from the segment's Qout
/// rivid set receive `0` (mirrors Strategy A's "reach absent from a member's rivid set ⇒ 0" rule).
pub fn write_segment_qinit (path: impl AsRef<Path>, qout: &QoutFile, connectivity: &Connectivity) -> Result<()> {
    let last_t = qout.n_time().saturating_sub(1);
    let mut out = String::with_capacity(connectivity.len() * 8);

    for reach in connectivity.reaches() {
        let flow = qout.qout_at(reach.rivid, last_t).unwrap_or(0.0);
        out.push_str(&flow.to_string());
        out.push('\n');
    }

    std::fs::write(path, out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn temp_connectivity_csv (contents: &str) -> std::path::PathBuf {
        let mut path = std::env::temp_dir();
        path.push( format!("odin_rapid_member_qinit_conn_{}.csv", std::process::id()) );
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn writes_one_line_per_connectivity_row_in_file_order() {
        let conn_path = temp_connectivity_csv("30,0,0\n10,30,0\n20,30,0\n");
        let conn = Connectivity::read_csv(&conn_path).unwrap();
        std::fs::remove_file(&conn_path).ok();

        let qout = QoutFile {
            rivid: vec![10,20], // 30 is absent from this segment's rivid set
            time: vec![0,3600],
            qout: Array2::from_shape_vec((2,2), vec![1.0,2.0, 3.0,4.0]).unwrap(),
            is_cf: false,
        };

        let out_path = std::env::temp_dir().join( format!("odin_rapid_member_qinit_out_{}.csv", std::process::id()) );
        write_segment_qinit(&out_path, &qout, &conn).unwrap();
        let contents = std::fs::read_to_string(&out_path).unwrap();
        std::fs::remove_file(&out_path).ok();

        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!( lines, vec!["0", "2", "4"] ); // row order: 30 (absent->0), 10, 20
    }
}
