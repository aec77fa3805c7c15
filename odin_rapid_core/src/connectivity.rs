use std::path::Path;
use crate::errors::{CoreError,Result};

/// one river reach in the connectivity forest, as a row of `rapid_connect.csv`.
#[derive(Debug,Clone)]
pub struct Reach {
    pub rivid: i64,
    /// `0` marks a basin outlet
    pub down_id: i64,
    pub up_ids: Vec<i64>,
}

/// the reach topology of a region: a forest of trees with distinguished outlets (`down_id == 0`),
/// stored as an arena indexed by the connectivity file's row order (not sorted by rivid) — the
/// order `QinitFile` rows must preserve.
#[derive(Debug,Clone)]
pub struct Connectivity {
    reaches: Vec<Reach>,
}

impl Connectivity {
    /// read `rapid_connect.csv`: columns `rivid, down_id, n_up, up_id_1 .. up_id_n` (no header).
    pub fn read_csv (path: impl AsRef<Path>) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)?;

        let mut reaches = Vec::new();
        for rec in reader.records() {
            let rec = rec?;
            let mut fields = rec.iter();

            let rivid: i64 = parse_field(fields.next(), "rivid")?;
            let down_id: i64 = parse_field(fields.next(), "down_id")?;
            let n_up: usize = parse_field(fields.next(), "n_up")?;

            let mut up_ids = Vec::with_capacity(n_up);
            for _ in 0..n_up {
                let up_id: i64 = parse_field(fields.next(), "up_id")?;
                if up_id != 0 {
                    up_ids.push(up_id);
                }
            }

            reaches.push( Reach{ rivid, down_id, up_ids } );
        }

        Ok( Connectivity{ reaches } )
    }

    /// reaches in file (= QinitFile) row order
    pub fn reaches (&self) -> &[Reach] { &self.reaches }

    pub fn len (&self) -> usize { self.reaches.len() }

    pub fn is_empty (&self) -> bool { self.reaches.is_empty() }

    pub fn index_of (&self, rivid: i64) -> Option<usize> {
        self.reaches.iter().position(|r| r.rivid == rivid)
    }

    pub fn reach (&self, rivid: i64) -> Option<&Reach> {
        self.index_of(rivid).map(|i| &self.reaches[i])
    }

    /// the reach immediately downstream of `rivid`, if any and if not an outlet
    pub fn downstream_of (&self, rivid: i64) -> Option<&Reach> {
        let down_id = self.reach(rivid)?.down_id;
        if down_id == 0 { None } else { self.reach(down_id) }
    }

    /// the reaches immediately upstream of `rivid`
    pub fn upstream_of (&self, rivid: i64) -> Vec<&Reach> {
        self.reach(rivid)
            .map(|r| r.up_ids.iter().filter_map(|id| self.reach(*id)).collect())
            .unwrap_or_default()
    }
}

fn parse_field (field: Option<&str>, name: &'static str) -> Result<i64> {
    field
        .ok_or_else(|| CoreError::ConnectivityMalformed( format!("missing {name} field") ))?
        .trim()
        .parse::<i64>()
        .map_err(|_| CoreError::ConnectivityMalformed( format!("non-numeric {name} field") ))
}

impl std::ops::Index<usize> for Connectivity {
    type Output = Reach;
    fn index (&self, i: usize) -> &Reach { &self.reaches[i] }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_csv (contents: &str) -> std::path::PathBuf {
        let mut path = std::env::temp_dir();
        path.push( format!("odin_rapid_connect_test_{}_{}.csv", std::process::id(), contents.len()) );
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn parses_topology_with_up_and_down_ids() {
        // A (up: B,C), B (up: none), C (up: none); A is the outlet
        let csv = "1,0,2,2,3\n2,1,0\n3,1,0\n";
        let path = temp_csv(csv);
        let conn = Connectivity::read_csv(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!( conn.len(), 3);
        let a = conn.reach(1).unwrap();
        assert_eq!( a.down_id, 0);
        assert_eq!( a.up_ids, vec![2,3]);

        let b = conn.reach(2).unwrap();
        assert_eq!( b.down_id, 1);
        assert!( b.up_ids.is_empty() );

        assert!( conn.downstream_of(1).is_none() ); // outlet
        assert_eq!( conn.downstream_of(2).unwrap().rivid, 1);
        assert_eq!( conn.upstream_of(1).iter().map(|r| r.rivid).collect::<Vec<_>>(), vec![2,3]);
    }

    #[test]
    fn preserves_file_row_order_not_rivid_order() {
        let csv = "30,0,0\n10,30,0\n20,30,0\n";
        let path = temp_csv(csv);
        let conn = Connectivity::read_csv(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let order: Vec<i64> = conn.reaches().iter().map(|r| r.rivid).collect();
        assert_eq!( order, vec![30,10,20] );
    }
}
