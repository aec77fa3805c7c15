use std::fmt;
use std::cmp::Ordering;
use chrono::{NaiveDate,Duration};
use serde::{Serialize,Deserialize};
use crate::errors::{CoreError,Result};

/// a scheduled forecast issuance `(issue_date, issue_hour)`, issued at 00Z or 12Z.
#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash,Serialize,Deserialize)]
pub struct Cycle {
    pub date: NaiveDate,
    pub hour: u8,
}

impl Cycle {
    pub fn new (date: NaiveDate, hour: u8) -> Result<Self> {
        if hour == 0 || hour == 12 {
            Ok( Cycle{ date, hour } )
        } else {
            Err( CoreError::InvalidCycle( format!("{date} {hour:02}") ) )
        }
    }

    /// parse the canonical textual form `YYYYMMDD.H` (e.g. `20200101.0`, `20200101.12`)
    pub fn parse_canonical (s: &str) -> Result<Self> {
        let (d,h) = s.split_once('.').ok_or_else(|| CoreError::InvalidCycle(s.to_string()))?;
        let date = NaiveDate::parse_from_str(d, "%Y%m%d").map_err(|_| CoreError::InvalidCycle(s.to_string()))?;
        let hour: u8 = h.parse().map_err(|_| CoreError::InvalidCycle(s.to_string()))?;
        Cycle::new(date, hour)
    }

    /// parse an upstream release folder name of the form `Runoff.YYYYMMDD.H[.suffix]*.netcdf.tar[.gz]?`
    pub fn parse_release_folder (name: &str) -> Result<Self> {
        let rest = name.strip_prefix("Runoff.").ok_or_else(|| CoreError::InvalidCycle(name.to_string()))?;
        let mut it = rest.split('.');
        let d = it.next().ok_or_else(|| CoreError::InvalidCycle(name.to_string()))?;
        let h = it.next().ok_or_else(|| CoreError::InvalidCycle(name.to_string()))?;
        let date = NaiveDate::parse_from_str(d, "%Y%m%d").map_err(|_| CoreError::InvalidCycle(name.to_string()))?;
        let hour: u8 = h.parse().map_err(|_| CoreError::InvalidCycle(name.to_string()))?;
        Cycle::new(date, hour)
    }

    /// parse the lockfile's `YYYYMMDDHH` form
    pub fn parse_lockfile_form (s: &str) -> Result<Self> {
        if s.len() != 10 {
            return Err( CoreError::InvalidCycle(s.to_string()) )
        }
        let date = NaiveDate::parse_from_str(&s[0..8], "%Y%m%d").map_err(|_| CoreError::InvalidCycle(s.to_string()))?;
        let hour: u8 = s[8..10].parse().map_err(|_| CoreError::InvalidCycle(s.to_string()))?;
        Cycle::new(date, hour)
    }

    /// the canonical textual form `YYYYMMDD.H`
    pub fn canonical (&self) -> String {
        format!("{}.{}", self.date.format("%Y%m%d"), self.hour)
    }

    /// the lockfile's `YYYYMMDDHH` form
    pub fn lockfile_form (&self) -> String {
        format!("{}{:02}", self.date.format("%Y%m%d"), self.hour)
    }

    /// the cycle that begins exactly 12 hours after this one
    pub fn next (&self) -> Self {
        if self.hour == 0 {
            Cycle{ date: self.date, hour: 12 }
        } else {
            Cycle{ date: self.date + Duration::days(1), hour: 0 }
        }
    }
}

impl PartialOrd for Cycle {
    fn partial_cmp (&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for Cycle {
    fn cmp (&self, other: &Self) -> Ordering {
        (self.date, self.hour).cmp( &(other.date, other.hour) )
    }
}

impl fmt::Display for Cycle {
    fn fmt (&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.canonical()) }
}

/// integer ensemble index ∈ [1,52]. 1..=51 are low-resolution perturbed members; 52 is the
/// deterministic high-resolution member.
#[derive(Debug,Clone,Copy,PartialEq,Eq,PartialOrd,Ord,Hash,Serialize,Deserialize)]
pub struct EnsembleMember(u8);

impl EnsembleMember {
    pub const HIGH_RES_INDEX: u8 = 52;

    pub fn new (index: u32) -> Result<Self> {
        if (1..=52).contains(&index) {
            Ok( EnsembleMember(index as u8) )
        } else {
            Err( CoreError::InvalidMember(index) )
        }
    }

    pub fn index (&self) -> u8 { self.0 }

    pub fn is_high_res (&self) -> bool { self.0 == Self::HIGH_RES_INDEX }
}

impl fmt::Display for EnsembleMember {
    fn fmt (&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

/// the three temporal resolutions ECMWF grid forecasts come in, distinguished by the unique
/// set of successive time-axis deltas (in hours).
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum GridResolution {
    /// 91 one-hour points, then 18 three-hour, then 15 six-hour (125 total); deltas {1,3,6}
    HighRes,
    /// 49 three-hour points, then 36 six-hour (85 total); deltas {3,6}
    LowResFull,
    /// 61 six-hour points; deltas {6}
    LowRes,
}

impl GridResolution {
    /// classify a grid from its time-axis length and the unique set of successive deltas (hours)
    pub fn classify (time_len: usize, deltas: &[i64]) -> Result<Self> {
        let mut uniq: Vec<i64> = deltas.to_vec();
        uniq.sort_unstable();
        uniq.dedup();

        match uniq.as_slice() {
            [1,3,6] if time_len == 125 => Ok(GridResolution::HighRes),
            [3,6] if time_len == 85 => Ok(GridResolution::LowResFull),
            [6] if time_len == 61 => Ok(GridResolution::LowRes),
            _ => Err( CoreError::OpFailed( format!(
                "cannot classify grid resolution: time_len={time_len} deltas={uniq:?}") ) ),
        }
    }

    pub fn time_len (&self) -> usize {
        match self {
            GridResolution::HighRes => 125,
            GridResolution::LowResFull => 85,
            GridResolution::LowRes => 61,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_cycle_rolls_over_midnight() {
        let c0 = Cycle::new( NaiveDate::from_ymd_opt(2020,1,1).unwrap(), 0).unwrap();
        let c12 = c0.next();
        assert_eq!( c12.hour, 12);
        assert_eq!( c12.date, c0.date);

        let c_next_day = c12.next();
        assert_eq!( c_next_day.hour, 0);
        assert_eq!( c_next_day.date, c0.date + Duration::days(1));
    }

    #[test]
    fn canonical_and_lockfile_forms_roundtrip() {
        let c = Cycle::new( NaiveDate::from_ymd_opt(2020,1,1).unwrap(), 12).unwrap();
        assert_eq!( c.canonical(), "20200101.12");
        assert_eq!( Cycle::parse_canonical("20200101.12").unwrap(), c);

        assert_eq!( c.lockfile_form(), "2020010112");
        assert_eq!( Cycle::parse_lockfile_form("2020010112").unwrap(), c);
    }

    #[test]
    fn parses_release_folder_names() {
        let c = Cycle::parse_release_folder("Runoff.20200101.0.netcdf.tar.gz").unwrap();
        assert_eq!( c.date, NaiveDate::from_ymd_opt(2020,1,1).unwrap());
        assert_eq!( c.hour, 0);
    }

    #[test]
    fn rejects_non_synoptic_hour() {
        assert!( Cycle::new( NaiveDate::from_ymd_opt(2020,1,1).unwrap(), 6).is_err() );
    }

    #[test]
    fn classifies_grid_resolution() {
        assert_eq!( GridResolution::classify(125, &[1,3,6]).unwrap(), GridResolution::HighRes );
        assert_eq!( GridResolution::classify(85, &[3,6]).unwrap(), GridResolution::LowResFull );
        assert_eq!( GridResolution::classify(61, &[6]).unwrap(), GridResolution::LowRes );
        assert!( GridResolution::classify(61, &[1,6]).is_err() );
    }

    #[test]
    fn member_high_res_is_52() {
        let m = EnsembleMember::new(52).unwrap();
        assert!( m.is_high_res() );
        assert!( !EnsembleMember::new(1).unwrap().is_high_res() );
        assert!( EnsembleMember::new(0).is_err() );
        assert!( EnsembleMember::new(53).is_err() );
    }
}
