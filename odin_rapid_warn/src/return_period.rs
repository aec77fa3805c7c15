use std::path::Path;
use crate::errors::{WarnError,Result};

/// one reach's return-period thresholds and geolocation, as read from `return_period*.nc`.
#[derive(Debug,Clone,Copy)]
pub struct ReturnPeriods {
    pub return_2: f64,
    pub return_10: f64,
    pub return_20: f64,
    pub lat: f64,
    pub lon: f64,
}

impl ReturnPeriods {
    /// the floor rule (spec step 2): if `return_20` is below the minimum flow threshold `tau`,
    /// replace the whole triple with `(tau, 5*tau, 10*tau)` — a floor scaling that preserves
    /// tier ordering for otherwise-quiescent reaches.
    pub fn with_floor (self, tau: f64) -> Self {
        if self.return_20 < tau {
            ReturnPeriods{ return_2: tau, return_10: tau * 5.0, return_20: tau * 10.0, ..self }
        } else {
            self
        }
    }
}

/// the per-region `return_period*.nc` table: `rivid`, `return_period_{2,10,20}`, `lat`, `lon`.
pub struct ReturnPeriodTable {
    rivid: Vec<i64>,
    values: Vec<ReturnPeriods>,
}

impl ReturnPeriodTable {
    pub fn read (path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = netcdf::open(path)?;

        let rivid: Vec<i64> = read_i64(&file, "rivid", path)?;
        let r2: Vec<f64> = read_f64(&file, "return_period_2", path)?;
        let r10: Vec<f64> = read_f64(&file, "return_period_10", path)?;
        let r20: Vec<f64> = read_f64(&file, "return_period_20", path)?;
        let lat: Vec<f64> = read_f64(&file, "lat", path)?;
        let lon: Vec<f64> = read_f64(&file, "lon", path)?;

        let values = (0..rivid.len()).map(|i| ReturnPeriods{
            return_2: r2[i], return_10: r10[i], return_20: r20[i], lat: lat[i], lon: lon[i],
        }).collect();

        Ok( ReturnPeriodTable{ rivid, values } )
    }

    pub fn get (&self, rivid: i64) -> Option<ReturnPeriods> {
        self.rivid.iter().position(|r| *r == rivid).map(|i| self.values[i])
    }
}

fn read_i64 (file: &netcdf::File, name: &str, path: &Path) -> Result<Vec<i64>> {
    let var = file.variable(name).ok_or_else(|| WarnError::OpFailed( format!("{path:?}: missing {name}") ))?;
    Ok( var.get_values(..)? )
}

fn read_f64 (file: &netcdf::File, name: &str, path: &Path) -> Result<Vec<f64>> {
    let var = file.variable(name).ok_or_else(|| WarnError::OpFailed( format!("{path:?}: missing {name}") ))?;
    Ok( var.get_values(..)? )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_rule_scales_when_return_20_below_threshold() {
        let rp = ReturnPeriods{ return_2: 0.5, return_10: 1.0, return_20: 2.0, lat: 0.0, lon: 0.0 };
        let floored = rp.with_floor(5.0);
        assert_eq!( floored.return_2, 5.0 );
        assert_eq!( floored.return_10, 25.0 );
        assert_eq!( floored.return_20, 50.0 );
    }

    #[test]
    fn floor_rule_is_noop_above_threshold() {
        let rp = ReturnPeriods{ return_2: 10.0, return_10: 50.0, return_20: 100.0, lat: 0.0, lon: 0.0 };
        let unchanged = rp.with_floor(5.0);
        assert_eq!( unchanged.return_20, 100.0 );
    }
}
