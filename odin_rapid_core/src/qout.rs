use std::path::Path;
use ndarray::Array2;
use crate::errors::{CoreError,Result};

/// CF-compliant epoch for the `time` variable: seconds since 1970-01-01 UTC.
pub const UNIX_EPOCH_UNITS: &str = "seconds since 1970-01-01 00:00:00 UTC";

/// one routed-discharge output, read back from either layout the kernel may produce:
/// `(rivid,time)` (CF-compliant) or `(time,rivid)` (raw kernel output).
#[derive(Debug,Clone)]
pub struct QoutFile {
    pub rivid: Vec<i64>,
    /// seconds since 1970-01-01 UTC; strictly monotonic per spec.md's CF time axis invariant
    pub time: Vec<i64>,
    /// always stored `(rivid,time)` regardless of the file's on-disk layout
    pub qout: Array2<f32>,
    pub is_cf: bool,
}

impl QoutFile {
    pub fn n_rivid (&self) -> usize { self.rivid.len() }
    pub fn n_time (&self) -> usize { self.time.len() }

    /// the row index of `rivid` in this file's rivid axis, if present
    pub fn index_of (&self, rivid: i64) -> Option<usize> {
        self.rivid.iter().position(|r| *r == rivid)
    }

    /// discharge for `rivid` at 0-based time index `t`, `None` if `rivid` is absent
    pub fn qout_at (&self, rivid: i64, t: usize) -> Option<f32> {
        self.index_of(rivid).map(|row| self.qout[[row,t]])
    }

    /// open and read a Qout file, detecting the `(rivid,time)` vs `(time,rivid)` layout from
    /// the `Qout` variable's declared dimension order.
    pub fn read (path: impl AsRef<Path>) -> Result<Self> {
        let file = netcdf::open(path)?;

        let rivid: Vec<i64> = file.variable("rivid")
            .ok_or_else(|| CoreError::OpFailed("Qout file has no rivid variable".into()))?
            .get_values(..)?;

        let time: Vec<i64> = file.variable("time")
            .map(|v| v.get_values(..))
            .transpose()?
            .unwrap_or_default();
        let is_cf = !time.is_empty();

        let var = file.variable("Qout")
            .ok_or_else(|| CoreError::OpFailed("Qout file has no Qout variable".into()))?;
        let dim_names: Vec<String> = var.dimensions().iter().map(|d| d.name().to_string()).collect();
        let raw: ndarray::ArrayD<f32> = var.get_values(..)?;
        let arr2 = raw.into_dimensionality::<ndarray::Ix2>()
            .map_err(|_| CoreError::OpFailed("Qout variable is not 2-dimensional".into()))?;

        let qout = if dim_names.first().map(String::as_str) == Some("time") {
            arr2.t().as_standard_layout().to_owned()
        } else {
            arr2
        };

        let time = if time.len() == qout.ncols() { time } else { vec![0; qout.ncols()] };

        Ok( QoutFile{ rivid, time, qout, is_cf } )
    }
}

/// geolocation attributes for one reach, as looked up from an optional `comid_lat_lon_z*.csv`.
#[derive(Debug,Clone,Copy,Default)]
pub struct ReachLocation {
    pub lat: f64,
    pub lon: f64,
    pub z: f64,
}

/// write the canonical CF-compliant Qout: dims `rivid,time`; variables `rivid:i32`,
/// `time:i32` (seconds since epoch), `lat:f64`, `lon:f64`, `z:f64`, `Qout:f32`, scalar
/// `crs:i32` (EPSG:4269); global attributes `Conventions=CF-1.6`, `featureType=timeSeries`.
pub fn write_cf_qout (
    path: impl AsRef<Path>,
    rivid: &[i64],
    time: &[i64],
    qout: &Array2<f32>,
    locations: &[ReachLocation],
) -> Result<()> {
    let n_rivid = rivid.len();
    let n_time = time.len();

    let mut file = netcdf::create(path)?;
    file.add_dimension("rivid", n_rivid)?;
    file.add_dimension("time", n_time)?;

    file.add_attribute("Conventions", "CF-1.6")?;
    file.add_attribute("featureType", "timeSeries")?;
    file.add_attribute("time_coverage_start", time.first().copied().unwrap_or(0).to_string())?;
    file.add_attribute("time_coverage_end", time.last().copied().unwrap_or(0).to_string())?;

    let mut rivid_var = file.add_variable::<i32>("rivid", &["rivid"])?;
    rivid_var.put_values(&rivid.iter().map(|r| *r as i32).collect::<Vec<_>>(), ..)?;

    let mut time_var = file.add_variable::<i32>("time", &["time"])?;
    time_var.put_values(&time.iter().map(|t| *t as i32).collect::<Vec<_>>(), ..)?;
    time_var.put_attribute("units", UNIX_EPOCH_UNITS)?;

    let mut lat_var = file.add_variable::<f64>("lat", &["rivid"])?;
    lat_var.put_values(&locations.iter().map(|l| l.lat).collect::<Vec<_>>(), ..)?;
    let mut lon_var = file.add_variable::<f64>("lon", &["rivid"])?;
    lon_var.put_values(&locations.iter().map(|l| l.lon).collect::<Vec<_>>(), ..)?;
    let mut z_var = file.add_variable::<f64>("z", &["rivid"])?;
    z_var.put_values(&locations.iter().map(|l| l.z).collect::<Vec<_>>(), ..)?;

    let mut qout_var = file.add_variable::<f32>("Qout", &["rivid","time"])?;
    qout_var.put_values(qout.as_standard_layout().as_slice().unwrap(), ..)?;

    let mut crs_var = file.add_variable::<i32>("crs", &[] as &[&str])?;
    crs_var.put_attribute("grid_mapping_name", "latitude_longitude")?;
    crs_var.put_attribute("epsg_code", "EPSG:4269")?;
    crs_var.put_values(&[0i32], ..)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_nc (tag: &str) -> std::path::PathBuf {
        let mut p = std::env::temp_dir();
        p.push( format!("odin_rapid_qout_test_{}_{tag}.nc", std::process::id()) );
        p
    }

    #[test]
    fn writes_and_reads_back_cf_qout() {
        let path = temp_nc("roundtrip");
        let rivid = vec![10,20,30];
        let time = vec![0,3600,7200];
        let qout = Array2::from_shape_vec((3,3), vec![
            1.0,1.1,1.2,
            2.0,2.1,2.2,
            3.0,3.1,3.2,
        ]).unwrap();
        let locs = vec![ReachLocation{lat:1.0,lon:2.0,z:3.0}; 3];

        write_cf_qout(&path, &rivid, &time, &qout, &locs).unwrap();
        let back = QoutFile::read(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!( back.rivid, rivid);
        assert_eq!( back.time, time);
        assert!( back.is_cf );
        assert_eq!( back.qout_at(20, 1).unwrap(), 2.1);
        assert!( back.qout_at(99, 0).is_none() );
    }
}
