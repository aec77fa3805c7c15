use std::path::Path;
use odin_rapid_core::GridResolution;
use crate::errors::{InflowError,Result};

/// the names a gridded runoff forecast may use for its dimensions/variable, and whether its
/// units need the 1e-3 mm→m scaling applied by new-generation grids.
pub struct GridForecast {
    file: netcdf::File,
    pub resolution: GridResolution,
    pub runoff_var: String,
    pub lon_dim: String,
    pub lat_dim: String,
    pub time_len: usize,
    pub is_new_generation: bool,
}

const LON_NAMES: &[&str] = &["lon", "longitude"];
const LAT_NAMES: &[&str] = &["lat", "latitude"];
const RUNOFF_NAMES: &[&str] = &["RO", "ro"];

impl GridForecast {
    /// open and validate a grid file: it must have exactly the expected dimension/variable
    /// names, and its time axis length/deltas must match one of the three resolution classes.
    pub fn open (path: impl AsRef<Path>, grid_tag: &str) -> Result<Self> {
        let path = path.as_ref();
        let file = netcdf::open(path)?;

        let lon_dim = find_one(&file, LON_NAMES)
            .ok_or_else(|| InflowError::InvalidGrid( format!("{path:?}: no lon/longitude dimension") ))?;
        let lat_dim = find_one(&file, LAT_NAMES)
            .ok_or_else(|| InflowError::InvalidGrid( format!("{path:?}: no lat/latitude dimension") ))?;
        let runoff_var = find_var(&file, RUNOFF_NAMES)
            .ok_or_else(|| InflowError::InvalidGrid( format!("{path:?}: no RO/ro runoff variable") ))?;

        let time_dim = file.dimension("time")
            .ok_or_else(|| InflowError::InvalidGrid( format!("{path:?}: no time dimension") ))?;
        let time_len = time_dim.len();

        let deltas = read_time_deltas(&file, time_len)?;
        let resolution = GridResolution::classify(time_len, &deltas)
            .map_err(|e| InflowError::InvalidGrid( format!("{path:?}: {e}") ))?;

        let is_new_generation = grid_tag.ends_with("_ng") || grid_tag.contains("t1279");

        Ok( GridForecast{ file, resolution, runoff_var, lon_dim, lat_dim, time_len, is_new_generation } )
    }

    /// read the full runoff slab as `(time, lat, lon)`, applying the new-generation mm→m scaling
    pub fn read_runoff_slab (&self) -> Result<ndarray::Array3<f64>> {
        let var = self.file.variable(&self.runoff_var)
            .ok_or_else(|| InflowError::InvalidGrid( format!("missing variable {}", self.runoff_var) ))?;

        let raw: ndarray::ArrayD<f64> = var.get_values(..)?;
        let arr3 = raw.into_dimensionality::<ndarray::Ix3>()
            .map_err(|_| InflowError::InvalidGrid( "runoff variable is not 3-dimensional (time,lat,lon)".into() ))?;

        Ok( if self.is_new_generation { arr3.mapv(|v| v * 1e-3) } else { arr3 } )
    }
}

fn find_one (file: &netcdf::File, names: &[&str]) -> Option<String> {
    names.iter().find(|n| file.dimension(n).is_some()).map(|s| s.to_string())
}

fn find_var (file: &netcdf::File, names: &[&str]) -> Option<String> {
    names.iter().find(|n| file.variable(n).is_some()).map(|s| s.to_string())
}

fn read_time_deltas (file: &netcdf::File, time_len: usize) -> Result<Vec<i64>> {
    let Some(time_var) = file.variable("time") else {
        return Err( InflowError::InvalidGrid("no time variable".into()) )
    };
    let values: Vec<i64> = time_var.get_values(..)?;
    if values.len() != time_len {
        return Err( InflowError::InvalidGrid("time variable length mismatch".into()) )
    }

    Ok( values.windows(2).map(|w| w[1] - w[0]).collect() )
}
