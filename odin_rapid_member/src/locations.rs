use std::{collections::HashMap,path::Path};
use serde::Deserialize;
use odin_rapid_core::ReachLocation;
use crate::errors::Result;

#[derive(Debug,Deserialize)]
struct LocationRow {
    rivid: i64,
    lat: f64,
    lon: f64,
    #[serde(default)]
    z: f64,
}

/// the optional `comid_lat_lon_z*.csv` lookup: reaches absent from it get the zeroed default
/// [`ReachLocation`] — geolocation is cosmetic metadata on the canonical Qout, not required for
/// routing correctness.
pub struct LocationLookup(HashMap<i64,ReachLocation>);

impl LocationLookup {
    pub fn read_csv (path: impl AsRef<Path>) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut map = HashMap::new();
        for rec in reader.deserialize() {
            let row: LocationRow = rec?;
            map.insert( row.rivid, ReachLocation{ lat: row.lat, lon: row.lon, z: row.z } );
        }
        Ok( LocationLookup(map) )
    }

    pub fn empty () -> Self { LocationLookup(HashMap::new()) }

    pub fn get (&self, rivid: i64) -> ReachLocation {
        self.0.get(&rivid).copied().unwrap_or_default()
    }
}
