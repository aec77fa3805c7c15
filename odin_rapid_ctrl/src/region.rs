use std::{collections::HashMap,path::{Path,PathBuf}};
use tracing::warn;

use odin_rapid_core::{Connectivity,Cycle,Region,WeightTable};
use odin_rapid_assim::{GageTable,SeasonalAverage};
use odin_rapid_member::LocationLookup;
use odin_rapid_warn::ReturnPeriodTable;

use crate::errors::{Result,op_failed};

/// everything the controller needs about one region's static inputs, loaded once per run and
/// reused across every cycle the run processes.
pub struct RegionContext {
    pub region: Region,
    pub input_dir: PathBuf,
    pub output_root: PathBuf,
    pub connectivity: Connectivity,
    weight_tables: HashMap<String,WeightTable>,
    pub locations: LocationLookup,
    pub gages: Option<GageTable>,
    pub seasonal: Option<SeasonalAverage>,
    pub return_periods: Option<ReturnPeriodTable>,
}

impl RegionContext {
    pub fn load (region: Region, io_root: &Path, historical_root: Option<&Path>) -> Result<Self> {
        let input_dir = io_root.join("input").join(region.as_str());
        let output_root = io_root.join("output").join(region.as_str());

        let connectivity = Connectivity::read_csv( input_dir.join("rapid_connect.csv") )?;
        let weight_tables = load_weight_tables(&input_dir)?;
        if weight_tables.is_empty() {
            return Err( op_failed( format!("{}: no weight_*.csv files in {input_dir:?}", region) ) )
        }

        let locations = find_one(&input_dir, "comid_lat_lon_z")
            .map(LocationLookup::read_csv)
            .transpose()?
            .unwrap_or_else(LocationLookup::empty);

        let gages_path = input_dir.join("usgs_gages.csv");
        let gages = if gages_path.is_file() { Some( GageTable::read_csv(&gages_path)? ) } else { None };

        let historical_dir = historical_root.map(|h| h.join(region.as_str()));
        let seasonal = historical_dir.as_ref()
            .and_then(|d| find_one(d, "seasonal_average"))
            .and_then(|p| match SeasonalAverage::read(&p) {
                Ok(s) => Some(s),
                Err(e) => { warn!("{region}: failed to read seasonal average {p:?}: {e}"); None }
            });
        let return_periods = historical_dir.as_ref()
            .and_then(|d| find_one(d, "return_period"))
            .and_then(|p| match ReturnPeriodTable::read(&p) {
                Ok(t) => Some(t),
                Err(e) => { warn!("{region}: failed to read return-period table {p:?}: {e}"); None }
            });

        Ok( RegionContext{ region, input_dir, output_root, connectivity, weight_tables, locations, gages, seasonal, return_periods } )
    }

    /// the weight table matching a member grid file's derived tag. Regions that support only one
    /// grid class (the common case) short-circuit to it regardless of the tag's exact spelling.
    pub fn weight_table_for (&self, grid_tag: &str) -> Result<&WeightTable> {
        if self.weight_tables.len() == 1 {
            return Ok( self.weight_tables.values().next().unwrap() )
        }
        self.weight_tables.iter()
            .find(|(key,_)| grid_tag.contains(key.as_str()) || key.contains(grid_tag))
            .map(|(_,wt)| wt)
            .ok_or_else(|| op_failed( format!("{}: no weight table matches grid tag '{grid_tag}'", self.region) ))
    }

    /// the `Qinit_YYYYMMDDtHH.csv` path for `cycle`.
    pub fn qinit_path (&self, cycle: Cycle) -> PathBuf {
        self.input_dir.join( format!("Qinit_{}t{:02}.csv", cycle.date.format("%Y%m%d"), cycle.hour) )
    }

    pub fn output_dir (&self, cycle: Cycle) -> PathBuf {
        self.output_root.join( cycle.canonical() )
    }
}

fn load_weight_tables (input_dir: &Path) -> Result<HashMap<String,WeightTable>> {
    let mut tables = HashMap::new();
    let entries = match std::fs::read_dir(input_dir) {
        Ok(e) => e,
        Err(e) => return Err( e.into() ),
    };

    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if let Some(rest) = name.strip_prefix("weight_").and_then(|s| s.strip_suffix(".csv")) {
            let table = WeightTable::read_csv(entry.path())?;
            tables.insert(rest.to_string(), table);
        }
    }

    Ok(tables)
}

/// the first file in `dir` whose name contains `stem`, if `dir` exists.
fn find_one (dir: &Path, stem: &str) -> Option<PathBuf> {
    std::fs::read_dir(dir).ok()?
        .flatten()
        .map(|e| e.path())
        .find(|p| p.file_name().and_then(|n| n.to_str()).map(|n| n.contains(stem)).unwrap_or(false))
}
