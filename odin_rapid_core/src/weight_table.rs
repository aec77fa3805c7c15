use std::path::Path;
use serde::Deserialize;
use crate::errors::{CoreError,Result};

/// one contributing grid cell of a reach's catchment, as a row of `weight_<grid>.csv`.
#[derive(Debug,Clone)]
pub struct WeightCell {
    pub area_sqm: f64,
    pub lon_index: usize,
    pub lat_index: usize,
}

/// all grid cells contributing lateral inflow to one reach (`StreamID`).
#[derive(Debug,Clone)]
pub struct WeightGroup {
    pub stream_id: i64,
    pub cells: Vec<WeightCell>,
    expected_npoints: usize,
}

impl WeightGroup {
    pub fn npoints (&self) -> usize { self.expected_npoints }
}

/// the precomputed area-weight mapping from one grid to the reaches of a region, read from
/// `weight_<grid>.csv` (header `StreamID,area_sqm,lon_index,lat_index,npoints`).
#[derive(Debug,Clone)]
pub struct WeightTable {
    pub groups: Vec<WeightGroup>,
}

#[derive(Debug,Deserialize)]
struct WeightRow {
    #[serde(rename = "StreamID")]
    stream_id: i64,
    area_sqm: f64,
    lon_index: usize,
    lat_index: usize,
    npoints: usize,
}

impl WeightTable {
    pub fn read_csv (path: impl AsRef<Path>) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut groups: Vec<WeightGroup> = Vec::new();

        for rec in reader.deserialize() {
            let row: WeightRow = rec?;
            let cell = WeightCell{ area_sqm: row.area_sqm, lon_index: row.lon_index, lat_index: row.lat_index };

            match groups.last_mut() {
                Some(g) if g.stream_id == row.stream_id => {
                    g.cells.push(cell);
                }
                _ => {
                    if let Some(prev) = groups.last() {
                        check_group_complete(prev)?;
                    }
                    groups.push( WeightGroup{ stream_id: row.stream_id, cells: vec![cell], expected_npoints: row.npoints } );
                }
            }
        }

        if let Some(g) = groups.last() {
            check_group_complete(g)?;
        }

        Ok( WeightTable{ groups } )
    }

    pub fn n_reaches (&self) -> usize { self.groups.len() }

    /// the union of (lon_index,lat_index) cells required across all groups, used to compute
    /// the bounding box of the grid slab that must be read.
    pub fn required_cells (&self) -> impl Iterator<Item = (usize,usize)> + '_ {
        self.groups.iter().flat_map(|g| g.cells.iter().map(|c| (c.lon_index, c.lat_index)))
    }
}

fn check_group_complete (g: &WeightGroup) -> Result<()> {
    if g.cells.len() != g.expected_npoints {
        Err( CoreError::WeightTableMalformed( format!(
            "group for StreamID {} has {} rows but declared npoints={}",
            g.stream_id, g.cells.len(), g.expected_npoints) ) )
    } else {
        Ok(())
    }
}
