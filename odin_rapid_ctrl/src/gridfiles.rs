use std::path::{Path,PathBuf};
use odin_rapid_core::EnsembleMember;

use crate::errors::{Result,op_failed};

/// one ensemble member's grid forecast file, discovered under a release folder.
#[derive(Debug,Clone)]
pub struct GridFileInfo {
    pub member: EnsembleMember,
    pub path: PathBuf,
    pub grid_tag: String,
    pub size: u64,
}

/// recognizes both grid-forecast naming conventions: new-generation `*.runoff.nc` files, whose
/// ensemble index is the trailing integer before `.nc`, and legacy `full_*.runoff.netcdf` /
/// `*.52.205.*.runoff.netcdf` files, whose ensemble index is the third dotted field. Returns the
/// parsed member plus a grid tag distinguishing the grid class (not the member) the file belongs
/// to, for later weight-table lookup.
pub fn parse_grid_filename (name: &str) -> Option<(EnsembleMember,String)> {
    if let Some(stem) = name.strip_suffix(".nc") {
        if !stem.ends_with(".netcdf") {
            let split = stem.rfind(|c: char| !c.is_ascii_digit())?;
            let digits = &stem[split+1..];
            if digits.is_empty() { return None }
            let member = EnsembleMember::new(digits.parse().ok()?).ok()?;
            let grid_tag = stem[..=split].trim_end_matches('.').to_string();
            return Some((member, grid_tag));
        }
    }

    if let Some(stem) = name.strip_suffix(".runoff.netcdf") {
        let fields: Vec<&str> = stem.split('.').collect();
        if fields.len() < 3 { return None }
        let member = EnsembleMember::new(fields[2].parse().ok()?).ok()?;
        let grid_tag = format!("{}.{}", fields[0], fields[1]);
        return Some((member, grid_tag));
    }

    None
}

/// lists every recognizable grid forecast file under `release_dir` (searched recursively, since
/// some releases nest files one directory deeper per member), sorted by descending file size —
/// larger files are more likely to be complete, so member processing order favors them.
pub fn list_member_grid_files (release_dir: &Path) -> Result<Vec<GridFileInfo>> {
    let mut found = Vec::new();

    odin_common::fs::visit_dirs(release_dir, true, &mut |entry| {
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else { return };
        let Some((member, grid_tag)) = parse_grid_filename(name) else { return };
        let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
        found.push( GridFileInfo{ member, path, grid_tag, size } );
    }).map_err(|e| op_failed( format!("{release_dir:?}: {e}") ))?;

    found.sort_by(|a,b| b.size.cmp(&a.size));
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_new_generation_trailing_digit_form() {
        let (m, tag) = parse_grid_filename("20200101000.glob.t1279_ng.1.runoff.nc").unwrap();
        assert_eq!( m.index(), 1 );
        assert_eq!( tag, "20200101000.glob.t1279_ng" );
    }

    #[test]
    fn parses_high_res_new_generation_member() {
        let (m, _) = parse_grid_filename("20200101000.glob.t1279_ng.52.runoff.nc").unwrap();
        assert!( m.is_high_res() );
    }

    #[test]
    fn parses_legacy_third_dotted_field_form() {
        let (m, tag) = parse_grid_filename("full_20200101.0.1.runoff.netcdf").unwrap();
        assert_eq!( m.index(), 1 );
        assert_eq!( tag, "full_20200101.0" );
    }

    #[test]
    fn rejects_unrecognized_names() {
        assert!( parse_grid_filename("readme.txt").is_none() );
        assert!( parse_grid_filename("rapid_connect.csv").is_none() );
    }
}
