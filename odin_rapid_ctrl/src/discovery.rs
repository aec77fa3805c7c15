use std::path::{Path,PathBuf};
use odin_rapid_core::Cycle;

use crate::errors::Result;

/// one upstream release folder, already downloaded and extracted, paired with the cycle it
/// represents.
#[derive(Debug,Clone)]
pub struct PendingCycle {
    pub cycle: Cycle,
    pub release_dir: PathBuf,
}

/// candidate release folders under `release_root` matching `release_glob`, strictly newer than
/// `watermark`, in ascending cycle order — the order the invocation protocol processes them in.
/// Folder names that fail to parse as a cycle are skipped rather than treated as fatal: an
/// upstream provider occasionally drops unrelated files into the same tree.
pub fn discover_pending_cycles (release_root: &Path, release_glob: &str, watermark: Cycle) -> Result<Vec<PendingCycle>> {
    let pattern = release_root.join(release_glob);
    let pattern = pattern.to_string_lossy().into_owned();

    let mut pending: Vec<PendingCycle> = glob::glob(&pattern)?
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_dir())
        .filter_map(|path| {
            let name = path.file_name()?.to_str()?;
            let cycle = Cycle::parse_release_folder(name).ok()?;
            Some( PendingCycle{ cycle, release_dir: path } )
        })
        .filter(|p| p.cycle > watermark)
        .collect();

    pending.sort_by_key(|p| p.cycle);
    Ok(pending)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn mkdir (root: &Path, name: &str) {
        std::fs::create_dir_all(root.join(name)).unwrap();
    }

    #[test]
    fn discovers_only_cycles_newer_than_watermark_in_ascending_order() {
        let root = std::env::temp_dir().join( format!("odin_rapid_ctrl_discovery_test_{}", std::process::id()) );
        let _ = std::fs::remove_dir_all(&root);
        std::fs::create_dir_all(&root).unwrap();

        mkdir(&root, "Runoff.20200101.0.netcdf");
        mkdir(&root, "Runoff.20200101.12.netcdf");
        mkdir(&root, "Runoff.20200102.0.netcdf");
        mkdir(&root, "not_a_release");

        let watermark = Cycle::new( NaiveDate::from_ymd_opt(2020,1,1).unwrap(), 0).unwrap();
        let pending = discover_pending_cycles(&root, "Runoff.*", watermark).unwrap();

        std::fs::remove_dir_all(&root).ok();

        assert_eq!( pending.len(), 2 );
        assert_eq!( pending[0].cycle.canonical(), "20200101.12" );
        assert_eq!( pending[1].cycle.canonical(), "20200102.0" );
    }
}
