use std::path::{Path,PathBuf};

/// timestep parameters for one kernel invocation: `(ZS_TauR, ZS_dtR, ZS_TauM, ZS_dtM)` in seconds.
/// `ZS_dtM` equals `ZS_TauR` for every call this system makes.
#[derive(Debug,Clone,Copy)]
pub struct TimestepParams {
    pub zs_tau_r: i64,
    pub zs_dt_r: i64,
    pub zs_tau_m: i64,
    pub zs_dt_m: i64,
}

impl TimestepParams {
    pub fn new (zs_tau_r: i64, zs_tau_m: i64) -> Self {
        TimestepParams{ zs_tau_r, zs_dt_r: 15*60, zs_tau_m, zs_dt_m: zs_tau_r }
    }
}

/// paths making up one routing run; all absolute.
pub struct RunPaths<'a> {
    pub region_dir: &'a Path,
    pub inflow_file: &'a Path,
    pub qinit_file: Option<&'a Path>,
    pub forcing: Option<&'a ForcingPaths<'a>>,
    pub qout_file: &'a Path,
}

pub struct ForcingPaths<'a> {
    pub qfor_file: &'a Path,
    pub for_tot_id_file: &'a Path,
    pub for_use_id_file: &'a Path,
}

/// forcing ingestion is enabled only when all three forcing files are present in the region
/// directory; any partial set is treated as absent.
pub fn detect_forcing (region_dir: &Path) -> Option<(PathBuf,PathBuf,PathBuf)> {
    let qfor = region_dir.join("qfor.csv");
    let tot = region_dir.join("for_tot_id.csv");
    let used = region_dir.join("for_use_id.csv");
    if qfor.is_file() && tot.is_file() && used.is_file() {
        Some((qfor, tot, used))
    } else {
        None
    }
}

/// render the kernel's namelist file contents.
pub fn render_namelist (region_dir: &Path, ts: TimestepParams, paths: &RunPaths) -> String {
    let mut out = String::new();
    out.push_str("&NL_namelist\n");
    out.push_str(&format!("BS_opt_Qinit = {}\n", if paths.qinit_file.is_some() { ".true." } else { ".false." }));
    out.push_str(&format!("BS_opt_for = {}\n", if paths.forcing.is_some() { ".true." } else { ".false." }));
    out.push_str(&format!("ZS_TauR = {}\n", ts.zs_tau_r));
    out.push_str(&format!("ZS_dtR = {}\n", ts.zs_dt_r));
    out.push_str(&format!("ZS_TauM = {}\n", ts.zs_tau_m));
    out.push_str(&format!("ZS_dtM = {}\n", ts.zs_dt_m));
    out.push_str(&format!("rapid_connect_file = '{}'\n", region_dir.join("rapid_connect.csv").display()));
    out.push_str(&format!("Vlat_file = '{}'\n", paths.inflow_file.display()));
    out.push_str(&format!("riv_bas_id_file = '{}'\n", region_dir.join("riv_bas_id.csv").display()));
    out.push_str(&format!("k_file = '{}'\n", region_dir.join("k.csv").display()));
    out.push_str(&format!("x_file = '{}'\n", region_dir.join("x.csv").display()));
    out.push_str(&format!("Qout_file = '{}'\n", paths.qout_file.display()));
    if let Some(qinit) = paths.qinit_file {
        out.push_str(&format!("Qinit_file = '{}'\n", qinit.display()));
    }
    if let Some(forcing) = paths.forcing {
        out.push_str(&format!("for_tot_id_file = '{}'\n", forcing.for_tot_id_file.display()));
        out.push_str(&format!("for_use_id_file = '{}'\n", forcing.for_use_id_file.display()));
        out.push_str(&format!("Qfor_file = '{}'\n", forcing.qfor_file.display()));
    }
    out.push_str("/\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namelist_omits_forcing_block_when_absent() {
        let region = PathBuf::from("/region");
        let inflow = PathBuf::from("/tmp/inflow.nc");
        let qout = PathBuf::from("/tmp/Qout.nc");
        let paths = RunPaths{ region_dir: &region, inflow_file: &inflow, qinit_file: None, forcing: None, qout_file: &qout };
        let rendered = render_namelist(&region, TimestepParams::new(3600, 360*3600), &paths);
        assert!( rendered.contains("BS_opt_for = .false.") );
        assert!( !rendered.contains("Qfor_file") );
    }

    #[test]
    fn detect_forcing_requires_all_three_files() {
        let dir = std::env::temp_dir().join( format!("odin_rapid_route_forcing_test_{}", std::process::id()) );
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("qfor.csv"), "x").unwrap();
        std::fs::write(dir.join("for_tot_id.csv"), "x").unwrap();
        assert!( detect_forcing(&dir).is_none() ); // for_use_id.csv missing
        std::fs::write(dir.join("for_use_id.csv"), "x").unwrap();
        assert!( detect_forcing(&dir).is_some() );
        std::fs::remove_dir_all(&dir).ok();
    }
}
