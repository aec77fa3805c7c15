use std::path::{Path,PathBuf};
use tokio::process::Command;
use tracing::{debug,info};

use odin_common::fs::ensure_dir;
use crate::errors::{RouteError,Result};
use crate::params::{TimestepParams,RunPaths,ForcingPaths,detect_forcing,render_namelist};

/// invokes the RAPID kernel once: renders its namelist into a scratch working directory, spawns
/// the kernel binary against it, and waits for completion.
pub struct RoutingDriver {
    kernel_path: PathBuf,
    work_dir: PathBuf,
}

impl RoutingDriver {
    pub fn new (kernel_path: impl Into<PathBuf>, work_dir: impl Into<PathBuf>) -> Self {
        RoutingDriver{ kernel_path: kernel_path.into(), work_dir: work_dir.into() }
    }

    /// run the kernel for one member/segment, producing `qout_file`. `qinit_file` and forcing
    /// inputs are optional; forcing is auto-detected from `region_dir`.
    pub async fn route (
        &self,
        region_dir: &Path,
        inflow_file: &Path,
        qinit_file: Option<&Path>,
        ts: TimestepParams,
        qout_file: &Path,
    ) -> Result<()> {
        ensure_dir(&self.work_dir)?;

        let forcing_paths = detect_forcing(region_dir);
        let forcing = forcing_paths.as_ref().map(|(qfor,tot,used)| ForcingPaths{
            qfor_file: qfor, for_tot_id_file: tot, for_use_id_file: used,
        });
        if forcing.is_none() {
            debug!("forcing inputs not found or incomplete in {region_dir:?}, proceeding without");
        }

        let paths = RunPaths{ region_dir, inflow_file, qinit_file, forcing: forcing.as_ref(), qout_file };
        let namelist = render_namelist(region_dir, ts, &paths);

        let namelist_path = self.work_dir.join("rapid_namelist");
        tokio::fs::write(&namelist_path, namelist).await?;

        if let Some(parent) = qout_file.parent() {
            ensure_dir(parent)?;
        }

        let mut cmd = Command::new(&self.kernel_path);
        cmd.current_dir(&self.work_dir);
        execute_cmd(&mut cmd).await
    }
}

async fn execute_cmd (cmd: &mut Command) -> Result<()> {
    debug!("executing {cmd:?}");
    cmd.kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|e| RouteError::SpawnFailed(e.to_string()))?;
    let status = child.wait().await?;

    if status.success() {
        info!("kernel completed with status {status}");
        Ok(())
    } else {
        Err( RouteError::KernelNonZeroExit(status) )
    }
}
