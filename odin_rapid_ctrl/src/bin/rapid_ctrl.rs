use std::path::PathBuf;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use odin_rapid_ctrl::{Controller,CtrlConfig,DispatcherBackend,Result};

/// forecast-cycle controller entry point for one ECMWF-style ensemble source: discovers pending
/// release cycles, routes every configured region's members, and writes warnings plus the next
/// cycle's initial state.
#[derive(Parser,Debug)]
#[command(version, about, long_about = "drive one invocation of the ensemble-streamflow forecast cycle")]
pub struct Args {
    /// path to the external routing kernel executable
    #[arg(long)]
    pub kernel_path: PathBuf,

    /// root of the `input/<region>/` and `output/<region>/<cycle>/` tree
    #[arg(long)]
    pub io_root: PathBuf,

    /// root under which upstream release folders already appear, downloaded and extracted
    #[arg(long)]
    pub release_root: PathBuf,

    /// glob pattern (relative to `release_root`) matching candidate release folders
    #[arg(long, default_value = "Runoff.*")]
    pub release_glob: String,

    /// root of `<historical>/<region>/` seasonal-average and return-period files
    #[arg(long)]
    pub historical_root: Option<PathBuf>,

    /// directory for the per-cycle summary logs
    #[arg(long)]
    pub log_root: PathBuf,

    /// scratch root for the local worker pool backend
    #[arg(long)]
    pub scratch_root: PathBuf,

    /// path to the persistent lockfile
    #[arg(long)]
    pub lockfile_path: PathBuf,

    /// restrict processing to these regions (repeatable); default is every region directory
    /// found under `io_root/input`
    #[arg(long = "region")]
    pub regions: Vec<String>,

    /// local worker pool size; defaults to available cores. Ignored if `--cluster-submit-cmd`
    /// is given.
    #[arg(long)]
    pub pool_size: Option<usize>,

    /// external queue manager submission executable; selects the Cluster dispatcher backend
    #[arg(long)]
    pub cluster_submit_cmd: Option<PathBuf>,

    /// outstanding cluster submissions this process keeps in flight at once
    #[arg(long, default_value_t = 8)]
    pub cluster_max_outstanding: usize,

    /// fetch and extract the upstream release archive before processing a cycle
    #[arg(long)]
    pub download: bool,

    /// external hook invoked with a cycle's canonical form to stage its release archive
    #[arg(long)]
    pub download_cmd: Option<PathBuf>,

    #[arg(long)]
    pub no_gage_correction: bool,

    #[arg(long)]
    pub no_warnings: bool,

    /// minimum-flow floor applied to each reach's return-period triple
    #[arg(long, default_value_t = 0.0)]
    pub warning_threshold: f64,
}

impl From<Args> for CtrlConfig {
    fn from (args: Args) -> Self {
        let dispatcher = match args.cluster_submit_cmd {
            Some(submit_cmd) => DispatcherBackend::Cluster{ submit_cmd, max_outstanding: args.cluster_max_outstanding },
            None => DispatcherBackend::Local{ pool_size: args.pool_size },
        };

        CtrlConfig {
            kernel_path: args.kernel_path,
            io_root: args.io_root,
            release_root: args.release_root,
            release_glob: args.release_glob,
            historical_root: args.historical_root,
            regions: args.regions,
            lockfile_path: args.lockfile_path,
            log_root: args.log_root,
            scratch_root: args.scratch_root,
            dispatcher,
            download: args.download,
            download_cmd: args.download_cmd,
            gage_correction: !args.no_gage_correction,
            warnings: !args.no_warnings,
            warning_threshold: args.warning_threshold,
        }
    }
}

#[tokio::main]
async fn main () -> Result<()> {
    odin_build::set_bin_context!();
    tracing_subscriber::fmt()
        .with_env_filter( EnvFilter::from_default_env())
        .try_init().ok();

    let args = Args::parse();
    let config: CtrlConfig = args.into();

    let controller = Controller::new(config)?;
    controller.run().await
}
