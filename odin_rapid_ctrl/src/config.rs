use std::path::PathBuf;
use serde::{Serialize,Deserialize};

/// the two interchangeable Job Dispatcher backends, selected at configuration time.
#[derive(Clone,Serialize,Deserialize,Debug)]
pub enum DispatcherBackend {
    /// bounded in-process worker pool; `pool_size` defaults to available cores when absent.
    Local { pool_size: Option<usize> },
    /// external queue manager submission executable, plus how many submissions this process
    /// keeps outstanding at once.
    Cluster { submit_cmd: PathBuf, max_outstanding: usize },
}

impl Default for DispatcherBackend {
    fn default () -> Self { DispatcherBackend::Local{ pool_size: None } }
}

/// top-level controller configuration: everything the invocation protocol needs to find its
/// inputs, pick a dispatch backend, and decide which optional phases to run.
#[derive(Clone,Serialize,Deserialize,Debug)]
pub struct CtrlConfig {
    /// path to the external routing kernel executable
    pub kernel_path: PathBuf,

    /// root of the `input/<region>/` and `output/<region>/<cycle>/` tree
    pub io_root: PathBuf,

    /// root directory under which upstream release folders (`Runoff.YYYYMMDD.H...`) appear,
    /// already downloaded and extracted — the FTP transport itself is an external collaborator
    pub release_root: PathBuf,

    /// glob pattern (relative to `release_root`) matching candidate release folders
    pub release_glob: String,

    /// root of `<historical>/<region>/` seasonal-average and return-period files
    pub historical_root: Option<PathBuf>,

    /// region names to process; empty means "every region directory present under
    /// `io_root/input`"
    pub regions: Vec<String>,

    pub lockfile_path: PathBuf,
    pub log_root: PathBuf,

    /// per-job scratch root for the Local pool backend
    pub scratch_root: PathBuf,

    pub dispatcher: DispatcherBackend,

    /// whether to invoke `download_cmd` before processing a cycle
    pub download: bool,
    /// external hook that stages/extracts one cycle's release archive into `release_root`;
    /// invoked with the cycle's canonical form as its sole argument
    pub download_cmd: Option<PathBuf>,

    pub gage_correction: bool,
    pub warnings: bool,

    /// minimum-flow floor `tau` applied to each reach's return-period triple before
    /// classification; `0.0` effectively disables the floor rule
    pub warning_threshold: f64,
}

impl Default for CtrlConfig {
    fn default () -> Self {
        CtrlConfig {
            kernel_path: PathBuf::from("/opt/rapid/rapid"),
            io_root: PathBuf::from("rapid_io"),
            release_root: PathBuf::from("rapid_io/releases"),
            release_glob: "Runoff.*".to_string(),
            historical_root: Some(PathBuf::from("rapid_io/historical")),
            regions: Vec::new(),
            lockfile_path: PathBuf::from("rapid_io/lock.json"),
            log_root: PathBuf::from("rapid_io/logs"),
            scratch_root: PathBuf::from("rapid_io/scratch"),
            dispatcher: DispatcherBackend::default(),
            download: false,
            download_cmd: None,
            gage_correction: true,
            warnings: true,
            warning_threshold: 0.0,
        }
    }
}
