use std::path::PathBuf;
use odin_rapid_core::{Cycle,EnsembleMember,Region};

/// one (region, member) routing job, self-contained enough to run on any backend: the job
/// carries its own scratch and output paths rather than depending on process-wide state.
#[derive(Debug,Clone)]
pub struct Job {
    pub region: Region,
    pub cycle: Cycle,
    pub member: EnsembleMember,
    pub work_dir: PathBuf,
    pub output_path: PathBuf,
}

/// the uniform result of running one job, regardless of backend. A failed job's output file is
/// guaranteed absent by whatever ran it (the Local pool backend and the Member Worker both honor
/// this; the Cluster backend relies on the remote Member Worker process honoring it too).
#[derive(Debug,Clone)]
pub enum Outcome {
    Completed { job: Job },
    Failed { job: Job, error: String },
}

impl Outcome {
    pub fn job (&self) -> &Job {
        match self { Outcome::Completed{ job } | Outcome::Failed{ job, .. } => job }
    }

    pub fn is_success (&self) -> bool { matches!(self, Outcome::Completed{..}) }
}
