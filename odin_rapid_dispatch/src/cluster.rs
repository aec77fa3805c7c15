use std::path::PathBuf;
use async_trait::async_trait;
use futures::stream::{self,StreamExt};
use tokio::process::Command;
use tracing::{debug,warn};

use crate::dispatcher::Dispatcher;
use crate::job::{Job,Outcome};

/// submits each job as a self-contained command to an external queue manager: the command
/// stages input files to an execute node, runs the Member Worker there, and transfers the Qout
/// back, exactly as the spec's Cluster backend describes. `submit_cmd` is the queue manager's
/// submission executable (a `qsub`/`sbatch`-style wrapper); this dispatcher's own concurrency
/// cap only bounds how many submissions are outstanding from this process at once, not the
/// cluster's actual execution concurrency.
pub struct ClusterDispatcher {
    submit_cmd: PathBuf,
    max_outstanding: usize,
}

impl ClusterDispatcher {
    pub fn new (submit_cmd: impl Into<PathBuf>, max_outstanding: usize) -> Self {
        ClusterDispatcher{ submit_cmd: submit_cmd.into(), max_outstanding: max_outstanding.max(1) }
    }

    async fn submit_and_wait (&self, job: Job) -> Outcome {
        let mut cmd = Command::new(&self.submit_cmd);
        cmd.arg("--region").arg(job.region.as_str())
            .arg("--cycle").arg(job.cycle.canonical())
            .arg("--member").arg(job.member.index().to_string())
            .arg("--work-dir").arg(&job.work_dir)
            .arg("--output").arg(&job.output_path)
            .kill_on_drop(true);

        debug!("submitting {cmd:?}");

        match cmd.status().await {
            Ok(status) if status.success() => Outcome::Completed{ job },
            Ok(status) => {
                warn!("cluster submission for member {} exited with {status}", job.member);
                Outcome::Failed{ error: format!("submission exited with {status}"), job }
            }
            Err(e) => {
                warn!("cluster submission for member {} failed to launch: {e}", job.member);
                Outcome::Failed{ error: e.to_string(), job }
            }
        }
    }
}

#[async_trait]
impl Dispatcher for ClusterDispatcher {
    async fn run_batch (&self, jobs: Vec<Job>) -> Vec<Outcome> {
        stream::iter(jobs.into_iter().map(|job| self.submit_and_wait(job)))
            .buffer_unordered(self.max_outstanding)
            .collect()
            .await
    }
}
