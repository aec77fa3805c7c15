use std::sync::Arc;
use async_trait::async_trait;
use futures::stream::{self,StreamExt};
use tracing::{info,warn};

use crate::dispatcher::{Dispatcher,JobRunner};
use crate::job::{Job,Outcome};

/// runs jobs in a bounded worker pool sized by available cores (or an explicit override),
/// interleaving up to `pool_size` jobs concurrently on the dispatching task rather than spawning
/// one OS task per job — each job is itself I/O- and child-process-bound, so concurrency comes
/// from awaiting many of them at once, not from extra threads.
pub struct LocalPoolDispatcher {
    pool_size: usize,
    runner: Arc<dyn JobRunner>,
}

impl LocalPoolDispatcher {
    pub fn new (pool_size: usize, runner: Arc<dyn JobRunner>) -> Self {
        LocalPoolDispatcher{ pool_size: pool_size.max(1), runner }
    }

    /// size the pool from the available core count, matching the spec's "bounded worker pool
    /// sized by available cores" default.
    pub fn from_available_cores (runner: Arc<dyn JobRunner>) -> Self {
        let cores = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        LocalPoolDispatcher::new(cores, runner)
    }
}

#[async_trait]
impl Dispatcher for LocalPoolDispatcher {
    async fn run_batch (&self, jobs: Vec<Job>) -> Vec<Outcome> {
        info!("dispatching {} jobs to a local pool of size {}", jobs.len(), self.pool_size);

        let runner = &self.runner;
        stream::iter(jobs.into_iter().map(|job| async move {
            match runner.run(&job).await {
                Ok(()) => Outcome::Completed{ job },
                Err(error) => {
                    warn!("job for member {} failed: {error}", job.member);
                    Outcome::Failed{ job, error }
                }
            }
        }))
        .buffer_unordered(self.pool_size)
        .collect()
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize,Ordering};
    use odin_rapid_core::{Cycle,EnsembleMember,Region};
    use chrono::NaiveDate;

    struct CountingRunner { calls: Arc<AtomicUsize>, fail_member: Option<u8> }

    #[async_trait]
    impl JobRunner for CountingRunner {
        async fn run (&self, job: &Job) -> Result<(), String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if Some(job.member.index()) == self.fail_member {
                Err("synthetic failure".to_string())
            } else {
                Ok(())
            }
        }
    }

    fn job_for (member: u32) -> Job {
        Job {
            region: Region::parse("nfie-conus").unwrap(),
            cycle: Cycle::new( NaiveDate::from_ymd_opt(2020,1,1).unwrap(), 0).unwrap(),
            member: EnsembleMember::new(member).unwrap(),
            work_dir: std::env::temp_dir(),
            output_path: std::env::temp_dir().join("Qout.nc"),
        }
    }

    #[tokio::test]
    async fn runs_all_jobs_and_reports_per_job_outcome() {
        let calls = Arc::new(AtomicUsize::new(0));
        let runner: Arc<dyn JobRunner> = Arc::new(CountingRunner{ calls: calls.clone(), fail_member: Some(2) });
        let dispatcher = LocalPoolDispatcher::new(2, runner);

        let jobs = vec![job_for(1), job_for(2), job_for(3)];
        let outcomes = dispatcher.run_batch(jobs).await;

        assert_eq!( calls.load(Ordering::SeqCst), 3);
        assert_eq!( outcomes.len(), 3);
        assert_eq!( outcomes.iter().filter(|o| o.is_success()).count(), 2);
        assert_eq!( outcomes.iter().filter(|o| !o.is_success()).count(), 1);
    }
}
