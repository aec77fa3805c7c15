use async_trait::async_trait;
use crate::job::{Job,Outcome};

/// the work a dispatched job actually performs, injected by the caller so that neither backend
/// needs to depend on the Member Worker crate directly — the Dispatcher only knows about `Job`
/// and `Outcome`, per the "tagged-variant Job record... and uniform Outcome result type" design.
#[async_trait]
pub trait JobRunner: Send + Sync {
    async fn run (&self, job: &Job) -> Result<(), String>;
}

/// one interchangeable submission interface behind which a Local pool or Cluster backend can
/// sit. Jobs are independent; completion order is not guaranteed; total wall time is bounded by
/// the slowest job plus whatever queueing latency the backend adds. Each backend owns how it
/// actually executes a job (a [`JobRunner`] in-process for the Local pool, an external queue
/// submission for the Cluster backend) — `run_batch` only ever deals in `Job`/`Outcome`.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn run_batch (&self, jobs: Vec<Job>) -> Vec<Outcome>;
}
