use std::{collections::HashMap,path::PathBuf};
use async_trait::async_trait;

use odin_rapid_core::WeightTable;
use odin_rapid_dispatch::{Job,JobRunner};
use odin_rapid_member::{MemberJob,MemberWorker};

use crate::region::RegionContext;

/// the grid file and resolved weight table for one member, precomputed once per cycle so the
/// runner doesn't re-scan the release folder or re-match weight tables on every job.
pub struct MemberMeta<'a> {
    pub grid_file: PathBuf,
    pub grid_tag: String,
    pub weight_table: &'a WeightTable,
}

/// reconstructs a full [`MemberJob`] from the minimal backend-agnostic [`Job`] record the Job
/// Dispatcher carries, using static region context and a per-cycle member meta table this runner
/// was built with. This keeps `Job` itself free of any region- or grid-specific fields: a Cluster
/// backend submission only needs `--region`/`--cycle`/`--member` to derive the same inputs
/// independently from the same shared filesystem.
pub struct MemberJobRunner<'a> {
    region: &'a RegionContext,
    kernel_path: PathBuf,
    prior_qinit: Option<PathBuf>,
    members: HashMap<u8,MemberMeta<'a>>,
}

impl<'a> MemberJobRunner<'a> {
    pub fn new (
        region: &'a RegionContext,
        kernel_path: PathBuf,
        prior_qinit: Option<PathBuf>,
        members: HashMap<u8,MemberMeta<'a>>,
    ) -> Self {
        MemberJobRunner{ region, kernel_path, prior_qinit, members }
    }
}

#[async_trait]
impl<'a> JobRunner for MemberJobRunner<'a> {
    async fn run (&self, job: &Job) -> Result<(), String> {
        let meta = self.members.get(&job.member.index())
            .ok_or_else(|| format!("no grid file discovered for member {}", job.member))?;

        std::fs::create_dir_all(&job.work_dir).map_err(|e| e.to_string())?;

        let member_job = MemberJob {
            cycle: job.cycle,
            member: job.member,
            grid_tag: &meta.grid_tag,
            grid_file: &meta.grid_file,
            region_dir: &self.region.input_dir,
            scratch_dir: &job.work_dir,
            weight_table: meta.weight_table,
            connectivity: &self.region.connectivity,
            kernel_path: &self.kernel_path,
            prior_qinit: self.prior_qinit.as_deref(),
            locations: &self.region.locations,
            output_path: &job.output_path,
        };

        let mut worker = MemberWorker::new();
        let result = worker.run(&member_job).await.map_err(|e| e.to_string());

        let _ = std::fs::remove_dir_all(&job.work_dir);
        result
    }
}
