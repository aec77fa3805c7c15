use std::path::{Path,PathBuf};
use tracing::{info,warn,instrument};

use odin_rapid_core::{Connectivity,Cycle,EnsembleMember,GridResolution,QoutFile,WeightTable};
use odin_rapid_inflow::{GridForecast,SegmentSelector,build_inflow,write_inflow_series};
use odin_rapid_route::{RoutingDriver,TimestepParams};

use crate::errors::Result;
use crate::locations::LocationLookup;
use crate::merge::{MergeSegment,merge_segments,write_merged};
use crate::qinit_scratch::write_segment_qinit;
use crate::scratch::ScratchFile;

/// the state machine a member passes through: `Pending → PreparingInflow → Routing →
/// PreparingInflow(next) … → Merging → Done | Failed`.
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum MemberStage {
    Pending,
    PreparingInflow,
    Routing,
    Merging,
    Done,
    Failed,
}

/// static description of one routing segment in a resolution's pipeline.
struct SegmentPlan {
    name: &'static str,
    selector: SegmentSelector,
    dt_hours: i64,
}

fn segment_plan (resolution: GridResolution) -> &'static [SegmentPlan] {
    use SegmentSelector::*;
    match resolution {
        GridResolution::HighRes => &[
            SegmentPlan{ name: "1hr", selector: OneHr, dt_hours: 1 },
            SegmentPlan{ name: "3hr", selector: ThreeHrSubset, dt_hours: 3 },
            SegmentPlan{ name: "6hr", selector: SixHrSubset, dt_hours: 6 },
        ],
        GridResolution::LowResFull => &[
            SegmentPlan{ name: "3hr", selector: ThreeHrSubset, dt_hours: 3 },
            SegmentPlan{ name: "6hr", selector: SixHrSubset, dt_hours: 6 },
        ],
        GridResolution::LowRes => &[
            SegmentPlan{ name: "6hr", selector: DefaultSixHr, dt_hours: 6 },
        ],
    }
}

/// inputs for one (region, member) routing job.
pub struct MemberJob<'a> {
    pub cycle: Cycle,
    pub member: EnsembleMember,
    pub grid_tag: &'a str,
    pub grid_file: &'a Path,
    pub region_dir: &'a Path,
    pub scratch_dir: &'a Path,
    pub weight_table: &'a WeightTable,
    pub connectivity: &'a Connectivity,
    pub kernel_path: &'a Path,
    /// Qinit from the previous cycle, seeding the first segment only
    pub prior_qinit: Option<&'a Path>,
    pub locations: &'a LocationLookup,
    pub output_path: &'a Path,
}

/// orchestrates Grid-to-Reach Inflow Builder → Routing Driver across up to three sequential
/// segments for one ensemble member, chaining each segment's terminal state into the next
/// segment's initial state, then merges the segments into one canonical CF Qout.
pub struct MemberWorker {
    pub stage: MemberStage,
}

impl MemberWorker {
    pub fn new () -> Self { MemberWorker{ stage: MemberStage::Pending } }

    #[instrument(skip_all, fields(member = %job.member, cycle = %job.cycle))]
    pub async fn run (&mut self, job: &MemberJob<'_>) -> Result<()> {
        match self.run_inner(job).await {
            Ok(()) => {
                self.stage = MemberStage::Done;
                info!("member {} completed", job.member);
                Ok(())
            }
            Err(e) => {
                self.stage = MemberStage::Failed;
                // a failed job's Qout file is guaranteed absent
                let _ = std::fs::remove_file(job.output_path);
                warn!("member {} failed: {e}", job.member);
                Err(e)
            }
        }
    }

    async fn run_inner (&mut self, job: &MemberJob<'_>) -> Result<()> {
        let grid = GridForecast::open(job.grid_file, job.grid_tag)?;
        let plan = segment_plan(grid.resolution);
        let driver = RoutingDriver::new(job.kernel_path, job.scratch_dir);

        let mut qinit_path: Option<PathBuf> = job.prior_qinit.map(|p| p.to_path_buf());
        let mut segments: Vec<MergeSegment> = Vec::with_capacity(plan.len());

        for (i, seg) in plan.iter().enumerate() {
            self.stage = MemberStage::PreparingInflow;
            let (rivids, m3_riv) = build_inflow(&grid, job.weight_table, seg.selector)?;

            let inflow_path = job.scratch_dir.join( format!("m3_riv_{}_{}.nc", seg.name, job.member) );
            write_inflow_series(&inflow_path, &rivids, &m3_riv)?;
            let _inflow_guard = ScratchFile::new(&inflow_path);

            let tau_r = seg.dt_hours * 3600;
            let tau_m = (m3_riv.ncols() as i64) * tau_r;
            let ts = TimestepParams::new(tau_r, tau_m);

            let qout_path = job.scratch_dir.join( format!("Qout_{}_{}.nc", seg.name, job.member) );
            let _qout_guard = ScratchFile::new(&qout_path);

            self.stage = MemberStage::Routing;
            driver.route(job.region_dir, &inflow_path, qinit_path.as_deref(), ts, &qout_path).await?;

            let qout = QoutFile::read(&qout_path)?;

            if i + 1 < plan.len() {
                let next_qinit = job.scratch_dir.join( format!("Qinit_{}_{}.csv", seg.name, job.member) );
                write_segment_qinit(&next_qinit, &qout, job.connectivity)?;
                qinit_path = Some(next_qinit);
            }

            segments.push( MergeSegment{ qout, dt_hours: seg.dt_hours } );
        }

        self.stage = MemberStage::Merging;
        let (rivid, time, merged) = merge_segments(&job.cycle, &segments)?;
        write_merged(job.output_path, &rivid, &time, &merged, job.locations)?;

        Ok(())
    }
}

impl Default for MemberWorker {
    fn default () -> Self { Self::new() }
}
