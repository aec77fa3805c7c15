use std::{collections::HashMap,path::PathBuf,sync::Arc,time::Duration};
use chrono::Utc;
use tracing::{info,warn,error};

use odin_common::fs::{append_line_to_file,ensure_dir};
use odin_rapid_assim::{GageTable,MeasurementClient,MemberQout,apply_gage_correction,ensemble_mean,seasonal_init,write_qinit_file};
use odin_rapid_core::{Cycle,EnsembleMember,QoutFile,Region};
use odin_rapid_dispatch::{ClusterDispatcher,Dispatcher,Job,LocalPoolDispatcher};
use odin_rapid_warn::{build_warnings,daily_peak_stats};

use crate::config::{CtrlConfig,DispatcherBackend};
use crate::discovery::discover_pending_cycles;
use crate::errors::{CtrlError,Result,op_failed};
use crate::gridfiles::list_member_grid_files;
use crate::region::RegionContext;
use crate::runner::{MemberJobRunner,MemberMeta};

const GAGE_RETRY_ATTEMPTS: u32 = 3;
const GAGE_RETRY_BACKOFF: Duration = Duration::from_secs(5);

/// one cycle's outcome for one region, summarized for the per-cycle log.
struct RegionOutcome {
    region: String,
    completed: usize,
    failed: usize,
    warnings_written: bool,
}

/// the forecast-cycle controller: owns every region's static context for the lifetime of one
/// invocation and drives the invocation protocol across however many pending cycles are found.
pub struct Controller {
    config: CtrlConfig,
    regions: Vec<RegionContext>,
}

impl Controller {
    pub fn new (config: CtrlConfig) -> Result<Self> {
        let names = if config.regions.is_empty() {
            discover_region_names(&config.io_root)?
        } else {
            config.regions.clone()
        };

        let mut regions = Vec::with_capacity(names.len());
        for name in names {
            let region = match Region::parse(&name) {
                Ok(r) => r,
                Err(e) => { warn!("skipping invalid region name '{name}': {e}"); continue }
            };
            match RegionContext::load(region.clone(), &config.io_root, config.historical_root.as_deref()) {
                Ok(ctx) => regions.push(ctx),
                Err(e) => warn!("skipping region {region}: failed to load static inputs: {e}"),
            }
        }

        if regions.is_empty() {
            return Err( op_failed("no usable region directories found") )
        }

        Ok( Controller{ config, regions } )
    }

    /// runs the full invocation protocol: acquire lock, discover pending cycles, optional
    /// seasonal preamble, process each cycle in order, advance the watermark after each, release
    /// the lock unconditionally on the way out.
    pub async fn run (&self) -> Result<()> {
        let existing = odin_rapid_core::Lockfile::read_or_default(&self.config.lockfile_path)?;
        if existing.running {
            info!("lockfile {:?} reports running=true; another controller instance owns the watermark, exiting cleanly", self.config.lockfile_path);
            return Ok(())
        }

        let (mut lock, watermark) = odin_rapid_core::Lockfile::acquire(&self.config.lockfile_path)
            .map_err(|e| CtrlError::LockHeld(e.to_string()))?;

        let pending = discover_pending_cycles(&self.config.release_root, &self.config.release_glob, watermark)?;
        if pending.is_empty() {
            info!("no cycles newer than watermark {}", watermark.canonical());
            lock.release(&self.config.lockfile_path)?;
            return Ok(())
        }

        if let Some(first) = pending.first() {
            self.run_seasonal_preamble(first.cycle);
        }

        for pending_cycle in &pending {
            match self.process_cycle(pending_cycle.cycle, &pending_cycle.release_dir).await {
                Ok(()) => {
                    lock.advance(&self.config.lockfile_path, pending_cycle.cycle)?;
                }
                Err(e) => {
                    error!("cycle {} failed catastrophically, stopping without advancing: {e}", pending_cycle.cycle.canonical());
                    break;
                }
            }
        }

        lock.release(&self.config.lockfile_path)?;
        Ok(())
    }

    /// Strategy B preamble: for each region with no Qinit yet for the first pending cycle, seed
    /// one from the seasonal average if present, otherwise warn and leave it absent (the first
    /// cycle's member jobs then run unseeded).
    fn run_seasonal_preamble (&self, first_cycle: Cycle) {
        for region in &self.regions {
            let path = region.qinit_path(first_cycle);
            if path.is_file() { continue }

            match &region.seasonal {
                Some(seasonal) => {
                    let values = seasonal_init(first_cycle.date, seasonal, &region.connectivity);
                    if let Err(e) = write_qinit_file(&path, &values) {
                        warn!("{}: failed to write seasonal-init Qinit: {e}", region.region);
                    }
                }
                None => warn!("{}: no seasonal average available, no prior Qinit for {}: starting unseeded",
                    region.region, first_cycle.canonical()),
            }
        }
    }

    async fn process_cycle (&self, cycle: Cycle, release_dir: &std::path::Path) -> Result<()> {
        if self.config.download {
            self.invoke_download_hook(cycle)?;
        }

        let grid_files = list_member_grid_files(release_dir)?;
        if grid_files.is_empty() {
            return Err( op_failed( format!("{}: no member grid files discovered under {release_dir:?}", cycle.canonical()) ) )
        }

        let mut outcomes = Vec::with_capacity(self.regions.len());
        for region in &self.regions {
            match self.process_region(region, cycle, &grid_files).await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => warn!("{}: region {} skipped: {e}", cycle.canonical(), region.region),
            }
        }

        self.write_cycle_summary(cycle, &outcomes);
        Ok(())
    }

    fn invoke_download_hook (&self, cycle: Cycle) -> Result<()> {
        let Some(cmd) = &self.config.download_cmd else {
            return Err( op_failed("download enabled but no download_cmd configured") )
        };

        let status = std::process::Command::new(cmd)
            .arg(cycle.canonical())
            .status()
            .map_err(|e| op_failed( format!("failed to launch download hook {cmd:?}: {e}") ))?;

        if !status.success() {
            return Err( op_failed( format!("download hook {cmd:?} exited with {status}") ) )
        }
        Ok(())
    }

    async fn process_region (&self, region: &RegionContext, cycle: Cycle, grid_files: &[crate::gridfiles::GridFileInfo]) -> Result<RegionOutcome> {
        let prior_qinit_path = region.qinit_path(cycle);
        let prior_qinit = if prior_qinit_path.is_file() { Some(prior_qinit_path.clone()) } else { None };

        if self.config.gage_correction {
            if let (Some(path), Some(gages)) = (&prior_qinit, &region.gages) {
                self.apply_gage_correction_to(region, path, gages).await;
            }
        }

        let mut members: HashMap<u8,MemberMeta<'_>> = HashMap::new();
        for info in grid_files {
            let weight_table = match region.weight_table_for(&info.grid_tag) {
                Ok(wt) => wt,
                Err(_) => continue, // grid class not relevant to this region
            };
            members.entry(info.member.index()).or_insert_with(|| MemberMeta {
                grid_file: info.path.clone(),
                grid_tag: info.grid_tag.clone(),
                weight_table,
            });
        }

        if members.is_empty() {
            return Err( op_failed("no grid files match any of this region's weight tables") )
        }

        let output_dir = region.output_dir(cycle);
        ensure_dir(&output_dir).map_err(CtrlError::IOError)?;

        let jobs: Vec<Job> = members.keys().map(|&idx| {
            let member = EnsembleMember::new(idx as u32).expect("index already validated by GridFileInfo");
            let output_path = output_dir.join( format!("Qout_{}_{}_{}.nc", region.region.watershed(), region.region.subbasin(), idx) );
            let work_dir = self.config.scratch_root.join(region.region.as_str()).join(cycle.lockfile_form()).join(idx.to_string());
            Job { region: region.region.clone(), cycle, member, work_dir, output_path }
        }).collect();

        let outcomes = self.dispatch(region, prior_qinit.clone(), members, jobs).await?;

        let completed: Vec<QoutFile> = outcomes.iter()
            .filter(|o| o.is_success())
            .filter_map(|o| QoutFile::read(&o.job().output_path).ok())
            .collect();
        let failed_count = outcomes.iter().filter(|o| !o.is_success()).count();

        let mut warnings_written = false;
        if self.config.warnings && !completed.is_empty() {
            if let Some(table) = &region.return_periods {
                match daily_peak_stats(&completed) {
                    Ok(stats) => {
                        let tiers = build_warnings(&stats, table, self.config.warning_threshold);
                        for (features, tier) in tiers.into_iter().zip([odin_rapid_warn::Tier::Return2,odin_rapid_warn::Tier::Return10,odin_rapid_warn::Tier::Return20]) {
                            let path = output_dir.join(tier.file_name());
                            if let Err(e) = odin_rapid_warn::write_tier(&path, features) {
                                warn!("{}: failed to write {}: {e}", region.region, tier.file_name());
                            }
                        }
                        warnings_written = true;
                    }
                    Err(e) => warn!("{}: warning generation failed: {e}", region.region),
                }
            }
        }

        // Strategy A: ensemble-mean Qinit for the next cycle, immediately after this region's
        // member jobs and warning generation, per the ordering guarantee.
        let member_qouts: Vec<MemberQout> = outcomes.iter()
            .filter(|o| o.is_success())
            .filter_map(|o| QoutFile::read(&o.job().output_path).ok().map(|qout| MemberQout{ member: o.job().member, qout }))
            .collect();

        if !member_qouts.is_empty() {
            let means = ensemble_mean(&member_qouts, &region.connectivity);
            let next_path = region.qinit_path(cycle.next());
            if let Err(e) = write_qinit_file(&next_path, &means) {
                warn!("{}: failed to write next-cycle Qinit: {e}", region.region);
            }
        }

        Ok( RegionOutcome{ region: region.region.as_str().to_string(), completed: completed.len(), failed: failed_count, warnings_written } )
    }

    async fn dispatch<'a> (&self, region: &'a RegionContext, prior_qinit: Option<PathBuf>, members: HashMap<u8,MemberMeta<'a>>, jobs: Vec<Job>) -> Result<Vec<odin_rapid_dispatch::Outcome>> {
        match &self.config.dispatcher {
            DispatcherBackend::Local{pool_size} => {
                let runner = Arc::new( MemberJobRunner::new(region, self.config.kernel_path.clone(), prior_qinit, members) );
                let dispatcher: Box<dyn Dispatcher> = match pool_size {
                    Some(n) => Box::new( LocalPoolDispatcher::new(*n, runner) ),
                    None => Box::new( LocalPoolDispatcher::from_available_cores(runner) ),
                };
                Ok( dispatcher.run_batch(jobs).await )
            }
            DispatcherBackend::Cluster{submit_cmd,max_outstanding} => {
                let dispatcher = ClusterDispatcher::new(submit_cmd.clone(), *max_outstanding);
                Ok( dispatcher.run_batch(jobs).await )
            }
        }
    }

    /// fetches each gaged reach's current measurement with a capped, fixed-backoff retry; gages
    /// that stay unreachable are skipped rather than failing the whole region.
    async fn apply_gage_correction_to (&self, region: &RegionContext, prior_qinit_path: &std::path::Path, gages: &GageTable) {
        let Ok(mut init_flows) = read_qinit_as_map(prior_qinit_path, &region.connectivity) else {
            warn!("{}: failed to read prior Qinit for gage correction", region.region);
            return
        };

        let client = MeasurementClient::new();
        let instant = Utc::now();
        let mut measured = HashMap::new();

        for entry in gages.gaged_reaches() {
            let Some(station_id) = &entry.station_id else { continue };
            match fetch_with_retry(&client, station_id, instant).await {
                Some(value) => { measured.insert(entry.rivid, value); }
                None => warn!("{}: no measurement for gage {station_id} (rivid {}), skipping", region.region, entry.rivid),
            }
        }

        if measured.is_empty() { return }

        apply_gage_correction(&mut init_flows, gages, &region.connectivity, &measured);

        let ordered: Vec<f32> = region.connectivity.reaches().iter()
            .map(|r| *init_flows.get(&r.rivid).unwrap_or(&0.0))
            .collect();

        if let Err(e) = write_qinit_file(prior_qinit_path, &ordered) {
            warn!("{}: failed to write gage-corrected Qinit: {e}", region.region);
        }
    }

    fn write_cycle_summary (&self, cycle: Cycle, outcomes: &[RegionOutcome]) {
        let log_path = self.config.log_root.join( format!("{}.log", cycle.lockfile_form()) );
        if ensure_dir(&self.config.log_root).is_err() { return }

        for outcome in outcomes {
            let line = format!(
                "{} region={} completed={} failed={} warnings_written={}",
                Utc::now().to_rfc3339(), outcome.region, outcome.completed, outcome.failed, outcome.warnings_written,
            );
            let _ = append_line_to_file(&log_path, &line);
        }
    }
}

async fn fetch_with_retry (client: &MeasurementClient, station_id: &str, instant: chrono::DateTime<Utc>) -> Option<f64> {
    for attempt in 0..GAGE_RETRY_ATTEMPTS {
        match client.measurement_at(station_id, instant).await {
            Ok(Some(value)) => return Some(value),
            Ok(None) => return None, // no data for this instant; not a transient failure
            Err(e) => {
                warn!("gage {station_id} measurement fetch attempt {attempt} failed: {e}");
                if attempt + 1 < GAGE_RETRY_ATTEMPTS {
                    tokio::time::sleep(GAGE_RETRY_BACKOFF).await;
                }
            }
        }
    }
    None
}

fn read_qinit_as_map (path: &std::path::Path, connectivity: &odin_rapid_core::Connectivity) -> Result<HashMap<i64,f32>> {
    let contents = std::fs::read_to_string(path)?;
    let mut map = HashMap::new();
    for (reach, line) in connectivity.reaches().iter().zip(contents.lines()) {
        if let Ok(value) = line.trim().parse::<f32>() {
            map.insert(reach.rivid, value);
        }
    }
    Ok(map)
}

fn discover_region_names (io_root: &std::path::Path) -> Result<Vec<String>> {
    let input_dir = io_root.join("input");
    let mut names = Vec::new();
    let entries = std::fs::read_dir(&input_dir).map_err(|e| op_failed( format!("{input_dir:?}: {e}") ))?;
    for entry in entries.flatten() {
        if entry.path().is_dir() {
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use odin_rapid_core::Connectivity;

    fn temp_dir (tag: &str) -> PathBuf {
        let p = std::env::temp_dir().join( format!("odin_rapid_ctrl_test_{}_{tag}", std::process::id()) );
        let _ = std::fs::remove_dir_all(&p);
        std::fs::create_dir_all(&p).unwrap();
        p
    }

    fn connectivity_with (rivids: &[i64]) -> Connectivity {
        let csv: String = rivids.iter().map(|r| format!("{r},0,0\n")).collect();
        let path = std::env::temp_dir().join( format!("odin_rapid_ctrl_conn_test_{}.csv", std::process::id()) );
        std::fs::write(&path, csv).unwrap();
        let conn = Connectivity::read_csv(&path).unwrap();
        std::fs::remove_file(&path).ok();
        conn
    }

    #[test]
    fn reads_qinit_in_connectivity_row_order () {
        let dir = temp_dir("qinit");
        let path = dir.join("Qinit_20200101t00.csv");
        std::fs::write(&path, "1.5\n2.5\n3.5\n").unwrap();

        let conn = connectivity_with(&[30,10,20]);
        let map = read_qinit_as_map(&path, &conn).unwrap();

        assert_eq!( map[&30], 1.5 );
        assert_eq!( map[&10], 2.5 );
        assert_eq!( map[&20], 3.5 );

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn discovers_region_names_from_input_subdirectories () {
        let dir = temp_dir("regions");
        std::fs::create_dir_all( dir.join("input").join("nfie-conus") ).unwrap();
        std::fs::create_dir_all( dir.join("input").join("nfie-texgulf") ).unwrap();
        std::fs::write( dir.join("input").join("README.txt"), "not a region" ).unwrap();

        let mut names = discover_region_names(&dir).unwrap();
        names.sort();

        assert_eq!( names, vec!["nfie-conus".to_string(), "nfie-texgulf".to_string()] );

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_input_dir_is_an_error () {
        let dir = temp_dir("missing");
        std::fs::remove_dir_all(&dir).ok();
        assert!( discover_region_names(&dir).is_err() );
    }
}
