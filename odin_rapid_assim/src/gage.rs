use std::{collections::HashMap,path::Path};
use chrono::{DateTime,TimeZone,Utc};
use serde::Deserialize;
use tracing::debug;

use odin_rapid_core::Connectivity;
use crate::errors::Result;

const CFS_TO_CMS: f64 = 35.3146667;
const USGS_IV_ENDPOINT: &str = "https://waterservices.usgs.gov/nwis/iv/";

/// one row of `usgs_gages.csv`: `rivid, natural_flow, station_id`. `natural_flow` and
/// `station_id` are independently optional in the original.
#[derive(Debug,Clone)]
pub struct GageEntry {
    pub rivid: i64,
    pub natural_flow: Option<f64>,
    pub station_id: Option<String>,
}

/// the `usgs_gages.csv` lookup, keyed by rivid.
pub struct GageTable(HashMap<i64,GageEntry>);

impl GageTable {
    pub fn read_csv (path: impl AsRef<Path>) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;
        let mut map = HashMap::new();

        for rec in reader.records() {
            let rec = rec?;
            let rivid: i64 = match rec.get(0).and_then(|s| s.trim().parse().ok()) {
                Some(v) => v,
                None => continue,
            };
            let natural_flow = rec.get(1).and_then(|s| s.trim().parse::<f64>().ok());
            let station_id = rec.get(2)
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(normalize_station_id);

            map.insert( rivid, GageEntry{ rivid, natural_flow, station_id } );
        }

        Ok( GageTable(map) )
    }

    pub fn get (&self, rivid: i64) -> Option<&GageEntry> { self.0.get(&rivid) }

    pub fn gaged_reaches (&self) -> impl Iterator<Item = &GageEntry> {
        self.0.values().filter(|e| e.station_id.is_some())
    }
}

/// USGS pads 7-digit site numbers with a leading zero.
fn normalize_station_id (s: &str) -> String {
    if s.len() == 7 { format!("0{s}") } else { s.to_string() }
}

#[derive(Debug,Deserialize)]
struct IvResponse {
    value: IvValue,
}
#[derive(Debug,Deserialize)]
struct IvValue {
    #[serde(rename = "timeSeries")]
    time_series: Vec<IvTimeSeries>,
}
#[derive(Debug,Deserialize)]
struct IvTimeSeries {
    values: Vec<IvValues>,
}
#[derive(Debug,Deserialize)]
struct IvValues {
    value: Vec<IvSample>,
}
#[derive(Debug,Deserialize)]
struct IvSample {
    #[serde(rename = "dateTime")]
    date_time: String,
    value: String,
}

/// fetches an instantaneous discharge measurement from the USGS Instantaneous Values service.
pub struct MeasurementClient {
    client: reqwest::Client,
    endpoint: String,
}

impl MeasurementClient {
    pub fn new () -> Self {
        MeasurementClient{ client: reqwest::Client::new(), endpoint: USGS_IV_ENDPOINT.to_string() }
    }

    #[cfg(test)]
    fn with_endpoint (endpoint: impl Into<String>) -> Self {
        MeasurementClient{ client: reqwest::Client::new(), endpoint: endpoint.into() }
    }

    /// the discharge (m³/s) at `instant`, or `None` if no sample exists at `instant` or within
    /// one hour of it. Matches `USGSStreamGage.get_gage_data`: exact match wins outright; failing
    /// that, linear interpolation between the bracketing samples if they are less than an hour
    /// apart, otherwise unavailable.
    pub async fn measurement_at (&self, station_id: &str, instant: DateTime<Utc>) -> Result<Option<f64>> {
        let start = (instant - chrono::Duration::days(1)).format("%Y-%m-%d").to_string();
        let end = instant.format("%Y-%m-%d").to_string();

        let response = self.client.get(&self.endpoint)
            .query(&[
                ("format","json"),
                ("sites", station_id),
                ("startDT", &start),
                ("endDT", &end),
                ("parameterCd","00060"),
            ])
            .send().await?;

        if !response.status().is_success() {
            debug!("USGS request for site {station_id} failed with status {}", response.status());
            return Ok(None);
        }

        let body: IvResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => { debug!("USGS response for site {station_id} did not parse: {e}"); return Ok(None) }
        };

        let Some(series) = body.value.time_series.first() else { return Ok(None) };
        let Some(values) = series.values.first() else { return Ok(None) };

        Ok( interpolate(&values.value, instant) )
    }
}

impl Default for MeasurementClient {
    fn default () -> Self { Self::new() }
}

fn interpolate (samples: &[IvSample], instant: DateTime<Utc>) -> Option<f64> {
    let mut prev: Option<(DateTime<Utc>,f64)> = None;

    for sample in samples {
        let t = DateTime::parse_from_rfc3339(&sample.date_time).ok()?.with_timezone(&Utc);
        let v: f64 = sample.value.parse().ok()?;

        if t == instant {
            return if v > 0.0 { Some(v / CFS_TO_CMS) } else { None };
        }
        if t > instant {
            let (prev_t, prev_v) = prev?;
            if t - prev_t < chrono::Duration::hours(1) {
                let needed = instant.timestamp() as f64;
                let prev_s = prev_t.timestamp() as f64;
                let next_s = t.timestamp() as f64;
                let prev_flow = prev_v / CFS_TO_CMS;
                let next_flow = v / CFS_TO_CMS;
                return Some( prev_flow + (next_flow - prev_flow) * (needed - prev_s) / (next_s - prev_s) );
            }
            return None;
        }
        prev = Some((t, v));
    }

    None
}

/// the Corrector: for every gaged reach with a measured flow, compute its error against the
/// current initial flow and push a correction to its immediate upstream/downstream neighbors
/// (never through another gaged reach), per `modify_init_flows_from_gage_flows` /
/// `modify_flow_connected`.
pub fn apply_gage_correction (
    init_flows: &mut HashMap<i64,f32>,
    gages: &GageTable,
    connectivity: &Connectivity,
    measured: &HashMap<i64,f64>,
) {
    for entry in gages.gaged_reaches() {
        let Some(&measured_flow) = measured.get(&entry.rivid) else { continue };
        let initial = *init_flows.get(&entry.rivid).unwrap_or(&0.0) as f64;

        let error = match entry.natural_flow {
            Some(natural) if natural != 0.0 => measured_flow - initial,
            _ => 0.0,
        };

        init_flows.insert(entry.rivid, measured_flow as f32);

        let mut neighbors: Vec<i64> = connectivity.upstream_of(entry.rivid).iter().map(|r| r.rivid).collect();
        if let Some(down) = connectivity.downstream_of(entry.rivid) {
            neighbors.push(down.rivid);
        }

        for neighbor_id in neighbors {
            // never propagate through another gaged reach
            if gages.get(neighbor_id).map(|g| g.station_id.is_some()).unwrap_or(false) {
                continue;
            }

            let neighbor_natural = gages.get(neighbor_id).and_then(|g| g.natural_flow);
            let updated = match (neighbor_natural, entry.natural_flow) {
                (Some(n_natural), Some(s_natural)) if s_natural != 0.0 => {
                    let current = *init_flows.get(&neighbor_id).unwrap_or(&0.0) as f64;
                    (current + error * n_natural / s_natural).max(0.0) as f32
                }
                _ => measured_flow as f32,
            };

            init_flows.insert(neighbor_id, updated);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connectivity_with_topology () -> Connectivity {
        // A (up: B,C), B and C leaves; A is the outlet
        let csv = "1,0,2,2,3\n2,1,0\n3,1,0\n";
        let mut path = std::env::temp_dir();
        path.push( format!("odin_rapid_assim_gage_test_{}.csv", std::process::id()) );
        std::fs::write(&path, csv).unwrap();
        let conn = Connectivity::read_csv(&path).unwrap();
        std::fs::remove_file(&path).ok();
        conn
    }

    fn gages () -> GageTable {
        let mut m = HashMap::new();
        m.insert(1, GageEntry{ rivid: 1, natural_flow: Some(100.0), station_id: Some("1".into()) });
        m.insert(2, GageEntry{ rivid: 2, natural_flow: Some(40.0), station_id: None });
        m.insert(3, GageEntry{ rivid: 3, natural_flow: None, station_id: None });
        GageTable(m)
    }

    #[test]
    fn propagates_to_immediate_neighbors_with_natural_flow_ratio () {
        let conn = connectivity_with_topology();
        let gage_table = gages();
        let mut init = HashMap::new();
        init.insert(1, 30.0f32);
        init.insert(2, 20.0f32);
        init.insert(3, 10.0f32);

        let mut measured = HashMap::new();
        measured.insert(1, 50.0f64);

        apply_gage_correction(&mut init, &gage_table, &conn, &measured);

        assert_eq!( init[&1], 50.0 );
        assert!( (init[&2] - 28.0).abs() < 1e-6 ); // 20 + (50-30)*40/100 = 28
        assert_eq!( init[&3], 50.0 ); // no natural_flow -> fallback to measured
    }

    #[test]
    fn never_propagates_through_another_gaged_reach () {
        let conn = connectivity_with_topology();
        let mut gage_map = HashMap::new();
        gage_map.insert(1, GageEntry{ rivid: 1, natural_flow: Some(100.0), station_id: Some("1".into()) });
        gage_map.insert(2, GageEntry{ rivid: 2, natural_flow: Some(40.0), station_id: Some("2".into()) });
        let gage_table = GageTable(gage_map);

        let mut init = HashMap::new();
        init.insert(1, 30.0f32);
        init.insert(2, 20.0f32);

        let mut measured = HashMap::new();
        measured.insert(1, 50.0f64);

        apply_gage_correction(&mut init, &gage_table, &conn, &measured);

        assert_eq!( init[&2], 20.0 ); // untouched: reach 2 is itself gaged
    }

    #[test]
    fn interpolates_within_one_hour_gap () {
        let t0: DateTime<Utc> = Utc.with_ymd_and_hms(2020,1,1,0,0,0).unwrap();
        let t1 = t0 + chrono::Duration::minutes(30);
        let samples = vec![
            IvSample{ date_time: t0.to_rfc3339(), value: "100.0".into() },
            IvSample{ date_time: t1.to_rfc3339(), value: "200.0".into() },
        ];
        let target = t0 + chrono::Duration::minutes(15);
        let result = interpolate(&samples, target).unwrap();
        // midpoint of 100/35.3146667 and 200/35.3146667
        let expected = (100.0/CFS_TO_CMS + 200.0/CFS_TO_CMS) / 2.0;
        assert!( (result - expected).abs() < 1e-6 );
    }

    #[test]
    fn gap_over_one_hour_is_unavailable () {
        let t0: DateTime<Utc> = Utc.with_ymd_and_hms(2020,1,1,0,0,0).unwrap();
        let t1 = t0 + chrono::Duration::hours(2);
        let samples = vec![
            IvSample{ date_time: t0.to_rfc3339(), value: "100.0".into() },
            IvSample{ date_time: t1.to_rfc3339(), value: "200.0".into() },
        ];
        let target = t0 + chrono::Duration::minutes(30);
        assert!( interpolate(&samples, target).is_none() );
    }
}
