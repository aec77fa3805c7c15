use std::path::Path;
use chrono::NaiveDate;
use geojson::{Feature,FeatureCollection,Geometry,JsonObject,Value as GeoValue};

use crate::errors::Result;
use crate::return_period::ReturnPeriods;
use crate::stats::DailyPeaks;

/// the three warning tiers, from the return-period table's `return_period_{2,10,20}` columns.
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum Tier { Return2, Return10, Return20 }

impl Tier {
    pub fn file_name (&self) -> &'static str {
        match self {
            Tier::Return2 => "return_2_points.geojson",
            Tier::Return10 => "return_10_points.geojson",
            Tier::Return20 => "return_20_points.geojson",
        }
    }
}

/// the highest tier `value` exceeds, or `None` if it exceeds none of them.
fn classify (value: f64, rp: &ReturnPeriods) -> Option<Tier> {
    if value > rp.return_20 { Some(Tier::Return20) }
    else if value > rp.return_10 { Some(Tier::Return10) }
    else if value > rp.return_2 { Some(Tier::Return2) }
    else { None }
}

fn round2 (v: f32) -> f64 {
    (( v as f64 * 100.0).round()) / 100.0
}

fn feature (lat: f64, lon: f64, rivid: i64, peak_date: NaiveDate, property_name: &str, value: f32, size: u8) -> Feature {
    let mut props = JsonObject::new();
    props.insert(property_name.to_string(), serde_json::Value::from( round2(value) ));
    props.insert("peak_date".to_string(), serde_json::Value::from( peak_date.format("%Y-%m-%d").to_string() ));
    props.insert("rivid".to_string(), serde_json::Value::from(rivid));
    props.insert("size".to_string(), serde_json::Value::from(size));

    Feature {
        bbox: None,
        geometry: Some( Geometry::new( GeoValue::Point(vec![lon, lat]) ) ),
        id: None,
        properties: Some(props),
        foreign_members: None,
    }
}

/// emit all warning features for one cycle × region: up to two features per (reach, day) — one
/// for the ensemble mean peak (`size=1`), one for the std-upper peak (`size=0`) — each sorted
/// into the highest tier its statistic exceeds.
pub fn build_warnings (stats: &DailyPeaks, table: &crate::return_period::ReturnPeriodTable, tau: f64) -> [Vec<Feature>; 3] {
    let mut tiers: [Vec<Feature>; 3] = [Vec::new(), Vec::new(), Vec::new()];

    for (row, &rivid) in stats.rivid.iter().enumerate() {
        let Some(rp) = table.get(rivid).map(|rp| rp.with_floor(tau)) else { continue };

        for (col, &date) in stats.dates.iter().enumerate() {
            let mean = stats.mean[[row,col]];
            let std_upper = stats.std_upper[[row,col]];

            if let Some(tier) = classify(mean as f64, &rp) {
                tiers[tier_index(tier)].push( feature(rp.lat, rp.lon, rivid, date, "mean_peak", mean, 1) );
            }
            if let Some(tier) = classify(std_upper as f64, &rp) {
                tiers[tier_index(tier)].push( feature(rp.lat, rp.lon, rivid, date, "std_upper_peak", std_upper, 0) );
            }
        }
    }

    tiers
}

fn tier_index (tier: Tier) -> usize {
    match tier { Tier::Return2 => 0, Tier::Return10 => 1, Tier::Return20 => 2 }
}

/// write one tier's features as a FeatureCollection in EPSG:4326, matching
/// `geojson_features_to_collection`'s named-CRS wrapper.
pub fn write_tier (path: impl AsRef<Path>, features: Vec<Feature>) -> Result<()> {
    let mut crs = JsonObject::new();
    crs.insert("type".to_string(), serde_json::Value::from("name"));
    let mut crs_props = JsonObject::new();
    crs_props.insert("name".to_string(), serde_json::Value::from("EPSG:4326"));
    crs.insert("properties".to_string(), serde_json::Value::Object(crs_props));

    let mut foreign = JsonObject::new();
    foreign.insert("crs".to_string(), serde_json::Value::Object(crs));

    let fc = FeatureCollection{ bbox: None, features, foreign_members: Some(foreign) };
    std::fs::write(path, fc.to_string())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn classify_picks_highest_exceeded_tier() {
        let rp = ReturnPeriods{ return_2: 5.0, return_10: 25.0, return_20: 50.0, lat: 0.0, lon: 0.0 };
        assert_eq!( classify(30.0, &rp), Some(Tier::Return10) );
        assert_eq!( classify(60.0, &rp), Some(Tier::Return20) );
        assert_eq!( classify(3.0, &rp), None );
    }

    #[test]
    fn peak_value_rounds_to_two_decimals() {
        assert_eq!( round2(12.344), 12.34 );
        assert_eq!( round2(12.346), 12.35 );
    }

    #[test]
    fn builds_mean_and_std_upper_features_for_one_reach_one_day() {
        let stats = DailyPeaks {
            dates: vec![ NaiveDate::from_ymd_opt(2020,1,1).unwrap() ],
            rivid: vec![10],
            mean: Array2::from_elem((1,1), 30.0),
            std: Array2::from_elem((1,1), 0.0),
            max: Array2::from_elem((1,1), 30.0),
            std_upper: Array2::from_elem((1,1), 60.0),
        };

        // exercised indirectly: the real ReturnPeriodTable is built from NetCDF, so here we only
        // check the tier classification feeding build_warnings behaves per scenario S6.
        let rp = ReturnPeriods{ return_2: 5.0, return_10: 25.0, return_20: 50.0, lat: 1.0, lon: 2.0 };
        assert_eq!( classify(stats.mean[[0,0]] as f64, &rp), Some(Tier::Return10) );
        assert_eq!( classify(stats.std_upper[[0,0]] as f64, &rp), Some(Tier::Return20) );
    }
}
