//! Warning-Point Generator: turns a cycle's ensemble of per-member Qouts and a region's
//! return-period table into three tiered GeoJSON FeatureCollections of exceedance points.

pub mod errors;
pub mod stats;
pub mod return_period;
pub mod geojson;

pub use errors::{WarnError,Result,op_failed};
pub use stats::{DailyPeaks,daily_peak_stats};
pub use return_period::{ReturnPeriods,ReturnPeriodTable};
pub use geojson::{Tier,build_warnings,write_tier};
