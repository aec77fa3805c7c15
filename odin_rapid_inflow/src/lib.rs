//! Grid-to-Reach Inflow Builder: turns one gridded runoff forecast (ECMWF cumulative runoff,
//! HighRes/LowResFull/LowRes) into an `InflowSeries` NetCDF of per-reach lateral inflow, using a
//! precomputed area-weight table to gather and sum contributing cells per reach.

pub mod errors;
pub mod segment;
pub mod grid;
pub mod builder;

pub use errors::{InflowError,Result,op_failed};
pub use segment::SegmentSelector;
pub use grid::GridForecast;
pub use builder::{build_inflow,write_inflow_series};
