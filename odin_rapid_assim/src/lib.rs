//! Initial-Flow Assimilator: builds the per-region `Qinit` file each forecast cycle seeds from,
//! via Strategy A (ensemble mean of the prior cycle), Strategy B (seasonal average), and an
//! optional gage-based corrector.

pub mod errors;
pub mod ensemble_mean;
pub mod seasonal;
pub mod gage;
pub mod qinit;

pub use errors::{AssimError,Result,op_failed};
pub use ensemble_mean::{MemberQout,ensemble_mean,sample_index};
pub use seasonal::{SeasonalAverage,day_of_year_index,seasonal_init};
pub use gage::{GageEntry,GageTable,MeasurementClient,apply_gage_correction};
pub use qinit::write_qinit_file;
