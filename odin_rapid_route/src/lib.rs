//! Routing Driver: renders a RAPID kernel namelist for one member/segment run and invokes the
//! kernel as a child process, surfacing its exit status.

pub mod errors;
pub mod params;
pub mod driver;

pub use errors::{RouteError,Result,op_failed};
pub use params::{TimestepParams,RunPaths,ForcingPaths,detect_forcing,render_namelist};
pub use driver::RoutingDriver;
