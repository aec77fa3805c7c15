use thiserror::Error;

pub type Result<T> = std::result::Result<T, MemberError>;

#[derive(Error,Debug)]
pub enum MemberError {
    #[error("IO error {0}")]
    IOError( #[from] std::io::Error),

    #[error("core error {0}")]
    CoreError( #[from] odin_rapid_core::CoreError),

    #[error("inflow error {0}")]
    InflowError( #[from] odin_rapid_inflow::InflowError),

    #[error("route error {0}")]
    RouteError( #[from] odin_rapid_route::RouteError),

    #[error("netCDF error {0}")]
    NetCdfError( #[from] netcdf::Error),

    #[error("CSV error {0}")]
    CsvError( #[from] csv::Error),

    #[error("{0}")]
    OpFailed(String),
}

pub fn op_failed (msg: impl ToString)->MemberError { MemberError::OpFailed(msg.to_string()) }
