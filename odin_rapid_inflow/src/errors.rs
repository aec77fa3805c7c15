use thiserror::Error;

pub type Result<T> = std::result::Result<T, InflowError>;

#[derive(Error,Debug)]
pub enum InflowError {
    #[error("IO error {0}")]
    IOError( #[from] std::io::Error),

    #[error("core error {0}")]
    CoreError( #[from] odin_rapid_core::CoreError),

    #[error("netCDF error {0}")]
    NetCdfError( #[from] netcdf::Error),

    #[error("invalid grid: {0}")]
    InvalidGrid(String),

    #[error("{0}")]
    OpFailed(String),
}

pub fn op_failed (msg: impl ToString)->InflowError { InflowError::OpFailed(msg.to_string()) }
