use thiserror::Error;

pub type Result<T> = std::result::Result<T, WarnError>;

#[derive(Error,Debug)]
pub enum WarnError {
    #[error("IO error {0}")]
    IOError( #[from] std::io::Error),

    #[error("core error {0}")]
    CoreError( #[from] odin_rapid_core::CoreError),

    #[error("netCDF error {0}")]
    NetCdfError( #[from] netcdf::Error),

    #[error("JSON error {0}")]
    JsonError( #[from] serde_json::Error),

    #[error("{0}")]
    OpFailed(String),
}

pub fn op_failed (msg: impl ToString) -> WarnError { WarnError::OpFailed(msg.to_string()) }
