use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Error,Debug)]
pub enum CoreError {
    #[error("IO error {0}")]
    IOError( #[from] std::io::Error),

    #[error("config error {0}")]
    ConfigError( #[from] odin_build::OdinBuildError),

    #[error("CSV error {0}")]
    CsvError( #[from] csv::Error),

    #[error("JSON error {0}")]
    JsonError( #[from] serde_json::Error),

    #[error("netCDF error {0}")]
    NetCdfError( #[from] netcdf::Error),

    #[error("invalid region name '{0}'")]
    InvalidRegionName(String),

    #[error("invalid cycle string '{0}'")]
    InvalidCycle(String),

    #[error("invalid ensemble member index {0}")]
    InvalidMember(u32),

    #[error("malformed weight table: {0}")]
    WeightTableMalformed(String),

    #[error("weight table group spans multiple StreamIDs: {0}")]
    GroupStreamIdInconsistent(String),

    #[error("malformed connectivity file: {0}")]
    ConnectivityMalformed(String),

    #[error("lockfile is corrupted: {0}")]
    LockfileCorruption(String),

    #[error("{0}")]
    OpFailed(String),
}

pub fn op_failed (msg: impl ToString)->CoreError { CoreError::OpFailed(msg.to_string()) }
