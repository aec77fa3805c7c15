use thiserror::Error;

pub type Result<T> = std::result::Result<T, RouteError>;

#[derive(Error,Debug)]
pub enum RouteError {
    #[error("IO error {0}")]
    IOError( #[from] std::io::Error),

    #[error("core error {0}")]
    CoreError( #[from] odin_rapid_core::CoreError),

    #[error("kernel exited with status {0}")]
    KernelNonZeroExit(std::process::ExitStatus),

    #[error("failed to spawn kernel: {0}")]
    SpawnFailed(String),

    #[error("{0}")]
    OpFailed(String),
}

pub fn op_failed (msg: impl ToString)->RouteError { RouteError::OpFailed(msg.to_string()) }
