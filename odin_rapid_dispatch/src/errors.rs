use thiserror::Error;

pub type Result<T> = std::result::Result<T, DispatchError>;

#[derive(Error,Debug)]
pub enum DispatchError {
    #[error("IO error {0}")]
    IOError( #[from] std::io::Error),

    #[error("{0}")]
    OpFailed(String),
}

pub fn op_failed (msg: impl ToString) -> DispatchError { DispatchError::OpFailed(msg.to_string()) }
