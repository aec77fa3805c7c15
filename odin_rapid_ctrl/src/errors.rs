use thiserror::Error;

pub type Result<T> = std::result::Result<T, CtrlError>;

#[derive(Error,Debug)]
pub enum CtrlError {
    #[error("IO error {0}")]
    IOError( #[from] std::io::Error),

    #[error("config error {0}")]
    ConfigError( #[from] odin_build::OdinBuildError),

    #[error("core error {0}")]
    CoreError( #[from] odin_rapid_core::CoreError),

    #[error("inflow error {0}")]
    InflowError( #[from] odin_rapid_inflow::InflowError),

    #[error("route error {0}")]
    RouteError( #[from] odin_rapid_route::RouteError),

    #[error("member error {0}")]
    MemberError( #[from] odin_rapid_member::MemberError),

    #[error("assimilation error {0}")]
    AssimError( #[from] odin_rapid_assim::AssimError),

    #[error("warning error {0}")]
    WarnError( #[from] odin_rapid_warn::WarnError),

    #[error("glob pattern error {0}")]
    GlobError( #[from] glob::PatternError),

    #[error("lock held: {0}")]
    LockHeld(String),

    #[error("{0}")]
    OpFailed(String),
}

pub fn op_failed (msg: impl ToString)->CtrlError { CtrlError::OpFailed(msg.to_string()) }
