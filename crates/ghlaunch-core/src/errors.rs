use thiserror::Error;

/// ghlaunch error types.
///
/// Convention: `LaunchError` is used at the crate boundary (public API).
/// Internal helpers (config, storage) use `anyhow::Result` for convenience with `.context()`.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("invalid target path: {0}")]
    InvalidPath(String),

    #[error("input unavailable: {0}")]
    InputUnavailable(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("tool not found: {0}")]
    ToolNotFound(String),

    #[error("{tool} exited with {status}")]
    ToolFailed { tool: String, status: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, LaunchError>;
