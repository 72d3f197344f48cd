use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("FFmpeg not found: {0}")]
    EngineNotFound(String),

    #[error("Input file not found: {0}")]
    InputNotFound(String),

    #[error("FFprobe failed: {0}")]
    ProbeFailed(String),

    #[error("FFmpeg failed (exit code {exit_code:?}): {detail}")]
    EngineFailed {
        exit_code: Option<i32>,
        detail: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConvertError>;
