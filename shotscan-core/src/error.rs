use thiserror::Error;

/// Error types for shotscan-core operations.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ffprobe failed: {0}")]
    Ffprobe(String),

    #[error("ffprobe parse error: {0}")]
    FfprobeParse(String),

    #[error("decoder error: {0}")]
    Decoder(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("annotation error: {0}")]
    Annotation(String),

    #[error("processing cancelled")]
    Cancelled,
}

/// Result type for shotscan-core operations.
pub type CoreResult<T> = std::result::Result<T, CoreError>;
