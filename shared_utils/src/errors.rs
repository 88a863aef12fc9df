use thiserror::Error;

#[derive(Error, Debug)]
pub enum RespImgError {
    #[error("Invalid quality value: {0}")]
    InvalidQuality(String),

    #[error("Invalid image width: {0}")]
    InvalidWidth(String),

    #[error("Unsupported source format: {0}")]
    UnsupportedFormat(String),

    #[error("External tool not found: {0}")]
    ToolNotFound(String),

    #[error("{tool} failed: {stderr}")]
    ToolFailed { tool: String, stderr: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RespImgError>;
