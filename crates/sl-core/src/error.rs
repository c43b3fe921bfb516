use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimelineError {
    #[error("invalid user id: {raw}")]
    InvalidUserId { raw: String },
    #[error("internal error: {message}")]
    Internal { message: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {message}")]
    Invalid { message: String },
}
