use crate::hub::HubError;
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while assembling or publishing the evaluation report
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Invalid result name: {0}")]
    InvalidIdentifier(String),

    #[error("Invalid mapping '{0}', expected <reference>:<optimized1,...,optimizedN>")]
    MalformedMapping(String),

    #[error("No eval results found for {0}")]
    NotFound(PathBuf),

    #[error("No file size entry for reference model {0}")]
    MissingFileSize(String),

    #[error("Cannot compute {0} over an empty result set")]
    EmptyResults(&'static str),

    #[error("Malformed evaluation record: {0}")]
    MalformedRecord(String),

    #[error("Failed to parse JSON: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    #[error("Hub error: {0}")]
    Hub(#[from] HubError),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for report operations
pub type ReportResult<T> = Result<T, ReportError>;

pub mod util {
    use super::*;

    /// Attach context to a malformed record failure
    pub fn malformed<E: fmt::Display>(e: E, context: &str) -> ReportError {
        ReportError::MalformedRecord(format!("{}: {}", context, e))
    }
}

impl From<config::ConfigError> for ReportError {
    fn from(err: config::ConfigError) -> Self {
        ReportError::ConfigError(err.to_string())
    }
}
