use serde::{Deserialize, Serialize};
use std::fmt;

/// Message surfaced when DDL generation is attempted without any columns.
pub const EMPTY_METADATA_MESSAGE: &str = "No metadata available to generate SQL.";

#[derive(Debug, Serialize, Deserialize)]
pub enum AppError {
    Internal(String),
    ValidationError(String),
    ParseError(String),
    IoError(String),
    EmptyMetadata,
    PublishError(String),
    ConfigError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            AppError::IoError(msg) => write!(f, "IO error: {}", msg),
            AppError::EmptyMetadata => write!(f, "{}", EMPTY_METADATA_MESSAGE),
            AppError::PublishError(msg) => write!(f, "Publish error: {}", msg),
            AppError::ConfigError(msg) => write!(f, "Config error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
