/// Error types for Print Desk
///
/// One enum per concern. None of these are fatal to the application:
/// a failed file read skips that file, a failed conversion only affects
/// that file's preview, and a failed submission leaves the batch intact.

use std::path::PathBuf;
use thiserror::Error;

use crate::state::data::EntryId;

/// Errors raised while reading a dropped or picked file
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LoadError {
    /// The file could not be read from disk
    #[error("Failed to read {path}: {reason}")]
    Read { path: PathBuf, reason: String },
    /// The file type is not one we can print
    #[error("Unsupported file type: {name}")]
    Unsupported { name: String },
    /// The file is larger than the configured limit
    #[error("{name} is too large ({size} bytes, limit {limit})")]
    TooLarge { name: String, size: u64, limit: u64 },
    /// Background task failed to complete
    #[error("Task join error: {0}")]
    Join(String),
}

/// Errors from the remote conversion / upload service
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ServiceError {
    /// Connection, timeout or transport failure
    #[error("Network error: {0}")]
    Network(String),
    /// The service answered with a non-2xx status
    #[error("Service returned HTTP {0}")]
    Status(u16),
    /// The conversion response had no usable preview URL
    #[error("Conversion response did not contain a preview URL")]
    MissingUrl,
    /// The response body could not be understood
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    /// A configured or returned URL could not be parsed
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            ServiceError::Status(status.as_u16())
        } else {
            ServiceError::Network(err.to_string())
        }
    }
}

/// Errors from the converted-preview cache database
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Failed to create cache directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("Could not determine user data directory")]
    NoDataDir,
}

/// Errors while loading the config file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors from store operations addressed by index or id
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("No file at index {index} (store has {len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("No file with id {0:?}")]
    UnknownEntry(EntryId),
}
