/// Application configuration
///
/// Loaded from `<config_dir>/print-desk/config.json` when present. Missing
/// fields take their defaults, and the service endpoints can be overridden
/// with `PRINT_DESK_CONVERT_URL` / `PRINT_DESK_UPLOAD_URL`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::state::selection::DEFAULT_PAGE_SIZE;

const DEFAULT_CONVERT_URL: &str = "https://fileuploadbackend-iwbq.onrender.com/upload";
const DEFAULT_UPLOAD_URL: &str = "https://fileuploadbackend-3rs9.onrender.com/api/upload";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_MAX_FILE_BYTES: u64 = 50 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Single-file conversion endpoint
    pub convert_url: String,
    /// Batch upload endpoint
    pub upload_url: String,
    /// Files per page in the file list
    pub page_size: usize,
    /// Per-request HTTP timeout
    pub request_timeout_secs: u64,
    /// Files larger than this are rejected when added
    pub max_file_bytes: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            convert_url: DEFAULT_CONVERT_URL.to_string(),
            upload_url: DEFAULT_UPLOAD_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
        }
    }
}

impl AppConfig {
    /// Load from the default location, falling back to defaults on any error
    pub fn load() -> Self {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => match Self::from_file(&path) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Ignoring config at {}: {}", path.display(), e);
                    Self::default()
                }
            },
            _ => Self::default(),
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.sanitized()
    }

    pub fn config_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir()?;
        path.push("print-desk");
        path.push("config.json");
        Some(path)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    fn apply_env_overrides(&mut self, get: impl Fn(&str) -> Option<String>) {
        if let Some(url) = get("PRINT_DESK_CONVERT_URL").filter(|v| !v.is_empty()) {
            self.convert_url = url;
        }
        if let Some(url) = get("PRINT_DESK_UPLOAD_URL").filter(|v| !v.is_empty()) {
            self.upload_url = url;
        }
    }

    /// Replace out-of-range values with defaults
    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if self.page_size == 0 {
            tracing::warn!("page_size must be at least 1, using {}", defaults.page_size);
            self.page_size = defaults.page_size;
        }
        if self.request_timeout_secs == 0 {
            self.request_timeout_secs = defaults.request_timeout_secs;
        }
        if self.max_file_bytes == 0 {
            self.max_file_bytes = defaults.max_file_bytes;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = AppConfig::from_json(r#"{ "page_size": 4 }"#).unwrap();
        assert_eq!(config.page_size, 4);
        assert_eq!(config.convert_url, DEFAULT_CONVERT_URL);
        assert_eq!(config.request_timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(matches!(AppConfig::from_json("{ nope"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_zero_values_are_sanitized() {
        let config = AppConfig::from_json(r#"{ "page_size": 0, "request_timeout_secs": 0 }"#)
            .unwrap()
            .sanitized();
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.request_timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config.apply_env_overrides(|key| match key {
            "PRINT_DESK_CONVERT_URL" => Some("http://localhost:9000/upload".to_string()),
            "PRINT_DESK_UPLOAD_URL" => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.convert_url, "http://localhost:9000/upload");
        assert_eq!(config.upload_url, DEFAULT_UPLOAD_URL);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "upload_url": "http://localhost/api/upload" }"#).unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.upload_url, "http://localhost/api/upload");
    }
}
