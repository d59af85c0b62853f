//! Configuration module
//!
//! Upload settings are read from the environment (and a `.env` file when present).
//! The upload pipeline itself never reads configuration; hosts build a storage backend
//! and a format registry from [`UploadConfig`] and pass the size limit per call.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::storage_types::StorageBackend;

const UPLOAD_DIR: &str = "uploads";
const MAX_FILE_SIZE_MB: u64 = 10;
const ALLOWED_FORMATS: &str = "jpg,png,gif";
const BYTES_PER_MB: u64 = 1024 * 1024;

/// Console log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "compact" | "text" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            _ => Err(anyhow::anyhow!("Invalid log format: {}", s)),
        }
    }
}

/// Upload configuration
#[derive(Clone, Debug)]
pub struct UploadConfig {
    pub upload_dir: PathBuf,
    /// Maximum accepted upload size in bytes. 0 = unlimited.
    pub max_file_size_bytes: u64,
    pub storage_backend: StorageBackend,
    /// When set, local storage refuses to write outside this directory.
    pub local_storage_root: Option<PathBuf>,
    /// Format tokens accepted by the upload pipeline, lowercased.
    pub allowed_formats: Vec<String>,
    pub environment: String,
    pub log_format: LogFormat,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from(UPLOAD_DIR),
            max_file_size_bytes: MAX_FILE_SIZE_MB * BYTES_PER_MB,
            storage_backend: StorageBackend::Local,
            local_storage_root: None,
            allowed_formats: split_formats(ALLOWED_FORMATS),
            environment: "development".to_string(),
            log_format: LogFormat::Compact,
        }
    }
}

impl UploadConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup (the environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let max_file_size_bytes = match lookup("MAX_FILE_SIZE_BYTES") {
            Some(bytes) => bytes
                .trim()
                .parse::<u64>()
                .map_err(|e| anyhow::anyhow!("Invalid MAX_FILE_SIZE_BYTES '{}': {}", bytes, e))?,
            None => {
                let mb = lookup("MAX_FILE_SIZE_MB")
                    .and_then(|v| v.trim().parse::<u64>().ok())
                    .unwrap_or(MAX_FILE_SIZE_MB);
                mb.saturating_mul(BYTES_PER_MB)
            }
        };

        let storage_backend = lookup("STORAGE_BACKEND")
            .map(|v| v.parse::<StorageBackend>())
            .transpose()?
            .unwrap_or(StorageBackend::Local);

        let log_format = lookup("LOG_FORMAT")
            .map(|v| v.parse::<LogFormat>())
            .transpose()?
            .unwrap_or(LogFormat::Compact);

        let config = UploadConfig {
            upload_dir: lookup("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(UPLOAD_DIR)),
            max_file_size_bytes,
            storage_backend,
            local_storage_root: lookup("LOCAL_STORAGE_ROOT")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            allowed_formats: split_formats(
                &lookup("ALLOWED_FORMATS").unwrap_or_else(|| ALLOWED_FORMATS.to_string()),
            ),
            environment,
            log_format,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.upload_dir.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("UPLOAD_DIR cannot be empty"));
        }

        if self.allowed_formats.is_empty() {
            return Err(anyhow::anyhow!(
                "ALLOWED_FORMATS must list at least one format"
            ));
        }

        if self.is_production() && self.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!(
                "An unlimited upload size is not allowed in production. Set MAX_FILE_SIZE_MB."
            ));
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }
}

fn split_formats(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
