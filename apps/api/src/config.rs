use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::normalize::PipelineConfig;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub max_upload_bytes: usize,
    /// JSON file overriding the built-in section keyword tables.
    pub keywords_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            max_upload_bytes: match std::env::var("MAX_UPLOAD_BYTES") {
                Ok(raw) => raw
                    .parse::<usize>()
                    .context("MAX_UPLOAD_BYTES must be a byte count")?,
                Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
            },
            keywords_path: std::env::var_os("KEYWORDS_PATH").map(PathBuf::from),
        })
    }

    /// Built-in tables, or the ones from `KEYWORDS_PATH` when set.
    pub fn pipeline_config(&self) -> Result<PipelineConfig> {
        match &self.keywords_path {
            Some(path) => PipelineConfig::from_json_file(path),
            None => Ok(PipelineConfig::default()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            rust_log: "info".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            keywords_path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pipeline_config_without_path() {
        let config = Config::default();
        let pipeline = config.pipeline_config().unwrap();
        assert_eq!(pipeline.summary_wrap_width, 120);
    }

    #[test]
    fn test_missing_keywords_file_is_an_error() {
        let config = Config {
            keywords_path: Some(PathBuf::from("/nonexistent/keywords.json")),
            ..Config::default()
        };
        assert!(config.pipeline_config().is_err());
    }
}
