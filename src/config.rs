// src/config.rs
use crate::types::request::MAX_UPLOAD_BYTES;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 400;
pub const FREE_JOB_LIMIT: usize = 5;
const CONFIG_FILE: &str = "applyflow.yaml";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub backend_url: String,
    pub timeout_secs: u64,
    pub max_upload_bytes: u64,
    pub free_job_limit: usize,
    pub download_dir: PathBuf,
    pub log_file: PathBuf,
}

/// One environment section of `applyflow.yaml`; every key is optional.
#[derive(Debug, Default, Deserialize)]
struct EnvironmentSection {
    backend_url: Option<String>,
    timeout_secs: Option<u64>,
    max_upload_bytes: Option<u64>,
    free_job_limit: Option<usize>,
    download_dir: Option<PathBuf>,
    log_file: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    local: EnvironmentSection,
    #[serde(default)]
    production: EnvironmentSection,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_upload_bytes: MAX_UPLOAD_BYTES,
            free_job_limit: FREE_JOB_LIMIT,
            download_dir: PathBuf::from("downloads"),
            log_file: std::env::temp_dir().join("applyflow.log"),
        }
    }
}

impl ClientConfig {
    pub fn new(backend_url: impl Into<String>) -> Self {
        Self::default().with_backend_url(backend_url)
    }

    pub fn with_backend_url(mut self, url: impl Into<String>) -> Self {
        self.backend_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_download_dir(mut self, dir: PathBuf) -> Self {
        self.download_dir = dir;
        self
    }

    pub fn with_free_job_limit(mut self, limit: usize) -> Self {
        self.free_job_limit = limit;
        self
    }

    /// Load configuration: defaults, then `applyflow.yaml` if present, then environment variables.
    pub fn load() -> Result<Self> {
        let environment = Self::get_environment();
        info!("Loading configuration for environment: {}", environment);

        let mut config = Self::default();
        let config_path = PathBuf::from(CONFIG_FILE);
        if config_path.exists() {
            config = config.merge_file(&config_path, &environment)?;
        }
        config.apply_env_overrides()
    }

    fn get_environment() -> String {
        std::env::var("APPLYFLOW_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .unwrap_or_else(|_| "local".to_string())
    }

    fn merge_file(self, path: &Path, environment: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        self.merge_yaml(&content, environment)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    fn merge_yaml(mut self, content: &str, environment: &str) -> Result<Self> {
        let file: ConfigFile = serde_yaml::from_str(content)?;
        let section = match environment {
            "production" => file.production,
            _ => file.local,
        };

        if let Some(url) = section.backend_url {
            self = self.with_backend_url(url);
        }
        if let Some(secs) = section.timeout_secs {
            self.timeout_secs = secs;
        }
        if let Some(limit) = section.max_upload_bytes {
            self.max_upload_bytes = limit;
        }
        if let Some(limit) = section.free_job_limit {
            self.free_job_limit = limit;
        }
        if let Some(dir) = section.download_dir {
            self.download_dir = dir;
        }
        if let Some(file) = section.log_file {
            self.log_file = file;
        }
        Ok(self)
    }

    fn apply_env_overrides(mut self) -> Result<Self> {
        if let Ok(url) = std::env::var("APPLYFLOW_BACKEND_URL") {
            self = self.with_backend_url(url);
        }
        if let Ok(secs) = std::env::var("APPLYFLOW_TIMEOUT_SECS") {
            self.timeout_secs = secs
                .parse()
                .with_context(|| format!("APPLYFLOW_TIMEOUT_SECS must be a number, got '{}'", secs))?;
        }
        if let Ok(dir) = std::env::var("APPLYFLOW_DOWNLOAD_DIR") {
            self.download_dir = PathBuf::from(dir);
        }
        Ok(self)
    }
}
