use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const API_URL_VAR: &str = "BGPSIM_API_URL";
pub const API_TIMEOUT_VAR: &str = "BGPSIM_API_TIMEOUT_SECS";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Cannot read settings file {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("Invalid settings file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Invalid value {value:?} for {var}")]
    InvalidOverride { var: &'static str, value: String },
}

/// Settings for talking to the simulator's API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Base URL, without the `/api/...` path
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    /// Number of ROA validity answers kept in memory
    pub roa_cache_size: usize,
}

impl EditorSettings {
    pub fn new() -> Self {
        EditorSettings {
            api_base_url: "http://localhost:8000".to_string(),
            request_timeout_secs: 10,
            roa_cache_size: 1024,
        }
    }

    pub fn with_api_base_url(mut self, url: &str) -> Self {
        self.api_base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// `<config dir>/bgpsimulator/editor.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("bgpsimulator").join("editor.json"))
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let contents = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads `path` (or the default location) if it exists, then applies
    /// environment overrides.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, SettingsError> {
        let path = path.map(Path::to_path_buf).or_else(Self::default_path);
        let settings = match path {
            Some(path) if path.exists() => Self::load(&path)?,
            _ => Self::new(),
        };
        settings.apply_env_overrides()
    }

    pub fn apply_env_overrides(self) -> Result<Self, SettingsError> {
        self.apply_overrides_from(|var| std::env::var(var).ok())
    }

    pub fn apply_overrides_from<F>(mut self, lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(API_URL_VAR) {
            self = self.with_api_base_url(&url);
        }
        if let Some(value) = lookup(API_TIMEOUT_VAR) {
            let secs = value
                .trim()
                .parse()
                .map_err(|_| SettingsError::InvalidOverride {
                    var: API_TIMEOUT_VAR,
                    value: value.clone(),
                })?;
            self = self.with_request_timeout_secs(secs);
        }
        Ok(self)
    }
}

impl Default for EditorSettings {
    fn default() -> Self {
        EditorSettings::new()
    }
}
