use pagesmith_editor::FeatureFlags;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_NAME: &str = "pagesmith.config.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Pagesmith configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Root holding `pages/`, `elements/` and `backups/`
    pub storage_dir: String,

    pub http_port: u16,
    pub host: IpAddr,

    /// Quiet period before an edit is written; handed to the builder UI
    /// through `/api/settings`
    pub autosave_debounce_ms: u64,

    pub features: FeatureFlags,

    /// Used by the built-in header and footer
    pub site_title: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_dir: "site".to_string(),
            http_port: 3030,
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            autosave_debounce_ms: 800,
            features: FeatureFlags::default(),
            site_title: "My Site".to_string(),
        }
    }
}

impl Config {
    /// Load config from a project directory, or defaults when there is none
    pub fn load(project_dir: &Path) -> Result<Self, ConfigError> {
        let path = project_dir.join(DEFAULT_CONFIG_NAME);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse { path, source })
    }

    pub fn save(&self, project_dir: &Path) -> Result<PathBuf, ConfigError> {
        let path = project_dir.join(DEFAULT_CONFIG_NAME);
        let json = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        std::fs::write(&path, json + "\n").map_err(|source| ConfigError::Write {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    /// Absolute storage root
    pub fn storage_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.storage_dir)
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.http_port)
    }
}
