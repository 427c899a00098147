//! Configuration loading and validation

use anyhow::Result;
use patload_core::dispatch::DispatchConfig;
use patload_core::header::EXPECTED_VERSION;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub hooks: HooksConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Uploader executable invoked once per file
    #[serde(default = "default_uploader")]
    pub uploader: PathBuf,
    /// Base directory that master file `path:` entries resolve against
    #[serde(default = "default_dir")]
    pub base_dir: PathBuf,
    /// Header version the tool expects; other versions warn
    #[serde(default = "default_version")]
    pub expected_version: f64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            uploader: default_uploader(),
            base_dir: default_dir(),
            expected_version: default_version(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HooksConfig {
    /// Directory searched for `<type>.fw.pre` / `<type>.fw.post` files
    #[serde(default = "default_dir")]
    pub dir: PathBuf,
}

impl Default for HooksConfig {
    fn default() -> Self {
        Self { dir: default_dir() }
    }
}

fn default_uploader() -> PathBuf {
    PathBuf::from("hpt")
}

fn default_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_version() -> f64 {
    EXPECTED_VERSION
}

impl Config {
    /// Convert to the core dispatch configuration
    pub fn to_dispatch_config(&self) -> DispatchConfig {
        DispatchConfig {
            base_dir: self.upload.base_dir.clone(),
            hook_dir: self.hooks.dir.clone(),
            expected_version: self.upload.expected_version,
        }
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(Config {
            upload: UploadConfig::default(),
            hooks: HooksConfig::default(),
        })
    }
}
