use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use directories::ProjectDirs;
use merge_explorer::DEFAULT_BASE_URL;

/// Local preferences. Credentials are deliberately not stored here.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    pub base_url: Option<String>,
    pub default_category: Option<String>,
    pub timeout_secs: Option<u64>,
    /// Open the JSON inspector after each call instead of printing the body.
    #[serde(default)]
    pub inspector: bool,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Config::get_path()?;
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Config::get_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn get_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "merge-explorer", "cli")
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;
        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    /// Command-line override first, then the config file, then the public API.
    pub fn effective_base_url(&self, cli_override: Option<&str>) -> String {
        cli_override
            .map(str::to_string)
            .or_else(|| self.base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
