use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::record::{Downtime, DEFAULT_AUTHOR, DEFAULT_COMMENT, DEFAULT_MINUTES};

pub const DEFAULT_COMMAND_FILE: &str = "/var/spool/nagios/cmd/nagios.cmd";
pub const COMMAND_FILE_ENV: &str = "NAGCMD_COMMAND_FILE";

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub nagios: NagiosConfig,
    pub downtime: DowntimeConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct NagiosConfig {
    pub command_file: PathBuf,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct DowntimeConfig {
    pub author: String,
    pub comment: String,
    pub minutes: i64,
    // false schedules flexible downtime
    pub fixed: bool,
}

impl Default for NagiosConfig {
    fn default() -> Self {
        Self {
            command_file: PathBuf::from(DEFAULT_COMMAND_FILE),
        }
    }
}

impl Default for DowntimeConfig {
    fn default() -> Self {
        Self {
            author: DEFAULT_AUTHOR.to_string(),
            comment: DEFAULT_COMMENT.to_string(),
            minutes: DEFAULT_MINUTES,
            fixed: true,
        }
    }
}

impl Config {
    /// Load `~/.nagcmd/config.toml`, falling back to defaults when it's
    /// absent. The environment can still override the command file.
    pub fn new() -> Result<Self> {
        let mut config = Self::load_from(&Self::get_config_path())?;
        if let Ok(path) = std::env::var(COMMAND_FILE_ENV) {
            if !path.is_empty() {
                config.nagios.command_file = PathBuf::from(path);
            }
        }
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        Ok(config)
    }

    pub fn get_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".nagcmd")
            .join("config.toml")
    }

    /// Downtime options seeded from the configured defaults.
    pub fn downtime(&self) -> Downtime {
        Downtime {
            minutes: self.downtime.minutes,
            fixed: self.downtime.fixed,
            author: self.downtime.author.clone(),
            comment: self.downtime.comment.clone(),
            ..Downtime::default()
        }
    }
}
