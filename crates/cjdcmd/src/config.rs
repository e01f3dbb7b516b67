use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Minimum time between two pings of the repeating ping command
pub const MIN_PING_INTERVAL_MS: u64 = 200;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Saved routing table dump to read instead of a live daemon
    #[serde(default)]
    pub table: Option<PathBuf>,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default)]
    pub resolve: ResolveConfig,
    #[serde(default)]
    pub ping: PingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(skip)]
    config_file_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveConfig {
    /// Show hostnames instead of addresses where one is known
    pub reverse_lookup: bool,
    pub hosts_file: PathBuf,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            reverse_lookup: true,
            hosts_file: PathBuf::from("/etc/hosts"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PingConfig {
    pub interval_ms: u64,
    /// Per-ping timeout, 0 leaves it to the daemon
    pub timeout_ms: u64,
}

impl Default for PingConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            timeout_ms: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

fn default_page_size() -> usize {
    cjdcmd_admin::DEFAULT_PAGE_SIZE
}

impl Default for Config {
    fn default() -> Self {
        Self {
            table: None,
            page_size: default_page_size(),
            resolve: ResolveConfig::default(),
            ping: PingConfig::default(),
            logging: LoggingConfig::default(),
            config_file_path: None,
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults.
    ///
    /// A missing file is an error only when its path was given explicitly.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self> {
        let explicit = config_path.is_some();
        let config_path = config_path.unwrap_or_else(Self::default_config_path);

        if !config_path.exists() {
            if explicit {
                anyhow::bail!("Configuration file not found: {}", config_path.display());
            }
            return Ok(Self::default());
        }

        let contents =
            fs::read_to_string(&config_path).context("Failed to read configuration file")?;

        let mut config: Config =
            serde_yaml::from_str(&contents).context("Failed to parse configuration file")?;

        config.config_file_path = Some(config_path);

        Ok(config)
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_file_path.as_deref()
    }

    fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cjdcmd")
            .join("config.yaml")
    }
}
