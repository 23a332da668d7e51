use anyhow::Context;
use pii_core::OutputFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Service configuration for the PII sanitizer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub rules: RulesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Largest accepted request body
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Largest accepted single log line
    #[serde(default = "default_max_line_bytes")]
    pub max_line_bytes: usize,

    #[serde(default)]
    pub allow_any_origin: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: PathBuf,

    #[serde(default)]
    pub format: OutputFormat,

    /// fsync after every append instead of only on shutdown
    #[serde(default)]
    pub sync_every_write: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Rule file (JSON or TOML); built-in rules when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
            max_line_bytes: default_max_line_bytes(),
            allow_any_origin: false,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            format: OutputFormat::default(),
            sync_every_write: false,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8087
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}

fn default_max_line_bytes() -> usize {
    16 * 1024
}

fn default_output_path() -> PathBuf {
    PathBuf::from("/var/log/sanitized-app.log")
}

impl Config {
    /// Load config from default location or create default if not found
    pub fn load() -> anyhow::Result<Self> {
        Self::load_or_create(&Self::config_path())
    }

    /// Load `path`, writing the defaults there first when it does not exist
    pub fn load_or_create(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            return Self::load_from(path);
        }

        let config = Config::default();
        // A read-only home must not stop the service from starting
        if let Err(e) = config.save(path) {
            warn!("Could not write default config to {}: {}", path.display(), e);
        }
        Ok(config)
    }

    /// Load config from an explicit path; the file must exist
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Write config as TOML, creating parent directories
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.max_line_bytes == 0 {
            anyhow::bail!("server.max_line_bytes must be greater than zero");
        }
        if self.server.max_body_bytes < self.server.max_line_bytes {
            anyhow::bail!("server.max_body_bytes must be at least server.max_line_bytes");
        }
        if self.output.path.as_os_str().is_empty() {
            anyhow::bail!("output.path must not be empty");
        }
        Ok(())
    }

    /// Get config file path
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Directory holding config.toml and the default rule file
    pub fn config_dir() -> PathBuf {
        if let Some(dirs) = directories::ProjectDirs::from("com", "pii-sanitizer", "pii-sanitizer") {
            dirs.config_dir().to_path_buf()
        } else {
            PathBuf::from("~/.pii-sanitizer")
        }
    }
}
