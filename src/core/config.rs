use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub backend: BackendConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub page: PageConfig,
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Session token issued by the auth provider; absent means signed out
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_min_refresh_interval_secs")]
    pub min_refresh_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageConfig {
    #[serde(default = "default_location")]
    pub location: String,
    /// Server-rendered shell markup; the built-in shell is used when unset
    pub template: Option<PathBuf>,
}

/// How the bootstrap sequencer waits for the navigation UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadinessStrategy {
    Signal,
    Poll,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapConfig {
    #[serde(default = "default_skip_initial_dispatch")]
    pub skip_initial_dispatch: bool,
    #[serde(default = "default_readiness")]
    pub readiness: ReadinessStrategy,
    #[serde(default = "default_ui_ready_timeout_ms")]
    pub ui_ready_timeout_ms: u64,
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    #[serde(default = "default_poll_attempts")]
    pub poll_attempts: u32,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default)]
    pub ui_mount_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_console")]
    pub console: bool,
}

// Default value functions
fn default_request_timeout_secs() -> u64 {
    30
}

fn default_min_refresh_interval_secs() -> u64 {
    30
}

fn default_location() -> String {
    "/app".to_string()
}

fn default_skip_initial_dispatch() -> bool {
    true
}

fn default_readiness() -> ReadinessStrategy {
    ReadinessStrategy::Signal
}

fn default_ui_ready_timeout_ms() -> u64 {
    4000
}

fn default_settle_delay_ms() -> u64 {
    1000
}

fn default_poll_attempts() -> u32 {
    20
}

fn default_poll_interval_ms() -> u64 {
    200
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_console() -> bool {
    false
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            min_refresh_interval_secs: default_min_refresh_interval_secs(),
        }
    }
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            location: default_location(),
            template: None,
        }
    }
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            skip_initial_dispatch: default_skip_initial_dispatch(),
            readiness: default_readiness(),
            ui_ready_timeout_ms: default_ui_ready_timeout_ms(),
            settle_delay_ms: default_settle_delay_ms(),
            poll_attempts: default_poll_attempts(),
            poll_interval_ms: default_poll_interval_ms(),
            ui_mount_delay_ms: 0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            console: default_console(),
        }
    }
}

impl BootstrapConfig {
    pub fn ui_ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ui_ready_timeout_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .context("Failed to parse config file")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        // Validate backend config
        if self.backend.base_url.trim().is_empty() {
            bail!("backend.base_url must not be empty");
        }

        if !self.backend.base_url.starts_with("http://") && !self.backend.base_url.starts_with("https://") {
            bail!(
                "backend.base_url must be an http(s) URL, got '{}'",
                self.backend.base_url
            );
        }

        if self.backend.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be greater than 0");
        }

        if let Some(token) = &self.backend.access_token {
            if token.trim().is_empty() {
                bail!("access_token must not be blank when set");
            }
        }

        // Validate page config
        if !self.page.location.starts_with('/') {
            bail!(
                "page.location must be an absolute path, got '{}'",
                self.page.location
            );
        }

        // Validate bootstrap config
        if self.bootstrap.ui_ready_timeout_ms == 0 {
            bail!("ui_ready_timeout_ms must be greater than 0");
        }

        if self.bootstrap.readiness == ReadinessStrategy::Poll {
            if self.bootstrap.poll_attempts == 0 {
                bail!("poll_attempts must be greater than 0");
            }

            if self.bootstrap.poll_interval_ms == 0 {
                bail!("poll_interval_ms must be greater than 0");
            }
        }

        // Validate logging config
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            bail!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.logging.level
            );
        }

        let valid_formats = ["json", "console"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            bail!(
                "Invalid log format '{}'. Must be one of: json, console",
                self.logging.format
            );
        }

        Ok(())
    }
}
