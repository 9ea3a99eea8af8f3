// ABOUTME: Configuration types and parsing for swapcam.yml.
// ABOUTME: Handles YAML parsing, file discovery, path resolution, and validation.

mod healthcheck;
mod init;
mod proxy;
mod services;
mod settle;

pub use healthcheck::{HealthConfig, HealthSource, ReachabilityConfig};
pub use init::init_config;
pub use proxy::ProxyConfig;
pub use services::ServicesConfig;
pub use settle::SettleConfig;

use crate::error::{Error, Result};
use crate::runtime::RuntimeType;
use crate::types::Color;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "swapcam.yml";
pub const CONFIG_FILENAME_ALT: &str = "swapcam.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".swapcam/config.yml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub runtime: RuntimeType,

    #[serde(default)]
    pub compose_file: Option<PathBuf>,

    #[serde(default)]
    pub project: Option<String>,

    #[serde(default)]
    pub services: ServicesConfig,

    /// Color started when no active state has been recorded yet.
    #[serde(default = "default_color")]
    pub default_color: Color,

    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,

    /// Network that must exist before instances start.
    #[serde(default)]
    pub network: Option<String>,

    /// Build the target instance's image before starting it.
    #[serde(default)]
    pub build: bool,

    #[serde(default)]
    pub health: HealthConfig,

    #[serde(default)]
    pub reachability: ReachabilityConfig,

    #[serde(default)]
    pub settle: SettleConfig,

    #[serde(default)]
    pub proxy: ProxyConfig,

    #[serde(default = "default_command_timeout", with = "humantime_serde")]
    pub command_timeout: Duration,

    /// Directory relative paths are resolved against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

fn default_color() -> Color {
    Color::Blue
}

fn default_state_file() -> PathBuf {
    PathBuf::from("active_container.txt")
}

fn default_command_timeout() -> Duration {
    Duration::from_secs(300)
}

impl Default for Config {
    fn default() -> Self {
        Config {
            runtime: RuntimeType::default(),
            compose_file: None,
            project: None,
            services: ServicesConfig::default(),
            default_color: default_color(),
            state_file: default_state_file(),
            network: None,
            build: false,
            health: HealthConfig::default(),
            reachability: ReachabilityConfig::default(),
            settle: SettleConfig::default(),
            proxy: ProxyConfig::default(),
            command_timeout: default_command_timeout(),
            base_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document means "all defaults".
        if yaml.trim().is_empty() {
            return Ok(Config::default());
        }
        let mut config: Config = serde_yaml::from_str(yaml)?;
        config.base_dir = PathBuf::from(".");
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_yaml(&content)?;
        config.base_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));
        // `.swapcam/config.yml` describes the project one level up.
        if config.base_dir.file_name().is_some_and(|n| n == ".swapcam")
            && let Some(parent) = config.base_dir.parent()
        {
            config.base_dir = parent.to_path_buf();
        }
        Ok(config)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    /// Check cross-field rules that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        let services = &self.services;
        if services.blue == services.green {
            return Err(Error::InvalidConfig(format!(
                "blue and green must be different services (both are '{}')",
                services.blue
            )));
        }
        if services.proxy == services.blue || services.proxy == services.green {
            return Err(Error::InvalidConfig(format!(
                "proxy service '{}' cannot also be an instance",
                services.proxy
            )));
        }

        if self.health.source == HealthSource::Http {
            for color in Color::ALL {
                if !self.health.urls.contains_key(&color) {
                    return Err(Error::InvalidConfig(format!(
                        "health.urls.{color} is required when health.source is http"
                    )));
                }
            }
        }

        if self.health.interval.is_zero() || self.reachability.interval.is_zero() {
            return Err(Error::InvalidConfig(
                "poll intervals must be greater than zero".to_string(),
            ));
        }

        for (name, argv) in [
            ("proxy.validate_command", &self.proxy.validate_command),
            ("proxy.reload_command", &self.proxy.reload_command),
        ] {
            if argv.as_ref().is_some_and(|a| a.is_empty()) {
                return Err(Error::InvalidConfig(format!("{name} cannot be empty")));
            }
        }

        Ok(())
    }

    /// Resolve a configured path against the project directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn state_path(&self) -> PathBuf {
        self.resolve(&self.state_file)
    }

    pub fn proxy_config_path(&self) -> PathBuf {
        self.resolve(&self.proxy.config_path)
    }

    pub fn template_path(&self) -> Option<PathBuf> {
        self.proxy.template.as_deref().map(|p| self.resolve(p))
    }

    pub fn compose_file_path(&self) -> Option<PathBuf> {
        self.compose_file.as_deref().map(|p| self.resolve(p))
    }
}
