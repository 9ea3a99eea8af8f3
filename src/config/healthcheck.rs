// ABOUTME: Health and reachability gate configuration.
// ABOUTME: Defines where health is read from plus the timeout and poll interval of each wait.

use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::types::Color;

/// Where the controller reads an instance's health from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthSource {
    /// Health status reported by the container runtime (the image's HEALTHCHECK).
    #[default]
    Container,
    /// GET the instance's health endpoint; any 2xx counts as healthy.
    Http,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthConfig {
    #[serde(default)]
    pub source: HealthSource,

    /// Health endpoint per color, used with `source: http`.
    #[serde(default)]
    pub urls: HashMap<Color, String>,

    #[serde(default = "default_health_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    #[serde(default = "default_health_interval", with = "humantime_serde")]
    pub interval: Duration,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            source: HealthSource::default(),
            urls: HashMap::new(),
            timeout: default_health_timeout(),
            interval: default_health_interval(),
        }
    }
}

fn default_health_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_health_interval() -> Duration {
    Duration::from_secs(2)
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReachabilityConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default = "default_reach_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    #[serde(default = "default_reach_interval", with = "humantime_serde")]
    pub interval: Duration,
}

impl Default for ReachabilityConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            timeout: default_reach_timeout(),
            interval: default_reach_interval(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_reach_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_reach_interval() -> Duration {
    Duration::from_secs(1)
}
