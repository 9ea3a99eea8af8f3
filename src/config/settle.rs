// ABOUTME: Fixed settle delays around instance stop and start.
// ABOUTME: Gives the runtime time to release the camera device between instances.

use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct SettleConfig {
    /// Pause after the old instance is removed, before the new one starts.
    #[serde(default = "default_after_stop", with = "humantime_serde")]
    pub after_stop: Duration,

    /// Pause after the new instance starts, before health polling begins.
    #[serde(default = "default_after_start", with = "humantime_serde")]
    pub after_start: Duration,
}

fn default_after_stop() -> Duration {
    Duration::from_secs(3)
}

fn default_after_start() -> Duration {
    Duration::from_secs(2)
}

impl Default for SettleConfig {
    fn default() -> Self {
        SettleConfig {
            after_stop: default_after_stop(),
            after_start: default_after_start(),
        }
    }
}

impl SettleConfig {
    /// No delays at all.
    pub fn none() -> Self {
        SettleConfig {
            after_stop: Duration::ZERO,
            after_start: Duration::ZERO,
        }
    }
}
