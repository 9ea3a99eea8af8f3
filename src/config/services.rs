// ABOUTME: Compose service names for the two instances and the proxy.
// ABOUTME: Maps a Color to its service and back.

use serde::Deserialize;

use crate::types::{Color, ServiceName};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServicesConfig {
    #[serde(default = "default_blue")]
    pub blue: ServiceName,

    #[serde(default = "default_green")]
    pub green: ServiceName,

    #[serde(default = "default_proxy")]
    pub proxy: ServiceName,
}

fn named(name: &str) -> ServiceName {
    ServiceName::new(name).expect("built-in service name is valid")
}

fn default_blue() -> ServiceName {
    named("app_blue")
}

fn default_green() -> ServiceName {
    named("app_green")
}

fn default_proxy() -> ServiceName {
    named("nginx")
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            blue: default_blue(),
            green: default_green(),
            proxy: default_proxy(),
        }
    }
}

impl ServicesConfig {
    pub fn for_color(&self, color: Color) -> &ServiceName {
        match color {
            Color::Blue => &self.blue,
            Color::Green => &self.green,
        }
    }

    pub fn color_of(&self, service: &str) -> Option<Color> {
        Color::ALL
            .into_iter()
            .find(|c| self.for_color(*c).as_str() == service)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_app_color_convention() {
        let services = ServicesConfig::default();
        assert_eq!(services.for_color(Color::Blue).as_str(), "app_blue");
        assert_eq!(services.for_color(Color::Green).as_str(), "app_green");
        assert_eq!(services.proxy.as_str(), "nginx");
    }

    #[test]
    fn color_of_reverses_for_color() {
        let services = ServicesConfig::default();
        assert_eq!(services.color_of("app_green"), Some(Color::Green));
        assert_eq!(services.color_of("nginx"), None);
    }
}
