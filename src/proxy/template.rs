// ABOUTME: Renders the reverse-proxy config for one color from a fixed template.
// ABOUTME: Rendering is pure and total; templates are checked once when loaded.

use std::path::{Path, PathBuf};

use crate::config::{Config, ServicesConfig};
use crate::types::Color;

pub const UPSTREAM_PLACEHOLDER: &str = "{{upstream}}";
pub const PORT_PLACEHOLDER: &str = "{{port}}";
pub const COLOR_PLACEHOLDER: &str = "{{color}}";

/// Built-in nginx config. MJPEG streams need buffering off and long reads.
pub const DEFAULT_TEMPLATE: &str = r#"# Generated by swapcam: live color is {{color}}. Changes are overwritten.
events {}

http {
    upstream active_app {
        server {{upstream}}:{{port}};
    }

    server {
        listen 80;

        location / {
            proxy_pass http://active_app;
            proxy_http_version 1.1;
            proxy_set_header Host $host;
            proxy_set_header X-Real-IP $remote_addr;
            proxy_set_header Upgrade $http_upgrade;
            proxy_set_header Connection "upgrade";
            proxy_buffering off;
            proxy_read_timeout 3600s;
        }
    }
}
"#;

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("failed to read proxy template {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("proxy template {origin} must contain {{{{upstream}}}} exactly once (found {count})")]
    Placeholder { origin: String, count: usize },
}

/// A validated template plus the values it is rendered with.
#[derive(Debug, Clone)]
pub struct ProxyTemplate {
    text: String,
    services: ServicesConfig,
    upstream_port: u16,
}

impl ProxyTemplate {
    pub fn new(
        text: impl Into<String>,
        services: ServicesConfig,
        upstream_port: u16,
    ) -> Result<Self, TemplateError> {
        let text = text.into();
        check_placeholder(&text, "<inline>")?;
        Ok(Self {
            text,
            services,
            upstream_port,
        })
    }

    pub fn builtin(services: ServicesConfig, upstream_port: u16) -> Self {
        Self {
            text: DEFAULT_TEMPLATE.to_string(),
            services,
            upstream_port,
        }
    }

    /// Load the configured template file, or the built-in one.
    pub fn from_config(config: &Config) -> Result<Self, TemplateError> {
        let services = config.services.clone();
        let port = config.proxy.upstream_port;
        match config.template_path() {
            None => Ok(Self::builtin(services, port)),
            Some(path) => Self::load(&path, services, port),
        }
    }

    pub fn load(
        path: &Path,
        services: ServicesConfig,
        upstream_port: u16,
    ) -> Result<Self, TemplateError> {
        let text = std::fs::read_to_string(path).map_err(|source| TemplateError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        check_placeholder(&text, &path.display().to_string())?;
        Ok(Self {
            text,
            services,
            upstream_port,
        })
    }

    /// Config text routing all traffic to `color`.
    pub fn render(&self, color: Color) -> String {
        self.text
            .replace(UPSTREAM_PLACEHOLDER, self.services.for_color(color).as_str())
            .replace(PORT_PLACEHOLDER, &self.upstream_port.to_string())
            .replace(COLOR_PLACEHOLDER, color.as_str())
    }

    /// Which color a rendered config routes to, if it can be told.
    pub fn routed_color(&self, config_text: &str) -> Option<Color> {
        if let Some(color) = Color::ALL
            .into_iter()
            .find(|c| self.render(*c) == config_text)
        {
            return Some(color);
        }

        // Hand-edited or older template: fall back to a unique service name.
        let mentioned: Vec<Color> = Color::ALL
            .into_iter()
            .filter(|c| config_text.contains(self.services.for_color(*c).as_str()))
            .collect();
        match mentioned.as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }
}

fn check_placeholder(text: &str, origin: &str) -> Result<(), TemplateError> {
    let count = text.matches(UPSTREAM_PLACEHOLDER).count();
    if count != 1 {
        return Err(TemplateError::Placeholder {
            origin: origin.to_string(),
            count,
        });
    }
    Ok(())
}
