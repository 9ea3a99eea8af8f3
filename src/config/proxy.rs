// ABOUTME: Reverse-proxy configuration: where the routing file lives and how to check/reload it.
// ABOUTME: Validate and reload commands default to running nginx inside the proxy service.

use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct ProxyConfig {
    /// Routing config file the proxy reads (bind-mounted into the proxy).
    #[serde(default = "default_config_path")]
    pub config_path: PathBuf,

    /// Optional template file replacing the built-in nginx template.
    #[serde(default)]
    pub template: Option<PathBuf>,

    /// Port the instances listen on inside the compose network.
    #[serde(default = "default_upstream_port")]
    pub upstream_port: u16,

    /// Where the proxy sees the directory holding `config_path`. When set,
    /// a new config is validated as a sibling `.candidate` file and only
    /// renamed over the live file once it passes.
    #[serde(default)]
    pub mount_dir: Option<PathBuf>,

    /// Syntax check command (argv). Defaults to `nginx -t` in the proxy service.
    /// With `mount_dir` set, `{candidate}` expands to the candidate's path
    /// inside the proxy.
    #[serde(default)]
    pub validate_command: Option<Vec<String>>,

    /// Reload command (argv). Defaults to `nginx -s reload` in the proxy service.
    #[serde(default)]
    pub reload_command: Option<Vec<String>>,
}

fn default_config_path() -> PathBuf {
    PathBuf::from("nginx/nginx.conf")
}

fn default_upstream_port() -> u16 {
    5000
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            config_path: default_config_path(),
            template: None,
            upstream_port: default_upstream_port(),
            mount_dir: None,
            validate_command: None,
            reload_command: None,
        }
    }
}
