// ABOUTME: Config scaffolding for new projects.
// ABOUTME: Creates a commented swapcam.yml listing every setting with its default.

use std::path::Path;

use crate::error::{Error, Result};
use crate::types::Color;

use super::CONFIG_FILENAME;

pub fn init_config(dir: &Path, default_color: Option<Color>, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    let yaml = generate_template_yaml(default_color.unwrap_or(Color::Blue));
    std::fs::write(&config_path, yaml)?;

    Ok(())
}

fn generate_template_yaml(default_color: Color) -> String {
    format!(
        r#"# Container runtime whose compose CLI runs the instances: docker or podman
runtime: docker
# compose_file: docker-compose.yml
# project: camera-edge

services:
  blue: app_blue
  green: app_green
  proxy: nginx

# Color started on the very first switch, when no active state exists yet
default_color: {default_color}
state_file: active_container.txt
# network: internal
build: false

health:
  # container: use the image HEALTHCHECK; http: GET the urls below
  source: container
  # urls:
  #   blue: http://127.0.0.1:5001/health
  #   green: http://127.0.0.1:5002/health
  timeout: 60s
  interval: 2s

reachability:
  enabled: true
  timeout: 30s
  interval: 1s

# Pauses that let the runtime release the camera device
settle:
  after_stop: 3s
  after_start: 2s

proxy:
  config_path: nginx/nginx.conf
  upstream_port: 5000
  # template: nginx/nginx.conf.tmpl
  # Validate new configs before they replace the live file
  # mount_dir: /etc/nginx
  # validate_command: ["docker", "compose", "exec", "-T", "nginx", "nginx", "-t"]
  # reload_command: ["docker", "compose", "exec", "-T", "nginx", "nginx", "-s", "reload"]

command_timeout: 5m
"#
    )
}
