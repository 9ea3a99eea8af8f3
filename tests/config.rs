// ABOUTME: Integration tests for configuration parsing and validation.
// ABOUTME: Tests YAML parsing, defaults, discovery, and path resolution.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use swapcam::config::*;
use swapcam::error::Error;
use swapcam::runtime::RuntimeType;
use swapcam::types::Color;

mod parsing {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::from_yaml("").unwrap();
        assert_eq!(config.runtime, RuntimeType::Docker);
        assert_eq!(config.default_color, Color::Blue);
        assert_eq!(config.state_file, PathBuf::from("active_container.txt"));
        assert_eq!(config.services.blue.as_str(), "app_blue");
        assert_eq!(config.services.green.as_str(), "app_green");
        assert_eq!(config.services.proxy.as_str(), "nginx");
        assert_eq!(config.health.source, HealthSource::Container);
        assert_eq!(config.health.timeout, Duration::from_secs(60));
        assert_eq!(config.health.interval, Duration::from_secs(2));
        assert!(config.reachability.enabled);
        assert_eq!(config.reachability.timeout, Duration::from_secs(30));
        assert_eq!(config.reachability.interval, Duration::from_secs(1));
        assert_eq!(config.settle.after_stop, Duration::from_secs(3));
        assert_eq!(config.settle.after_start, Duration::from_secs(2));
        assert_eq!(config.proxy.upstream_port, 5000);
        assert!(!config.build);
    }

    #[test]
    fn parse_full_config() {
        let yaml = r#"
runtime: podman
compose_file: deploy/compose.yml
project: camera
services:
  blue: cam-a
  green: cam-b
  proxy: edge-proxy
default_color: green
state_file: state/active
network: camnet
build: true
health:
  source: http
  urls:
    blue: http://127.0.0.1:5001/health
    green: http://127.0.0.1:5002/health
  timeout: 90s
  interval: 500ms
reachability:
  enabled: false
settle:
  after_stop: 5s
  after_start: 0s
proxy:
  config_path: /etc/nginx/conf.d/app.conf
  upstream_port: 8080
command_timeout: 2m
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.runtime, RuntimeType::Podman);
        assert_eq!(config.project.as_deref(), Some("camera"));
        assert_eq!(config.services.for_color(Color::Green).as_str(), "cam-b");
        assert_eq!(config.default_color, Color::Green);
        assert_eq!(config.network.as_deref(), Some("camnet"));
        assert!(config.build);
        assert_eq!(config.health.source, HealthSource::Http);
        assert_eq!(config.health.urls.len(), 2);
        assert_eq!(config.health.interval, Duration::from_millis(500));
        assert!(!config.reachability.enabled);
        assert_eq!(config.settle.after_start, Duration::ZERO);
        assert_eq!(config.proxy.upstream_port, 8080);
        assert_eq!(config.command_timeout, Duration::from_secs(120));
    }

    #[test]
    fn unknown_color_is_rejected() {
        assert!(Config::from_yaml("default_color: purple").is_err());
    }

    #[test]
    fn invalid_service_name_is_rejected() {
        assert!(Config::from_yaml("services:\n  blue: App_Blue\n").is_err());
    }
}

mod validation {
    use super::*;

    fn invalid(yaml: &str) -> String {
        match Config::from_yaml(yaml) {
            Err(Error::InvalidConfig(message)) => message,
            other => panic!("expected invalid config, got {other:?}"),
        }
    }

    #[test]
    fn blue_and_green_must_differ() {
        let message = invalid("services:\n  blue: app\n  green: app\n");
        assert!(message.contains("different"));
    }

    #[test]
    fn proxy_cannot_be_an_instance() {
        let message = invalid("services:\n  proxy: app_blue\n");
        assert!(message.contains("proxy"));
    }

    #[test]
    fn http_health_needs_both_urls() {
        let message = invalid(
            "health:\n  source: http\n  urls:\n    blue: http://127.0.0.1:5001/health\n",
        );
        assert!(message.contains("health.urls.green"));
    }

    #[test]
    fn zero_interval_is_rejected() {
        invalid("health:\n  interval: 0s\n");
    }

    #[test]
    fn empty_reload_command_is_rejected() {
        let message = invalid("proxy:\n  reload_command: []\n");
        assert!(message.contains("proxy.reload_command"));
    }
}

mod discovery {
    use super::*;

    #[test]
    fn discovers_swapcam_yml() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("swapcam.yml"), "default_color: green\n").unwrap();

        let config = Config::discover(dir.path()).unwrap();
        assert_eq!(config.default_color, Color::Green);
        assert_eq!(config.base_dir, dir.path());
    }

    #[test]
    fn dot_directory_config_resolves_against_project() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join(".swapcam")).unwrap();
        fs::write(dir.path().join(".swapcam/config.yml"), "").unwrap();

        let config = Config::discover(dir.path()).unwrap();
        assert_eq!(config.base_dir, dir.path());
        assert_eq!(
            config.state_path(),
            dir.path().join("active_container.txt")
        );
    }

    #[test]
    fn missing_config_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Config::discover(dir.path()),
            Err(Error::ConfigNotFound(_))
        ));
    }

    #[test]
    fn absolute_paths_are_kept() {
        let mut config = Config::default();
        config.base_dir = PathBuf::from("/srv/cam");
        config.state_file = PathBuf::from("/var/lib/cam/active");

        assert_eq!(config.state_path(), Path::new("/var/lib/cam/active"));
        assert_eq!(
            config.proxy_config_path(),
            Path::new("/srv/cam/nginx/nginx.conf")
        );
    }
}

mod init {
    use super::*;

    #[test]
    fn init_writes_parseable_config() {
        let dir = tempfile::tempdir().unwrap();
        init_config(dir.path(), Some(Color::Green), false).unwrap();

        let config = Config::discover(dir.path()).unwrap();
        assert_eq!(config.default_color, Color::Green);
    }

    #[test]
    fn init_refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), "existing: true\n").unwrap();

        assert!(matches!(
            init_config(dir.path(), None, false),
            Err(Error::AlreadyExists(_))
        ));
        init_config(dir.path(), None, true).unwrap();
    }
}
