// ABOUTME: Activates a rendered routing config: write, validate, then reload the proxy.
// ABOUTME: A config the validator rejects never becomes the live file the proxy reloads.

use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::exec::{CommandOutput, CommandRunner, CommandSpec, ExecError};
use crate::runtime::Compose;
use crate::state::write_atomic;

/// Replaced in a configured validate command by the candidate's path inside the proxy.
pub const CANDIDATE_PLACEHOLDER: &str = "{candidate}";

#[derive(Debug, thiserror::Error)]
pub enum RoutingError {
    #[error("failed to read routing config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write routing config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("routing config rejected by proxy validator: {}", .output.detail())]
    Invalid { output: CommandOutput },

    #[error("proxy reload failed: {}", .output.detail())]
    Reload { output: CommandOutput },

    #[error("could not run proxy {step} command: {source}")]
    Exec {
        step: &'static str,
        #[source]
        source: ExecError,
    },
}

impl RoutingError {
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            RoutingError::Invalid { output } | RoutingError::Reload { output } => {
                output.exit_code.filter(|c| *c != 0)
            }
            _ => None,
        }
    }
}

/// Makes a routing config live.
#[async_trait]
pub trait RouteApplier: Send + Sync {
    async fn apply(&self, config_text: &str) -> Result<(), RoutingError>;
}

/// Where a new config sits while the validator checks it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Staging {
    /// Over the live file; the previous file is put back if it is rejected.
    InPlace,
    /// In a sibling `.candidate` file, renamed over the live file once it passes.
    Candidate,
}

/// Applies configs to a proxy whose config file lives on the local disk.
pub struct ProxyReloader<R> {
    runner: R,
    config_path: PathBuf,
    staging: Staging,
    validate: CommandSpec,
    reload: CommandSpec,
}

impl<R: CommandRunner> ProxyReloader<R> {
    /// Validate in place: `validate` checks the live path.
    pub fn new(
        runner: R,
        config_path: impl Into<PathBuf>,
        validate: CommandSpec,
        reload: CommandSpec,
    ) -> Self {
        Self {
            runner,
            config_path: config_path.into(),
            staging: Staging::InPlace,
            validate,
            reload,
        }
    }

    /// Validate a sibling candidate: `validate` must check [`Self::candidate_path`].
    pub fn with_candidate(mut self) -> Self {
        self.staging = Staging::Candidate;
        self
    }

    /// Configured commands, or `nginx -t` / `nginx -s reload` inside the proxy service.
    pub fn from_config<C>(runner: R, config: &Config, compose: &Compose<C>) -> Self {
        let config_path = config.proxy_config_path();
        let mounted_candidate = config
            .proxy
            .mount_dir
            .as_deref()
            .map(|dir| path_arg(&dir.join(file_name(&candidate_path(&config_path)))));

        let configured: Option<Vec<String>> =
            config.proxy.validate_command.as_deref().map(|argv| {
                argv.iter()
                    .map(|arg| match &mounted_candidate {
                        Some(candidate) => arg.replace(CANDIDATE_PLACEHOLDER, candidate),
                        None => arg.clone(),
                    })
                    .collect()
            });
        let validate = configured
            .as_deref()
            .and_then(CommandSpec::from_argv)
            .unwrap_or_else(|| match &mounted_candidate {
                Some(candidate) => {
                    compose.exec_in_proxy(["nginx", "-t", "-c", candidate.as_str()])
                }
                None => compose.exec_in_proxy(["nginx", "-t"]),
            });
        let reload = config
            .proxy
            .reload_command
            .as_deref()
            .and_then(CommandSpec::from_argv)
            .unwrap_or_else(|| compose.exec_in_proxy(["nginx", "-s", "reload"]));

        let reloader = Self::new(runner, config_path, validate, reload);
        if mounted_candidate.is_some() {
            reloader.with_candidate()
        } else {
            reloader
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// `<config_path>.candidate`, next to the live file.
    pub fn candidate_path(&self) -> PathBuf {
        candidate_path(&self.config_path)
    }

    fn read_previous(&self) -> Result<Option<Vec<u8>>, RoutingError> {
        match std::fs::read(&self.config_path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(RoutingError::Read {
                path: self.config_path.clone(),
                source,
            }),
        }
    }

    fn write(path: &Path, content: &[u8]) -> Result<(), RoutingError> {
        write_atomic(path, content).map_err(|source| RoutingError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Put the last-known-good config back after a rejected candidate.
    fn restore(&self, previous: Option<&[u8]>) {
        let result = match previous {
            Some(content) => write_atomic(&self.config_path, content),
            None => std::fs::remove_file(&self.config_path),
        };
        match result {
            Ok(()) => tracing::info!(
                "Restored previous routing config at {}",
                self.config_path.display()
            ),
            Err(e) => tracing::error!(
                "Failed to restore routing config at {}: {}",
                self.config_path.display(),
                e
            ),
        }
    }

    fn discard_candidate(&self) {
        let candidate = self.candidate_path();
        if let Err(e) = std::fs::remove_file(&candidate)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!("Failed to remove {}: {}", candidate.display(), e);
        }
    }

    /// Rename the validated candidate over the live file.
    fn promote_candidate(&self) -> Result<(), RoutingError> {
        let candidate = self.candidate_path();
        std::fs::rename(&candidate, &self.config_path).map_err(|source| RoutingError::Write {
            path: self.config_path.clone(),
            source,
        })?;
        if let Some(dir) = self.config_path.parent()
            && let Ok(dir) = std::fs::File::open(dir)
        {
            let _ = dir.sync_all();
        }
        Ok(())
    }

    async fn validate(&self) -> Result<(), RoutingError> {
        let output = self
            .runner
            .run(&self.validate)
            .await
            .map_err(|source| RoutingError::Exec {
                step: "validate",
                source,
            })?;
        if !output.success() {
            tracing::error!("Proxy rejected routing config: {}", output.detail());
            return Err(RoutingError::Invalid { output });
        }
        Ok(())
    }

    async fn reload(&self) -> Result<(), RoutingError> {
        let output = self
            .runner
            .run(&self.reload)
            .await
            .map_err(|source| RoutingError::Exec {
                step: "reload",
                source,
            })?;
        if !output.success() {
            tracing::error!("Proxy reload failed: {}", output.detail());
            return Err(RoutingError::Reload { output });
        }
        Ok(())
    }

    async fn apply_in_place(
        &self,
        config_text: &str,
        previous: Option<&[u8]>,
    ) -> Result<(), RoutingError> {
        Self::write(&self.config_path, config_text.as_bytes())?;
        if let Err(e) = self.validate().await {
            self.restore(previous);
            return Err(e);
        }
        Ok(())
    }

    async fn apply_candidate(&self, config_text: &str) -> Result<(), RoutingError> {
        let candidate = self.candidate_path();
        Self::write(&candidate, config_text.as_bytes())?;
        tracing::debug!("Validating candidate {}", candidate.display());
        if let Err(e) = self.validate().await {
            self.discard_candidate();
            return Err(e);
        }
        if let Err(e) = self.promote_candidate() {
            self.discard_candidate();
            return Err(e);
        }
        Ok(())
    }
}

#[async_trait]
impl<R: CommandRunner> RouteApplier for ProxyReloader<R> {
    async fn apply(&self, config_text: &str) -> Result<(), RoutingError> {
        let previous = self.read_previous()?;
        let previous = previous.as_deref();

        match self.staging {
            Staging::InPlace => self.apply_in_place(config_text, previous).await?,
            Staging::Candidate => self.apply_candidate(config_text).await?,
        }

        if let Err(e) = self.reload().await {
            self.restore(previous);
            return Err(e);
        }

        tracing::info!("Proxy reloaded with {}", self.config_path.display());
        Ok(())
    }
}

fn candidate_path(live: &Path) -> PathBuf {
    let mut name = live
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("proxy.conf"));
    name.push(".candidate");
    live.with_file_name(name)
}

fn file_name(path: &Path) -> &Path {
    path.file_name().map(Path::new).unwrap_or(path)
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
