// ABOUTME: Application-wide error types for swapcam.
// ABOUTME: Uses thiserror for ergonomic error handling and maps each error to a process exit code.

use std::path::PathBuf;
use thiserror::Error;

use crate::deploy::{LockError, SwitchFailure};
use crate::health::ProbeError;
use crate::proxy::TemplateError;
use crate::runtime::LifecycleError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("configuration file not found in {0}")]
    ConfigNotFound(PathBuf),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("routing template: {0}")]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Lock(#[from] LockError),

    #[error("hook failed: {0}")]
    Hook(String),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error("health probe: {0}")]
    Probe(#[from] ProbeError),

    #[error(transparent)]
    Switch(#[from] SwitchFailure),
}

impl Error {
    /// Process exit code for this error.
    ///
    /// A failed switch propagates the failing sub-command's code; problems
    /// with the invocation itself (config, template, existing files) exit 2.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Switch(failure) => failure.exit_code(),
            Error::Lifecycle(e) => e.exit_code().unwrap_or(1),
            Error::AlreadyExists(_)
            | Error::ConfigNotFound(_)
            | Error::InvalidConfig(_)
            | Error::Yaml(_)
            | Error::Template(_)
            | Error::Probe(ProbeError::InvalidUrl { .. } | ProbeError::MissingUrl(_)) => 2,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
