// ABOUTME: Lifecycle error types with SNAFU pattern.
// ABOUTME: Carries the failing operation and the exact command output for diagnosis.

use snafu::Snafu;

use super::types::LifecycleOp;
use crate::exec::{CommandOutput, ExecError};

/// A container runtime command that failed or could not be run.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum LifecycleError {
    #[snafu(display("{op} failed: `{command}` returned {}", output.detail()))]
    CommandFailed {
        op: LifecycleOp,
        command: String,
        output: CommandOutput,
    },

    #[snafu(display("{op} could not run: {source}"))]
    Exec { op: LifecycleOp, source: ExecError },

    #[snafu(display("could not parse status of {service}: {reason}"))]
    StatusParse { service: String, reason: String },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleErrorKind {
    /// The runtime ran the command and rejected it.
    Rejected,
    /// The command could not be spawned or timed out.
    Unavailable,
    /// The runtime answered with output we could not read.
    BadStatus,
}

impl LifecycleError {
    pub fn kind(&self) -> LifecycleErrorKind {
        match self {
            LifecycleError::CommandFailed { .. } => LifecycleErrorKind::Rejected,
            LifecycleError::Exec { .. } => LifecycleErrorKind::Unavailable,
            LifecycleError::StatusParse { .. } => LifecycleErrorKind::BadStatus,
        }
    }

    /// The failing command's own exit code, when it exited non-zero.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            LifecycleError::CommandFailed { output, .. } => output.exit_code.filter(|c| *c != 0),
            _ => None,
        }
    }
}
