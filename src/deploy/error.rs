// ABOUTME: Error types for switch operations.
// ABOUTME: Covers lifecycle, health/reachability timeouts, routing, and persistence failures.

use std::fmt;
use std::time::Duration;

use super::operation::{SwitchOperation, SwitchStep};
use crate::proxy::RoutingError;
use crate::runtime::{InstanceHealth, LifecycleError};
use crate::state::StateError;
use crate::types::{Color, ServiceName};

/// Why a switch step failed. Every variant is fatal to the switch.
#[derive(Debug, thiserror::Error)]
pub enum SwitchError {
    /// The runtime rejected a start/stop/remove/build.
    #[error("{color} instance: {source}")]
    Lifecycle {
        color: Color,
        #[source]
        source: LifecycleError,
    },

    /// The routing proxy could not be brought up.
    #[error("proxy service: {source}")]
    Proxy {
        #[source]
        source: LifecycleError,
    },

    /// The new instance never reported healthy.
    #[error("{color} instance not healthy after {:.0}s (last status: {last})", .waited.as_secs_f64())]
    HealthTimeout {
        color: Color,
        waited: Duration,
        last: InstanceHealth,
    },

    /// The proxy could not resolve the new instance.
    #[error("proxy cannot reach {name} after {:.0}s: {last}", .waited.as_secs_f64())]
    ReachabilityTimeout {
        name: ServiceName,
        waited: Duration,
        last: String,
    },

    /// Rendered config was rejected or the reload failed.
    #[error(transparent)]
    Routing(#[from] RoutingError),

    /// The new active state could not be written.
    #[error(transparent)]
    Persist(#[from] StateError),
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchErrorKind {
    Lifecycle,
    HealthTimeout,
    ReachabilityTimeout,
    ConfigInvalid,
    Reload,
    Persist,
}

impl SwitchError {
    pub fn kind(&self) -> SwitchErrorKind {
        match self {
            SwitchError::Lifecycle { .. } | SwitchError::Proxy { .. } => {
                SwitchErrorKind::Lifecycle
            }
            SwitchError::HealthTimeout { .. } => SwitchErrorKind::HealthTimeout,
            SwitchError::ReachabilityTimeout { .. } => SwitchErrorKind::ReachabilityTimeout,
            SwitchError::Routing(RoutingError::Invalid { .. }) => SwitchErrorKind::ConfigInvalid,
            SwitchError::Routing(_) => SwitchErrorKind::Reload,
            SwitchError::Persist(_) => SwitchErrorKind::Persist,
        }
    }

    /// Process exit code: the failing sub-command's own code when known, else 1.
    pub fn exit_code(&self) -> i32 {
        let code = match self {
            SwitchError::Lifecycle { source, .. } | SwitchError::Proxy { source } => {
                source.exit_code()
            }
            SwitchError::Routing(e) => e.exit_code(),
            _ => None,
        };
        code.unwrap_or(1)
    }
}

/// A switch that ended in FAILED.
#[derive(Debug)]
pub struct SwitchFailure {
    pub operation: SwitchOperation,
    pub step: SwitchStep,
    pub error: SwitchError,
}

impl SwitchFailure {
    pub fn kind(&self) -> SwitchErrorKind {
        self.error.kind()
    }

    pub fn exit_code(&self) -> i32 {
        self.error.exit_code()
    }
}

impl fmt::Display for SwitchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "switch {} failed at {}: {}", self.operation, self.step, self.error)
    }
}

impl std::error::Error for SwitchFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::CommandOutput;
    use crate::runtime::LifecycleOp;

    #[test]
    fn lifecycle_error_propagates_command_exit_code() {
        let err = SwitchError::Lifecycle {
            color: Color::Green,
            source: LifecycleError::CommandFailed {
                op: LifecycleOp::Start,
                command: "docker compose up -d app_green".to_string(),
                output: CommandOutput::failed(125, "camera busy"),
            },
        };
        assert_eq!(err.exit_code(), 125);
        assert_eq!(err.kind(), SwitchErrorKind::Lifecycle);
    }

    #[test]
    fn proxy_failure_is_a_lifecycle_failure() {
        let err = SwitchError::Proxy {
            source: LifecycleError::CommandFailed {
                op: LifecycleOp::StartProxy,
                command: "docker compose up -d nginx".to_string(),
                output: CommandOutput::failed(17, "port 80 already allocated"),
            },
        };
        assert_eq!(err.kind(), SwitchErrorKind::Lifecycle);
        assert_eq!(err.exit_code(), 17);
        assert!(err.to_string().starts_with("proxy service: start-proxy failed"));
    }

    #[test]
    fn timeouts_use_generic_exit_code() {
        let err = SwitchError::HealthTimeout {
            color: Color::Blue,
            waited: Duration::from_secs(60),
            last: InstanceHealth::Starting,
        };
        assert_eq!(err.exit_code(), 1);
        assert_eq!(
            err.to_string(),
            "blue instance not healthy after 60s (last status: starting)"
        );
    }

    #[test]
    fn invalid_config_is_its_own_kind() {
        let err = SwitchError::Routing(RoutingError::Invalid {
            output: CommandOutput::failed(1, "nginx: [emerg] host not found"),
        });
        assert_eq!(err.kind(), SwitchErrorKind::ConfigInvalid);
        assert_eq!(err.exit_code(), 1);
    }
}
