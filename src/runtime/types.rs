// ABOUTME: Runtime type definitions for Docker and Podman.
// ABOUTME: Includes the RuntimeType enum, lifecycle operations, and observed instance health.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The container runtime whose compose front end drives the instances.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeType {
    #[default]
    Docker,
    Podman,
}

impl RuntimeType {
    /// Name of the CLI binary for this runtime.
    pub fn binary(&self) -> &'static str {
        match self {
            RuntimeType::Docker => "docker",
            RuntimeType::Podman => "podman",
        }
    }
}

impl fmt::Display for RuntimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binary())
    }
}

/// A single lifecycle command issued against an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleOp {
    Build,
    Start,
    StartProxy,
    Stop,
    Remove,
    Status,
    EnsureNetwork,
}

impl fmt::Display for LifecycleOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleOp::Build => "build",
            LifecycleOp::Start => "start",
            LifecycleOp::StartProxy => "start-proxy",
            LifecycleOp::Stop => "stop",
            LifecycleOp::Remove => "remove",
            LifecycleOp::Status => "status",
            LifecycleOp::EnsureNetwork => "ensure-network",
        };
        f.write_str(name)
    }
}

/// Health as reported by a running instance. Observed, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceHealth {
    Starting,
    Healthy,
    Unhealthy,
    Unknown,
}

impl InstanceHealth {
    pub fn is_healthy(&self) -> bool {
        matches!(self, InstanceHealth::Healthy)
    }
}

impl fmt::Display for InstanceHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InstanceHealth::Starting => "starting",
            InstanceHealth::Healthy => "healthy",
            InstanceHealth::Unhealthy => "unhealthy",
            InstanceHealth::Unknown => "unknown",
        };
        f.write_str(name)
    }
}
