// ABOUTME: Capability traits at the seam between the orchestrator and the container runtime.
// ABOUTME: InstanceLifecycle drives instances by color; Reachability checks the proxy's view.

use async_trait::async_trait;

use super::error::LifecycleError;
use super::types::InstanceHealth;
use crate::types::{Color, ServiceName};

/// Start, stop, and remove the instance for a color, and keep the proxy up.
///
/// Implementations make exactly one attempt per call. Retrying belongs to
/// the caller.
#[async_trait]
pub trait InstanceLifecycle: Send + Sync {
    /// Build the instance's image.
    async fn build(&self, color: Color) -> Result<(), LifecycleError>;

    /// Create (if needed) and start the instance.
    async fn start(&self, color: Color) -> Result<(), LifecycleError>;

    /// Stop the running instance.
    async fn stop(&self, color: Color) -> Result<(), LifecycleError>;

    /// Remove the stopped instance's container.
    async fn remove(&self, color: Color) -> Result<(), LifecycleError>;

    /// Bring up the routing proxy, rebuilding it when `build` is set.
    ///
    /// Leaves an already running proxy in place.
    async fn start_proxy(&self, build: bool) -> Result<(), LifecycleError>;

    /// Read the instance's externally reported health.
    async fn health_status(&self, color: Color) -> Result<InstanceHealth, LifecycleError>;
}

/// Whether the proxy can currently resolve an instance's network name.
#[async_trait]
pub trait Reachability: Send + Sync {
    async fn is_reachable(&self, name: &ServiceName) -> Result<bool, LifecycleError>;
}
