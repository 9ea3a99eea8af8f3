// ABOUTME: State transition methods for the switch state machine.
// ABOUTME: Each method consumes self and returns the next state, failing fast on any error.

use std::time::Duration;

use super::error::SwitchError;
use super::operation::{SwitchOperation, SwitchOutcome};
use super::state::{Done, Healthy, NewStarted, OldStopped, Planned, Reachable, Routed};
use super::switch::Switch;
use crate::health::{HealthProbe, wait_healthy, wait_reachable};
use crate::proxy::{ProxyTemplate, RouteApplier};
use crate::runtime::{InstanceLifecycle, Reachability};
use crate::state::StateStore;
use crate::types::{Color, ServiceName};

fn lifecycle_error(color: Color) -> impl FnOnce(crate::runtime::LifecycleError) -> SwitchError {
    move |source| SwitchError::Lifecycle { color, source }
}

async fn settle(delay: Duration, reason: &str) {
    if !delay.is_zero() {
        tracing::debug!("Settling {:?} {}", delay, reason);
        tokio::time::sleep(delay).await;
    }
}

// =============================================================================
// Planned -> OldStopped
// =============================================================================

impl Switch<Planned> {
    /// STOP_OLD: stop and remove the live instance so it releases the camera.
    ///
    /// Skipped on bootstrap. `settle_delay` runs after removal only when
    /// something was actually stopped.
    #[must_use = "switch state must be used"]
    pub async fn stop_old<L: InstanceLifecycle + ?Sized>(
        self,
        lifecycle: &L,
        settle_delay: Duration,
    ) -> Result<Switch<OldStopped>, SwitchError> {
        let Some(old) = self.from else {
            tracing::info!("No active instance recorded; bootstrapping {}", self.to);
            return Ok(self.transition(OldStopped));
        };

        tracing::info!("Stopping {} instance", old);
        lifecycle.stop(old).await.map_err(lifecycle_error(old))?;
        tracing::info!("Removing {} instance", old);
        lifecycle.remove(old).await.map_err(lifecycle_error(old))?;
        settle(settle_delay, "for camera release").await;

        Ok(self.transition(OldStopped))
    }
}

// =============================================================================
// OldStopped -> NewStarted
// =============================================================================

impl Switch<OldStopped> {
    /// START_NEW: optionally build, then start the target instance and make
    /// sure the proxy that will route to it is up.
    #[must_use = "switch state must be used"]
    pub async fn start_new<L: InstanceLifecycle + ?Sized>(
        self,
        lifecycle: &L,
        build: bool,
        settle_delay: Duration,
    ) -> Result<Switch<NewStarted>, SwitchError> {
        let color = self.to;
        if build {
            tracing::info!("Building {} instance", color);
            lifecycle.build(color).await.map_err(lifecycle_error(color))?;
        }

        tracing::info!("Starting {} instance", color);
        lifecycle.start(color).await.map_err(lifecycle_error(color))?;
        tracing::info!("Ensuring proxy is up");
        lifecycle
            .start_proxy(build)
            .await
            .map_err(|source| SwitchError::Proxy { source })?;
        settle(settle_delay, "before health polling").await;

        Ok(self.transition(NewStarted))
    }
}

// =============================================================================
// NewStarted -> Healthy
// =============================================================================

impl Switch<NewStarted> {
    /// AWAIT_HEALTHY: poll until the new instance reports healthy.
    ///
    /// On timeout the instance is left running so it can be inspected.
    #[must_use = "switch state must be used"]
    pub async fn await_healthy<H: HealthProbe + ?Sized>(
        self,
        probe: &H,
        timeout: Duration,
        interval: Duration,
    ) -> Result<Switch<Healthy>, SwitchError> {
        let color = self.to;
        tracing::info!("Waiting up to {:?} for {} to become healthy", timeout, color);

        match wait_healthy(probe, color, timeout, interval).await {
            Ok(attempts) => {
                tracing::info!("{} healthy after {} check(s)", color, attempts);
                Ok(self.transition(Healthy))
            }
            Err(timed_out) => Err(SwitchError::HealthTimeout {
                color,
                waited: timed_out.waited,
                last: timed_out.last,
            }),
        }
    }
}

// =============================================================================
// Healthy -> Reachable
// =============================================================================

impl Switch<Healthy> {
    /// AWAIT_REACHABLE: poll until the proxy can resolve the new instance.
    #[must_use = "switch state must be used"]
    pub async fn await_reachable<N: Reachability + ?Sized>(
        self,
        network: &N,
        name: &ServiceName,
        timeout: Duration,
        interval: Duration,
    ) -> Result<Switch<Reachable>, SwitchError> {
        tracing::info!("Waiting up to {:?} for proxy to reach {}", timeout, name);

        match wait_reachable(network, name, timeout, interval).await {
            Ok(attempts) => {
                tracing::info!("{} reachable after {} check(s)", name, attempts);
                Ok(self.transition(Reachable))
            }
            Err(timed_out) => Err(SwitchError::ReachabilityTimeout {
                name: name.clone(),
                waited: timed_out.waited,
                last: timed_out.last,
            }),
        }
    }

    /// Proceed without a reachability gate (proxy shares the instance's network view).
    pub fn skip_reachability(self) -> Switch<Reachable> {
        tracing::debug!("Reachability gate disabled");
        self.transition(Reachable)
    }
}

// =============================================================================
// Reachable -> Routed
// =============================================================================

impl Switch<Reachable> {
    /// UPDATE_ROUTING: render the config for the new color and activate it.
    #[must_use = "switch state must be used"]
    pub async fn update_routing<A: RouteApplier + ?Sized>(
        self,
        applier: &A,
        template: &ProxyTemplate,
    ) -> Result<Switch<Routed>, SwitchError> {
        let config_text = template.render(self.to);
        tracing::info!("Routing traffic to {}", self.to);
        applier.apply(&config_text).await?;
        Ok(self.transition(Routed))
    }
}

// =============================================================================
// Routed -> Done
// =============================================================================

impl Switch<Routed> {
    /// PERSIST: commit the new active color. Runs only after routing is live.
    #[must_use = "switch state must be used"]
    pub fn persist(self, store: &StateStore) -> Result<Switch<Done>, SwitchError> {
        store.write(self.to)?;
        Ok(self.transition(Done))
    }
}

// =============================================================================
// Done - Terminal State
// =============================================================================

impl Switch<Done> {
    /// Consume the switch and return its completed record.
    pub fn finish(self) -> SwitchOperation {
        self.operation().with_outcome(SwitchOutcome::Done)
    }
}
