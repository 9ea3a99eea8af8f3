// ABOUTME: Drives one switch through every state-machine step against injected collaborators.
// ABOUTME: Fails fast on the first error and reports which step failed and what state was left behind.

use std::time::Duration;

use super::error::{SwitchError, SwitchFailure};
use super::operation::{SwitchOperation, SwitchOutcome, SwitchStep};
use super::state::Planned;
use super::switch::Switch;
use crate::config::{Config, ServicesConfig, SettleConfig};
use crate::health::HealthProbe;
use crate::proxy::{ProxyTemplate, RouteApplier};
use crate::runtime::{InstanceLifecycle, Reachability};
use crate::state::StateStore;
use crate::types::Color;

/// Timeout and poll interval for one bounded wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub timeout: Duration,
    pub interval: Duration,
}

/// Knobs that shape a switch, independent of how the collaborators are implemented.
#[derive(Debug, Clone)]
pub struct SwitchPolicy {
    pub default_color: Color,
    pub build: bool,
    pub settle: SettleConfig,
    pub health: WaitPolicy,
    /// None disables the reachability gate.
    pub reachability: Option<WaitPolicy>,
}

impl SwitchPolicy {
    pub fn from_config(config: &Config) -> Self {
        let reachability = config.reachability.enabled.then_some(WaitPolicy {
            timeout: config.reachability.timeout,
            interval: config.reachability.interval,
        });
        Self {
            default_color: config.default_color,
            build: config.build,
            settle: config.settle.clone(),
            health: WaitPolicy {
                timeout: config.health.timeout,
                interval: config.health.interval,
            },
            reachability,
        }
    }
}

/// Sequences one switch: compute target, stop old, start new, health gate,
/// reachability gate, routing update, persist.
///
/// Holds no lock of its own; callers must not run two concurrently against
/// the same state file.
pub struct Orchestrator<'a> {
    pub lifecycle: &'a dyn InstanceLifecycle,
    pub health: &'a dyn HealthProbe,
    /// Required when `policy.reachability` is set; the gate is skipped otherwise.
    pub reachability: Option<&'a dyn Reachability>,
    pub router: &'a dyn RouteApplier,
    pub template: &'a ProxyTemplate,
    pub store: &'a StateStore,
    pub services: &'a ServicesConfig,
    pub policy: SwitchPolicy,
}

impl Orchestrator<'_> {
    /// COMPUTE_TARGET from the persisted active color.
    pub fn plan(&self) -> Switch<Planned> {
        Switch::plan(self.store.read(), self.policy.default_color)
    }

    /// Plan and execute a switch.
    pub async fn run(&self) -> Result<SwitchOperation, SwitchFailure> {
        self.execute(self.plan()).await
    }

    /// Execute a planned switch to completion or to its first failure.
    pub async fn execute(&self, switch: Switch<Planned>) -> Result<SwitchOperation, SwitchFailure> {
        let record = switch.operation();
        tracing::info!("Starting switch {}", record);

        let switch = switch
            .stop_old(self.lifecycle, self.policy.settle.after_stop)
            .await
            .map_err(|e| self.fail(&record, SwitchStep::StopOld, e))?;

        let switch = switch
            .start_new(self.lifecycle, self.policy.build, self.policy.settle.after_start)
            .await
            .map_err(|e| self.fail(&record, SwitchStep::StartNew, e))?;

        let switch = switch
            .await_healthy(self.health, self.policy.health.timeout, self.policy.health.interval)
            .await
            .map_err(|e| self.fail(&record, SwitchStep::AwaitHealthy, e))?;

        let switch = match (self.policy.reachability, self.reachability) {
            (Some(wait), Some(network)) => {
                let name = self.services.for_color(record.to);
                switch
                    .await_reachable(network, name, wait.timeout, wait.interval)
                    .await
                    .map_err(|e| self.fail(&record, SwitchStep::AwaitReachable, e))?
            }
            (Some(_), None) => {
                tracing::warn!("Reachability gate enabled but no checker available; skipping");
                switch.skip_reachability()
            }
            (None, _) => switch.skip_reachability(),
        };

        let switch = switch
            .update_routing(self.router, self.template)
            .await
            .map_err(|e| self.fail(&record, SwitchStep::UpdateRouting, e))?;

        let switch = switch
            .persist(self.store)
            .map_err(|e| self.fail(&record, SwitchStep::Persist, e))?;

        let operation = switch.finish();
        tracing::info!(
            "Switch {} complete in {:.1}s",
            operation,
            operation.elapsed_secs()
        );
        Ok(operation)
    }

    /// Log the failure with what it leaves behind, then build the terminal record.
    fn fail(&self, record: &SwitchOperation, step: SwitchStep, error: SwitchError) -> SwitchFailure {
        let from = record.from;
        let to = record.to;

        match step {
            SwitchStep::StopOld => {
                if let Some(old) = from {
                    tracing::error!("Could not stop {}; it may still hold the camera", old);
                }
            }
            SwitchStep::StartNew => match &error {
                SwitchError::Proxy { .. } => {
                    tracing::error!("{} is running but the proxy is down; nothing is served", to);
                }
                _ => tracing::error!("{} failed to start and no instance is serving", to),
            },
            SwitchStep::AwaitHealthy => {
                tracing::error!(
                    "{} left running for inspection; routing unchanged and no healthy instance is live",
                    to
                );
            }
            SwitchStep::AwaitReachable => {
                tracing::error!("{} is healthy but unreachable from the proxy; routing unchanged", to);
            }
            SwitchStep::UpdateRouting => match from {
                Some(old) => tracing::error!(
                    "Routing inconsistency: persisted state still names {} (stopped) while {} runs unrouted",
                    old,
                    to
                ),
                None => tracing::error!(
                    "Routing inconsistency: no persisted state while {} runs unrouted",
                    to
                ),
            },
            SwitchStep::Persist => {
                tracing::error!(
                    "Traffic is routed to {} but the state file was not updated",
                    to
                );
            }
            SwitchStep::ComputeTarget => {}
        }

        let operation = record.clone().with_outcome(SwitchOutcome::Failed(step));
        tracing::error!("Switch {} failed at {}: {}", operation, step, error);
        SwitchFailure {
            operation,
            step,
            error,
        }
    }
}
