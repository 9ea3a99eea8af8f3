// ABOUTME: Health and reachability gates: bounded polling until a condition holds.
// ABOUTME: Probes are pluggable (runtime-reported status or an HTTP endpoint).

mod container;
mod http;
mod reachability;

pub use container::ContainerProbe;
pub use http::{HttpProbe, ProbeError};
pub use reachability::wait_reachable;

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

use crate::runtime::InstanceHealth;
use crate::types::Color;

/// Observes an instance's health. One observation per call.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn probe(&self, color: Color) -> InstanceHealth;
}

/// A wait that hit its deadline without the condition holding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimedOut<T> {
    pub attempts: u32,
    pub waited: Duration,
    /// The last observation before giving up.
    pub last: T,
}

/// Call `check` every `interval` until it returns `Ok` or `timeout` elapses.
///
/// `check` always runs at least once. On success returns the number of
/// attempts made.
pub async fn poll_until<T, F, Fut>(
    timeout: Duration,
    interval: Duration,
    mut check: F,
) -> Result<u32, TimedOut<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), T>>,
{
    let start = Instant::now();
    let deadline = start + timeout;
    let mut attempts = 0;

    loop {
        attempts += 1;
        match check().await {
            Ok(()) => return Ok(attempts),
            Err(last) => {
                let now = Instant::now();
                if now >= deadline {
                    return Err(TimedOut {
                        attempts,
                        waited: now - start,
                        last,
                    });
                }
                tokio::time::sleep(interval.min(deadline - now)).await;
            }
        }
    }
}

/// Block until `color` reports healthy, or fail with the last status seen.
pub async fn wait_healthy<H: HealthProbe + ?Sized>(
    probe: &H,
    color: Color,
    timeout: Duration,
    interval: Duration,
) -> Result<u32, TimedOut<InstanceHealth>> {
    poll_until(timeout, interval, || async move {
        let health = probe.probe(color).await;
        tracing::debug!("{} health: {}", color, health);
        if health.is_healthy() {
            Ok(())
        } else {
            Err(health)
        }
    })
    .await
}
