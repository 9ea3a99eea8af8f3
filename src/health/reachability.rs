// ABOUTME: Waits until the proxy can resolve an instance's network name.
// ABOUTME: Guards against routing to a freshly created container the proxy cannot see yet.

use std::time::Duration;

use super::{TimedOut, poll_until};
use crate::runtime::Reachability;
use crate::types::ServiceName;

/// Block until `name` is reachable from the proxy, or fail with the last reason.
pub async fn wait_reachable<N: Reachability + ?Sized>(
    network: &N,
    name: &ServiceName,
    timeout: Duration,
    interval: Duration,
) -> Result<u32, TimedOut<String>> {
    poll_until(timeout, interval, || async move {
        match network.is_reachable(name).await {
            Ok(true) => Ok(()),
            Ok(false) => {
                tracing::debug!("{} not resolvable from proxy yet", name);
                Err(format!("{name} not resolvable from proxy"))
            }
            Err(e) => {
                tracing::debug!("Reachability check for {} failed: {}", name, e);
                Err(e.to_string())
            }
        }
    })
    .await
}
